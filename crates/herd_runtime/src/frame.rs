//! Frame timing
//!
//! Rendered frames drive path refresh; physics runs at its own fixed rate,
//! consumed from an accumulator.

use std::time::{Duration, Instant};

/// Longest frame delta accepted; anything longer is a stall, not motion
pub const DEFAULT_MAX_DELTA: f32 = 0.1;

/// Frame timing information
#[derive(Debug, Clone)]
pub struct FrameTiming {
    /// Target FPS
    pub target_fps: u32,
    /// Target frame time in seconds
    pub target_frame_time: f32,
    /// Frame deltas are clamped to this
    pub max_delta: f32,
    /// Time not yet consumed by fixed steps
    pub accumulator: f32,
    /// Total elapsed time
    pub total_time: f32,
    /// Last frame's delta time
    pub delta_time: f32,
    /// Frames seen so far
    pub frame: u64,
    /// Frame start time
    pub frame_start: Instant,
    /// Average FPS (smoothed)
    pub avg_fps: f32,
    fps_frame_count: u32,
    fps_time_accumulator: f32,
}

impl FrameTiming {
    pub fn new(target_fps: u32) -> Self {
        let target_fps = target_fps.max(1);
        Self {
            target_fps,
            target_frame_time: 1.0 / target_fps as f32,
            max_delta: DEFAULT_MAX_DELTA,
            accumulator: 0.0,
            total_time: 0.0,
            delta_time: 0.0,
            frame: 0,
            frame_start: Instant::now(),
            avg_fps: target_fps as f32,
            fps_frame_count: 0,
            fps_time_accumulator: 0.0,
        }
    }

    /// Start a frame lasting `delta_time` seconds. Returns the clamped delta.
    pub fn update(&mut self, delta_time: f32) -> f32 {
        let delta_time = delta_time.clamp(0.0, self.max_delta);

        self.delta_time = delta_time;
        self.total_time += delta_time;
        self.accumulator += delta_time;
        self.frame += 1;
        self.frame_start = Instant::now();

        self.fps_frame_count += 1;
        self.fps_time_accumulator += delta_time;
        if self.fps_time_accumulator >= 1.0 {
            self.avg_fps = self.fps_frame_count as f32 / self.fps_time_accumulator;
            self.fps_frame_count = 0;
            self.fps_time_accumulator = 0.0;
        }

        delta_time
    }

    /// Consume fixed timestep from accumulator
    pub fn consume_fixed_step(&mut self, fixed_timestep: f32) -> bool {
        if self.accumulator >= fixed_timestep {
            self.accumulator -= fixed_timestep;
            true
        } else {
            false
        }
    }

    /// How far into the next fixed step we are, in `[0, 1)`
    pub fn interpolation_factor(&self, fixed_timestep: f32) -> f32 {
        self.accumulator / fixed_timestep
    }

    /// Wall-clock time left in the current frame's budget
    pub fn remaining_budget(&self) -> Duration {
        Duration::from_secs_f32(self.target_frame_time).saturating_sub(self.frame_start.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_frame_timing() {
        let mut timing = FrameTiming::new(60);

        timing.update(1.0 / 60.0);
        timing.update(1.0 / 60.0);
        timing.update(1.0 / 60.0);

        assert_eq!(timing.frame, 3);
        assert_abs_diff_eq!(timing.total_time, 0.05, epsilon = 1e-6);
    }

    #[test]
    fn test_fixed_timestep() {
        let mut timing = FrameTiming::new(60);
        let fixed_step = 1.0 / 60.0;

        timing.update(fixed_step);

        assert!(timing.consume_fixed_step(fixed_step));
        assert!(!timing.consume_fixed_step(fixed_step));
    }

    #[test]
    fn test_physics_faster_than_frames() {
        let mut timing = FrameTiming::new(30);
        let fixed_step = 1.0 / 120.0;

        timing.update(1.0 / 30.0 + 1e-6);
        let mut steps = 0;
        while timing.consume_fixed_step(fixed_step) {
            steps += 1;
        }
        assert_eq!(steps, 4);
        assert!(timing.interpolation_factor(fixed_step) < 1.0);
    }

    #[test]
    fn test_stall_is_clamped() {
        let mut timing = FrameTiming::new(60);
        assert_eq!(timing.update(2.0), DEFAULT_MAX_DELTA);
        assert_eq!(timing.update(-1.0), 0.0);
        assert_abs_diff_eq!(timing.total_time, DEFAULT_MAX_DELTA);
    }
}
