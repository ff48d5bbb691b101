//! Steering behaviors
//!
//! Each behavior is a pure function of agent state that returns a steering
//! force (desired velocity minus current velocity). Degenerate geometry never
//! produces NaN: anything closer than [`STEERING_EPSILON`] yields zero.

use herd_math::Vec3;

/// Distances (and, for seek, squared distances) below this count as "already there"
pub const STEERING_EPSILON: f32 = 1e-4;

/// Steer toward `target` at full speed.
pub fn seek(target: Vec3, position: Vec3, velocity: Vec3, max_speed: f32) -> Vec3 {
    let to_target = target - position;

    if to_target.length_squared() < STEERING_EPSILON {
        return Vec3::ZERO;
    }

    let desired = to_target.normalize_or_zero() * max_speed;
    desired - velocity
}

/// Steer toward `target`, slowing down inside `slowing_radius` and braking
/// fully once the remaining distance is within stopping distance.
///
/// Stopping distance is `speed² / (2 · max_force)`, the distance needed to
/// reach zero speed under maximum deceleration.
pub fn arrive(
    target: Vec3,
    position: Vec3,
    velocity: Vec3,
    max_speed: f32,
    max_force: f32,
    slowing_radius: f32,
) -> Vec3 {
    let to_target = target - position;
    let distance = to_target.length();

    if distance < STEERING_EPSILON {
        return Vec3::ZERO;
    }

    let speed = velocity.length();
    let deceleration = max_force.max(STEERING_EPSILON);
    let stopping_distance = (speed * speed) / (2.0 * deceleration);

    if distance <= stopping_distance {
        return -velocity;
    }

    let target_speed = if distance < slowing_radius {
        max_speed * (distance / slowing_radius)
    } else {
        max_speed
    };

    let desired = to_target.normalize_or_zero() * target_speed;
    desired - velocity
}

/// Steer away from neighbors inside `separation_radius`.
///
/// Each neighbor contributes a repulsion proportional to the inverse of its
/// distance, and contributions are averaged rather than summed so the force
/// doesn't explode in dense crowds. The result is clamped to `strength`.
///
/// This is a linear scan: O(n) per agent and O(n²) per frame. Fine for a few
/// hundred agents; larger populations want a spatial index first.
pub fn separate<I>(
    position: Vec3,
    velocity: Vec3,
    neighbors: I,
    separation_radius: f32,
    strength: f32,
    max_speed: f32,
) -> Vec3
where
    I: IntoIterator<Item = Vec3>,
{
    let mut force = Vec3::ZERO;
    let mut count = 0u32;

    for other in neighbors {
        let to_other = other - position;
        let distance = to_other.length();

        // coincident agents have no direction to push along
        if distance < separation_radius && distance > STEERING_EPSILON {
            let away = -to_other.normalize_or_zero() / distance;
            force += away * strength;
            count += 1;
        }
    }

    if count == 0 {
        return Vec3::ZERO;
    }

    force = force / count as f32;
    let steer = force.normalize_or_zero() * max_speed - velocity;
    steer.clamp_length(strength)
}

/// Weighted accumulation of steering forces
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SteeringOutput {
    /// Summed linear force
    pub linear: Vec3,
}

impl SteeringOutput {
    /// Zero output
    pub fn zero() -> Self {
        Self::default()
    }

    /// Add a force scaled by its blend weight
    pub fn add_weighted(&mut self, force: Vec3, weight: f32) {
        self.linear += force * weight;
    }

    /// Magnitude of the summed force
    pub fn magnitude(&self) -> f32 {
        self.linear.length()
    }

    /// The summed force, capped at `max_force`
    pub fn clamped(&self, max_force: f32) -> Vec3 {
        self.linear.clamp_length(max_force)
    }
}
