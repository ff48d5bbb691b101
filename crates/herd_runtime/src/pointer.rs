//! Target dragging
//!
//! A pointer ray is projected onto the horizontal plane the target sits on and
//! the target jumps to the hit point. The headless runtime has no mouse, so
//! [`OrbitingPointer`] sweeps the ray around in a circle instead.

use crate::config::PointerConfig;
use herd_ai::Simulation;
use herd_core::{HerdError, Result, TargetId};
use herd_math::{Ray, Vec3};

/// Move `target` to where `ray` meets the target's own height plane.
///
/// Returns false, leaving the target in place, when the ray never reaches
/// that plane.
pub fn drag_target(sim: &mut Simulation, target: TargetId, ray: &Ray) -> Result<bool> {
    let current = sim
        .target_position(target)
        .ok_or(HerdError::UnknownTarget(target))?;

    match ray.intersect_horizontal_plane(current.y) {
        Some(hit) => {
            sim.set_target_position(target, hit)?;
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Scripted pointer circling a point on the ground, seen from a fixed camera
#[derive(Debug, Clone)]
pub struct OrbitingPointer {
    camera: Vec3,
    center: Vec3,
    radius: f32,
    speed: f32,
    angle: f32,
}

impl OrbitingPointer {
    pub fn new(center: Vec3, config: &PointerConfig) -> Self {
        Self {
            camera: center + config.camera_offset,
            center,
            radius: config.orbit_radius,
            speed: config.orbit_speed,
            angle: 0.0,
        }
    }

    /// Advance the pointer by `dt` and return the ray under it
    pub fn advance(&mut self, dt: f32) -> Ray {
        self.angle = herd_math::wrap_angle(self.angle + self.speed * dt);
        self.ray()
    }

    /// Ray from the camera through the pointer
    pub fn ray(&self) -> Ray {
        let aim = self.center
            + Vec3::new(self.angle.cos() * self.radius, 0.0, self.angle.sin() * self.radius);
        Ray::from_points(self.camera, aim)
    }
}
