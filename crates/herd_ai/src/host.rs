//! Host motion system boundary
//!
//! The host owns agent transforms and collision resolution. The steering core
//! hands it a velocity each physics step and reads back what the host actually
//! applied.

use herd_core::AgentId;
use herd_math::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Motion collaborator seen by the steering core
pub trait MotionHost {
    /// Current world position, `None` if the host has no body for `agent`
    fn position(&self, agent: AgentId) -> Option<Vec3>;

    /// Move the agent with `velocity` for `dt` seconds, resolving collisions.
    /// Returns the velocity that remains after collision response.
    fn apply_velocity(&mut self, agent: AgentId, velocity: Vec3, dt: f32) -> Vec3;

    /// Whether the agent is standing on a surface
    fn is_grounded(&self, agent: AgentId) -> bool;

    /// Gravity acceleration
    fn gravity(&self) -> Vec3;
}

/// Configuration for [`KinematicHost`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Gravity vector
    pub gravity: Vec3,
    /// Height of the flat ground plane
    pub ground_height: f32,
    /// Bodies this close above the ground count as grounded
    pub ground_tolerance: f32,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.8, 0.0),
            ground_height: 0.0,
            ground_tolerance: 1e-3,
        }
    }
}

impl HostConfig {
    /// Set gravity
    pub fn with_gravity(mut self, x: f32, y: f32, z: f32) -> Self {
        self.gravity = Vec3::new(x, y, z);
        self
    }
}

#[derive(Debug, Clone, Copy)]
struct Body {
    position: Vec3,
    grounded: bool,
}

/// Minimal host: explicit Euler integration over an infinite flat floor
#[derive(Debug, Clone, Default)]
pub struct KinematicHost {
    config: HostConfig,
    bodies: HashMap<AgentId, Body>,
}

impl KinematicHost {
    pub fn new(config: HostConfig) -> Self {
        Self {
            config,
            bodies: HashMap::new(),
        }
    }

    /// Create a body for `agent` at `position`
    pub fn spawn(&mut self, agent: AgentId, position: Vec3) {
        let grounded = self.is_on_ground(position);
        self.bodies.insert(agent, Body { position, grounded });
    }

    /// Remove the agent's body
    pub fn despawn(&mut self, agent: AgentId) -> bool {
        self.bodies.remove(&agent).is_some()
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    fn is_on_ground(&self, position: Vec3) -> bool {
        position.y <= self.config.ground_height + self.config.ground_tolerance
    }
}

impl MotionHost for KinematicHost {
    fn position(&self, agent: AgentId) -> Option<Vec3> {
        self.bodies.get(&agent).map(|b| b.position)
    }

    fn apply_velocity(&mut self, agent: AgentId, velocity: Vec3, dt: f32) -> Vec3 {
        let ground = self.config.ground_height;
        let tolerance = self.config.ground_tolerance;

        let Some(body) = self.bodies.get_mut(&agent) else {
            return velocity;
        };

        let mut velocity = velocity;
        let mut position = body.position + velocity * dt;

        if position.y <= ground + tolerance {
            position.y = ground;
            // the floor absorbs downward motion
            if velocity.y < 0.0 {
                velocity.y = 0.0;
            }
            body.grounded = true;
        } else {
            body.grounded = false;
        }

        body.position = position;
        velocity
    }

    fn is_grounded(&self, agent: AgentId) -> bool {
        self.bodies.get(&agent).is_some_and(|b| b.grounded)
    }

    fn gravity(&self) -> Vec3 {
        self.config.gravity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_moves_along_ground() {
        let mut host = KinematicHost::default();
        let agent = AgentId::from_raw(0);
        host.spawn(agent, Vec3::ZERO);
        assert!(host.is_grounded(agent));

        let v = host.apply_velocity(agent, Vec3::new(2.0, 0.0, 0.0), 0.5);
        assert_eq!(v, Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(host.position(agent), Some(Vec3::new(1.0, 0.0, 0.0)));
    }

    #[test]
    fn test_lands_on_ground() {
        let mut host = KinematicHost::default();
        let agent = AgentId::from_raw(0);
        host.spawn(agent, Vec3::new(0.0, 0.1, 0.0));
        assert!(!host.is_grounded(agent));

        let v = host.apply_velocity(agent, Vec3::new(0.0, -1.0, 0.0), 0.5);
        assert_eq!(v.y, 0.0);
        assert!(host.is_grounded(agent));
        assert_abs_diff_eq!(host.position(agent).unwrap().y, 0.0);
    }

    #[test]
    fn test_unknown_agent() {
        let mut host = KinematicHost::new(HostConfig::default().with_gravity(0.0, -1.0, 0.0));
        let ghost = AgentId::from_raw(42);
        assert_eq!(host.position(ghost), None);
        assert!(!host.is_grounded(ghost));
        assert_eq!(host.apply_velocity(ghost, Vec3::X, 1.0), Vec3::X);
        assert_eq!(host.gravity(), Vec3::new(0.0, -1.0, 0.0));
    }
}
