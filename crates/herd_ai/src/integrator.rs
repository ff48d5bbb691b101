//! Motion integration
//!
//! One physics step for one agent:
//!
//! 1. seek or arrive toward the cached waypoint (per [`SteeringMode`])
//! 2. separation, when anyone else is around
//! 3. weighted sum, clamped to `max_force`
//! 4. `velocity += force * dt`, clamped to `max_speed`
//! 5. ease facing toward the direction of travel
//! 6. gravity in the air, vertical velocity zeroed on the ground
//! 7. hand the velocity to the host

use crate::agent::Agent;
use crate::config::DEFAULT_TURN_RATE;
use crate::host::MotionHost;
use crate::registry::NeighborSnapshot;
use crate::scheduler::SteeringMode;
use crate::steering::{self, SteeringOutput, STEERING_EPSILON};
use herd_math::{lerp_angle, wrap_angle, Vec3};

/// Integrates steering forces into agent velocity
#[derive(Debug, Clone, Copy)]
pub struct MotionIntegrator {
    turn_rate: f32,
}

impl MotionIntegrator {
    pub fn new(turn_rate: f32) -> Self {
        Self { turn_rate }
    }

    /// Blended, clamped steering force for `agent` at `position`
    pub fn steering_force(
        &self,
        agent: &Agent,
        position: Vec3,
        neighbors: &NeighborSnapshot,
        separation_active: bool,
    ) -> Vec3 {
        let params = &agent.params;
        let mut output = SteeringOutput::zero();

        if let Some(waypoint) = agent.path.waypoint() {
            let force = match agent.path.mode() {
                SteeringMode::Arriving => steering::arrive(
                    waypoint,
                    position,
                    agent.velocity,
                    params.max_speed,
                    params.max_force,
                    params.slowing_radius,
                ),
                SteeringMode::Following => {
                    steering::seek(waypoint, position, agent.velocity, params.max_speed)
                }
            };
            output.add_weighted(force, params.arrive_weight);
        }

        if separation_active {
            let force = steering::separate(
                position,
                agent.velocity,
                neighbors.others(agent.id),
                params.separation_radius,
                params.separation_strength,
                params.max_speed,
            );
            output.add_weighted(force, params.separation_weight);
        }

        output.clamped(params.max_force)
    }

    /// Apply `force` for `dt`, updating velocity and facing. Returns the
    /// velocity to hand to the host.
    pub fn integrate(
        &self,
        agent: &mut Agent,
        force: Vec3,
        grounded: bool,
        gravity: Vec3,
        dt: f32,
    ) -> Vec3 {
        let mut velocity = agent.velocity + force * dt;
        velocity = velocity.clamp_length(agent.params.max_speed);

        if velocity.length_squared() > STEERING_EPSILON {
            let target_yaw = (-velocity.x).atan2(-velocity.z);
            let weight = (self.turn_rate * dt).min(1.0);
            agent.yaw = wrap_angle(lerp_angle(agent.yaw, target_yaw, weight));
        }

        if grounded {
            velocity.y = 0.0;
        } else {
            velocity += gravity * dt;
        }

        agent.velocity = velocity;
        velocity
    }

    /// Run a full physics step for `agent`. Agents the host has no body for
    /// are left untouched.
    pub fn step<H: MotionHost + ?Sized>(
        &self,
        agent: &mut Agent,
        neighbors: &NeighborSnapshot,
        separation_active: bool,
        host: &mut H,
        dt: f32,
    ) {
        let Some(position) = neighbors.position(agent.id).or_else(|| host.position(agent.id)) else {
            return;
        };

        let force = self.steering_force(agent, position, neighbors, separation_active);
        let velocity = self.integrate(agent, force, host.is_grounded(agent.id), host.gravity(), dt);

        agent.velocity = host.apply_velocity(agent.id, velocity, dt);
    }
}

impl Default for MotionIntegrator {
    fn default() -> Self {
        Self::new(DEFAULT_TURN_RATE)
    }
}
