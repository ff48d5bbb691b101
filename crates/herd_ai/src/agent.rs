//! Steering agent state

use crate::config::AgentParams;
use crate::scheduler::PathState;
use herd_core::{AgentId, TargetId};
use herd_math::Vec3;

/// Core-owned state of one agent.
///
/// Position belongs to the host motion system; everything the steering core
/// needs to remember between steps lives here.
#[derive(Debug, Clone)]
pub struct Agent {
    pub(crate) id: AgentId,
    pub(crate) velocity: Vec3,
    pub(crate) yaw: f32,
    pub(crate) target: Option<TargetId>,
    pub(crate) params: AgentParams,
    pub(crate) path: PathState,
}

impl Agent {
    pub(crate) fn new(id: AgentId, params: AgentParams, target: Option<TargetId>) -> Self {
        let mut path = PathState::default();
        if target.is_some() {
            path.request_refresh();
        }

        Self {
            id,
            velocity: Vec3::ZERO,
            yaw: 0.0,
            target,
            params,
            path,
        }
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    /// Velocity after the last physics step (post host collision response)
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Facing around the vertical axis, radians; zero faces -Z
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn target(&self) -> Option<TargetId> {
        self.target
    }

    pub fn params(&self) -> &AgentParams {
        &self.params
    }

    pub fn path(&self) -> &PathState {
        &self.path
    }

    /// Color used to tell agents' debug paths apart
    pub fn debug_color(&self) -> [f32; 3] {
        debug_color(self.id)
    }
}

/// Fully saturated hue stepped by 0.15 per identity, as RGB in `[0, 1]`
pub fn debug_color(agent: AgentId) -> [f32; 3] {
    let hue = (agent.raw() as f32 * 0.15) % 1.0;
    hsv_to_rgb(hue, 1.0, 1.0)
}

fn hsv_to_rgb(h: f32, s: f32, v: f32) -> [f32; 3] {
    let sector = (h * 6.0).floor();
    let f = h * 6.0 - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - f * s);
    let t = v * (1.0 - (1.0 - f) * s);

    match sector as i32 % 6 {
        0 => [v, t, p],
        1 => [q, v, p],
        2 => [p, v, t],
        3 => [p, q, v],
        4 => [t, p, v],
        _ => [v, p, q],
    }
}
