//! Herd AI - Steering and Motion
//!
//! This crate drives a population of agents toward shared or per-agent moving
//! targets while keeping them from bunching up.
//!
//! # Features
//!
//! - Steering behaviors (seek, arrive, separation)
//! - Staggered path refresh so agents don't all query navigation on one frame
//! - Bounded-force, bounded-speed motion integration with smooth facing
//! - Grid nav mesh (A*) and kinematic host as reference collaborators
//!
//! # Frame structure
//!
//! ```text
//!  rendered frame          physics step (0..n per frame)        end of frame
//! ┌───────────────┐       ┌──────────────────────────────┐     ┌───────────┐
//! │ process()     │ ───▶  │ physics_step()               │ ──▶ │ end_frame │
//! │ scheduler     │       │ seek/arrive + separate       │     │ removals  │
//! │ writes paths  │       │ clamp, integrate, host apply │     └───────────┘
//! └───────────────┘       └──────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use herd_ai::prelude::*;
//!
//! let mut sim = Simulation::new(SimulationConfig::default())?;
//! let target = sim.create_target(Vec3::new(10.0, 0.0, 0.0));
//! let agent = sim.create_agent(AgentParams::default(), Some(target))?;
//! host.spawn(agent, Vec3::ZERO);
//!
//! sim.process(dt, &mut navigator, &host);
//! sim.physics_step(dt, &mut host);
//! sim.end_frame(&mut navigator);
//! ```

pub mod agent;
pub mod config;
pub mod host;
pub mod integrator;
pub mod navigation;
pub mod registry;
pub mod scheduler;
pub mod simulation;
pub mod steering;

pub mod prelude {
    pub use crate::agent::{debug_color, Agent};
    pub use crate::config::{AgentParams, SimulationConfig};
    pub use crate::host::{HostConfig, KinematicHost, MotionHost};
    pub use crate::integrator::MotionIntegrator;
    pub use crate::navigation::{GridNavigator, NavMesh, NavPath, Navigator};
    pub use crate::registry::{AgentRegistry, NeighborSnapshot};
    pub use crate::scheduler::{PathRefreshScheduler, PathState, SteeringMode};
    pub use crate::simulation::Simulation;
    pub use crate::steering::{arrive, seek, separate, SteeringOutput};
    pub use herd_core::prelude::*;
    pub use herd_math::Vec3;
}

pub use prelude::*;
