//! Demo scene: a crowd on a grid chasing a target dragged by the pointer

use crate::config::RuntimeConfig;
use crate::frame::FrameTiming;
use crate::pointer::{self, OrbitingPointer};
use herd_ai::prelude::*;
use std::collections::HashMap;

/// Spacing between spawn points
const SPAWN_SPACING: f32 = 2.0;

/// Snapshot of crowd state for progress reports
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CrowdStats {
    pub agents: usize,
    pub mean_distance: f32,
    pub max_distance: f32,
    pub max_speed: f32,
}

pub struct Scene {
    pub sim: Simulation,
    pub navigator: GridNavigator,
    pub host: KinematicHost,
    pub target: TargetId,
    pointer: OrbitingPointer,
    agent_params: AgentParams,
    /// Spawn lattice dimensions
    columns: usize,
    rows: usize,
    slots: HashMap<AgentId, usize>,
    free_slots: Vec<usize>,
    next_slot: usize,
    churn_interval: f32,
    since_churn: f32,
    queries: usize,
}

impl Scene {
    pub fn build(config: &RuntimeConfig) -> Result<Self> {
        let grid = &config.grid;
        let mesh = NavMesh::create_grid(grid.width, grid.depth, grid.cell_size);
        let center = grid.center();

        let mut sim = Simulation::new(config.simulation.clone())?;
        let target = sim.create_target(center);

        let mut scene = Self {
            sim,
            navigator: GridNavigator::new(mesh)
                .with_reached_distance(grid.waypoint_reached_distance),
            host: KinematicHost::new(config.host.clone()),
            target,
            pointer: OrbitingPointer::new(center, &config.pointer),
            agent_params: config.agent,
            columns: lattice_size(grid.width),
            rows: lattice_size(grid.depth),
            slots: HashMap::new(),
            free_slots: Vec::new(),
            next_slot: 0,
            churn_interval: config.churn_interval_secs,
            since_churn: 0.0,
            queries: 0,
        };

        for _ in 0..config.agent_count {
            scene.spawn_agent()?;
        }

        log::info!(
            "Scene ready: {} agents on {} nav polygons",
            scene.sim.len(),
            scene.navigator.mesh().polygons.len()
        );
        Ok(scene)
    }

    /// Run one rendered frame and every physics step it owes
    pub fn frame(&mut self, timing: &mut FrameTiming, physics_dt: f32) -> Result<()> {
        let dt = timing.delta_time;

        let ray = self.pointer.advance(dt);
        pointer::drag_target(&mut self.sim, self.target, &ray)?;

        self.queries += self.sim.process(dt, &mut self.navigator, &self.host);

        if self.churn_interval > 0.0 {
            self.since_churn += dt;
            if self.since_churn >= self.churn_interval {
                self.since_churn = 0.0;
                self.churn()?;
            }
        }

        while timing.consume_fixed_step(physics_dt) {
            self.sim.physics_step(physics_dt, &mut self.host);
        }

        for agent in self.sim.end_frame(&mut self.navigator) {
            self.host.despawn(agent);
        }
        Ok(())
    }

    /// Path queries issued since the last call
    pub fn take_query_count(&mut self) -> usize {
        std::mem::take(&mut self.queries)
    }

    pub fn stats(&self) -> CrowdStats {
        let goal = self.sim.target_position(self.target).unwrap_or(Vec3::ZERO);
        let mut stats = CrowdStats::default();
        let mut total = 0.0;

        for agent in self.sim.agents() {
            let Some(position) = self.host.position(agent.id()) else {
                continue;
            };
            let distance = position.horizontal().distance(goal.horizontal());
            total += distance;
            stats.agents += 1;
            stats.max_distance = stats.max_distance.max(distance);
            stats.max_speed = stats.max_speed.max(agent.velocity().horizontal().length());

            log::trace!(
                "{} at {:?} yaw {:.2} color {:?}",
                agent.id(),
                position,
                agent.yaw(),
                agent.debug_color()
            );
        }

        if stats.agents > 0 {
            stats.mean_distance = total / stats.agents as f32;
        }
        stats
    }

    /// Spawn an agent on a free lattice slot. Slots of retired agents are
    /// reused first; past the lattice's capacity, slots wrap and overlap.
    fn spawn_agent(&mut self) -> Result<AgentId> {
        let slot = match self.free_slots.pop() {
            Some(slot) => slot,
            None => {
                let slot = self.next_slot % (self.columns * self.rows);
                self.next_slot += 1;
                slot
            }
        };

        let position = Vec3::new(
            (slot % self.columns) as f32 * SPAWN_SPACING + SPAWN_SPACING * 0.5,
            0.0,
            (slot / self.columns) as f32 * SPAWN_SPACING + SPAWN_SPACING * 0.5,
        );

        let agent = self.sim.create_agent(self.agent_params, Some(self.target))?;
        self.host.spawn(agent, position);
        self.slots.insert(agent, slot);
        Ok(agent)
    }

    /// Retire the oldest agent and bring in a fresh one
    fn churn(&mut self) -> Result<()> {
        let oldest = self.sim.agents().map(Agent::id).min();
        if let Some(oldest) = oldest {
            self.sim.destroy_agent(oldest)?;
            if self.sim.agent(oldest).is_none() {
                // outside a frame removal is immediate, so end_frame won't report it
                self.host.despawn(oldest);
            }
            if let Some(slot) = self.slots.remove(&oldest) {
                self.free_slots.push(slot);
            }
        }
        let fresh = self.spawn_agent()?;
        log::debug!("Churn: {:?} out, {} in", oldest, fresh);
        Ok(())
    }
}

/// Spawn points that fit along one side of the grid
fn lattice_size(extent: f32) -> usize {
    ((extent / SPAWN_SPACING).floor() as usize).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> RuntimeConfig {
        let mut config = RuntimeConfig::default();
        config.agent_count = 6;
        config.grid.width = 20.0;
        config.grid.depth = 20.0;
        config.pointer.orbit_radius = 5.0;
        config.pointer.camera_offset = Vec3::new(0.0, 15.0, 8.0);
        config
    }

    fn run(scene: &mut Scene, config: &RuntimeConfig, seconds: f32) {
        let mut timing = FrameTiming::new(config.frame_rate);
        while timing.total_time < seconds {
            timing.update(config.frame_dt());
            scene.frame(&mut timing, config.physics_dt()).unwrap();
        }
    }

    #[test]
    fn test_build_spawns_population() {
        let config = small_config();
        let scene = Scene::build(&config).unwrap();

        assert_eq!(scene.sim.len(), 6);
        assert_eq!(scene.host.body_count(), 6);
        assert_eq!(scene.sim.target_position(scene.target), Some(config.grid.center()));
    }

    #[test]
    fn test_crowd_follows_dragged_target() {
        let config = small_config();
        let mut scene = Scene::build(&config).unwrap();
        let before = scene.stats();

        run(&mut scene, &config, 8.0);
        let after = scene.stats();

        assert_eq!(after.agents, 6);
        assert!(after.mean_distance < before.mean_distance);
        assert!(after.max_speed <= config.agent.max_speed + 1e-4);
        assert!(scene.take_query_count() > 6);
        assert_eq!(scene.take_query_count(), 0);
    }

    #[test]
    fn test_churn_keeps_population_steady() {
        let mut config = small_config();
        config.churn_interval_secs = 0.5;
        let mut scene = Scene::build(&config).unwrap();
        let first = scene.sim.agents().map(Agent::id).min().unwrap();

        run(&mut scene, &config, 2.2);

        assert_eq!(scene.sim.len(), 6);
        assert_eq!(scene.host.body_count(), 6);
        assert!(scene.sim.agent(first).is_none());
    }

    #[test]
    fn test_churn_reuses_retired_slot() {
        let mut config = small_config();
        config.agent_count = 3;
        let mut scene = Scene::build(&config).unwrap();
        let oldest = scene.sim.agents().map(Agent::id).min().unwrap();
        let slot_position = scene.host.position(oldest).unwrap();

        for _ in 0..50 {
            scene.churn().unwrap();
        }

        // every replacement lands on the lattice, never past the mesh edge
        assert_eq!(scene.sim.len(), 3);
        assert_eq!(scene.host.body_count(), 3);
        assert!(scene.sim.agents().all(|agent| {
            let p = scene.host.position(agent.id()).unwrap();
            p.x < config.grid.width && p.z < config.grid.depth
        }));
        assert_eq!(scene.next_slot, 3);
        assert!(scene.slots.values().all(|&slot| slot < 3));
        assert!(scene
            .sim
            .agents()
            .any(|agent| scene.host.position(agent.id()) == Some(slot_position)));
    }
}
