//! Simulation driver
//!
//! Owns agents, targets and the registry. Navigation and motion collaborators
//! are passed in per call, so the driver never holds on to host state.

use crate::agent::Agent;
use crate::config::{AgentParams, SimulationConfig};
use crate::host::MotionHost;
use crate::integrator::MotionIntegrator;
use crate::navigation::Navigator;
use crate::registry::{AgentRegistry, NeighborSnapshot};
use crate::scheduler::PathRefreshScheduler;
use herd_core::{AgentId, HerdError, IdGenerator, Result, TargetId};
use herd_math::Vec3;
use std::collections::HashMap;

/// A population of steering agents and the targets they chase
#[derive(Debug)]
pub struct Simulation {
    agents: HashMap<AgentId, Agent>,
    registry: AgentRegistry,
    targets: HashMap<TargetId, Vec3>,
    agent_ids: IdGenerator,
    target_ids: IdGenerator,
    scheduler: PathRefreshScheduler,
    integrator: MotionIntegrator,
    in_frame: bool,
    /// Destroyed outside a frame; the navigator forgets them on the next pass
    retired: Vec<AgentId>,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            scheduler: PathRefreshScheduler::from_config(&config),
            integrator: MotionIntegrator::new(config.turn_rate),
            agents: HashMap::new(),
            registry: AgentRegistry::new(),
            targets: HashMap::new(),
            agent_ids: IdGenerator::new(),
            target_ids: IdGenerator::new(),
            in_frame: false,
            retired: Vec::new(),
        })
    }

    pub fn scheduler(&self) -> &PathRefreshScheduler {
        &self.scheduler
    }

    /// Whether [`process`](Self::process) ran and [`end_frame`](Self::end_frame) hasn't yet
    pub fn is_in_frame(&self) -> bool {
        self.in_frame
    }

    // Targets

    pub fn create_target(&mut self, position: Vec3) -> TargetId {
        let id: TargetId = self.target_ids.next();
        self.targets.insert(id, position);
        log::debug!("Created {} at {:?}", id, position);
        id
    }

    /// Move a target. Agents pick the new position up on their next refresh.
    pub fn set_target_position(&mut self, target: TargetId, position: Vec3) -> Result<()> {
        let slot = self
            .targets
            .get_mut(&target)
            .ok_or(HerdError::UnknownTarget(target))?;
        *slot = position;
        Ok(())
    }

    pub fn target_position(&self, target: TargetId) -> Option<Vec3> {
        self.targets.get(&target).copied()
    }

    /// Remove a target; agents chasing it become idle
    pub fn remove_target(&mut self, target: TargetId) -> Result<()> {
        self.targets
            .remove(&target)
            .ok_or(HerdError::UnknownTarget(target))?;

        for agent in self.agents.values_mut() {
            if agent.target == Some(target) {
                agent.target = None;
                agent.path.clear();
            }
        }

        log::debug!("Removed {}", target);
        Ok(())
    }

    // Agents

    /// Spawn an agent. With a target, its first path is requested on the
    /// next [`process`](Self::process) pass.
    pub fn create_agent(
        &mut self,
        params: AgentParams,
        target: Option<TargetId>,
    ) -> Result<AgentId> {
        params.validate()?;
        if let Some(target) = target {
            self.check_target(target)?;
        }

        let id: AgentId = self.agent_ids.next();
        self.agents.insert(id, Agent::new(id, params, target));
        self.registry.insert(id);

        log::debug!("Created {} (target: {:?}, population: {})", id, target, self.registry.len());
        Ok(id)
    }

    /// Destroy an agent. Inside a frame the agent stays registered until
    /// [`end_frame`](Self::end_frame); outside a frame it leaves immediately.
    pub fn destroy_agent(&mut self, agent: AgentId) -> Result<()> {
        if !self.agents.contains_key(&agent) {
            return Err(HerdError::UnknownAgent(agent));
        }

        if self.in_frame {
            if self.registry.schedule_removal(agent) {
                log::debug!("Scheduled removal of {}", agent);
            }
            return Ok(());
        }

        self.registry.remove(agent);
        self.agents.remove(&agent);
        self.retired.push(agent);
        log::debug!("Destroyed {} (population: {})", agent, self.registry.len());
        Ok(())
    }

    /// Retarget an agent; `None` stops path following
    pub fn set_agent_target(&mut self, agent: AgentId, target: Option<TargetId>) -> Result<()> {
        if let Some(target) = target {
            self.check_target(target)?;
        }

        let state = self.agent_mut(agent)?;
        state.target = target;
        match target {
            Some(_) => state.path.request_refresh(),
            None => state.path.clear(),
        }
        Ok(())
    }

    pub fn set_agent_params(&mut self, agent: AgentId, params: AgentParams) -> Result<()> {
        params.validate()?;
        self.agent_mut(agent)?.params = params;
        Ok(())
    }

    pub fn agent(&self, agent: AgentId) -> Option<&Agent> {
        self.agents.get(&agent)
    }

    /// Live agents in registry order
    pub fn agents(&self) -> impl Iterator<Item = &Agent> + '_ {
        self.registry.iter().filter_map(|id| self.agents.get(&id))
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    // Frame passes

    /// Per rendered frame: advance every agent's refresh clock and update its
    /// cached waypoint. Returns the number of path queries issued.
    pub fn process<N, H>(&mut self, dt: f32, navigator: &mut N, host: &H) -> usize
    where
        N: Navigator + ?Sized,
        H: MotionHost + ?Sized,
    {
        self.in_frame = true;

        for agent in self.retired.drain(..) {
            navigator.forget(agent);
        }

        let mut queries = 0;
        for id in self.registry.iter() {
            let Some(agent) = self.agents.get_mut(&id) else {
                continue;
            };
            let Some(position) = host.position(id) else {
                continue;
            };

            let target = agent.target.and_then(|t| self.targets.get(&t).copied());
            if self
                .scheduler
                .update(id, &mut agent.path, dt, position, target, navigator)
            {
                queries += 1;
            }
        }

        if queries > 0 {
            log::trace!("Issued {} path queries", queries);
        }
        queries
    }

    /// Per physics step: steer and move every agent through `host`
    pub fn physics_step<H: MotionHost + ?Sized>(&mut self, dt: f32, host: &mut H) {
        let neighbors = NeighborSnapshot::capture(self.registry.iter(), |id| host.position(id));
        let separation_active = self.registry.len() > 1;

        for id in self.registry.iter() {
            if let Some(agent) = self.agents.get_mut(&id) {
                self.integrator
                    .step(agent, &neighbors, separation_active, host, dt);
            }
        }
    }

    /// Close the frame: apply deferred removals and drop their paths.
    /// Returns the agents that left so the caller can despawn their bodies.
    pub fn end_frame<N: Navigator + ?Sized>(&mut self, navigator: &mut N) -> Vec<AgentId> {
        let removed = self.registry.flush_removals();

        for &agent in &removed {
            self.agents.remove(&agent);
            navigator.forget(agent);
            log::debug!("Destroyed {} (population: {})", agent, self.registry.len());
        }

        self.in_frame = false;
        removed
    }

    fn check_target(&self, target: TargetId) -> Result<()> {
        if self.targets.contains_key(&target) {
            Ok(())
        } else {
            Err(HerdError::UnknownTarget(target))
        }
    }

    fn agent_mut(&mut self, agent: AgentId) -> Result<&mut Agent> {
        self.agents
            .get_mut(&agent)
            .ok_or(HerdError::UnknownAgent(agent))
    }
}
