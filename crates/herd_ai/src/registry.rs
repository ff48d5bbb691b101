//! Live agent registry and neighbor snapshots

use herd_core::AgentId;
use herd_math::Vec3;

/// Set of live agents, in insertion order.
///
/// The registry tracks identities only; agent state lives with the
/// simulation driver. Removal swaps the last member into the hole, so order
/// is not stable across removals.
#[derive(Debug, Clone, Default)]
pub struct AgentRegistry {
    members: Vec<AgentId>,
    pending_removal: Vec<AgentId>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an agent. Returns false if it was already present.
    pub fn insert(&mut self, agent: AgentId) -> bool {
        if self.contains(agent) {
            return false;
        }
        self.members.push(agent);
        true
    }

    /// Unregister an agent immediately. Returns false if it wasn't present.
    pub fn remove(&mut self, agent: AgentId) -> bool {
        self.pending_removal.retain(|&id| id != agent);
        match self.members.iter().position(|&id| id == agent) {
            Some(idx) => {
                self.members.swap_remove(idx);
                true
            }
            None => false,
        }
    }

    /// Queue a removal for [`flush_removals`](Self::flush_removals); the
    /// agent stays visible to iteration until then.
    pub fn schedule_removal(&mut self, agent: AgentId) -> bool {
        if !self.contains(agent) || self.is_pending_removal(agent) {
            return false;
        }
        self.pending_removal.push(agent);
        true
    }

    pub fn is_pending_removal(&self, agent: AgentId) -> bool {
        self.pending_removal.contains(&agent)
    }

    /// Apply queued removals, returning the agents that left
    pub fn flush_removals(&mut self) -> Vec<AgentId> {
        let removed = std::mem::take(&mut self.pending_removal);
        for &agent in &removed {
            if let Some(idx) = self.members.iter().position(|&id| id == agent) {
                self.members.swap_remove(idx);
            }
        }
        removed
    }

    pub fn contains(&self, agent: AgentId) -> bool {
        self.members.contains(&agent)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.members.iter().copied()
    }
}

/// Positions of all registered agents, captured once per physics step so
/// separation never observes a half-updated crowd.
#[derive(Debug, Clone, Default)]
pub struct NeighborSnapshot {
    entries: Vec<(AgentId, Vec3)>,
}

impl NeighborSnapshot {
    /// Capture positions for `agents`; agents without a position are skipped
    pub fn capture<I, F>(agents: I, mut position_of: F) -> Self
    where
        I: IntoIterator<Item = AgentId>,
        F: FnMut(AgentId) -> Option<Vec3>,
    {
        let entries = agents
            .into_iter()
            .filter_map(|id| position_of(id).map(|pos| (id, pos)))
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn position(&self, agent: AgentId) -> Option<Vec3> {
        self.entries
            .iter()
            .find(|(id, _)| *id == agent)
            .map(|&(_, pos)| pos)
    }

    /// Positions of every agent except `agent`
    pub fn others(&self, agent: AgentId) -> impl Iterator<Item = Vec3> + '_ {
        self.entries
            .iter()
            .filter(move |(id, _)| *id != agent)
            .map(|&(_, pos)| pos)
    }
}
