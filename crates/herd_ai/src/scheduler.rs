//! Staggered path refresh
//!
//! Re-planning a path is the expensive navigation query. Each agent refreshes
//! once per interval plus a fixed per-agent offset, so a crowd that spawned on
//! the same frame spreads its queries over the interval instead of spiking.
//!
//! The scheduler runs once per rendered frame and is the only writer of
//! [`PathState`]; the motion integrator runs per physics step and only reads it.

use crate::config::SimulationConfig;
use crate::navigation::Navigator;
use herd_core::AgentId;
use herd_math::Vec3;

/// Which arrival behavior steers toward the cached waypoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SteeringMode {
    /// Intermediate waypoint: seek at full speed
    #[default]
    Following,
    /// Final waypoint: arrive and brake
    Arriving,
}

impl SteeringMode {
    /// Mode for a path cursor at `index` of `length` points
    pub fn from_path(index: usize, length: usize) -> Self {
        if length > 0 && index + 1 == length {
            SteeringMode::Arriving
        } else {
            SteeringMode::Following
        }
    }
}

/// Per-agent path cache
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathState {
    since_refresh: f32,
    refresh_pending: bool,
    waypoint: Option<Vec3>,
    mode: SteeringMode,
}

impl PathState {
    /// Seconds since the last refresh
    pub fn since_refresh(&self) -> f32 {
        self.since_refresh
    }

    /// Cached waypoint; `None` means no path contribution
    pub fn waypoint(&self) -> Option<Vec3> {
        self.waypoint
    }

    pub fn mode(&self) -> SteeringMode {
        self.mode
    }

    /// Whether the next scheduler pass refreshes regardless of timing
    pub fn is_refresh_pending(&self) -> bool {
        self.refresh_pending
    }

    /// Force a refresh on the next scheduler pass
    pub fn request_refresh(&mut self) {
        self.refresh_pending = true;
    }

    /// Drop the cached path
    pub fn clear(&mut self) {
        self.waypoint = None;
        self.mode = SteeringMode::Following;
        self.refresh_pending = false;
    }

    #[cfg(test)]
    pub(crate) fn set_cache(&mut self, waypoint: Option<Vec3>, mode: SteeringMode) {
        self.waypoint = waypoint;
        self.mode = mode;
    }

    fn sync<N: Navigator + ?Sized>(&mut self, agent: AgentId, position: Vec3, navigator: &mut N) {
        self.waypoint = navigator.next_waypoint(agent, position);
        self.mode = match self.waypoint {
            Some(_) => SteeringMode::from_path(
                navigator.path_index(agent),
                navigator.path_length(agent),
            ),
            None => SteeringMode::Following,
        };
    }
}

/// Decides when each agent re-queries navigation
#[derive(Debug, Clone, Copy)]
pub struct PathRefreshScheduler {
    interval: f32,
    slots: u32,
}

impl PathRefreshScheduler {
    pub fn new(interval: f32, slots: u32) -> Self {
        Self {
            interval,
            slots: slots.max(1),
        }
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(config.path_update_interval, config.stagger_slots)
    }

    /// Fixed stagger offset: `(id mod slots) * (interval / slots)`
    pub fn offset(&self, agent: AgentId) -> f32 {
        let slot = (agent.raw() % self.slots as u64) as f32;
        slot * (self.interval / self.slots as f32)
    }

    /// Accumulated time at which `agent` refreshes
    pub fn threshold(&self, agent: AgentId) -> f32 {
        self.interval + self.offset(agent)
    }

    /// Advance the agent's refresh clock by `dt`, re-plan toward `target` if
    /// due, then refresh the cached waypoint from the navigator cursor.
    ///
    /// Returns whether a path query was issued this frame.
    pub fn update<N: Navigator + ?Sized>(
        &self,
        agent: AgentId,
        state: &mut PathState,
        dt: f32,
        position: Vec3,
        target: Option<Vec3>,
        navigator: &mut N,
    ) -> bool {
        state.since_refresh += dt;

        let Some(target) = target else {
            state.clear();
            return false;
        };

        let due = state.refresh_pending || state.since_refresh >= self.threshold(agent);
        if due {
            state.since_refresh = 0.0;
            state.refresh_pending = false;
            navigator.set_destination(agent, position, target);
        }

        state.sync(agent, position, navigator);
        due
    }
}

impl Default for PathRefreshScheduler {
    fn default() -> Self {
        Self::from_config(&SimulationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    /// Straight-line navigator: path is [from, target]
    #[derive(Default)]
    struct LineNavigator {
        queries: Vec<AgentId>,
        target: Option<Vec3>,
        reachable: bool,
    }

    impl Navigator for LineNavigator {
        fn set_destination(&mut self, agent: AgentId, _from: Vec3, target: Vec3) {
            self.queries.push(agent);
            self.target = self.reachable.then_some(target);
        }

        fn next_waypoint(&mut self, _agent: AgentId, _position: Vec3) -> Option<Vec3> {
            self.target
        }

        fn path_length(&self, _agent: AgentId) -> usize {
            if self.target.is_some() { 2 } else { 0 }
        }

        fn path_index(&self, _agent: AgentId) -> usize {
            1
        }
    }

    #[test]
    fn test_offsets_spread_evenly() {
        let scheduler = PathRefreshScheduler::new(0.25, 10);

        let thresholds: Vec<f32> = (0..10)
            .map(|i| scheduler.threshold(AgentId::from_raw(i)))
            .collect();

        for (i, t) in thresholds.iter().enumerate() {
            assert_abs_diff_eq!(*t, 0.25 + i as f32 * 0.025, epsilon = 1e-6);
        }
        for pair in thresholds.windows(2) {
            assert!(pair[1] > pair[0]);
        }

        // slot wraps after ten agents
        assert_eq!(
            scheduler.offset(AgentId::from_raw(13)),
            scheduler.offset(AgentId::from_raw(3))
        );
    }

    #[test]
    fn test_staggered_refresh_times_are_distinct() {
        let scheduler = PathRefreshScheduler::new(0.25, 10);
        let dt = 0.001;
        let mut refresh_times = Vec::new();

        for i in 0..10 {
            let agent = AgentId::from_raw(i);
            let mut state = PathState::default();
            let mut nav = LineNavigator { reachable: true, ..Default::default() };
            let mut elapsed = 0.0;

            loop {
                elapsed += dt;
                let refreshed =
                    scheduler.update(agent, &mut state, dt, Vec3::ZERO, Some(Vec3::X), &mut nav);
                if refreshed {
                    refresh_times.push(elapsed);
                    break;
                }
            }
        }

        for pair in refresh_times.windows(2) {
            // 25ms apart, give or take one tick of accumulation error
            assert_abs_diff_eq!(pair[1] - pair[0], 0.025, epsilon = 0.0015);
        }
    }

    #[test]
    fn test_accumulator_resets_on_refresh() {
        let scheduler = PathRefreshScheduler::new(0.25, 10);
        let agent = AgentId::from_raw(0);
        let mut state = PathState::default();
        let mut nav = LineNavigator { reachable: true, ..Default::default() };
        let target = Some(Vec3::new(5.0, 0.0, 0.0));

        assert!(!scheduler.update(agent, &mut state, 0.2, Vec3::ZERO, target, &mut nav));
        assert_abs_diff_eq!(state.since_refresh(), 0.2);
        assert!(scheduler.update(agent, &mut state, 0.1, Vec3::ZERO, target, &mut nav));
        assert_eq!(state.since_refresh(), 0.0);
        assert_eq!(nav.queries.len(), 1);
    }

    #[test]
    fn test_pending_refresh_is_immediate() {
        let scheduler = PathRefreshScheduler::default();
        let agent = AgentId::from_raw(4);
        let mut state = PathState::default();
        state.request_refresh();
        let mut nav = LineNavigator { reachable: true, ..Default::default() };

        assert!(scheduler.update(agent, &mut state, 0.0, Vec3::ZERO, Some(Vec3::Z), &mut nav));
        assert!(!state.is_refresh_pending());
        assert_eq!(state.waypoint(), Some(Vec3::Z));
        assert_eq!(state.mode(), SteeringMode::Arriving);
    }

    #[test]
    fn test_no_target_clears_cache() {
        let scheduler = PathRefreshScheduler::default();
        let agent = AgentId::from_raw(1);
        let mut state = PathState::default();
        state.request_refresh();
        let mut nav = LineNavigator { reachable: true, ..Default::default() };

        scheduler.update(agent, &mut state, 0.1, Vec3::ZERO, Some(Vec3::X), &mut nav);
        assert!(state.waypoint().is_some());

        assert!(!scheduler.update(agent, &mut state, 1.0, Vec3::ZERO, None, &mut nav));
        assert_eq!(state.waypoint(), None);
        assert_eq!(nav.queries.len(), 1);
    }

    #[test]
    fn test_unreachable_gives_no_waypoint() {
        let scheduler = PathRefreshScheduler::default();
        let agent = AgentId::from_raw(2);
        let mut state = PathState::default();
        state.request_refresh();
        let mut nav = LineNavigator::default();

        scheduler.update(agent, &mut state, 0.1, Vec3::ZERO, Some(Vec3::X), &mut nav);
        assert_eq!(state.waypoint(), None);
        assert_eq!(state.mode(), SteeringMode::Following);
    }

    #[test]
    fn test_mode_from_path() {
        assert_eq!(SteeringMode::from_path(0, 0), SteeringMode::Following);
        assert_eq!(SteeringMode::from_path(1, 3), SteeringMode::Following);
        assert_eq!(SteeringMode::from_path(2, 3), SteeringMode::Arriving);
        assert_eq!(SteeringMode::from_path(0, 1), SteeringMode::Arriving);
    }
}
