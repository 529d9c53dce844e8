//! The per-agent record the engine keeps between ticks.
//!
//! Position, role and cargo come from the snapshot every tick. State, goal,
//! target and remaining path belong to the engine and survive between
//! ticks until the agent disappears or the match resets.

use std::collections::VecDeque;

use colony_types::{
    AgentId, AgentObservation, AgentState, DefenderState, HexCoord, Role, ScoutState,
};

use crate::fsm::{PathUpdate, Step};
use crate::station::SlotId;

/// One live agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Agent {
    /// Arena-issued identifier.
    pub id: AgentId,
    /// The agent's role.
    pub role: Role,
    /// Observed position this tick.
    pub position: HexCoord,
    /// Observed cargo this tick.
    pub cargo: u32,
    /// Current state machine state.
    pub state: AgentState,
    /// The cell currently being walked to.
    pub goal: Option<HexCoord>,
    /// What the goal is about: a resource for gatherers, a hostile for
    /// defenders. May differ from `goal` when the target cell cannot be
    /// entered.
    pub target: Option<HexCoord>,
    /// Remaining cells to enter, nearest first.
    pub path: VecDeque<HexCoord>,
    /// The claimed slot, if any.
    pub station: Option<SlotId>,
    /// Ticks spent idle so far, counting the tick idling began. Zero
    /// outside the idle state.
    pub idle_ticks: u32,
}

impl Agent {
    /// Create a freshly observed, not yet stationed agent.
    pub const fn new(obs: &AgentObservation) -> Self {
        Self {
            id: obs.id,
            role: obs.role,
            position: obs.coord,
            cargo: obs.cargo,
            state: AgentState::Unassigned,
            goal: None,
            target: None,
            path: VecDeque::new(),
            station: None,
            idle_ticks: 0,
        }
    }

    /// Take a new observation and bring the stored path back in line with
    /// where the agent actually is.
    ///
    /// If the agent stands on a cell of its path, everything up to and
    /// including that cell was consumed. Afterwards the head must be
    /// adjacent to the position; otherwise the path is stale and dropped.
    pub fn observe(&mut self, obs: &AgentObservation) {
        self.position = obs.coord;
        self.cargo = obs.cargo;
        self.sync_path();
    }

    fn sync_path(&mut self) {
        if let Some(idx) = self.path.iter().position(|c| *c == self.position) {
            self.path.drain(..=idx);
        }
        if self
            .path
            .front()
            .is_some_and(|head| !head.is_adjacent(self.position))
        {
            self.path.clear();
        }
    }

    /// Put the agent on a station with its role's initial state.
    pub fn assign(&mut self, slot: SlotId) {
        self.station = Some(slot);
        self.state = AgentState::initial(self.role);
        self.goal = None;
        self.target = None;
        self.path.clear();
        self.idle_ticks = 0;
    }

    /// Drop the station and go back to the unassigned state.
    pub fn unassign(&mut self) {
        self.station = None;
        self.state = AgentState::Unassigned;
        self.goal = None;
        self.target = None;
        self.path.clear();
    }

    /// Apply the result of a state machine evaluation.
    pub fn apply(&mut self, step: Step) {
        let stayed = self.state == step.state;
        let idle = step.is_idle();
        self.state = step.state;
        self.goal = step.goal;
        self.target = step.target;
        match step.path {
            PathUpdate::Keep => {}
            PathUpdate::Replace(cells) => self.path = cells.into(),
            PathUpdate::Clear => self.path.clear(),
        }
        self.idle_ticks = match (idle, stayed) {
            (true, true) => self.idle_ticks.saturating_add(1),
            (true, false) => 1,
            (false, _) => 0,
        };
    }

    /// The cell this agent wants to occupy next tick.
    pub fn next_cell(&self) -> HexCoord {
        self.path.front().copied().unwrap_or(self.position)
    }

    /// Record that the scheduler committed `destination`.
    ///
    /// A committed path head is consumed; anything else leaves the path as
    /// it was.
    pub fn commit(&mut self, destination: HexCoord) {
        if self.path.front() == Some(&destination) {
            self.path.pop_front();
        }
    }

    /// Discard the stored path so the next tick plans afresh.
    pub fn clear_path(&mut self) {
        self.path.clear();
    }

    /// Whether the agent is parked on `station_cell` in a holding state.
    pub fn holds_station(&self, station_cell: HexCoord) -> bool {
        self.position == station_cell
            && matches!(
                self.state,
                AgentState::Scout(ScoutState::Sentry)
                    | AgentState::Defender(DefenderState::Guard)
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use colony_types::GathererState;

    fn obs(q: i32, r: i32) -> AgentObservation {
        AgentObservation {
            id: AgentId::from_u128(1),
            coord: HexCoord::new(q, r),
            role: Role::Gatherer,
            cargo: 0,
        }
    }

    #[test]
    fn new_agent_is_unassigned() {
        let agent = Agent::new(&obs(0, 0));
        assert_eq!(agent.state, AgentState::Unassigned);
        assert_eq!(agent.next_cell(), HexCoord::new(0, 0));
    }

    #[test]
    fn observing_consumed_prefix_trims_path() {
        let mut agent = Agent::new(&obs(0, 0));
        agent.path = [HexCoord::new(1, 0), HexCoord::new(2, 0), HexCoord::new(3, 0)]
            .into_iter()
            .collect();

        // The arena moved it two cells along.
        agent.observe(&obs(2, 0));
        assert_eq!(agent.path, VecDeque::from([HexCoord::new(3, 0)]));
    }

    #[test]
    fn observing_off_path_clears_stale_path() {
        let mut agent = Agent::new(&obs(0, 0));
        agent.path = [HexCoord::new(1, 0), HexCoord::new(2, 0)].into_iter().collect();
        agent.observe(&obs(-3, 0));
        assert!(agent.path.is_empty());
    }

    #[test]
    fn unchanged_position_keeps_path() {
        let mut agent = Agent::new(&obs(0, 0));
        agent.path = [HexCoord::new(1, 0)].into_iter().collect();
        agent.observe(&obs(0, 0));
        assert_eq!(agent.path.len(), 1);
    }

    #[test]
    fn commit_consumes_head_only_when_matching() {
        let mut agent = Agent::new(&obs(0, 0));
        agent.path = [HexCoord::new(1, 0), HexCoord::new(2, 0)].into_iter().collect();
        agent.commit(HexCoord::new(0, 0));
        assert_eq!(agent.path.len(), 2);
        agent.commit(HexCoord::new(1, 0));
        assert_eq!(agent.path.front(), Some(&HexCoord::new(2, 0)));
    }

    #[test]
    fn idle_counter_tracks_consecutive_idle_ticks() {
        let mut agent = Agent::new(&obs(0, 0));
        agent.assign(SlotId(0));
        let idle = Step {
            state: AgentState::Gatherer(GathererState::Idle),
            goal: None,
            target: None,
            path: PathUpdate::Keep,
        };
        agent.apply(idle.clone());
        assert_eq!(agent.idle_ticks, 1);
        agent.apply(idle.clone());
        agent.apply(idle);
        assert_eq!(agent.idle_ticks, 3);
    }

    #[test]
    fn replaced_path_is_stored_and_idle_counter_resets() {
        let mut agent = Agent::new(&obs(0, 0));
        agent.assign(SlotId(0));
        agent.apply(Step {
            state: AgentState::Gatherer(GathererState::Idle),
            goal: None,
            target: None,
            path: PathUpdate::Replace(vec![HexCoord::new(1, 0)]),
        });
        assert_eq!(agent.idle_ticks, 1);
        assert_eq!(agent.next_cell(), HexCoord::new(1, 0));

        agent.apply(Step {
            state: AgentState::Gatherer(GathererState::ToTarget),
            goal: Some(HexCoord::new(2, 0)),
            target: Some(HexCoord::new(2, 0)),
            path: PathUpdate::Replace(vec![HexCoord::new(1, 0), HexCoord::new(2, 0)]),
        });
        assert_eq!(agent.idle_ticks, 0);
        assert_eq!(agent.path.back(), Some(&HexCoord::new(2, 0)));
    }
}
