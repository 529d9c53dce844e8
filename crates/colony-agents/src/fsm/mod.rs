//! Per-role state machines.
//!
//! Each role module exposes the same contract:
//!
//! ```text
//! update(agent, station, planner) -> Step
//! ```
//!
//! where `station` is the coordinate of the agent's claimed slot. The
//! [`update`] function dispatches on the tagged [`AgentState`], so no
//! component needs to look at the role separately. [`advance`] applies the
//! step to the agent and re-plans when an agent with a goal has run out of
//! path without arriving.
//!
//! Transitions may chain within one tick: a gatherer that reaches its
//! station and immediately spots a resource leaves the tick already walking
//! toward it.

pub mod defender;
pub mod gatherer;
pub mod scout;

use colony_types::{AgentState, GathererState, HexCoord};
use tracing::debug;

use crate::agent::Agent;
use crate::planner::Planner;
use crate::policy::IdlePolicy;

/// What to do with the agent's stored path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathUpdate {
    /// Leave it alone.
    Keep,
    /// Replace it with a freshly planned route (nearest cell first).
    Replace(Vec<HexCoord>),
    /// Drop it; the agent holds this tick.
    Clear,
}

/// The outcome of one state machine evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// The state after this tick's transitions.
    pub state: AgentState,
    /// The cell the agent is heading for.
    pub goal: Option<HexCoord>,
    /// The resource or hostile the goal is about.
    pub target: Option<HexCoord>,
    /// Path change.
    pub path: PathUpdate,
}

impl Step {
    /// Keep the agent's current goal, target and path in `state`.
    pub fn stay(agent: &Agent, state: AgentState) -> Self {
        Self {
            state,
            goal: agent.goal,
            target: agent.target,
            path: PathUpdate::Keep,
        }
    }

    /// Head for `goal` with a freshly planned route.
    ///
    /// A failed route still sets the goal; the empty path makes the agent
    /// hold and [`advance`] retries next tick.
    pub fn head_for(
        agent: &Agent,
        state: AgentState,
        goal: HexCoord,
        target: Option<HexCoord>,
        planner: &mut Planner<'_>,
    ) -> Self {
        let path = planner
            .route(agent.id, agent.position, goal)
            .map_or(PathUpdate::Clear, PathUpdate::Replace);
        Self {
            state,
            goal: Some(goal),
            target,
            path,
        }
    }

    /// Whether this step leaves a gatherer idling.
    pub fn is_idle(&self) -> bool {
        self.state == AgentState::Gatherer(GathererState::Idle)
    }
}

/// Evaluate the agent's state machine for this tick.
pub fn update(agent: &Agent, station: Option<HexCoord>, planner: &mut Planner<'_>) -> Step {
    match (agent.state, station) {
        (AgentState::Gatherer(state), Some(station)) => {
            gatherer::update(agent, state, station, planner)
        }
        (AgentState::Scout(state), Some(station)) => scout::update(agent, state, station, planner),
        (AgentState::Defender(state), Some(station)) => {
            defender::update(agent, state, station, planner)
        }
        _ => Step {
            state: AgentState::Unassigned,
            goal: None,
            target: None,
            path: PathUpdate::Keep,
        },
    }
}

/// Run one tick for `agent`: evaluate, apply, and keep the path alive.
///
/// Unassigned agents consult `policy` instead of a state machine.
pub fn advance(
    agent: &mut Agent,
    station: Option<HexCoord>,
    planner: &mut Planner<'_>,
    policy: &mut dyn IdlePolicy,
) {
    if agent.state == AgentState::Unassigned || station.is_none() {
        let step = policy
            .next_step(agent, planner)
            .map_or_else(Vec::new, |cell| vec![cell]);
        agent.path = step.into();
        return;
    }

    let before = agent.state;
    let step = update(agent, station, planner);
    agent.apply(step);

    if before != agent.state {
        debug!(
            agent = %agent.id,
            from = before.label(),
            to = agent.state.label(),
            goal = ?agent.goal,
            "State transition"
        );
    }

    if let Some(goal) = agent.goal
        && agent.path.is_empty()
        && !planner.reached(agent.position, goal)
        && let Some(cells) = planner.route(agent.id, agent.position, goal)
    {
        agent.path = cells.into();
    }
}
