//! Defender cycle: `ToGuard -> Guard -> Hunt -> Guard`.
//!
//! A guarding defender that sees a hostile picks the nearest one and
//! closes in on it. Hostile cells are impassable, so the hunt ends one step
//! away. If the quarry moves by one cell the defender follows; once no
//! hostile is near the last sighting it walks back to its post.

use colony_types::{AgentState, DefenderState, HexCoord};

use super::{PathUpdate, Step};
use crate::agent::Agent;
use crate::planner::Planner;

/// Evaluate one defender for this tick.
pub fn update(
    agent: &Agent,
    state: DefenderState,
    station: HexCoord,
    planner: &mut Planner<'_>,
) -> Step {
    match state {
        DefenderState::ToGuard => {
            if planner.reached(agent.position, station) {
                return guard(agent, station, planner);
            }
            let state = AgentState::Defender(DefenderState::ToGuard);
            if agent.goal == Some(station) {
                Step::stay(agent, state)
            } else {
                Step::head_for(agent, state, station, None, planner)
            }
        }
        DefenderState::Guard => guard(agent, station, planner),
        DefenderState::Hunt => hunt(agent, station, planner),
    }
}

fn guard(agent: &Agent, station: HexCoord, planner: &mut Planner<'_>) -> Step {
    if let Some(hostile) = planner.nearest_hostile(agent.position) {
        return chase(agent, hostile, planner);
    }
    Step {
        state: AgentState::Defender(DefenderState::Guard),
        goal: Some(station),
        target: None,
        path: PathUpdate::Keep,
    }
}

fn hunt(agent: &Agent, station: HexCoord, planner: &mut Planner<'_>) -> Step {
    let Some(quarry) = agent.target else {
        return guard(agent, station, planner);
    };
    if planner.hostile_at(quarry) {
        return Step::stay(agent, AgentState::Defender(DefenderState::Hunt));
    }
    if let Some(moved) = planner.hostile_near(quarry) {
        return chase(agent, moved, planner);
    }
    Step::head_for(
        agent,
        AgentState::Defender(DefenderState::Guard),
        station,
        None,
        planner,
    )
}

fn chase(agent: &Agent, hostile: HexCoord, planner: &mut Planner<'_>) -> Step {
    Step::head_for(
        agent,
        AgentState::Defender(DefenderState::Hunt),
        hostile,
        Some(hostile),
        planner,
    )
}
