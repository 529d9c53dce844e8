//! Gatherer cycle: `ToStation -> Idle -> ToTarget -> Carrying -> ToDeposit
//! -> ToStation`.
//!
//! An idle gatherer scans around itself for the nearest unreserved
//! resource (and, if enabled, falls back to the nearest one anywhere). The
//! chosen resource is reserved so no other gatherer picks it this tick.
//! Deliveries always go to an auxiliary home cell, never to the anchor.

use colony_types::{AgentState, GathererState, HexCoord};

use super::{PathUpdate, Step};
use crate::agent::Agent;
use crate::planner::Planner;

/// Evaluate one gatherer for this tick.
pub fn update(
    agent: &Agent,
    state: GathererState,
    station: HexCoord,
    planner: &mut Planner<'_>,
) -> Step {
    match state {
        GathererState::ToStation => to_station(agent, station, planner),
        GathererState::Idle => idle(agent, station, planner),
        GathererState::ToTarget => to_target(agent, station, planner),
        GathererState::Carrying => carrying(agent, planner),
        GathererState::ToDeposit => to_deposit(agent, station, planner),
    }
}

fn to_station(agent: &Agent, station: HexCoord, planner: &mut Planner<'_>) -> Step {
    if planner.reached(agent.position, station) {
        return idle(agent, station, planner);
    }
    let state = AgentState::Gatherer(GathererState::ToStation);
    if agent.goal == Some(station) {
        Step::stay(agent, state)
    } else {
        Step::head_for(agent, state, station, None, planner)
    }
}

fn idle(agent: &Agent, station: HexCoord, planner: &mut Planner<'_>) -> Step {
    if agent.cargo > 0 {
        return carrying(agent, planner);
    }

    let hold = Step {
        state: AgentState::Gatherer(GathererState::Idle),
        goal: Some(station),
        target: None,
        path: PathUpdate::Keep,
    };

    // `idle_ticks` is zero on the tick idling begins.
    let idle_ticks = if agent.state == AgentState::Gatherer(GathererState::Idle) {
        agent.idle_ticks
    } else {
        0
    };
    if !planner.config().scans_on(idle_ticks) {
        return hold;
    }

    let found = planner.scan_for_resource(agent.position).or_else(|| {
        if planner.config().global_fallback {
            planner.nearest_resource(agent.position)
        } else {
            None
        }
    });
    let Some(resource) = found else {
        return hold;
    };

    match planner.route(agent.id, agent.position, resource) {
        Some(cells) => {
            planner.reserve(resource);
            Step {
                state: AgentState::Gatherer(GathererState::ToTarget),
                goal: Some(resource),
                target: Some(resource),
                path: PathUpdate::Replace(cells),
            }
        }
        None => hold,
    }
}

fn to_target(agent: &Agent, station: HexCoord, planner: &mut Planner<'_>) -> Step {
    let Some(resource) = agent.target else {
        return idle(agent, station, planner);
    };
    let present = planner.world().resources.contains(&resource);

    if agent.position == resource {
        return if agent.cargo > 0 || present {
            carrying(agent, planner)
        } else {
            // Someone else got there first.
            idle(agent, station, planner)
        };
    }
    if agent.cargo > 0 {
        return carrying(agent, planner);
    }
    if !present {
        return idle(agent, station, planner);
    }

    planner.reserve(resource);
    Step::stay(agent, AgentState::Gatherer(GathererState::ToTarget))
}

fn carrying(agent: &Agent, planner: &mut Planner<'_>) -> Step {
    match planner.nearest_depot(agent.position) {
        Some(depot) => Step::head_for(
            agent,
            AgentState::Gatherer(GathererState::ToDeposit),
            depot,
            None,
            planner,
        ),
        None => Step {
            state: AgentState::Gatherer(GathererState::Carrying),
            goal: None,
            target: None,
            path: PathUpdate::Clear,
        },
    }
}

fn to_deposit(agent: &Agent, station: HexCoord, planner: &mut Planner<'_>) -> Step {
    if agent.cargo == 0 {
        return Step::head_for(
            agent,
            AgentState::Gatherer(GathererState::ToStation),
            station,
            None,
            planner,
        );
    }
    if agent.goal.is_none() {
        return carrying(agent, planner);
    }
    Step::stay(agent, AgentState::Gatherer(GathererState::ToDeposit))
}
