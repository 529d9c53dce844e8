//! Scout cycle: `ToStation -> Sentry -> Carrying -> Sentry`.
//!
//! A scout holds a far corner slot. When a resource turns up under it (or
//! it finds itself loaded) it walks to the nearest depot, then goes back to
//! its post once unloaded. The anchor is only used when the colony has no
//! other home cell, since idle ants park on it.

use colony_types::{AgentState, HexCoord, ScoutState};

use super::{PathUpdate, Step};
use crate::agent::Agent;
use crate::planner::Planner;

/// Evaluate one scout for this tick.
pub fn update(
    agent: &Agent,
    state: ScoutState,
    station: HexCoord,
    planner: &mut Planner<'_>,
) -> Step {
    match state {
        ScoutState::ToStation => {
            if planner.reached(agent.position, station) {
                return sentry(agent, station, planner);
            }
            let state = AgentState::Scout(ScoutState::ToStation);
            if agent.goal == Some(station) {
                Step::stay(agent, state)
            } else {
                Step::head_for(agent, state, station, None, planner)
            }
        }
        ScoutState::Sentry => sentry(agent, station, planner),
        ScoutState::Carrying => carrying(agent, station, planner),
    }
}

fn sentry(agent: &Agent, station: HexCoord, planner: &mut Planner<'_>) -> Step {
    let loaded = agent.cargo > 0 || planner.world().resources.contains(&agent.position);
    let home = planner
        .nearest_depot(agent.position)
        .or_else(|| planner.nearest_home(agent.position));
    if loaded && let Some(home) = home {
        return Step::head_for(
            agent,
            AgentState::Scout(ScoutState::Carrying),
            home,
            Some(agent.position),
            planner,
        );
    }
    Step {
        state: AgentState::Scout(ScoutState::Sentry),
        goal: Some(station),
        target: None,
        path: PathUpdate::Keep,
    }
}

fn carrying(agent: &Agent, station: HexCoord, planner: &mut Planner<'_>) -> Step {
    let Some(home) = agent.goal else {
        return sentry(agent, station, planner);
    };
    if agent.position == home && agent.cargo == 0 {
        // Delivered.
        return Step::head_for(
            agent,
            AgentState::Scout(ScoutState::Sentry),
            station,
            None,
            planner,
        );
    }
    Step::stay(agent, AgentState::Scout(ScoutState::Carrying))
}

#[cfg(test)]
mod tests {
    use colony_types::Role;

    use super::*;
    use crate::fsm::tests::{Fixture, agent};

    const STATION: HexCoord = HexCoord::new(-4, 0);

    fn scout(at: HexCoord, state: ScoutState) -> Agent {
        agent(3, Role::Scout, at, AgentState::Scout(state))
    }

    #[test]
    fn arriving_at_station_becomes_sentry() {
        let fx = Fixture::new(6);
        let a = scout(STATION, ScoutState::ToStation);
        let mut planner = fx.planner(&[STATION]);
        let step = update(&a, ScoutState::ToStation, STATION, &mut planner);
        assert_eq!(step.state, AgentState::Scout(ScoutState::Sentry));
    }

    #[test]
    fn resource_underfoot_sends_scout_home() {
        let mut fx = Fixture::new(6);
        fx.resources.insert(STATION);
        let a = scout(STATION, ScoutState::Sentry);
        let mut planner = fx.planner(&[STATION]);
        let step = update(&a, ScoutState::Sentry, STATION, &mut planner);
        assert_eq!(step.state, AgentState::Scout(ScoutState::Carrying));
        // The anchor is closer, but depots come first.
        assert_eq!(step.goal, Some(HexCoord::new(1, 0)));
        assert!(matches!(step.path, PathUpdate::Replace(ref cells) if cells.last() == Some(&HexCoord::new(1, 0))));
    }

    #[test]
    fn empty_station_keeps_sentry() {
        let fx = Fixture::new(6);
        let a = scout(STATION, ScoutState::Sentry);
        let mut planner = fx.planner(&[STATION]);
        let step = update(&a, ScoutState::Sentry, STATION, &mut planner);
        assert_eq!(step.state, AgentState::Scout(ScoutState::Sentry));
        assert_eq!(step.path, PathUpdate::Keep);
    }

    #[test]
    fn delivery_returns_to_post() {
        let fx = Fixture::new(6);
        let depot = HexCoord::new(0, 1);
        let mut a = scout(depot, ScoutState::Carrying);
        a.goal = Some(depot);
        let mut planner = fx.planner(&[depot]);
        let step = update(&a, ScoutState::Carrying, STATION, &mut planner);
        assert_eq!(step.state, AgentState::Scout(ScoutState::Sentry));
        assert_eq!(step.goal, Some(STATION));
        assert!(matches!(step.path, PathUpdate::Replace(ref cells) if cells.last() == Some(&STATION)));
    }

    #[test]
    fn en_route_keeps_carrying() {
        let fx = Fixture::new(6);
        let mut a = scout(HexCoord::new(-2, 0), ScoutState::Carrying);
        a.goal = Some(HexCoord::new(0, 1));
        a.cargo = 1;
        let mut planner = fx.planner(&[a.position]);
        let step = update(&a, ScoutState::Carrying, STATION, &mut planner);
        assert_eq!(step.state, AgentState::Scout(ScoutState::Carrying));
    }

    #[test]
    fn loaded_scout_waits_on_depot_until_unloaded() {
        let fx = Fixture::new(6);
        let depot = HexCoord::new(0, 1);
        let mut a = scout(depot, ScoutState::Carrying);
        a.goal = Some(depot);
        a.cargo = 2;
        let mut planner = fx.planner(&[depot]);
        let step = update(&a, ScoutState::Carrying, STATION, &mut planner);
        assert_eq!(step.state, AgentState::Scout(ScoutState::Carrying));
        assert_eq!(step.goal, Some(depot));
    }

    #[test]
    fn anchor_is_used_only_without_depots() {
        let mut fx = Fixture::new(6);
        fx.depots.clear();
        fx.homes = vec![HexCoord::ORIGIN];
        let mut a = scout(STATION, ScoutState::Sentry);
        a.cargo = 1;
        let mut planner = fx.planner(&[STATION]);
        let step = update(&a, ScoutState::Sentry, STATION, &mut planner);
        assert_eq!(step.goal, Some(HexCoord::ORIGIN));
    }

    #[test]
    fn occupied_anchor_does_not_strand_loaded_scout() {
        let fx = Fixture::new(6);
        let mut a = scout(STATION, ScoutState::Sentry);
        a.cargo = 1;
        // An unassigned ant holds the anchor for the whole trip.
        let parked = HexCoord::ORIGIN;
        let mut policy = crate::policy::HoldPosition;
        let mut delivered_at = None;
        for _ in 0..20 {
            let mut planner = fx.planner(&[a.position, parked]);
            crate::fsm::advance(&mut a, Some(STATION), &mut planner, &mut policy);
            let next = a.next_cell();
            a.commit(next);
            a.position = next;
            if a.cargo > 0 && fx.depots.contains(&a.position) {
                a.cargo = 0;
                delivered_at = Some(a.position);
            }
            if a.state == AgentState::Scout(ScoutState::Sentry) && a.cargo == 0 {
                break;
            }
        }
        assert_eq!(delivered_at, Some(HexCoord::new(1, 0)));
        assert_eq!(a.goal, Some(STATION));
        assert_eq!(a.state, AgentState::Scout(ScoutState::Sentry));
    }
}
