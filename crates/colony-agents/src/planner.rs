//! Tick-scoped routing services for the state machines.
//!
//! A [`WorldView`] is the read-only picture of the current tick. A
//! [`Planner`] wraps it with the mutable bookkeeping one FSM pass needs:
//! which cells are occupied, which resources are already spoken for, and
//! which agents failed to find a route.
//!
//! Occupied and impassable targets (a hostile, a station someone else is
//! parked on) are never routed into. The planner instead aims for the
//! cheapest free neighbor of the target and treats standing next to it as
//! arrival.

use std::collections::BTreeSet;

use colony_types::{AgentId, HexCoord};
use colony_world::{CostModel, find_path, nearest_within};
use tracing::debug;

use crate::config::BehaviorConfig;

/// Read-only facts of the current tick.
#[derive(Debug, Clone, Copy)]
pub struct WorldView<'a> {
    /// Turn number.
    pub turn: u64,
    /// This tick's cost tables.
    pub model: &'a CostModel,
    /// Visible resources.
    pub resources: &'a BTreeSet<HexCoord>,
    /// Visible hostiles.
    pub hostiles: &'a [HexCoord],
    /// Every home cell, anchor included.
    pub homes: &'a [HexCoord],
    /// Home cells other than the anchor.
    pub depots: &'a [HexCoord],
}

/// Routing services and per-tick reservations.
#[derive(Debug)]
pub struct Planner<'a> {
    world: WorldView<'a>,
    config: &'a BehaviorConfig,
    occupied: BTreeSet<HexCoord>,
    reserved: BTreeSet<HexCoord>,
    unreachable: Vec<AgentId>,
}

impl<'a> Planner<'a> {
    /// Create a planner for one tick. `occupied` holds every live agent's
    /// position.
    pub const fn new(
        world: WorldView<'a>,
        config: &'a BehaviorConfig,
        occupied: BTreeSet<HexCoord>,
    ) -> Self {
        Self {
            world,
            config,
            occupied,
            reserved: BTreeSet::new(),
            unreachable: Vec::new(),
        }
    }

    /// The tick's world facts.
    pub const fn world(&self) -> &WorldView<'a> {
        &self.world
    }

    /// Behavior tunables.
    pub const fn config(&self) -> &BehaviorConfig {
        self.config
    }

    /// Whether `cell` can be stepped onto by an agent standing at `from`.
    pub fn is_enterable(&self, cell: HexCoord, from: HexCoord) -> bool {
        cell == from || (self.world.model.is_passable(cell) && !self.occupied.contains(&cell))
    }

    /// Whether an agent at `from` counts as having reached `goal`.
    ///
    /// Standing on the goal always counts. Standing next to a goal that
    /// cannot be entered counts too.
    pub fn reached(&self, from: HexCoord, goal: HexCoord) -> bool {
        from == goal || (from.is_adjacent(goal) && !self.is_enterable(goal, from))
    }

    /// Plan a route from `from` to `goal` for `agent`.
    ///
    /// Returns the cells to enter, nearest first; an empty list means the
    /// agent has already arrived. `None` means no route exists this tick;
    /// the agent is recorded as unreachable.
    pub fn route(&mut self, agent: AgentId, from: HexCoord, goal: HexCoord) -> Option<Vec<HexCoord>> {
        if self.reached(from, goal) {
            return Some(Vec::new());
        }

        let mut blocked = self.occupied.clone();
        blocked.remove(&from);

        let found = if self.is_enterable(goal, from) {
            find_path(from, goal, self.world.model, &blocked)
        } else {
            // Cheapest free neighbor; ties keep the first in direction order.
            goal.neighbors()
                .into_iter()
                .filter(|n| self.is_enterable(*n, from))
                .filter_map(|n| find_path(from, n, self.world.model, &blocked))
                .fold(None, |best: Option<colony_world::Path>, candidate| match best {
                    Some(b) if b.cost <= candidate.cost => Some(b),
                    _ => Some(candidate),
                })
        };

        if let Some(path) = found {
            Some(path.into_steps())
        } else {
            debug!(agent = %agent, from = %from, goal = %goal, "No route");
            if !self.unreachable.contains(&agent) {
                self.unreachable.push(agent);
            }
            None
        }
    }

    /// Reserve a resource so later agents in the same tick skip it.
    pub fn reserve(&mut self, cell: HexCoord) {
        self.reserved.insert(cell);
    }

    /// Whether a resource has been reserved this tick.
    pub fn is_reserved(&self, cell: HexCoord) -> bool {
        self.reserved.contains(&cell)
    }

    /// Whether `cell` holds a visible resource that an agent at `from` may
    /// go for: not reserved, and not under another agent.
    pub fn is_free_resource(&self, cell: HexCoord, from: HexCoord) -> bool {
        self.world.resources.contains(&cell)
            && !self.reserved.contains(&cell)
            && (cell == from || !self.occupied.contains(&cell))
    }

    /// Nearest free resource within the configured scan radius.
    pub fn scan_for_resource(&self, from: HexCoord) -> Option<HexCoord> {
        nearest_within(from, self.world.model, self.config.search_radius, |c| {
            self.is_free_resource(c, from)
        })
    }

    /// Nearest free resource anywhere, by hex distance.
    pub fn nearest_resource(&self, from: HexCoord) -> Option<HexCoord> {
        from.nearest(
            self.world
                .resources
                .iter()
                .copied()
                .filter(|c| self.is_free_resource(*c, from)),
        )
    }

    /// Nearest visible hostile.
    pub fn nearest_hostile(&self, from: HexCoord) -> Option<HexCoord> {
        from.nearest(self.world.hostiles.iter().copied())
    }

    /// Whether a hostile is currently visible at `cell`.
    pub fn hostile_at(&self, cell: HexCoord) -> bool {
        self.world.hostiles.contains(&cell)
    }

    /// The visible hostile closest to `cell` among those at most one step
    /// from it. Used to keep chasing a hostile that just moved.
    pub fn hostile_near(&self, cell: HexCoord) -> Option<HexCoord> {
        cell.nearest(
            self.world
                .hostiles
                .iter()
                .copied()
                .filter(|h| h.distance(cell) <= 1),
        )
    }

    /// Nearest auxiliary home cell; never the anchor.
    pub fn nearest_depot(&self, from: HexCoord) -> Option<HexCoord> {
        from.nearest(self.world.depots.iter().copied())
    }

    /// Nearest home cell of any kind.
    pub fn nearest_home(&self, from: HexCoord) -> Option<HexCoord> {
        from.nearest(self.world.homes.iter().copied())
    }

    /// Agents that found no route this tick, in evaluation order.
    pub fn unreachable(&self) -> &[AgentId] {
        &self.unreachable
    }

    /// Consume the planner and return the unreachable list.
    pub fn into_unreachable(self) -> Vec<AgentId> {
        self.unreachable
    }
}
