//! Per-turn input and output of the engine.
//!
//! A [`WorldSnapshot`] is the authoritative picture of one turn as the
//! arena reports it. The engine reads it, derives its own tables from it,
//! and never retains it. A [`MovePlan`] is the engine's answer: exactly one
//! destination per live agent.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{Role, Terrain};
use crate::hex::HexCoord;
use crate::ids::AgentId;

/// One observed cell and its terrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CellObservation {
    /// Cell coordinate.
    pub coord: HexCoord,
    /// Terrain kind.
    pub terrain: Terrain,
}

/// One live friendly agent as observed this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AgentObservation {
    /// Arena-issued identifier.
    pub id: AgentId,
    /// Current cell.
    pub coord: HexCoord,
    /// The agent's role.
    pub role: Role,
    /// Units of resource currently carried.
    pub cargo: u32,
}

/// Everything the arena tells the engine about one turn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct WorldSnapshot {
    /// Turn counter. Repeated values carry no new information.
    pub turn: u64,
    /// Cells observed this turn.
    pub cells: Vec<CellObservation>,
    /// The colony anchor (main home cell).
    pub anchor: HexCoord,
    /// All home cells, possibly including the anchor.
    pub homes: Vec<HexCoord>,
    /// Live friendly agents.
    pub agents: Vec<AgentObservation>,
    /// Cells currently holding a visible resource.
    pub resources: Vec<HexCoord>,
    /// Cells currently holding a visible hostile.
    pub hostiles: Vec<HexCoord>,
}

impl WorldSnapshot {
    /// Whether the snapshot carries map data worth a tick.
    ///
    /// Before a match starts the arena answers with an empty map.
    pub const fn has_map(&self) -> bool {
        !self.cells.is_empty()
    }

    /// Home cells other than the anchor, in snapshot order.
    pub fn depots(&self) -> Vec<HexCoord> {
        self.homes
            .iter()
            .copied()
            .filter(|h| *h != self.anchor)
            .collect()
    }
}

/// The engine's decision for one agent this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MoveOrder {
    /// The agent being moved.
    pub agent: AgentId,
    /// Where the agent stood when the turn began.
    pub from: HexCoord,
    /// Where the agent should end the turn.
    pub destination: HexCoord,
}

impl MoveOrder {
    /// Whether the order keeps the agent where it is.
    pub fn is_hold(&self) -> bool {
        self.from == self.destination
    }
}

/// One destination per live agent, in agent-id order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MovePlan {
    /// The turn this plan answers.
    pub turn: u64,
    /// The per-agent orders.
    pub orders: Vec<MoveOrder>,
}

impl MovePlan {
    /// The planned destination of `agent`, if it is part of the plan.
    pub fn destination_of(&self, agent: AgentId) -> Option<HexCoord> {
        self.orders
            .iter()
            .find(|o| o.agent == agent)
            .map(|o| o.destination)
    }

    /// Orders that actually move an agent.
    pub fn moves(&self) -> impl Iterator<Item = &MoveOrder> {
        self.orders.iter().filter(|o| !o.is_hold())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depots_exclude_anchor() {
        let snapshot = WorldSnapshot {
            anchor: HexCoord::new(5, 5),
            homes: vec![HexCoord::new(5, 5), HexCoord::new(6, 5), HexCoord::new(5, 6)],
            ..WorldSnapshot::default()
        };
        assert_eq!(snapshot.depots(), vec![HexCoord::new(6, 5), HexCoord::new(5, 6)]);
    }

    #[test]
    fn empty_map_is_not_playable() {
        assert!(!WorldSnapshot::default().has_map());
    }

    #[test]
    fn plan_lookup_and_moves() {
        let a = AgentId::from_u128(1);
        let b = AgentId::from_u128(2);
        let plan = MovePlan {
            turn: 3,
            orders: vec![
                MoveOrder {
                    agent: a,
                    from: HexCoord::new(0, 0),
                    destination: HexCoord::new(1, 0),
                },
                MoveOrder {
                    agent: b,
                    from: HexCoord::new(2, 2),
                    destination: HexCoord::new(2, 2),
                },
            ],
        };
        assert_eq!(plan.destination_of(b), Some(HexCoord::new(2, 2)));
        assert_eq!(plan.moves().count(), 1);
    }
}
