//! Per-tick observability report.
//!
//! The engine never writes to a global status line. Everything an operator
//! or renderer might want to show about a tick is collected into a
//! [`TickReport`] and returned next to the move plan; the caller decides
//! where it goes.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{AgentState, Role};
use crate::hex::HexCoord;
use crate::ids::AgentId;

/// What one agent is doing after the tick was planned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AgentStatus {
    /// The agent.
    pub id: AgentId,
    /// Its role.
    pub role: Role,
    /// Where it stood when the tick began.
    pub position: HexCoord,
    /// Its state after the FSM step.
    pub state: AgentState,
    /// The cell it is currently heading for.
    pub goal: Option<HexCoord>,
    /// Its claimed station, or `None` when unassigned.
    pub station: Option<HexCoord>,
    /// Cells left on its stored path after this tick's move.
    pub path_len: u32,
    /// The destination committed for this tick.
    pub destination: HexCoord,
    /// Whether the scheduler forced it to hold because of a conflict.
    pub held: bool,
}

/// A cell more than one agent wanted this tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ConflictRecord {
    /// The contested cell.
    pub cell: HexCoord,
    /// Every agent that wanted it; all of them were held.
    pub agents: Vec<AgentId>,
}

/// Summary of one planned tick.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TickReport {
    /// The turn that was planned.
    pub turn: u64,
    /// One row per live agent, in id order.
    pub agents: Vec<AgentStatus>,
    /// Destination conflicts resolved by holding.
    pub conflicts: Vec<ConflictRecord>,
    /// Agents whose new goal had no path this tick.
    pub unreachable: Vec<AgentId>,
    /// Agents seen for the first time this tick.
    pub joined: Vec<AgentId>,
    /// Agents that disappeared this tick.
    pub departed: Vec<AgentId>,
    /// Slots currently claimed.
    pub slots_claimed: u32,
    /// Slots generated so far.
    pub slots_total: u32,
    /// Cells with known terrain.
    pub known_cells: u32,
    /// Cells carrying a non-zero danger penalty.
    pub danger_cells: u32,
}

impl TickReport {
    /// Number of agents that hold no station.
    pub fn unassigned(&self) -> usize {
        self.agents
            .iter()
            .filter(|a| a.state == AgentState::Unassigned)
            .count()
    }

    /// Number of agents that move this tick.
    pub fn moving(&self) -> usize {
        self.agents
            .iter()
            .filter(|a| a.destination != a.position)
            .count()
    }
}
