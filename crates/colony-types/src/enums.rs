//! Enumeration types for the colony coordinator.
//!
//! Roles and terrain kinds are plain data. Agent states are a tagged
//! variant per role: each role has its own state machine, and the
//! [`AgentState`] wrapper makes the role explicit so no component has to
//! branch on a separate role field to interpret a state.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Roles and terrain
// ---------------------------------------------------------------------------

/// The job an agent performs for the colony.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Role {
    /// Collects resources and carries them to a home cell.
    Gatherer,
    /// Holds a far sentry station and picks up resources that appear there.
    Scout,
    /// Guards the home cells and intercepts hostiles.
    Defender,
}

impl Role {
    /// Every role, in a fixed order.
    pub const ALL: [Self; 3] = [Self::Gatherer, Self::Scout, Self::Defender];

    /// Whether agents of this role count toward station ring growth.
    pub const fn patrols_rings(self) -> bool {
        matches!(self, Self::Gatherer | Self::Scout)
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Gatherer => "gatherer",
            Self::Scout => "scout",
            Self::Defender => "defender",
        };
        f.write_str(name)
    }
}

/// The kind of ground a cell is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Terrain {
    /// Part of the colony's home.
    Home,
    /// Plain open ground.
    Open,
    /// Slow ground that costs more to cross.
    Rough,
    /// Passable ground that damages whoever crosses it.
    Hazard,
    /// Solid rock; never enterable.
    Obstacle,
}

// ---------------------------------------------------------------------------
// Per-role state machines
// ---------------------------------------------------------------------------

/// States of the gatherer cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum GathererState {
    /// Walking to the assigned station.
    ToStation,
    /// At the station, scanning for resources.
    Idle,
    /// Walking to a chosen resource.
    ToTarget,
    /// Holding a resource; the deposit cell is about to be chosen.
    Carrying,
    /// Walking to a home cell to unload.
    ToDeposit,
}

/// States of the scout cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ScoutState {
    /// Walking to the assigned station.
    ToStation,
    /// Holding the station (or returning to it after a delivery).
    Sentry,
    /// Delivering a resource picked up at the station.
    Carrying,
}

/// States of the defender cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum DefenderState {
    /// Walking to the assigned guard post.
    ToGuard,
    /// Holding the guard post (or returning to it after a hunt).
    Guard,
    /// Pursuing a visible hostile.
    Hunt,
}

/// The state of one agent, tagged by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(tag = "role", content = "state", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum AgentState {
    /// A gatherer and its cycle state.
    Gatherer(GathererState),
    /// A scout and its cycle state.
    Scout(ScoutState),
    /// A defender and its cycle state.
    Defender(DefenderState),
    /// No station could be assigned; the agent idles where it stands.
    Unassigned,
}

impl AgentState {
    /// The state a freshly stationed agent of `role` starts in.
    pub const fn initial(role: Role) -> Self {
        match role {
            Role::Gatherer => Self::Gatherer(GathererState::ToStation),
            Role::Scout => Self::Scout(ScoutState::ToStation),
            Role::Defender => Self::Defender(DefenderState::ToGuard),
        }
    }

    /// Short human-readable label for logs.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Gatherer(GathererState::ToStation) | Self::Scout(ScoutState::ToStation) => {
                "to_station"
            }
            Self::Gatherer(GathererState::Idle) => "idle",
            Self::Gatherer(GathererState::ToTarget) => "to_target",
            Self::Gatherer(GathererState::Carrying) | Self::Scout(ScoutState::Carrying) => {
                "carrying"
            }
            Self::Gatherer(GathererState::ToDeposit) => "to_deposit",
            Self::Scout(ScoutState::Sentry) => "sentry",
            Self::Defender(DefenderState::ToGuard) => "to_guard",
            Self::Defender(DefenderState::Guard) => "guard",
            Self::Defender(DefenderState::Hunt) => "hunt",
            Self::Unassigned => "unassigned",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_states_per_role() {
        assert_eq!(
            AgentState::initial(Role::Gatherer),
            AgentState::Gatherer(GathererState::ToStation)
        );
        assert_eq!(
            AgentState::initial(Role::Scout),
            AgentState::Scout(ScoutState::ToStation)
        );
        assert_eq!(
            AgentState::initial(Role::Defender),
            AgentState::Defender(DefenderState::ToGuard)
        );
    }

    #[test]
    fn only_gatherers_and_scouts_grow_rings() {
        assert!(Role::Gatherer.patrols_rings());
        assert!(Role::Scout.patrols_rings());
        assert!(!Role::Defender.patrols_rings());
    }

    #[test]
    fn agent_state_serializes_tagged() {
        let json = serde_json::to_string(&AgentState::Scout(ScoutState::Sentry))
            .unwrap_or_default();
        assert_eq!(json, r#"{"role":"scout","state":"sentry"}"#);

        let json = serde_json::to_string(&AgentState::Unassigned).unwrap_or_default();
        assert_eq!(json, r#"{"role":"unassigned"}"#);
    }
}
