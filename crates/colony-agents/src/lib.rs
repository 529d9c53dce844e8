//! Agents, stations, and the per-role state machines that steer them.
//!
//! Every live ant the arena reports becomes an [`Agent`]. Agents claim a
//! slot in the [`StationRegistry`], and once per tick their role's state
//! machine picks a goal and asks the [`Planner`] for a route. The
//! resulting paths are handed to the move scheduler in `colony-core`.
//!
//! # Modules
//!
//! - [`agent`] -- The per-agent record: position, state, goal, remaining path.
//! - [`config`] -- Behavior and station layout tunables.
//! - [`error`] -- Error types for configuration validation.
//! - [`fsm`] -- Role dispatch and the gatherer, scout, and defender machines.
//! - [`planner`] -- Tick-scoped routing services and resource reservations.
//! - [`policy`] -- What unassigned agents do when they have no station.
//! - [`station`] -- Slot generation, lazy ring growth, claims and releases.

pub mod agent;
pub mod config;
pub mod error;
pub mod fsm;
pub mod planner;
pub mod policy;
pub mod station;

pub use agent::Agent;
pub use config::{BehaviorConfig, IdlePolicyKind, StationConfig};
pub use error::AgentError;
pub use fsm::{PathUpdate, Step};
pub use planner::{Planner, WorldView};
pub use policy::{HoldPosition, IdlePolicy, RandomWander};
pub use station::{Slot, SlotId, StationRegistry};
