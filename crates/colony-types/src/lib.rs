//! Shared type definitions for the hex colony coordinator.
//!
//! This crate is the single source of truth for the values that cross crate
//! boundaries: coordinates, identifiers, role and state enumerations, the
//! per-turn world snapshot consumed by the engine, and the move plan and
//! tick report it produces. Report types flow to `TypeScript` via `ts-rs`
//! for a dashboard renderer.
//!
//! # Modules
//!
//! - [`hex`] -- Axial hex coordinates, the cyclic direction table, and the
//!   hex distance metric.
//! - [`ids`] -- Type-safe UUID wrapper for agent identifiers.
//! - [`enums`] -- Roles, terrain kinds, and per-role state machine states.
//! - [`snapshot`] -- World snapshot input and move plan output.
//! - [`report`] -- Per-tick observability report.

pub mod enums;
pub mod hex;
pub mod ids;
pub mod report;
pub mod snapshot;

// Re-export all public types at crate root for convenience.
pub use enums::{AgentState, DefenderState, GathererState, Role, ScoutState, Terrain};
pub use hex::{DIRECTIONS, HexCoord};
pub use ids::AgentId;
pub use report::{AgentStatus, ConflictRecord, TickReport};
pub use snapshot::{AgentObservation, CellObservation, MoveOrder, MovePlan, WorldSnapshot};
