//! Terrain knowledge, traversal costs, and path search for the hex colony
//! coordinator.
//!
//! This crate models what the colony knows about the ground it walks on and
//! answers the two routing questions the agents ask every tick: "what is the
//! cheapest way there?" and "is anything interesting close by?".
//!
//! # Modules
//!
//! - [`error`] -- Error types for terrain configuration.
//! - [`terrain`] -- The configurable terrain-kind to cost/penalty table.
//! - [`knowledge`] -- Accumulated terrain knowledge that only ever grows.
//! - [`cost_model`] -- Per-tick cost and danger-penalty tables with hostile
//!   halos and static obstacles layered on top of terrain.
//! - [`pathfind`] -- A* search minimizing accumulated cost plus penalty.
//! - [`local_search`] -- Bounded breadth-first scan for the nearest target.

pub mod cost_model;
pub mod error;
pub mod knowledge;
pub mod local_search;
pub mod pathfind;
pub mod terrain;

// Re-export primary types at crate root.
pub use cost_model::{CellCost, CostModel};
pub use error::WorldError;
pub use knowledge::TerrainKnowledge;
pub use local_search::nearest_within;
pub use pathfind::{Path, SearchResult, find_path, search};
pub use terrain::{TerrainCost, TerrainTable};
