//! Error types for the `colony-world` crate.

use colony_types::Terrain;

/// Errors that can occur while configuring the world model.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// A passable terrain kind was configured with a move cost of zero,
    /// which would make the hex distance heuristic overestimate.
    #[error("terrain {terrain:?} has a move cost of 0; passable terrain must cost at least 1")]
    ZeroMoveCost {
        /// The misconfigured terrain kind.
        terrain: Terrain,
    },
}
