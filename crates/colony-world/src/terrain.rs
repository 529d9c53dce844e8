//! Terrain kind to traversal cost mapping.
//!
//! The mapping is a tunable parameter, loaded from the `terrain` section of
//! the configuration file. Defaults:
//!
//! | Terrain  | Move cost  | Penalty |
//! |----------|------------|---------|
//! | Home     | 1          | 0       |
//! | Open     | 1          | 0       |
//! | Rough    | 2          | 0       |
//! | Hazard   | 1          | 5       |
//! | Obstacle | impassable | 0       |

use colony_types::Terrain;
use serde::{Deserialize, Serialize};

use crate::error::WorldError;

/// Base cost and penalty for one terrain kind.
///
/// A missing `move_cost` in configuration means the terrain is impassable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainCost {
    /// Movement points to enter the cell, or `None` if entry is disallowed.
    pub move_cost: Option<u32>,
    /// Extra routing cost that discourages, but does not forbid, entry.
    #[serde(default)]
    pub penalty: u32,
}

impl TerrainCost {
    /// A terrain nobody can enter.
    pub const IMPASSABLE: Self = Self {
        move_cost: None,
        penalty: 0,
    };

    /// A passable terrain with the given cost and penalty.
    pub const fn passable(move_cost: u32, penalty: u32) -> Self {
        Self {
            move_cost: Some(move_cost),
            penalty,
        }
    }
}

/// The full terrain cost table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainTable {
    /// Home cells.
    #[serde(default = "default_home")]
    pub home: TerrainCost,
    /// Open ground.
    #[serde(default = "default_open")]
    pub open: TerrainCost,
    /// Rough ground.
    #[serde(default = "default_rough")]
    pub rough: TerrainCost,
    /// Hazardous ground.
    #[serde(default = "default_hazard")]
    pub hazard: TerrainCost,
    /// Solid obstacles.
    #[serde(default = "default_obstacle")]
    pub obstacle: TerrainCost,
}

impl Default for TerrainTable {
    fn default() -> Self {
        Self {
            home: default_home(),
            open: default_open(),
            rough: default_rough(),
            hazard: default_hazard(),
            obstacle: default_obstacle(),
        }
    }
}

impl TerrainTable {
    /// The configured cost for `terrain`.
    pub const fn cost_of(&self, terrain: Terrain) -> TerrainCost {
        match terrain {
            Terrain::Home => self.home,
            Terrain::Open => self.open,
            Terrain::Rough => self.rough,
            Terrain::Hazard => self.hazard,
            Terrain::Obstacle => self.obstacle,
        }
    }

    /// Check that every passable terrain costs at least 1.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::ZeroMoveCost`] naming the first offending kind.
    pub fn validate(&self) -> Result<(), WorldError> {
        for terrain in [
            Terrain::Home,
            Terrain::Open,
            Terrain::Rough,
            Terrain::Hazard,
            Terrain::Obstacle,
        ] {
            if self.cost_of(terrain).move_cost == Some(0) {
                return Err(WorldError::ZeroMoveCost { terrain });
            }
        }
        Ok(())
    }
}

const fn default_home() -> TerrainCost {
    TerrainCost::passable(1, 0)
}

const fn default_open() -> TerrainCost {
    TerrainCost::passable(1, 0)
}

const fn default_rough() -> TerrainCost {
    TerrainCost::passable(2, 0)
}

const fn default_hazard() -> TerrainCost {
    TerrainCost::passable(1, 5)
}

const fn default_obstacle() -> TerrainCost {
    TerrainCost::IMPASSABLE
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_table() {
        let table = TerrainTable::default();
        assert_eq!(table.cost_of(Terrain::Open), TerrainCost::passable(1, 0));
        assert_eq!(table.cost_of(Terrain::Rough), TerrainCost::passable(2, 0));
        assert_eq!(table.cost_of(Terrain::Hazard), TerrainCost::passable(1, 5));
        assert_eq!(table.cost_of(Terrain::Obstacle), TerrainCost::IMPASSABLE);
        assert!(table.validate().is_ok());
    }

    #[test]
    fn zero_cost_is_rejected() {
        let table = TerrainTable {
            rough: TerrainCost::passable(0, 0),
            ..TerrainTable::default()
        };
        assert!(matches!(
            table.validate(),
            Err(WorldError::ZeroMoveCost {
                terrain: Terrain::Rough
            })
        ));
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let yaml = "hazard:\n  move_cost: 1\n  penalty: 9\nobstacle: {}\n";
        let table: TerrainTable = serde_yml::from_str(yaml).unwrap();
        assert_eq!(table.hazard, TerrainCost::passable(1, 9));
        assert_eq!(table.obstacle, TerrainCost::IMPASSABLE);
        assert_eq!(table.rough, TerrainCost::passable(2, 0));
    }
}
