//! Accumulated terrain knowledge.
//!
//! The arena only reports cells currently in view. What the colony has seen
//! once stays known: a cell never reverts to unknown, so routes planned
//! through remembered terrain remain valid after it leaves view.

use std::collections::BTreeMap;

use colony_types::{CellObservation, HexCoord, Terrain};

/// Every cell the colony has observed and its last observed terrain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TerrainKnowledge {
    cells: BTreeMap<HexCoord, Terrain>,
}

impl TerrainKnowledge {
    /// Create empty knowledge.
    pub const fn new() -> Self {
        Self {
            cells: BTreeMap::new(),
        }
    }

    /// Merge a turn's observations. Returns the number of newly known cells.
    ///
    /// Observed cells overwrite their previous terrain; cells absent from
    /// `observations` keep whatever was known about them.
    pub fn absorb(&mut self, observations: &[CellObservation]) -> usize {
        let mut learned: usize = 0;
        for obs in observations {
            if self.cells.insert(obs.coord, obs.terrain).is_none() {
                learned = learned.saturating_add(1);
            }
        }
        learned
    }

    /// The known terrain of `coord`.
    pub fn terrain_at(&self, coord: HexCoord) -> Option<Terrain> {
        self.cells.get(&coord).copied()
    }

    /// Whether `coord` has ever been observed.
    pub fn is_known(&self, coord: HexCoord) -> bool {
        self.cells.contains_key(&coord)
    }

    /// Number of known cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether nothing is known yet.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Known cells in coordinate order.
    pub fn iter(&self) -> impl Iterator<Item = (HexCoord, Terrain)> + '_ {
        self.cells.iter().map(|(c, t)| (*c, *t))
    }

    /// Forget everything. Only used when a new match starts.
    pub fn clear(&mut self) {
        self.cells.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(q: i32, r: i32, terrain: Terrain) -> CellObservation {
        CellObservation {
            coord: HexCoord::new(q, r),
            terrain,
        }
    }

    #[test]
    fn knowledge_only_grows() {
        let mut k = TerrainKnowledge::new();
        assert_eq!(k.absorb(&[obs(0, 0, Terrain::Open), obs(1, 0, Terrain::Rough)]), 2);

        // Second turn sees a different window.
        assert_eq!(k.absorb(&[obs(1, 0, Terrain::Rough), obs(2, 0, Terrain::Hazard)]), 1);

        assert_eq!(k.len(), 3);
        assert_eq!(k.terrain_at(HexCoord::new(0, 0)), Some(Terrain::Open));
        assert!(k.is_known(HexCoord::new(2, 0)));
        assert!(!k.is_known(HexCoord::new(3, 0)));
    }

    #[test]
    fn empty_turn_keeps_everything() {
        let mut k = TerrainKnowledge::new();
        k.absorb(&[obs(4, 4, Terrain::Obstacle)]);
        assert_eq!(k.absorb(&[]), 0);
        assert_eq!(k.terrain_at(HexCoord::new(4, 4)), Some(Terrain::Obstacle));
    }
}
