//! Per-tick traversal cost and danger tables.
//!
//! A [`CostModel`] is rebuilt every tick from three layers:
//!
//! 1. Terrain knowledge mapped through the [`TerrainTable`].
//! 2. Static obstacles: friendly agents parked on their stations. Those
//!    cells become impassable for the tick.
//! 3. Hostiles: each hostile cell becomes impassable and every one of its
//!    six neighbors gets a halo penalty added on top of whatever penalty it
//!    already carries. Halos of adjacent hostiles stack.
//!
//! Unknown cells are impassable and carry no penalty.

use std::collections::BTreeMap;

use colony_types::HexCoord;

use crate::knowledge::TerrainKnowledge;
use crate::terrain::TerrainTable;

/// Cost entry for a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellCost {
    /// Movement cost to enter, or `None` if impassable this tick.
    pub move_cost: Option<u32>,
    /// Accumulated routing penalty.
    pub penalty: u32,
}

impl CellCost {
    /// A passable cell. Costs below 1 are raised to 1.
    pub fn passable(move_cost: u32, penalty: u32) -> Self {
        Self {
            move_cost: Some(move_cost.max(1)),
            penalty,
        }
    }

    /// An impassable cell.
    pub const fn blocked() -> Self {
        Self {
            move_cost: None,
            penalty: 0,
        }
    }
}

/// The traversal tables one tick plans against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CostModel {
    cells: BTreeMap<HexCoord, CellCost>,
}

impl CostModel {
    /// Create an empty model where every cell is unknown.
    pub const fn new() -> Self {
        Self {
            cells: BTreeMap::new(),
        }
    }

    /// Build the terrain layer from accumulated knowledge.
    pub fn from_knowledge(knowledge: &TerrainKnowledge, table: &TerrainTable) -> Self {
        let cells = knowledge
            .iter()
            .map(|(coord, terrain)| {
                let base = table.cost_of(terrain);
                let entry = base.move_cost.map_or_else(CellCost::blocked, |cost| {
                    CellCost::passable(cost, base.penalty)
                });
                (coord, entry)
            })
            .collect();
        Self { cells }
    }

    /// A model where every listed cell costs `move_cost` and has no penalty.
    ///
    /// Handy for scenario maps and tests.
    pub fn uniform<I>(cells: I, move_cost: u32) -> Self
    where
        I: IntoIterator<Item = HexCoord>,
    {
        Self {
            cells: cells
                .into_iter()
                .map(|c| (c, CellCost::passable(move_cost, 0)))
                .collect(),
        }
    }

    /// Overwrite the entry for `coord`.
    pub fn set(&mut self, coord: HexCoord, cost: CellCost) {
        self.cells.insert(coord, cost);
    }

    /// Mark friendly static obstacles as impassable for this tick.
    pub fn block_static<I>(&mut self, cells: I)
    where
        I: IntoIterator<Item = HexCoord>,
    {
        for cell in cells {
            if let Some(entry) = self.cells.get_mut(&cell) {
                entry.move_cost = None;
            }
        }
    }

    /// Mark hostile cells impassable and surround each with a penalty halo.
    ///
    /// The halo is additive: a cell next to two hostiles gets twice the
    /// penalty. Returns the number of cells that received a halo.
    pub fn add_hostiles<I>(&mut self, hostiles: I, halo_penalty: u32) -> usize
    where
        I: IntoIterator<Item = HexCoord>,
    {
        let mut haloed: usize = 0;
        for hostile in hostiles {
            self.cells
                .entry(hostile)
                .and_modify(|e| e.move_cost = None)
                .or_insert_with(CellCost::blocked);

            for neighbor in hostile.neighbors() {
                if let Some(entry) = self.cells.get_mut(&neighbor) {
                    entry.penalty = entry.penalty.saturating_add(halo_penalty);
                    haloed = haloed.saturating_add(1);
                }
            }
        }
        haloed
    }

    /// Movement cost to enter `coord`; `None` when impassable or unknown.
    pub fn cost(&self, coord: HexCoord) -> Option<u32> {
        self.cells.get(&coord).and_then(|e| e.move_cost)
    }

    /// Routing penalty of `coord`; zero when unknown.
    pub fn penalty(&self, coord: HexCoord) -> u32 {
        self.cells.get(&coord).map_or(0, |e| e.penalty)
    }

    /// Cost plus penalty of entering `coord`, or `None` when impassable.
    pub fn step_cost(&self, coord: HexCoord) -> Option<u32> {
        self.cells
            .get(&coord)
            .and_then(|e| e.move_cost.map(|c| c.saturating_add(e.penalty)))
    }

    /// Whether `coord` can be entered this tick.
    pub fn is_passable(&self, coord: HexCoord) -> bool {
        self.cost(coord).is_some()
    }

    /// Cells carrying a non-zero penalty, in coordinate order.
    pub fn overlay(&self) -> impl Iterator<Item = (HexCoord, u32)> + '_ {
        self.cells
            .iter()
            .filter(|(_, e)| e.penalty > 0)
            .map(|(c, e)| (*c, e.penalty))
    }

    /// Number of cells in the model.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the model has no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use colony_types::{CellObservation, Terrain};

    fn disc(radius: i32) -> Vec<HexCoord> {
        let mut out = Vec::new();
        for q in radius.saturating_neg()..=radius {
            for r in radius.saturating_neg()..=radius {
                let c = HexCoord::new(q, r);
                if c.distance(HexCoord::ORIGIN) <= radius.unsigned_abs() {
                    out.push(c);
                }
            }
        }
        out
    }

    #[test]
    fn terrain_layer_uses_table() {
        let mut k = TerrainKnowledge::new();
        k.absorb(&[
            CellObservation {
                coord: HexCoord::new(0, 0),
                terrain: Terrain::Rough,
            },
            CellObservation {
                coord: HexCoord::new(1, 0),
                terrain: Terrain::Hazard,
            },
            CellObservation {
                coord: HexCoord::new(2, 0),
                terrain: Terrain::Obstacle,
            },
        ]);
        let model = CostModel::from_knowledge(&k, &TerrainTable::default());
        assert_eq!(model.cost(HexCoord::new(0, 0)), Some(2));
        assert_eq!(model.penalty(HexCoord::new(1, 0)), 5);
        assert_eq!(model.step_cost(HexCoord::new(1, 0)), Some(6));
        assert_eq!(model.cost(HexCoord::new(2, 0)), None);
        // Never observed.
        assert_eq!(model.cost(HexCoord::new(9, 9)), None);
        assert_eq!(model.penalty(HexCoord::new(9, 9)), 0);
    }

    #[test]
    fn hostile_blocks_and_halos_every_neighbor() {
        let mut model = CostModel::uniform(disc(3), 1);
        let hostile = HexCoord::new(0, 0);
        assert_eq!(model.add_hostiles([hostile], 20), 6);

        assert_eq!(model.cost(hostile), None);
        for n in hostile.neighbors() {
            assert_eq!(model.penalty(n), 20);
            assert_eq!(model.cost(n), Some(1));
        }
        assert_eq!(model.penalty(HexCoord::new(2, 0)), 0);
    }

    #[test]
    fn adjacent_hostile_halos_stack() {
        let mut model = CostModel::uniform(disc(3), 1);
        let a = HexCoord::new(0, 0);
        let b = HexCoord::new(2, 0);
        model.add_hostiles([a, b], 20);

        // (1, 0) touches both.
        assert_eq!(model.penalty(HexCoord::new(1, 0)), 40);
        assert_eq!(model.penalty(HexCoord::new(-1, 0)), 20);
    }

    #[test]
    fn halo_layers_on_terrain_penalty() {
        let mut model = CostModel::uniform(disc(2), 1);
        model.set(HexCoord::new(1, 0), CellCost::passable(1, 5));
        model.add_hostiles([HexCoord::ORIGIN], 20);
        assert_eq!(model.penalty(HexCoord::new(1, 0)), 25);
    }

    #[test]
    fn static_obstacles_become_impassable() {
        let mut model = CostModel::uniform(disc(2), 1);
        model.block_static([HexCoord::new(1, 0)]);
        assert!(!model.is_passable(HexCoord::new(1, 0)));
        assert!(model.is_passable(HexCoord::new(0, 1)));
    }

    #[test]
    fn overlay_lists_only_penalized_cells() {
        let mut model = CostModel::uniform(disc(3), 1);
        model.add_hostiles([HexCoord::ORIGIN], 7);
        let overlay: Vec<_> = model.overlay().collect();
        assert_eq!(overlay.len(), 6);
        assert!(overlay.iter().all(|(_, p)| *p == 7));
    }
}
