//! A* path search over the hex grid.
//!
//! Entering a cell costs its move cost plus its penalty. The heuristic is
//! hex distance, which never overestimates because every passable cell
//! costs at least 1. The frontier is a `BTreeSet` keyed by
//! `(estimate, insertion sequence, cell)`, so equal estimates pop in the
//! order they were discovered. Superseded entries stay in the set and are
//! skipped when popped.
//!
//! Cells in the `blocked` set (occupied this tick) are never entered. A
//! blocked or impassable goal fails the pre-check before any node is
//! expanded, so callers aiming at an occupied cell must pick a free
//! neighbor of it instead.

use std::collections::{BTreeMap, BTreeSet};

use colony_types::HexCoord;

use crate::cost_model::CostModel;

/// A found route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    /// Every cell from start to goal, both inclusive.
    pub cells: Vec<HexCoord>,
    /// Accumulated cost plus penalty of every entered cell.
    pub cost: u32,
}

impl Path {
    /// The cells still to be entered (everything after the start).
    pub fn steps(&self) -> &[HexCoord] {
        self.cells.get(1..).unwrap_or_default()
    }

    /// Consume the path, keeping only the cells to be entered.
    pub fn into_steps(mut self) -> Vec<HexCoord> {
        if !self.cells.is_empty() {
            self.cells.remove(0);
        }
        self.cells
    }

    /// Number of moves.
    pub fn len(&self) -> usize {
        self.cells.len().saturating_sub(1)
    }

    /// Whether the path has no moves.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The outcome of one search, with effort statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    /// The route, if one exists.
    pub path: Option<Path>,
    /// Number of cells popped and expanded.
    pub expanded: usize,
}

/// Run A* from `start` to `goal`.
pub fn search(
    start: HexCoord,
    goal: HexCoord,
    model: &CostModel,
    blocked: &BTreeSet<HexCoord>,
) -> SearchResult {
    if !model.is_passable(goal) || blocked.contains(&goal) {
        return SearchResult {
            path: None,
            expanded: 0,
        };
    }
    if start == goal {
        return SearchResult {
            path: Some(Path {
                cells: vec![start],
                cost: 0,
            }),
            expanded: 0,
        };
    }

    let mut frontier: BTreeSet<(u32, u64, HexCoord)> = BTreeSet::new();
    let mut best: BTreeMap<HexCoord, u32> = BTreeMap::new();
    let mut prev: BTreeMap<HexCoord, HexCoord> = BTreeMap::new();
    let mut closed: BTreeSet<HexCoord> = BTreeSet::new();
    let mut seq: u64 = 0;
    let mut expanded: usize = 0;

    best.insert(start, 0);
    frontier.insert((start.distance(goal), seq, start));

    while let Some((_, _, current)) = frontier.pop_first() {
        if !closed.insert(current) {
            continue; // superseded entry
        }
        expanded = expanded.saturating_add(1);

        let Some(&g) = best.get(&current) else {
            continue;
        };
        if current == goal {
            return SearchResult {
                path: Some(Path {
                    cells: reconstruct(&prev, start, goal),
                    cost: g,
                }),
                expanded,
            };
        }

        for next in current.neighbors() {
            if closed.contains(&next) || blocked.contains(&next) {
                continue;
            }
            let Some(step) = model.step_cost(next) else {
                continue;
            };
            let tentative = g.saturating_add(step);
            if best.get(&next).is_none_or(|&known| tentative < known) {
                best.insert(next, tentative);
                prev.insert(next, current);
                seq = seq.saturating_add(1);
                frontier.insert((tentative.saturating_add(next.distance(goal)), seq, next));
            }
        }
    }

    SearchResult {
        path: None,
        expanded,
    }
}

/// Find the cheapest route from `start` to `goal`, if any.
pub fn find_path(
    start: HexCoord,
    goal: HexCoord,
    model: &CostModel,
    blocked: &BTreeSet<HexCoord>,
) -> Option<Path> {
    search(start, goal, model, blocked).path
}

fn reconstruct(
    prev: &BTreeMap<HexCoord, HexCoord>,
    start: HexCoord,
    goal: HexCoord,
) -> Vec<HexCoord> {
    let mut cells = vec![goal];
    let mut current = goal;
    while current != start {
        let Some(&p) = prev.get(&current) else {
            break;
        };
        cells.push(p);
        current = p;
    }
    cells.reverse();
    cells
}
