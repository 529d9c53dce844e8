//! Bounded nearest-target search.
//!
//! A layered breadth-first scan from a start cell that stops at the first
//! cell satisfying a predicate, up to a given hop radius. Impassable cells
//! are neither reported nor expanded through. Penalties are ignored: this
//! answers "what is close", not "what is cheap".

use std::collections::BTreeSet;

use colony_types::HexCoord;

use crate::cost_model::CostModel;

/// Find the nearest cell within `radius` hops of `start` for which
/// `is_target` holds.
///
/// The start cell itself is tested first. Within a layer, cells are tested
/// in discovery order, which follows the fixed neighbor direction order.
pub fn nearest_within<F>(
    start: HexCoord,
    model: &CostModel,
    radius: u32,
    is_target: F,
) -> Option<HexCoord>
where
    F: Fn(HexCoord) -> bool,
{
    let mut visited: BTreeSet<HexCoord> = BTreeSet::new();
    visited.insert(start);
    let mut layer = vec![start];
    let mut depth: u32 = 0;

    while !layer.is_empty() {
        if let Some(hit) = layer.iter().copied().find(|c| is_target(*c)) {
            return Some(hit);
        }
        if depth >= radius {
            break;
        }

        let mut next_layer = Vec::new();
        for cell in layer {
            for next in cell.neighbors() {
                if model.is_passable(next) && visited.insert(next) {
                    next_layer.push(next);
                }
            }
        }
        layer = next_layer;
        depth = depth.saturating_add(1);
    }
    None
}
