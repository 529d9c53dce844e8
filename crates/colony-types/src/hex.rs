//! Axial hex coordinates and grid geometry.
//!
//! Cells are addressed by an axial `(q, r)` pair. The six neighbors of a
//! cell are enumerated in the fixed cyclic order of [`DIRECTIONS`], which
//! every search in the workspace relies on for reproducible tie-breaks.
//!
//! Distance is the standard hex metric `max(|dq|, |dr|, |dq + dr|)`. Because
//! the cheapest terrain costs 1 per step, the metric never overestimates the
//! true traversal cost and doubles as the A* heuristic.
//!
//! All coordinate arithmetic saturates instead of overflowing.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// An axial hex coordinate.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub struct HexCoord {
    /// Column axis.
    pub q: i32,
    /// Diagonal row axis.
    pub r: i32,
}

/// The six unit direction vectors in fixed cyclic order.
///
/// Consecutive entries are adjacent directions, so `DIRECTIONS[i]` and
/// `DIRECTIONS[(i + 1) % 6]` bound one sixth of the plane.
pub const DIRECTIONS: [HexCoord; 6] = [
    HexCoord::new(1, 0),
    HexCoord::new(1, -1),
    HexCoord::new(0, -1),
    HexCoord::new(-1, 0),
    HexCoord::new(-1, 1),
    HexCoord::new(0, 1),
];

impl HexCoord {
    /// The coordinate origin `(0, 0)`.
    pub const ORIGIN: Self = Self::new(0, 0);

    /// Create a coordinate from its axial components.
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Translate this coordinate by `delta`.
    #[must_use]
    pub const fn offset(self, delta: Self) -> Self {
        Self {
            q: self.q.saturating_add(delta.q),
            r: self.r.saturating_add(delta.r),
        }
    }

    /// Multiply both components by `factor`.
    #[must_use]
    pub const fn scaled(self, factor: i32) -> Self {
        Self {
            q: self.q.saturating_mul(factor),
            r: self.r.saturating_mul(factor),
        }
    }

    /// The neighbor in direction `direction` (taken modulo 6).
    #[must_use]
    pub fn neighbor(self, direction: usize) -> Self {
        let idx = direction.checked_rem(DIRECTIONS.len()).unwrap_or(0);
        DIRECTIONS.get(idx).map_or(self, |d| self.offset(*d))
    }

    /// All six neighbors in [`DIRECTIONS`] order.
    pub fn neighbors(self) -> [Self; 6] {
        DIRECTIONS.map(|d| self.offset(d))
    }

    /// Hex distance (number of steps) between two coordinates.
    pub fn distance(self, other: Self) -> u32 {
        let dq = i64::from(self.q).saturating_sub(i64::from(other.q));
        let dr = i64::from(self.r).saturating_sub(i64::from(other.r));
        let ds = dq.saturating_add(dr);
        let steps = dq
            .unsigned_abs()
            .max(dr.unsigned_abs())
            .max(ds.unsigned_abs());
        u32::try_from(steps).unwrap_or(u32::MAX)
    }

    /// Whether `other` is exactly one step away.
    pub fn is_adjacent(self, other: Self) -> bool {
        self.distance(other) == 1
    }

    /// The element of `candidates` closest to `self`.
    ///
    /// Ties go to the earliest candidate in iteration order.
    pub fn nearest<I>(self, candidates: I) -> Option<Self>
    where
        I: IntoIterator<Item = Self>,
    {
        let mut best: Option<(u32, Self)> = None;
        for candidate in candidates {
            let d = self.distance(candidate);
            if best.is_none_or(|(best_d, _)| d < best_d) {
                best = Some((d, candidate));
            }
        }
        best.map(|(_, c)| c)
    }
}

impl core::fmt::Display for HexCoord {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.q, self.r)
    }
}

impl From<(i32, i32)> for HexCoord {
    fn from((q, r): (i32, i32)) -> Self {
        Self::new(q, r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directions_are_unit_steps() {
        for d in DIRECTIONS {
            assert_eq!(HexCoord::ORIGIN.distance(d), 1);
        }
    }

    #[test]
    fn consecutive_directions_are_adjacent() {
        for i in 0..6 {
            let a = HexCoord::ORIGIN.neighbor(i);
            let b = HexCoord::ORIGIN.neighbor(i + 1);
            assert!(a.is_adjacent(b), "{a} and {b} should touch");
        }
    }

    #[test]
    fn neighbor_wraps_direction_index() {
        let c = HexCoord::new(3, -2);
        assert_eq!(c.neighbor(6), c.neighbor(0));
        assert_eq!(c.neighbor(13), c.neighbor(1));
    }

    #[test]
    fn distance_matches_hex_metric() {
        let a = HexCoord::new(0, 0);
        assert_eq!(a.distance(HexCoord::new(2, 2)), 4);
        assert_eq!(a.distance(HexCoord::new(2, -2)), 2);
        assert_eq!(a.distance(HexCoord::new(-3, 1)), 3);
        assert_eq!(a.distance(a), 0);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = HexCoord::new(5, -7);
        let b = HexCoord::new(-2, 4);
        assert_eq!(a.distance(b), b.distance(a));
    }

    #[test]
    fn distance_saturates_at_extremes() {
        let a = HexCoord::new(i32::MIN, i32::MIN);
        let b = HexCoord::new(i32::MAX, i32::MAX);
        assert!(a.distance(b) > 0);
    }

    #[test]
    fn scaled_corner() {
        let corner = HexCoord::new(10, 10).offset(HexCoord::new(1, -1).scaled(4));
        assert_eq!(corner, HexCoord::new(14, 6));
    }

    #[test]
    fn nearest_prefers_first_on_tie() {
        let origin = HexCoord::ORIGIN;
        let picks = [HexCoord::new(0, 2), HexCoord::new(2, 0), HexCoord::new(5, 5)];
        assert_eq!(origin.nearest(picks), Some(HexCoord::new(0, 2)));
        assert_eq!(origin.nearest(Vec::new()), None);
    }

    #[test]
    fn serde_shape() {
        let json = serde_json::to_string(&HexCoord::new(1, -1)).unwrap_or_default();
        assert_eq!(json, r#"{"q":1,"r":-1}"#);
    }
}
