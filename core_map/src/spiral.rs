//! Ring-ordered offset table used by every bounded-radius search.
//!
//! The order of entries decides which cell a generation step or a gameplay
//! search visits first, so the table must be built the same way everywhere.

use std::ops::Range;

use crate::geometry::{hex_length, MapGeometry, MapPos};

/// Number of entries in the table.
pub const SPIRAL_LEN: usize = 295;

/// Outermost ring that is present in full.
pub const MAX_FULL_RING: usize = 9;

/// Rotation rows, one per direction (Right, DownRight, Down, Left, UpLeft,
/// Up). Each row is `[a, b, c, d]` with `x' = a*x + c*y`, `y' = b*x + d*y`.
const SPIRAL_MATRIX: [[i32; 4]; 6] = [
    [1, 0, 0, 1],
    [1, 1, -1, 0],
    [0, 1, -1, -1],
    [-1, 0, 0, -1],
    [-1, -1, 1, 0],
    [0, -1, 1, 1],
];

/// Base points: for ring r the segment `(r, 0) .. (r, r - 1)`; ring 10 is cut
/// short after four points so the table ends at 295 entries.
const SPIRAL_BASE: [(i32, i32); 49] = [
    (1, 0),
    (2, 0), (2, 1),
    (3, 0), (3, 1), (3, 2),
    (4, 0), (4, 1), (4, 2), (4, 3),
    (5, 0), (5, 1), (5, 2), (5, 3), (5, 4),
    (6, 0), (6, 1), (6, 2), (6, 3), (6, 4), (6, 5),
    (7, 0), (7, 1), (7, 2), (7, 3), (7, 4), (7, 5), (7, 6),
    (8, 0), (8, 1), (8, 2), (8, 3), (8, 4), (8, 5), (8, 6), (8, 7),
    (9, 0), (9, 1), (9, 2), (9, 3), (9, 4), (9, 5), (9, 6), (9, 7), (9, 8),
    (10, 0), (10, 1), (10, 2), (10, 3),
];

/// Immutable table of relative `(dx, dy)` offsets ordered by ring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpiralPattern {
    offsets: Vec<(i32, i32)>,
}

impl Default for SpiralPattern {
    fn default() -> Self {
        Self::new()
    }
}

impl SpiralPattern {
    pub fn new() -> Self {
        let mut offsets = Vec::with_capacity(SPIRAL_LEN);
        offsets.push((0, 0));
        for &(x, y) in SPIRAL_BASE.iter() {
            for [a, b, c, d] in SPIRAL_MATRIX {
                offsets.push((a * x + c * y, b * x + d * y));
            }
        }
        debug_assert_eq!(offsets.len(), SPIRAL_LEN);
        Self { offsets }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Offset at `index`; panics past the end of the table.
    #[inline]
    pub fn offset_at(&self, index: usize) -> (i32, i32) {
        self.offsets[index]
    }

    pub fn offsets(&self) -> &[(i32, i32)] {
        &self.offsets
    }

    /// Ring (hex distance from the origin) of the entry at `index`.
    pub fn ring_of(&self, index: usize) -> usize {
        let (dx, dy) = self.offset_at(index);
        hex_length(dx, dy) as usize
    }

    /// Index range covering exactly one ring, clipped to the table.
    pub fn ring_range(&self, ring: usize) -> Range<usize> {
        spiral_offset(ring).min(self.len())..spiral_num(ring).min(self.len())
    }

    /// Translate `pos` by the entry at `index`.
    #[inline]
    pub fn pos_add_spirally(&self, geometry: &MapGeometry, pos: MapPos, index: usize) -> MapPos {
        let (dx, dy) = self.offset_at(index);
        geometry.pos_add(pos, dx, dy)
    }
}

/// Number of entries covering rings `0..=radius` (`1 + 3r(r + 1)`).
#[inline]
pub fn spiral_num(radius: usize) -> usize {
    1 + 3 * radius * (radius + 1)
}

/// Index of the first entry of ring `radius`.
#[inline]
pub fn spiral_offset(radius: usize) -> usize {
    if radius == 0 {
        0
    } else {
        spiral_num(radius - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_has_fixed_length_and_origin() {
        let spiral = SpiralPattern::new();
        assert_eq!(spiral.len(), SPIRAL_LEN);
        assert_eq!(spiral.offset_at(0), (0, 0));
    }

    #[test]
    fn ring_distance_never_decreases() {
        let spiral = SpiralPattern::new();
        let mut last = 0;
        for index in 0..spiral.len() {
            let ring = spiral.ring_of(index);
            assert!(ring >= last, "entry {index} steps back to ring {ring}");
            last = ring;
        }
        assert_eq!(last, 10);
    }

    #[test]
    fn closed_form_ring_bounds_match_table() {
        let spiral = SpiralPattern::new();
        for ring in 0..=MAX_FULL_RING {
            let range = spiral.ring_range(ring);
            let expected = if ring == 0 { 1 } else { 6 * ring };
            assert_eq!(range.len(), expected);
            assert!(range.clone().all(|index| spiral.ring_of(index) == ring));
        }
        assert_eq!(spiral.ring_range(10).len(), 24);
        assert_eq!(spiral.ring_range(11).len(), 0);
    }

    #[test]
    fn full_rings_have_no_duplicates() {
        let spiral = SpiralPattern::new();
        let mut seen = std::collections::HashSet::new();
        for &offset in spiral.offsets() {
            assert!(seen.insert(offset), "duplicate offset {offset:?}");
        }
    }

    #[test]
    fn first_ring_follows_direction_order() {
        let spiral = SpiralPattern::new();
        let rendered = spiral.offsets()[1..7]
            .iter()
            .map(|(x, y)| format!("({x},{y})"))
            .collect::<Vec<_>>()
            .join(" ");
        insta::assert_snapshot!(rendered, @"(1,0) (1,1) (0,1) (-1,0) (-1,-1) (0,-1)");
    }

    #[test]
    fn second_ring_interleaves_rotations() {
        let spiral = SpiralPattern::new();
        let rendered = spiral.offsets()[7..19]
            .iter()
            .map(|(x, y)| format!("({x},{y})"))
            .collect::<Vec<_>>()
            .join(" ");
        insta::assert_snapshot!(
            rendered,
            @"(2,0) (2,2) (0,2) (-2,0) (-2,-2) (0,-2) (2,1) (1,2) (-1,1) (-2,-1) (-1,-2) (1,-1)"
        );
    }
}
