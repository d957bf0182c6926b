//! Bounded neighbourhood searches over the spiral table.
//!
//! Every search visits positions in spiral order, so results and tie-breaks
//! are deterministic. Radii beyond the table are clipped to it.

use crate::{
    geometry::MapPos,
    landscape::PlayerId,
    map::Map,
    random::MapRandom,
    spiral::{spiral_num, spiral_offset},
};

/// Random draws made by [`Map::find_spot_near`] before giving up.
pub const SPOT_NEAR_TRIES: usize = 16;

impl Map {
    fn spiral_indices(&self, min_distance: u32, range: u32) -> std::ops::Range<usize> {
        let len = self.spiral().len();
        let start = spiral_offset(min_distance as usize).min(len);
        let end = spiral_num(range as usize).min(len);
        start..end.max(start)
    }

    /// Positions between `min_distance` and `range` of `base` accepted by
    /// `pred`, nearest first.
    pub fn find_in_area(
        &self,
        base: MapPos,
        range: u32,
        min_distance: u32,
        mut pred: impl FnMut(&Map, MapPos) -> bool,
    ) -> Vec<MapPos> {
        self.spiral_indices(min_distance, range)
            .map(|index| self.pos_add_spirally(base, index))
            .filter(|&pos| pred(self, pos))
            .collect()
    }

    /// First position in spiral order within `range` accepted by `pred`.
    pub fn find_nearest(
        &self,
        base: MapPos,
        range: u32,
        mut pred: impl FnMut(&Map, MapPos) -> bool,
    ) -> Option<MapPos> {
        self.spiral_indices(0, range)
            .map(|index| self.pos_add_spirally(base, index))
            .find(|&pos| pred(self, pos))
    }

    /// Highest-rated position within `range`. `rate` returns `None` for
    /// positions that do not qualify; ties keep the earlier position.
    pub fn find_best(
        &self,
        base: MapPos,
        range: u32,
        mut rate: impl FnMut(&Map, MapPos) -> Option<i32>,
    ) -> Option<(MapPos, i32)> {
        let mut best: Option<(MapPos, i32)> = None;
        for index in self.spiral_indices(0, range) {
            let pos = self.pos_add_spirally(base, index);
            if let Some(score) = rate(self, pos) {
                if best.map_or(true, |(_, top)| score > top) {
                    best = Some((pos, score));
                }
            }
        }
        best
    }

    /// Try random positions within `range` of `base` until one passes `pred`.
    pub fn find_spot_near(
        &self,
        base: MapPos,
        range: u32,
        random: &mut MapRandom,
        mut pred: impl FnMut(&Map, MapPos) -> bool,
    ) -> Option<MapPos> {
        let count = self.spiral_indices(0, range).len();
        for _ in 0..SPOT_NEAR_TRIES {
            let index = usize::from(random.next_word()) % count;
            let pos = self.pos_add_spirally(base, index);
            if pred(self, pos) {
                return Some(pos);
            }
        }
        None
    }

    /// Positions owned by `owner` accepted by `pred`, in position order.
    pub fn find_in_territory(
        &self,
        owner: PlayerId,
        mut pred: impl FnMut(&Map, MapPos) -> bool,
    ) -> Vec<MapPos> {
        self.geometry()
            .positions()
            .filter(|&pos| self.owner(pos) == Some(owner) && pred(self, pos))
            .collect()
    }
}
