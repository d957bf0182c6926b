//! Fractal height synthesis over the toroidal grid.

use crate::geometry::{Direction, MapPos};

use super::Workspace;

/// Highest height synthesis may produce; 252..=255 are reserved for water
/// carving.
pub const MAX_SYNTH_HEIGHT: i32 = 250;
/// Spacing of the randomly seeded coarse grid.
pub const SQUARE_STEP: u32 = 16;
/// Largest height difference allowed between adjacent vertices.
pub const MAX_SLOPE: i32 = 32;

const SUBDIVISION_LEVELS: [i32; 4] = [8, 4, 2, 1];

/// Displacement amplitude for the first subdivision level. Later levels
/// halve it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Roughness {
    pub base: i32,
    /// Added to the amplitude on the first level only. Historical maps were
    /// generated with the upper bits of the roughness draw leaking in here.
    pub first_level_extra: i32,
}

impl Roughness {
    pub fn from_draw(draw: i32, preserve_legacy_quirks: bool) -> Self {
        Self {
            base: 0x80 + (draw & 0x7f),
            first_level_extra: if preserve_legacy_quirks {
                (draw >> 8) & 0x7f
            } else {
                0
            },
        }
    }

    pub fn fixed(base: i32) -> Self {
        Self {
            base,
            first_level_extra: 0,
        }
    }
}

/// Per-level amplitude/offset pairs, `(r1, r2)` with `r2` biasing the draw.
fn levels(roughness: Roughness, spikiness: i32) -> impl Iterator<Item = (i32, i32, i32)> {
    let r1 = roughness.base;
    let r2 = (r1 * spikiness) >> 16;
    SUBDIVISION_LEVELS
        .into_iter()
        .enumerate()
        .map(move |(level, step)| {
            let extra = if level == 0 {
                roughness.first_level_extra
            } else {
                0
            };
            (step, (r1 >> level) + extra, r2 >> level)
        })
}

fn displace(ws: &mut Workspace, avg: i32, r1: i32, r2: i32) -> i32 {
    let offset = ((ws.next() * r1) >> 16) - r2;
    (avg + offset).clamp(0, MAX_SYNTH_HEIGHT)
}

fn coarse_corners(ws: &Workspace, step: i32) -> Vec<MapPos> {
    let step = step as usize;
    let geometry = ws.geometry;
    (0..geometry.rows())
        .step_by(step)
        .flat_map(|row| {
            (0..geometry.cols())
                .step_by(step)
                .map(move |col| geometry.pos(col, row))
        })
        .collect()
}

/// Seed every 16th vertex on both axes.
pub fn init_heights_squares(ws: &mut Workspace) {
    for pos in coarse_corners(ws, SQUARE_STEP as i32) {
        let height = (ws.next() & 0xff).min(MAX_SYNTH_HEIGHT);
        ws.set_height(pos, height);
    }
}

/// Midpoint displacement: each level fills the right, down and down-right
/// midpoints of every coarse cell from the two corners on that edge.
pub fn init_heights_midpoints(ws: &mut Workspace, roughness: Roughness) {
    let spikiness = ws.config.terrain_spikiness;
    for (step, r1, r2) in levels(roughness, spikiness) {
        for pos in coarse_corners(ws, step * 2) {
            let h = ws.height(pos);
            for dir in [Direction::Right, Direction::Down, Direction::DownRight] {
                let far = ws.geometry.move_n(pos, dir, step * 2);
                let mid = ws.geometry.move_n(pos, dir, step);
                let avg = (h + ws.height(far)) / 2;
                let value = displace(ws, avg, r1, r2);
                ws.set_height(mid, value);
            }
        }
    }
}

/// Diamond-square: cell centers from four corners, then edge midpoints from
/// their two corners and the centers on either side.
pub fn init_heights_diamond_square(ws: &mut Workspace, roughness: Roughness) {
    let spikiness = ws.config.terrain_spikiness;
    for (step, r1, r2) in levels(roughness, spikiness) {
        let corners = coarse_corners(ws, step * 2);
        let g = ws.geometry;

        for &pos in &corners {
            let sum = ws.height(pos)
                + ws.height(g.move_n(pos, Direction::Right, step * 2))
                + ws.height(g.move_n(pos, Direction::Down, step * 2))
                + ws.height(g.move_n(pos, Direction::DownRight, step * 2));
            let value = displace(ws, sum / 4, r1, r2);
            ws.set_height(g.move_n(pos, Direction::DownRight, step), value);
        }

        for &pos in &corners {
            let center = g.move_n(pos, Direction::DownRight, step);

            let upper_center = g.move_n(g.move_n(pos, Direction::Up, step), Direction::Right, step);
            let sum = ws.height(pos)
                + ws.height(g.move_n(pos, Direction::Right, step * 2))
                + ws.height(upper_center)
                + ws.height(center);
            let value = displace(ws, sum / 4, r1, r2);
            ws.set_height(g.move_n(pos, Direction::Right, step), value);

            let left_center = g.move_n(g.move_n(pos, Direction::Down, step), Direction::Left, step);
            let sum = ws.height(pos)
                + ws.height(g.move_n(pos, Direction::Down, step * 2))
                + ws.height(left_center)
                + ws.height(center);
            let value = displace(ws, sum / 4, r1, r2);
            ws.set_height(g.move_n(pos, Direction::Down, step), value);
        }
    }
}

/// Relax slopes until no adjacent pair differs by more than [`MAX_SLOPE`].
/// Returns the number of sweeps that changed something.
pub fn clamp_heights(ws: &mut Workspace) -> u32 {
    let mut passes = 0;
    loop {
        let mut changed = false;
        for pos in ws.geometry.positions() {
            for dir in [Direction::Right, Direction::DownRight, Direction::Down] {
                let other = ws.geometry.move_dir(pos, dir);
                let (a, b) = (ws.height(pos), ws.height(other));
                if a - b > MAX_SLOPE {
                    ws.set_height(other, a - MAX_SLOPE);
                    changed = true;
                } else if b - a > MAX_SLOPE {
                    ws.set_height(pos, b - MAX_SLOPE);
                    changed = true;
                }
            }
        }
        if !changed {
            break;
        }
        passes += 1;
    }
    tracing::debug!(target: "hexmap::mapgen", passes, "mapgen.heights.clamped");
    passes
}

/// Shift heights so carved water sits at zero.
pub fn heights_rebase(ws: &mut Workspace) {
    let shift = ws.config.water_level - 1;
    for height in ws.heights.iter_mut() {
        *height -= shift;
    }
}

/// Compress rebased heights into the final 0..=31 range and store them on
/// the tiles.
pub fn heights_rescale(ws: &mut Workspace) {
    for (tile, height) in ws.tiles.iter_mut().zip(ws.heights.iter_mut()) {
        *height = ((*height + 6) >> 3).min(31);
        tile.height = *height as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapGenConfig;
    use crate::generator::Workspace;
    use crate::geometry::MapGeometry;

    fn seeded_workspace(seed: u64) -> Workspace {
        let geometry = MapGeometry::from_dimensions(64, 64).expect("grid");
        let mut ws = Workspace::new(geometry, &MapGenConfig::new(3, seed));
        init_heights_squares(&mut ws);
        ws
    }

    #[test]
    fn coarse_corners_are_seeded_in_range() {
        let ws = seeded_workspace(77);
        let g = ws.geometry;
        let mut seeded = 0;
        for row in (0..64).step_by(16) {
            for col in (0..64).step_by(16) {
                let h = ws.height(g.pos(col, row));
                assert!((0..=MAX_SYNTH_HEIGHT).contains(&h));
                seeded += 1;
            }
        }
        assert_eq!(seeded, 16);
        assert_eq!(ws.height(g.pos(1, 0)), 0);
    }

    #[test]
    fn midpoints_with_fixed_roughness_repeat() {
        let mut a = seeded_workspace(0x5eed);
        let mut b = a.clone();
        init_heights_midpoints(&mut a, Roughness::fixed(200));
        init_heights_midpoints(&mut b, Roughness::fixed(200));
        assert_eq!(a.heights, b.heights);
        assert!(a.heights.iter().all(|h| (0..=MAX_SYNTH_HEIGHT).contains(h)));
        // Every vertex lies on some level's midpoint lattice.
        let distinct: std::collections::HashSet<_> = a.heights.iter().collect();
        assert!(distinct.len() > 10);
    }

    #[test]
    fn diamond_square_stays_in_range() {
        let mut ws = seeded_workspace(42);
        init_heights_diamond_square(&mut ws, Roughness::from_draw(0x1234, true));
        assert!(ws.heights.iter().all(|h| (0..=MAX_SYNTH_HEIGHT).contains(h)));
    }

    #[test]
    fn legacy_quirk_only_touches_first_level() {
        let legacy = Roughness::from_draw(0x7f55, true);
        let fixed = Roughness::from_draw(0x7f55, false);
        assert_eq!(legacy.base, fixed.base);
        assert_eq!(legacy.base, 0x80 + 0x55);
        assert_eq!(legacy.first_level_extra, 0x7f);
        assert_eq!(fixed.first_level_extra, 0);

        let a: Vec<_> = levels(legacy, 0x9999).collect();
        let b: Vec<_> = levels(fixed, 0x9999).collect();
        assert_ne!(a[0], b[0]);
        assert_eq!(a[1..], b[1..]);
    }

    #[test]
    fn clamping_limits_every_slope() {
        let mut ws = seeded_workspace(3);
        let g = ws.geometry;
        ws.set_height(g.pos(10, 10), 250);
        ws.set_height(g.pos(40, 20), 200);
        let passes = clamp_heights(&mut ws);
        assert!(passes > 0);
        for pos in g.positions() {
            for n in g.neighbors(pos) {
                assert!((ws.height(pos) - ws.height(n)).abs() <= MAX_SLOPE);
            }
        }
        assert_eq!(ws.height(g.pos(10, 10)), 250);
    }

    #[test]
    fn rescale_caps_at_thirty_one() {
        let mut ws = seeded_workspace(1);
        ws.heights.iter_mut().for_each(|h| *h = 300);
        ws.heights[0] = 0;
        ws.heights[1] = 10;
        heights_rescale(&mut ws);
        assert_eq!(ws.tiles[0].height, 0);
        assert_eq!(ws.tiles[1].height, 2);
        assert_eq!(ws.tiles[2].height, 31);
    }
}
