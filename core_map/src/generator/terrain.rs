//! Terrain band assignment and band diffusion.

use crate::{
    geometry::{Half, Triangle},
    terrain::Terrain,
};

use super::Workspace;

/// Tries per region to find a grass area large enough for a desert.
pub const DESERT_CENTER_TRIES: usize = 200;
/// Spiral scatter draws per desert core.
pub const DESERT_CORE_CELLS: usize = 100;

/// Band every triangle from the sum of its three rebased corner heights.
pub fn init_types(ws: &mut Workspace) {
    for pos in ws.geometry.positions() {
        for half in [Half::Up, Half::Down] {
            let triangle = Triangle { pos, half };
            let sum: i32 = ws
                .geometry
                .triangle_corners(triangle)
                .iter()
                .map(|&corner| ws.height(corner))
                .sum();
            ws.set_triangle(triangle, Terrain::from_height_sum(sum));
        }
    }
}

/// Whether any triangle sharing a corner with `triangle` has band `seed`.
fn touches_band(ws: &Workspace, triangle: Triangle, seed: Terrain) -> bool {
    ws.geometry
        .triangle_corners(triangle)
        .into_iter()
        .flat_map(|corner| ws.geometry.triangles_around(corner))
        .any(|other| other != triangle && ws.triangle(other) == seed)
}

/// Turn every `old` triangle touching a `seed` triangle into `new`.
///
/// The sweep runs in position order and updates in place. Returns the
/// number of triangles changed.
pub fn seed_terrain_type(ws: &mut Workspace, old: Terrain, seed: Terrain, new: Terrain) -> u32 {
    debug_assert_ne!(old, seed);
    let mut changed = 0;
    for pos in ws.geometry.positions() {
        for half in [Half::Up, Half::Down] {
            let triangle = Triangle { pos, half };
            if ws.triangle(triangle) == old && touches_band(ws, triangle, seed) {
                ws.set_triangle(triangle, new);
                changed += 1;
            }
        }
    }
    changed
}

/// Grade water by distance from land and give coasts a beach band.
pub fn init_sea_and_shore(ws: &mut Workspace) {
    let shallow = seed_terrain_type(ws, Terrain::Water0, Terrain::Grass1, Terrain::Water3);
    seed_terrain_type(ws, Terrain::Water0, Terrain::Water3, Terrain::Water2);
    seed_terrain_type(ws, Terrain::Water0, Terrain::Water2, Terrain::Water1);
    let beach = seed_terrain_type(ws, Terrain::Grass1, Terrain::Water3, Terrain::Grass0);
    tracing::debug!(target: "hexmap::mapgen", shallow, beach, "mapgen.shore.graded");
}

/// Ring every `Desert2` core with `Desert1`, then `Desert0`, then a
/// `Grass3` fringe, converting only open grass.
///
/// Each ring is seeded only from the ring before it, so a triangle shares
/// corners with its own band and the bands directly inward or outward.
pub fn grade_deserts(ws: &mut Workspace) {
    const RINGS: [(Terrain, Terrain); 3] = [
        (Terrain::Desert2, Terrain::Desert1),
        (Terrain::Desert1, Terrain::Desert0),
        (Terrain::Desert0, Terrain::Grass3),
    ];
    for (seed, new) in RINGS {
        seed_terrain_type(ws, Terrain::Grass1, seed, new);
        seed_terrain_type(ws, Terrain::Grass2, seed, new);
    }
}

/// Seed desert cores in open grassland and grade them outward.
///
/// Returns `(placed, skipped)` desert counts.
pub fn create_deserts(ws: &mut Workspace) -> (u32, u32) {
    let mut placed = 0;
    let mut skipped = 0;
    for _ in 0..ws.geometry.region_count() {
        let mut center = None;
        for _ in 0..DESERT_CENTER_TRIES {
            let pos = ws.rnd_pos();
            if ws.large_hexagon_in_range(pos, Terrain::Grass1, Terrain::Grass2) {
                center = Some(pos);
                break;
            }
        }
        let Some(center) = center else {
            skipped += 1;
            continue;
        };
        placed += 1;
        for _ in 0..DESERT_CORE_CELLS {
            let index = (ws.next() & 0x7f) as usize;
            let pos = ws.pos_add_spirally(center, index);
            for triangle in ws.geometry.triangles_around(pos) {
                if ws.triangle(triangle).in_range(Terrain::Grass1, Terrain::Grass2) {
                    ws.set_triangle(triangle, Terrain::Desert2);
                }
            }
        }
    }

    grade_deserts(ws);

    tracing::debug!(
        target: "hexmap::mapgen",
        placed,
        skipped,
        "mapgen.deserts.seeded"
    );
    (placed, skipped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::test_support::uniform_workspace;

    #[test]
    fn bands_follow_corner_sums() {
        let mut ws = uniform_workspace(16, 16, Terrain::Water0, 1);
        let g = ws.geometry;
        ws.heights.iter_mut().for_each(|h| *h = 150);
        let low = g.pos(5, 5);
        ws.set_height(low, 0);
        init_types(&mut ws);
        // 0 + 150 + 150 = 300
        assert_eq!(ws.triangle(Triangle::up(low)), Terrain::Grass1);
        // 450 everywhere away from the low vertex.
        assert_eq!(ws.triangle(Triangle::up(g.pos(10, 10))), Terrain::Tundra1);
    }

    #[test]
    fn water_next_to_land_becomes_shallow() {
        let mut ws = uniform_workspace(16, 16, Terrain::Water0, 1);
        let g = ws.geometry;
        let island = g.pos(8, 8);
        ws.set_triangle(Triangle::up(island), Terrain::Grass1);
        init_sea_and_shore(&mut ws);

        // Neighbouring water, one band shallower per step towards land.
        assert_eq!(ws.triangle(Triangle::down(island)), Terrain::Water3);
        assert_eq!(ws.triangle(Triangle::up(island)), Terrain::Grass0);
        assert_eq!(ws.triangle(Triangle::up(g.pos(0, 0))), Terrain::Water0);
        let bands: Vec<_> = (0..6)
            .map(|dx| ws.triangle(Triangle::up(g.pos(8 + dx, 8))))
            .collect();
        assert!(bands.windows(2).skip(1).all(|w| w[0] >= w[1]), "{bands:?}");
    }

    #[test]
    fn seeding_leaves_unrelated_bands_alone() {
        let mut ws = uniform_workspace(8, 8, Terrain::Tundra0, 1);
        let changed = seed_terrain_type(&mut ws, Terrain::Grass1, Terrain::Water0, Terrain::Grass0);
        assert_eq!(changed, 0);
        assert!(ws.tiles.iter().all(|t| t.terrain_up == Terrain::Tundra0));
    }

    #[test]
    fn deserts_grade_from_core_to_grass() {
        let mut ws = uniform_workspace(64, 64, Terrain::Grass1, 2024);
        let (placed, skipped) = create_deserts(&mut ws);
        assert_eq!((placed, skipped), (4, 0));
        let count = |band: Terrain| {
            ws.tiles
                .iter()
                .map(|t| (t.terrain_up == band) as usize + (t.terrain_down == band) as usize)
                .sum::<usize>()
        };
        assert!(count(Terrain::Desert2) > 0);
        assert!(count(Terrain::Desert1) > 0);
        assert!(count(Terrain::Desert0) > 0);
        assert!(count(Terrain::Grass3) > 0);
    }

    #[test]
    fn desert_rings_only_touch_adjacent_bands() {
        let mut ws = uniform_workspace(64, 64, Terrain::Grass1, 1);
        let g = ws.geometry;
        let center = g.pos(32, 32);
        for index in [0, 1, 2, 3, 5, 8, 13, 21] {
            let pos = ws.pos_add_spirally(center, index);
            for triangle in g.triangles_around(pos) {
                ws.set_triangle(triangle, Terrain::Desert2);
            }
        }
        grade_deserts(&mut ws);

        use Terrain::{Desert0, Desert1, Desert2, Grass1, Grass3};
        let allowed = |band: Terrain| -> &'static [Terrain] {
            match band {
                Desert2 => &[Desert2, Desert1],
                Desert1 => &[Desert2, Desert1, Desert0],
                Desert0 => &[Desert1, Desert0, Grass3],
                Grass3 => &[Desert0, Grass3, Grass1],
                _ => &[Grass3, Grass1],
            }
        };
        let mut seen = [0usize; 3];
        for pos in g.positions() {
            for half in [Half::Up, Half::Down] {
                let triangle = Triangle { pos, half };
                let band = ws.triangle(triangle);
                match band {
                    Desert1 => seen[0] += 1,
                    Desert0 => seen[1] += 1,
                    Grass3 => seen[2] += 1,
                    _ => {}
                }
                for corner in g.triangle_corners(triangle) {
                    for other in g.triangles_around(corner) {
                        let near = ws.triangle(other);
                        assert!(
                            allowed(band).contains(&near),
                            "{band:?} at {triangle:?} touches {near:?}"
                        );
                    }
                }
            }
        }
        assert!(seen.iter().all(|&n| n > 0), "{seen:?}");
    }
}
