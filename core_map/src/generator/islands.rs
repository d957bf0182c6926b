//! Drowning land fragments cut off from the main landmass.

use std::collections::VecDeque;

use crate::{
    geometry::{Direction, MapPos},
    terrain::Terrain,
};

use super::Workspace;

fn is_land_vertex(ws: &Workspace, pos: MapPos) -> bool {
    ws.geometry
        .triangles_around(pos)
        .into_iter()
        .any(|tri| !ws.triangle(tri).is_water())
}

/// Land vertices reachable from `start`, walking edges with land on at least
/// one side. Vertices already tagged are not revisited.
fn flood_land(ws: &Workspace, start: MapPos, tags: &mut [bool]) -> Vec<MapPos> {
    let mut reached = vec![start];
    let mut queue = VecDeque::from([start]);
    tags[start.index()] = true;
    while let Some(pos) = queue.pop_front() {
        for dir in Direction::ALL {
            let next = ws.geometry.move_dir(pos, dir);
            if tags[next.index()] {
                continue;
            }
            let land_edge = ws
                .geometry
                .edge_triangles(pos, dir)
                .into_iter()
                .any(|tri| !ws.triangle(tri).is_water());
            if land_edge {
                tags[next.index()] = true;
                reached.push(next);
                queue.push_back(next);
            }
        }
    }
    reached
}

fn drown(ws: &mut Workspace, pos: MapPos) {
    ws.set_height(pos, 0);
    for tri in ws.geometry.triangles_around(pos) {
        ws.set_triangle(tri, Terrain::Water0);
    }
}

/// Flood-fill land components until one covers a quarter of the map, then
/// drown land that was never reached.
///
/// By default components filled before the main one are spared, so small
/// islands early in position order survive. With `exhaustive_island_pruning`
/// only the main component is kept. Nothing is drowned when no component
/// reaches the threshold. Returns the number of vertices drowned.
pub fn remove_islands(ws: &mut Workspace) -> u32 {
    let tile_count = ws.geometry.tile_count();
    let threshold = tile_count / 4;
    let mut tags = vec![false; tile_count];
    let mut main = None;

    for pos in ws.geometry.positions() {
        if tags[pos.index()] || !is_land_vertex(ws, pos) {
            continue;
        }
        let component = flood_land(ws, pos, &mut tags);
        if component.len() >= threshold {
            main = Some(component);
            break;
        }
    }

    let Some(main) = main else {
        tracing::debug!(target: "hexmap::mapgen", "mapgen.islands.no_main_landmass");
        return 0;
    };

    let keep = if ws.config.exhaustive_island_pruning {
        let mut keep = vec![false; tile_count];
        for pos in &main {
            keep[pos.index()] = true;
        }
        keep
    } else {
        tags
    };

    let islands: Vec<MapPos> = ws
        .geometry
        .positions()
        .filter(|&pos| !keep[pos.index()] && is_land_vertex(ws, pos))
        .collect();
    for &pos in &islands {
        drown(ws, pos);
    }
    let drowned = islands.len() as u32;
    tracing::debug!(
        target: "hexmap::mapgen",
        main_landmass = main.len(),
        drowned,
        "mapgen.islands.pruned"
    );
    drowned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::test_support::uniform_workspace;
    use crate::geometry::Triangle;

    /// Open sea with a one-triangle island at (2, 2) and a land band over
    /// rows 10..=28, so the island comes first in position order.
    fn island_before_main(exhaustive: bool) -> Workspace {
        let mut ws = uniform_workspace(32, 32, Terrain::Water0, 1);
        ws.config.exhaustive_island_pruning = exhaustive;
        ws.heights.iter_mut().for_each(|h| *h = 5);
        let g = ws.geometry;
        for row in 10..=28 {
            for col in 0..32 {
                let pos = g.pos(col, row);
                ws.set_triangle(Triangle::up(pos), Terrain::Grass1);
                ws.set_triangle(Triangle::down(pos), Terrain::Grass1);
            }
        }
        ws.set_triangle(Triangle::up(g.pos(2, 2)), Terrain::Grass1);
        ws
    }

    #[test]
    fn legacy_pruning_spares_fragments_seen_first() {
        let mut ws = island_before_main(false);
        assert_eq!(remove_islands(&mut ws), 0);
        assert_eq!(ws.triangle(Triangle::up(ws.geometry.pos(2, 2))), Terrain::Grass1);
    }

    #[test]
    fn exhaustive_pruning_drowns_every_fragment() {
        let mut ws = island_before_main(true);
        assert_eq!(remove_islands(&mut ws), 3);
        let g = ws.geometry;
        assert_eq!(ws.triangle(Triangle::up(g.pos(2, 2))), Terrain::Water0);
        assert_eq!(ws.height(g.pos(2, 3)), 0);
        assert_eq!(ws.height(g.pos(3, 3)), 0);
        assert_eq!(ws.height(g.pos(20, 20)), 5);
        assert_eq!(ws.triangle(Triangle::up(g.pos(20, 20))), Terrain::Grass1);
    }

    #[test]
    fn island_found_after_main_landmass_is_drowned() {
        let mut ws = uniform_workspace(32, 32, Terrain::Grass1, 1);
        let g = ws.geometry;
        let island = g.pos(20, 20);
        for index in 0..ws.spiral.ring_range(4).end {
            let pos = ws.pos_add_spirally(island, index);
            ws.set_triangle(Triangle::up(pos), Terrain::Water0);
            ws.set_triangle(Triangle::down(pos), Terrain::Water0);
        }
        ws.set_triangle(Triangle::up(island), Terrain::Grass1);
        assert_eq!(remove_islands(&mut ws), 3);
        assert_eq!(ws.triangle(Triangle::up(island)), Terrain::Water0);
    }

    #[test]
    fn all_water_map_is_left_alone() {
        let mut ws = uniform_workspace(16, 16, Terrain::Water0, 1);
        assert_eq!(remove_islands(&mut ws), 0);
    }
}
