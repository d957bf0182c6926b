//! Lake and sea carving.
//!
//! Bodies grow ring by ring from their lowest vertex. While a body grows its
//! vertices carry marker heights above the synthesis range; once it stops
//! they are lowered to a second pair of markers that later bodies treat as
//! high ground, so two bodies never merge.

use crate::geometry::{Direction, MapPos};

use super::Workspace;

const WATER: i32 = 255;
const SHORE: i32 = 254;
const SEALED_WATER: i32 = 253;
const SEALED_SHORE: i32 = 252;

/// Mark `pos` as water if it and all its neighbours are low enough.
///
/// A ring vertex must already be shore of the growing body; the seed vertex
/// of a body only needs to be at or below the water level.
fn expand_level_area(ws: &mut Workspace, pos: MapPos, limit: i32, from_body: bool) -> bool {
    let height = ws.height(pos);
    let eligible = if from_body {
        height == SHORE
    } else {
        height <= limit
    };
    if !eligible {
        return false;
    }
    let neighbors = ws.geometry.neighbors(pos);
    if neighbors.iter().any(|&n| {
        let h = ws.height(n);
        h < SHORE && h > limit
    }) {
        return false;
    }
    ws.set_height(pos, WATER);
    for n in neighbors {
        if ws.height(n) != WATER {
            ws.set_height(n, SHORE);
        }
    }
    true
}

/// Vertices of the hex ring at `radius` around `center`, starting due right
/// and walking clockwise.
fn ring(ws: &Workspace, center: MapPos, radius: i32) -> Vec<MapPos> {
    if radius == 0 {
        return vec![center];
    }
    let mut pos = ws.geometry.move_n(center, Direction::Right, radius);
    let mut out = Vec::with_capacity(6 * radius as usize);
    for turn in 0..6 {
        let dir = Direction::Down.turn(turn);
        for _ in 0..radius {
            out.push(pos);
            pos = ws.geometry.move_dir(pos, dir);
        }
    }
    out
}

/// Grow one body from `pos`. Returns the number of water vertices carved,
/// zero when `pos` cannot seed a body.
pub fn expand_water_body(ws: &mut Workspace, pos: MapPos) -> u32 {
    let limit = ws.config.water_level;
    let max_area = ws.config.max_lake_area;
    if !expand_level_area(ws, pos, limit, false) {
        return 0;
    }
    let mut carved = 1;
    for radius in 1..=max_area {
        let mut grew = false;
        for vertex in ring(ws, pos, radius) {
            if expand_level_area(ws, vertex, limit, true) {
                carved += 1;
                grew = true;
            }
        }
        if !grew {
            break;
        }
    }
    for radius in 0..=max_area + 1 {
        for vertex in ring(ws, pos, radius) {
            match ws.height(vertex) {
                WATER => ws.set_height(vertex, SEALED_WATER),
                SHORE => ws.set_height(vertex, SEALED_SHORE),
                _ => {}
            }
        }
    }
    carved
}

/// Carve every body, then turn markers back into heights around the water
/// level. Water vertices get their initial fish. Returns the number of
/// bodies carved.
pub fn create_water_bodies(ws: &mut Workspace) -> u32 {
    let level = ws.config.water_level;
    let mut lakes = 0;
    let mut water_vertices = 0;
    for h in 0..=level {
        for pos in ws.geometry.positions() {
            if ws.height(pos) == h {
                let carved = expand_water_body(ws, pos);
                if carved > 0 {
                    lakes += 1;
                    water_vertices += carved;
                }
            }
        }
    }

    for pos in ws.geometry.positions() {
        match ws.height(pos) {
            SEALED_SHORE => ws.set_height(pos, level),
            SEALED_WATER => {
                ws.set_height(pos, level - 1);
                let fish = (ws.next() & 7) as u8;
                ws.tile_mut(pos).resource_amount = fish;
            }
            h if h <= level => ws.set_height(pos, level + 1),
            _ => {}
        }
    }

    tracing::debug!(
        target: "hexmap::mapgen",
        lakes,
        water_vertices,
        "mapgen.water.carved"
    );
    lakes
}
