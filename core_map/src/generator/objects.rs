//! Vegetation, rock and mineral clusters.

use crate::{
    geometry::{Direction, MapPos},
    objects::{MapObject, Space},
    terrain::{Mineral, Terrain},
};

use super::{GenerationReport, Workspace};

/// One kind of object cluster. `per_region` clusters are attempted for each
/// 32x32 region of the map.
struct ObjectCluster {
    per_region: usize,
    objects: usize,
    /// Bounds the spiral index drawn for each object, and so the radius.
    spiral_mask: i32,
    min: Terrain,
    max: Terrain,
    pick: fn(i32) -> MapObject,
}

fn tree(draw: i32) -> MapObject {
    MapObject::Tree((draw & 7) as u8)
}

fn pine(draw: i32) -> MapObject {
    MapObject::Pine((draw & 7) as u8)
}

fn tree_or_pine(draw: i32) -> MapObject {
    if draw & 8 == 0 {
        tree(draw)
    } else {
        pine(draw)
    }
}

fn mixed_vegetation(draw: i32) -> MapObject {
    match (draw >> 3) & 3 {
        0 | 1 => tree(draw),
        2 => pine(draw),
        _ => MapObject::Palm((draw & 3) as u8),
    }
}

fn stone(draw: i32) -> MapObject {
    MapObject::Stone((draw & 7) as u8)
}

#[rustfmt::skip]
const OBJECT_CLUSTERS: [ObjectCluster; 16] = [
    ObjectCluster { per_region: 8, objects: 16, spiral_mask: 0x7f, min: Terrain::Grass1, max: Terrain::Grass2, pick: tree_or_pine },
    ObjectCluster { per_region: 1, objects: 45, spiral_mask: 0x3f, min: Terrain::Grass1, max: Terrain::Grass2, pick: tree },
    ObjectCluster { per_region: 1, objects: 30, spiral_mask: 0x3f, min: Terrain::Grass0, max: Terrain::Grass2, pick: pine },
    ObjectCluster { per_region: 1, objects: 20, spiral_mask: 0x7f, min: Terrain::Grass0, max: Terrain::Grass2, pick: mixed_vegetation },
    ObjectCluster { per_region: 1, objects: 40, spiral_mask: 0x3f, min: Terrain::Grass1, max: Terrain::Grass2, pick: stone },
    ObjectCluster { per_region: 1, objects: 15, spiral_mask: 0xff, min: Terrain::Grass1, max: Terrain::Tundra2, pick: stone },
    ObjectCluster { per_region: 1, objects: 2, spiral_mask: 0xff, min: Terrain::Grass1, max: Terrain::Grass2, pick: |_| MapObject::DeadTree },
    ObjectCluster { per_region: 1, objects: 6, spiral_mask: 0xff, min: Terrain::Grass1, max: Terrain::Grass2, pick: |d| MapObject::Sandstone((d & 1) as u8) },
    ObjectCluster { per_region: 1, objects: 50, spiral_mask: 0x7f, min: Terrain::Water2, max: Terrain::Water3, pick: |d| MapObject::WaterTree((d & 3) as u8) },
    ObjectCluster { per_region: 1, objects: 5, spiral_mask: 0xff, min: Terrain::Grass1, max: Terrain::Grass2, pick: |_| MapObject::Stub },
    ObjectCluster { per_region: 1, objects: 10, spiral_mask: 0xff, min: Terrain::Grass1, max: Terrain::Grass2, pick: |_| MapObject::Boulder },
    ObjectCluster { per_region: 1, objects: 2, spiral_mask: 0xf, min: Terrain::Desert2, max: Terrain::Desert2, pick: |d| MapObject::Cadaver((d & 1) as u8) },
    ObjectCluster { per_region: 1, objects: 6, spiral_mask: 0x7f, min: Terrain::Desert0, max: Terrain::Desert2, pick: |d| MapObject::Cactus((d & 1) as u8) },
    ObjectCluster { per_region: 1, objects: 8, spiral_mask: 0x7f, min: Terrain::Tundra0, max: Terrain::Snow0, pick: |_| MapObject::Boulder },
    ObjectCluster { per_region: 1, objects: 6, spiral_mask: 0x3f, min: Terrain::Desert2, max: Terrain::Desert2, pick: |d| MapObject::Palm((d & 3) as u8) },
    ObjectCluster { per_region: 1, objects: 8, spiral_mask: 0x7f, min: Terrain::Water1, max: Terrain::Water3, pick: |d| MapObject::WaterStone((d & 1) as u8) },
];

/// `(mineral, clusters per region)` in placement order.
const MINERAL_CLUSTERS: [(Mineral, usize); 4] = [
    (Mineral::Coal, 9),
    (Mineral::Iron, 4),
    (Mineral::Gold, 2),
    (Mineral::Stone, 2),
];

/// Place `count` clusters of `objects` each. Returns `(placed, skipped,
/// objects)`.
fn random_object_clusters(
    ws: &mut Workspace,
    count: usize,
    cluster: &ObjectCluster,
) -> (u32, u32, u32) {
    let (mut placed, mut skipped, mut objects) = (0, 0, 0);
    for _ in 0..count {
        let Some(center) = ws.find_cluster_center(cluster.min, cluster.max) else {
            skipped += 1;
            continue;
        };
        placed += 1;
        for _ in 0..cluster.objects {
            let index = (ws.next() & cluster.spiral_mask) as usize;
            let pos = ws.pos_add_spirally(center, index);
            if ws.hexagon_in_range(pos, cluster.min, cluster.max) && ws.tile(pos).object.is_none() {
                let object = (cluster.pick)(ws.next());
                ws.tile_mut(pos).object = object;
                objects += 1;
            }
        }
    }
    (placed, skipped, objects)
}

pub fn create_objects(ws: &mut Workspace, report: &mut GenerationReport) {
    let regions = ws.geometry.region_count();
    for cluster in OBJECT_CLUSTERS.iter() {
        let (placed, skipped, objects) =
            random_object_clusters(ws, cluster.per_region * regions, cluster);
        report.object_clusters += placed;
        report.object_clusters_skipped += skipped;
        report.objects_placed += objects;
    }
    tracing::debug!(
        target: "hexmap::mapgen",
        clusters = report.object_clusters,
        skipped = report.object_clusters_skipped,
        objects = report.objects_placed,
        "mapgen.objects.scattered"
    );
}

/// Lay concentric rings of `mineral` around `center`: the center ring gets
/// the richest deposit, each ring outwards four units less. A vertex is only
/// overwritten by a richer deposit. Returns the number of vertices set.
pub fn create_mineral_cluster_at(
    ws: &mut Workspace,
    center: MapPos,
    rings: usize,
    mineral: Mineral,
    min: Terrain,
    max: Terrain,
) -> u32 {
    let mut set = 0;
    for ring in 0..rings {
        let amount = (4 * (rings - ring)) as u8;
        for index in ws.spiral.ring_range(ring) {
            let pos = ws.pos_add_spirally(center, index);
            if !ws.hexagon_in_range(pos, min, max) {
                continue;
            }
            let tile = ws.tile_mut(pos);
            let existing = if tile.mineral == Mineral::None {
                0
            } else {
                tile.resource_amount
            };
            if amount > existing {
                tile.mineral = mineral;
                tile.resource_amount = amount;
                set += 1;
            }
        }
    }
    set
}

pub fn create_minerals(ws: &mut Workspace, report: &mut GenerationReport) {
    let regions = ws.geometry.region_count();
    for (mineral, per_region) in MINERAL_CLUSTERS {
        for _ in 0..per_region * regions {
            let Some(center) = ws.find_cluster_center(Terrain::Tundra0, Terrain::Tundra2) else {
                report.mineral_clusters_skipped += 1;
                continue;
            };
            let rings = 2 + (ws.next() & 3) as usize;
            create_mineral_cluster_at(
                ws,
                center,
                rings,
                mineral,
                Terrain::Tundra0,
                Terrain::Tundra2,
            );
            report.mineral_clusters += 1;
        }
    }
    tracing::debug!(
        target: "hexmap::mapgen",
        clusters = report.mineral_clusters,
        skipped = report.mineral_clusters_skipped,
        "mapgen.minerals.placed"
    );
}

/// Neighbours checked by [`clean_up`]. Each pair of adjacent vertices is
/// seen once, from the later one in position order.
const CLEAN_UP_DIRECTIONS: [Direction; 3] = [Direction::Left, Direction::UpLeft, Direction::Up];

/// Remove impassable objects whose left, upper-left or upper neighbour is
/// open water or another impassable object, so no two obstacles touch and
/// none sits against a lake edge on those sides. Water obstacles fall under
/// the same rule; ones with land on all three sides stay. Returns the number
/// removed.
pub fn clean_up(ws: &mut Workspace) -> u32 {
    let mut removed = 0;
    for pos in ws.geometry.positions() {
        if ws.tile(pos).object.space() != Space::Impassable {
            continue;
        }
        let blocked = CLEAN_UP_DIRECTIONS.into_iter().any(|dir| {
            let n = ws.geometry.move_dir(pos, dir);
            ws.is_all_water(n) || ws.tile(n).object.space() == Space::Impassable
        });
        if blocked {
            ws.tile_mut(pos).object = MapObject::None;
            removed += 1;
        }
    }
    tracing::debug!(target: "hexmap::mapgen", removed, "mapgen.objects.cleaned");
    removed
}
