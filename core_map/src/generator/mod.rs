//! Deterministic landscape generation.
//!
//! Stages run strictly in the order of [`ClassicMapGenerator::generate`] and
//! share one random stream through [`Workspace`]. Reordering stages, or the
//! draws inside them, changes the map produced for every seed.

pub mod heights;
pub mod islands;
pub mod objects;
pub mod terrain;
pub mod water;

use serde::Serialize;

use crate::{
    config::{HeightGenerator, MapGenConfig},
    geometry::{MapGeometry, MapPos, Triangle},
    landscape::LandscapeTile,
    random::MapRandom,
    spiral::SpiralPattern,
    terrain::Terrain,
};

/// Attempts made to find a cluster center before the cluster is skipped.
pub const CLUSTER_CENTER_TRIES: usize = 100;

/// Mutable state shared by every stage of one generation run.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub geometry: MapGeometry,
    pub spiral: SpiralPattern,
    pub random: MapRandom,
    /// Working heights. Wider than the final 0..=31 range: synthesis runs on
    /// 0..=250 and water carving uses 252..=255 as markers.
    pub heights: Vec<i32>,
    pub tiles: Vec<LandscapeTile>,
    pub config: MapGenConfig,
}

impl Workspace {
    pub fn new(geometry: MapGeometry, config: &MapGenConfig) -> Self {
        let tiles = geometry.tile_count();
        Self {
            geometry,
            spiral: SpiralPattern::new(),
            random: config.random(),
            heights: vec![0; tiles],
            tiles: vec![LandscapeTile::default(); tiles],
            config: config.clone(),
        }
    }

    #[inline]
    pub fn next(&mut self) -> i32 {
        self.random.next_i32()
    }

    #[inline]
    pub fn height(&self, pos: MapPos) -> i32 {
        self.heights[pos.index()]
    }

    #[inline]
    pub fn set_height(&mut self, pos: MapPos, height: i32) {
        self.heights[pos.index()] = height;
    }

    #[inline]
    pub fn tile(&self, pos: MapPos) -> &LandscapeTile {
        &self.tiles[pos.index()]
    }

    #[inline]
    pub fn tile_mut(&mut self, pos: MapPos) -> &mut LandscapeTile {
        &mut self.tiles[pos.index()]
    }

    #[inline]
    pub fn triangle(&self, triangle: Triangle) -> Terrain {
        self.tile(triangle.pos).terrain(triangle.half)
    }

    #[inline]
    pub fn set_triangle(&mut self, triangle: Triangle, terrain: Terrain) {
        self.tile_mut(triangle.pos).set_terrain(triangle.half, terrain);
    }

    /// Uniform random position: column drawn first, then row.
    pub fn rnd_pos(&mut self) -> MapPos {
        let col = self.next() as u32 & self.geometry.col_mask();
        let row = self.next() as u32 & self.geometry.row_mask();
        self.geometry.pos(col, row)
    }

    pub fn pos_add_spirally(&self, pos: MapPos, index: usize) -> MapPos {
        self.spiral.pos_add_spirally(&self.geometry, pos, index)
    }

    /// Whether all six triangles around `pos` lie in `min..=max`.
    pub fn hexagon_in_range(&self, pos: MapPos, min: Terrain, max: Terrain) -> bool {
        self.geometry
            .triangles_around(pos)
            .into_iter()
            .all(|tri| self.triangle(tri).in_range(min, max))
    }

    /// `hexagon_in_range` for `pos` and each of its neighbours.
    pub fn large_hexagon_in_range(&self, pos: MapPos, min: Terrain, max: Terrain) -> bool {
        self.hexagon_in_range(pos, min, max)
            && self
                .geometry
                .neighbors(pos)
                .into_iter()
                .all(|n| self.hexagon_in_range(n, min, max))
    }

    pub fn is_all_water(&self, pos: MapPos) -> bool {
        self.hexagon_in_range(pos, Terrain::Water0, Terrain::Water3)
    }

    /// Up to [`CLUSTER_CENTER_TRIES`] random positions whose hexagon lies in
    /// `min..=max`; `None` when every try misses.
    pub fn find_cluster_center(&mut self, min: Terrain, max: Terrain) -> Option<MapPos> {
        for _ in 0..CLUSTER_CENTER_TRIES {
            let pos = self.rnd_pos();
            if self.hexagon_in_range(pos, min, max) {
                return Some(pos);
            }
        }
        None
    }
}

/// Counters gathered while generating, logged once at the end.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GenerationReport {
    pub clamp_passes: u32,
    pub lakes: u32,
    pub islands_drowned: u32,
    pub deserts: u32,
    pub deserts_skipped: u32,
    pub object_clusters: u32,
    pub object_clusters_skipped: u32,
    pub objects_placed: u32,
    pub mineral_clusters: u32,
    pub mineral_clusters_skipped: u32,
    pub objects_cleared: u32,
}

/// A complete landscape synthesis strategy.
pub trait MapGenerator {
    /// Stable identifier recorded in snapshots.
    fn name(&self) -> &'static str;

    /// Fill `workspace.tiles` for every position.
    fn generate(&self, workspace: &mut Workspace) -> GenerationReport;
}

/// The standard pipeline: fractal heights, lakes, terrain bands, island
/// pruning, deserts, vegetation, minerals.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassicMapGenerator;

impl MapGenerator for ClassicMapGenerator {
    fn name(&self) -> &'static str {
        "classic"
    }

    fn generate(&self, ws: &mut Workspace) -> GenerationReport {
        let mut report = GenerationReport::default();

        heights::init_heights_squares(ws);
        let roughness = heights::Roughness::from_draw(ws.next(), ws.config.preserve_legacy_quirks);
        match ws.config.height_generator {
            HeightGenerator::Midpoints => heights::init_heights_midpoints(ws, roughness),
            HeightGenerator::DiamondSquare => heights::init_heights_diamond_square(ws, roughness),
        }
        report.clamp_passes = heights::clamp_heights(ws);

        report.lakes = water::create_water_bodies(ws);
        heights::heights_rebase(ws);
        terrain::init_types(ws);
        report.islands_drowned = islands::remove_islands(ws);
        heights::heights_rescale(ws);

        terrain::init_sea_and_shore(ws);
        let (deserts, deserts_skipped) = terrain::create_deserts(ws);
        report.deserts = deserts;
        report.deserts_skipped = deserts_skipped;

        objects::create_objects(ws, &mut report);
        objects::create_minerals(ws, &mut report);
        report.objects_cleared = objects::clean_up(ws);

        tracing::info!(
            target: "hexmap::mapgen",
            generator = self.name(),
            cols = ws.geometry.cols(),
            rows = ws.geometry.rows(),
            seed = ws.config.seed,
            lakes = report.lakes,
            islands_drowned = report.islands_drowned,
            deserts = report.deserts,
            objects = report.objects_placed,
            minerals = report.mineral_clusters,
            "mapgen.complete"
        );
        report
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Workspace over a small grid with every triangle set to `terrain`.
    pub fn uniform_workspace(cols: u32, rows: u32, terrain: Terrain, seed: u64) -> Workspace {
        let geometry = MapGeometry::from_dimensions(cols, rows).expect("grid");
        let mut ws = Workspace::new(geometry, &MapGenConfig::new(3, seed));
        for tile in ws.tiles.iter_mut() {
            tile.terrain_up = terrain;
            tile.terrain_down = terrain;
        }
        ws
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::uniform_workspace;
    use super::*;

    #[test]
    fn random_positions_stay_on_grid() {
        let mut ws = uniform_workspace(32, 16, Terrain::Grass1, 11);
        for _ in 0..200 {
            let pos = ws.rnd_pos();
            assert!(pos.index() < ws.geometry.tile_count());
        }
    }

    #[test]
    fn hexagon_checks_see_single_foreign_triangle() {
        let mut ws = uniform_workspace(16, 16, Terrain::Grass1, 1);
        let center = ws.geometry.pos(8, 8);
        assert!(ws.large_hexagon_in_range(center, Terrain::Grass1, Terrain::Grass2));

        let next_door = ws.geometry.pos(9, 9);
        ws.set_triangle(Triangle::up(next_door), Terrain::Snow0);
        assert!(ws.hexagon_in_range(center, Terrain::Grass1, Terrain::Grass2));
        assert!(!ws.large_hexagon_in_range(center, Terrain::Grass1, Terrain::Grass2));
    }

    #[test]
    fn cluster_center_gives_up_after_bounded_tries() {
        let mut ws = uniform_workspace(16, 16, Terrain::Grass1, 5);
        let before = ws.random;
        assert_eq!(ws.find_cluster_center(Terrain::Tundra0, Terrain::Tundra2), None);
        let mut replay = before;
        for _ in 0..CLUSTER_CENTER_TRIES * 2 {
            replay.next_word();
        }
        assert_eq!(ws.random, replay);
    }
}
