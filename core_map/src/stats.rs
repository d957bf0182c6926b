use rayon::prelude::*;
use serde::Serialize;

use crate::{
    map::Map,
    terrain::{Mineral, Terrain},
};

/// Aggregate counts over a finished map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MapStats {
    /// Triangle count per terrain band, indexed by band code.
    pub band_triangles: [u32; 16],
    /// Vertices whose six triangles are all water.
    pub water_vertices: u32,
    pub land_vertices: u32,
    /// Summed deposit amount per mineral code; index 0 is unused.
    pub mineral_amounts: [u32; 5],
    pub deposit_vertices: u32,
    pub objects: u32,
}

impl MapStats {
    fn merge(mut self, other: MapStats) -> MapStats {
        for (a, b) in self.band_triangles.iter_mut().zip(other.band_triangles) {
            *a += b;
        }
        for (a, b) in self.mineral_amounts.iter_mut().zip(other.mineral_amounts) {
            *a += b;
        }
        self.water_vertices += other.water_vertices;
        self.land_vertices += other.land_vertices;
        self.deposit_vertices += other.deposit_vertices;
        self.objects += other.objects;
        self
    }

    pub fn band(&self, terrain: Terrain) -> u32 {
        self.band_triangles[terrain.code() as usize]
    }

    pub fn mineral(&self, mineral: Mineral) -> u32 {
        self.mineral_amounts[mineral.code() as usize]
    }

    /// Share of vertices that are not fully submerged.
    pub fn land_ratio(&self) -> f32 {
        let total = self.water_vertices + self.land_vertices;
        if total == 0 {
            0.0
        } else {
            self.land_vertices as f32 / total as f32
        }
    }
}

impl Map {
    /// Read-only tally, computed in parallel over positions.
    pub fn stats(&self) -> MapStats {
        let geometry = *self.geometry();
        (0..geometry.tile_count())
            .into_par_iter()
            .fold(MapStats::default, |mut stats, index| {
                let pos = geometry.pos_from_index(index);
                let tile = self.tile(pos);
                stats.band_triangles[tile.terrain_up.code() as usize] += 1;
                stats.band_triangles[tile.terrain_down.code() as usize] += 1;
                if self.is_in_water(pos) {
                    stats.water_vertices += 1;
                } else {
                    stats.land_vertices += 1;
                }
                if tile.mineral != Mineral::None {
                    stats.mineral_amounts[tile.mineral.code() as usize] +=
                        u32::from(tile.resource_amount);
                    stats.deposit_vertices += 1;
                }
                if !tile.object.is_none() {
                    stats.objects += 1;
                }
                stats
            })
            .reduce(MapStats::default, MapStats::merge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{geometry::MapGeometry, landscape::LandscapeTile, objects::MapObject};

    #[test]
    fn counts_every_triangle_once() {
        let geometry = MapGeometry::from_dimensions(16, 8).expect("grid");
        let tile = LandscapeTile {
            terrain_up: Terrain::Tundra0,
            terrain_down: Terrain::Snow1,
            mineral: Mineral::Gold,
            resource_amount: 3,
            object: MapObject::Boulder,
            ..LandscapeTile::default()
        };
        let map = Map::from_landscape(geometry, vec![tile; 128]).expect("map");
        let stats = map.stats();
        assert_eq!(stats.band(Terrain::Tundra0), 128);
        assert_eq!(stats.band(Terrain::Snow1), 128);
        assert_eq!(stats.band_triangles.iter().sum::<u32>(), 256);
        assert_eq!(stats.mineral(Mineral::Gold), 384);
        assert_eq!(stats.deposit_vertices, 128);
        assert_eq!(stats.objects, 128);
        assert_eq!(stats.water_vertices, 0);
        assert_eq!(stats.land_ratio(), 1.0);
    }
}
