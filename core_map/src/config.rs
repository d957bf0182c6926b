use std::{
    collections::HashMap,
    env, fs, io,
    path::{Path, PathBuf},
    sync::Arc,
};

use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::random::MapRandom;

pub const BUILTIN_MAP_PRESETS: &str = include_str!("data/map_presets.json");

pub const DEFAULT_MAP_SIZE: u32 = 3;
pub const DEFAULT_WATER_LEVEL: i32 = 20;
pub const DEFAULT_MAX_LAKE_AREA: i32 = 14;
pub const DEFAULT_TERRAIN_SPIKINESS: i32 = 0x9999;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeightGenerator {
    #[default]
    Midpoints,
    DiamondSquare,
}

/// Parameters of one generation run.
#[derive(Resource, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapGenConfig {
    pub size: u32,
    pub seed: u64,
    pub height_generator: HeightGenerator,
    pub water_level: i32,
    /// Ring count a single lake may grow before it is sealed.
    pub max_lake_area: i32,
    /// Fraction of the roughness, in 1/65536, subtracted from each offset.
    pub terrain_spikiness: i32,
    /// Reuse upper random bits in the first subdivision level, as old seeds
    /// expect.
    pub preserve_legacy_quirks: bool,
    /// Drown everything outside the main landmass instead of only the
    /// fragments the first flood fills never touched.
    pub exhaustive_island_pruning: bool,
}

impl Default for MapGenConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_MAP_SIZE,
            seed: 0x3f3f_1357_2468,
            height_generator: HeightGenerator::Midpoints,
            water_level: DEFAULT_WATER_LEVEL,
            max_lake_area: DEFAULT_MAX_LAKE_AREA,
            terrain_spikiness: DEFAULT_TERRAIN_SPIKINESS,
            preserve_legacy_quirks: true,
            exhaustive_island_pruning: false,
        }
    }
}

impl MapGenConfig {
    pub fn new(size: u32, seed: u64) -> Self {
        Self {
            size,
            seed,
            ..Self::default()
        }
    }

    /// Same config with the seed taken from a seed string or phrase.
    pub fn with_seed_phrase(mut self, phrase: &str) -> Self {
        self.seed = MapRandom::from_phrase(phrase).seed();
        self
    }

    pub fn random(&self) -> MapRandom {
        MapRandom::new(self.seed)
    }

    pub fn validate(&self) -> Result<(), MapConfigError> {
        if !(1..=249).contains(&self.water_level) {
            return Err(MapConfigError::WaterLevel(self.water_level));
        }
        if self.max_lake_area <= 0 {
            return Err(MapConfigError::LakeArea(self.max_lake_area));
        }
        if !(0..=0xffff).contains(&self.terrain_spikiness) {
            return Err(MapConfigError::Spikiness(self.terrain_spikiness));
        }
        Ok(())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MapConfigError {
    #[error("water level {0} outside 1..=249")]
    WaterLevel(i32),
    #[error("max lake area must be positive, got {0}")]
    LakeArea(i32),
    #[error("terrain spikiness {0} outside 0..=65535")]
    Spikiness(i32),
}

/// Named generator settings; fields left out keep their defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct MapPreset {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub height_generator: HeightGenerator,
    #[serde(default = "default_water_level")]
    pub water_level: i32,
    #[serde(default = "default_max_lake_area")]
    pub max_lake_area: i32,
    #[serde(default = "default_terrain_spikiness")]
    pub terrain_spikiness: i32,
    #[serde(default = "default_true")]
    pub preserve_legacy_quirks: bool,
    #[serde(default)]
    pub exhaustive_island_pruning: bool,
}

const fn default_water_level() -> i32 {
    DEFAULT_WATER_LEVEL
}

const fn default_max_lake_area() -> i32 {
    DEFAULT_MAX_LAKE_AREA
}

const fn default_terrain_spikiness() -> i32 {
    DEFAULT_TERRAIN_SPIKINESS
}

const fn default_true() -> bool {
    true
}

impl MapPreset {
    pub fn config(&self, size: u32, seed: u64) -> MapGenConfig {
        MapGenConfig {
            size,
            seed,
            height_generator: self.height_generator,
            water_level: self.water_level,
            max_lake_area: self.max_lake_area,
            terrain_spikiness: self.terrain_spikiness,
            preserve_legacy_quirks: self.preserve_legacy_quirks,
            exhaustive_island_pruning: self.exhaustive_island_pruning,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MapPresetsFile {
    pub presets: Vec<MapPreset>,
}

#[derive(Debug, Clone)]
pub struct MapPresets {
    by_id: HashMap<String, MapPreset>,
}

impl MapPresets {
    pub fn builtin() -> Arc<Self> {
        let presets =
            Self::from_json_str(BUILTIN_MAP_PRESETS).expect("builtin map presets should parse");
        Arc::new(presets)
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        let parsed: MapPresetsFile = serde_json::from_str(json)?;
        let by_id = parsed
            .presets
            .into_iter()
            .map(|preset| (preset.id.clone(), preset))
            .collect();
        Ok(Self { by_id })
    }

    pub fn from_file(path: &Path) -> Result<Self, MapPresetsError> {
        let contents = fs::read_to_string(path).map_err(|source| MapPresetsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_json_str(&contents)?)
    }

    pub fn get(&self, id: &str) -> Option<&MapPreset> {
        self.by_id.get(id)
    }

    /// Like [`MapPresets::get`], but a missing id is an error.
    pub fn resolve(&self, id: &str) -> Result<&MapPreset, MapPresetsError> {
        self.get(id)
            .ok_or_else(|| MapPresetsError::Unknown(id.to_string()))
    }

    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.by_id.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum MapPresetsError {
    #[error("failed to parse map presets: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read map presets from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("unknown map preset {0:?}")]
    Unknown(String),
}

/// Presets from `MAP_PRESETS_PATH` when set and readable, else the builtin set.
pub fn load_map_presets_from_env() -> (Arc<MapPresets>, Option<PathBuf>) {
    if let Some(path) = env::var("MAP_PRESETS_PATH").ok().map(PathBuf::from) {
        match MapPresets::from_file(&path) {
            Ok(presets) => {
                tracing::info!(
                    target: "hexmap::mapgen",
                    path = %path.display(),
                    "map_presets.loaded=file"
                );
                return (Arc::new(presets), Some(path));
            }
            Err(err) => {
                tracing::warn!(
                    target: "hexmap::mapgen",
                    path = %path.display(),
                    error = %err,
                    "map_presets.load_failed"
                );
            }
        }
    }
    tracing::info!(target: "hexmap::mapgen", "map_presets.loaded=builtin");
    (MapPresets::builtin(), None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_presets_parse_and_validate() {
        let presets = MapPresets::builtin();
        assert!(presets.len() >= 3);
        for id in presets.ids() {
            let preset = presets.get(id).expect("listed preset");
            preset.config(3, 1).validate().expect("builtin preset is valid");
        }
        let classic = presets.get("classic").expect("classic preset");
        assert_eq!(classic.config(5, 9), MapGenConfig::new(5, 9));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: MapGenConfig =
            serde_json::from_str(r#"{"size": 6, "height_generator": "diamond_square"}"#)
                .expect("parse");
        assert_eq!(config.size, 6);
        assert_eq!(config.height_generator, HeightGenerator::DiamondSquare);
        assert_eq!(config.water_level, DEFAULT_WATER_LEVEL);
        assert!(config.preserve_legacy_quirks);
    }

    #[test]
    fn validation_rejects_bad_levels() {
        let mut config = MapGenConfig::default();
        config.water_level = 0;
        assert_eq!(config.validate(), Err(MapConfigError::WaterLevel(0)));
        config.water_level = 250;
        assert_eq!(config.validate(), Err(MapConfigError::WaterLevel(250)));
        config.water_level = 20;
        config.max_lake_area = 0;
        assert_eq!(config.validate(), Err(MapConfigError::LakeArea(0)));
    }

    #[test]
    fn seed_phrase_accepts_seed_strings() {
        let config = MapGenConfig::default().with_seed_phrase("1111111111111128");
        assert_eq!(config.seed, 0o17);

        let config = MapGenConfig::default().with_seed_phrase("8667715887436237");
        assert_eq!(config.random().to_seed_string(), "8667715887436237");
    }

    #[test]
    fn unknown_preset_is_an_error() {
        let presets = MapPresets::builtin();
        assert_eq!(presets.resolve("classic").expect("classic").id, "classic");
        let err = presets.resolve("atlantis").unwrap_err();
        assert!(matches!(err, MapPresetsError::Unknown(ref id) if id == "atlantis"));
    }

    #[test]
    fn missing_preset_file_reports_path() {
        let err = MapPresets::from_file(Path::new("/nonexistent/presets.json")).unwrap_err();
        assert!(matches!(err, MapPresetsError::Read { .. }));
    }
}
