//! Hex world model and deterministic terrain generator.
//!
//! A [`Map`] is a toroidal grid of vertices, each carrying two triangular
//! half-tiles of terrain. [`Map::generate`] builds the landscape from a
//! seed; the same seed and size always produce the same tiles, which save
//! files and multiplayer sessions depend on.

pub mod app;
pub mod config;
pub mod generator;
pub mod geometry;
pub mod handlers;
pub mod hashing;
pub mod landscape;
pub mod map;
pub mod objects;
pub mod random;
pub mod search;
pub mod spiral;
pub mod stats;
pub mod terrain;

pub use app::{build_headless_app, generate_world_map, WorldMap};
pub use config::{
    load_map_presets_from_env, HeightGenerator, MapConfigError, MapGenConfig, MapPreset,
    MapPresets, MapPresetsError,
};
pub use generator::{ClassicMapGenerator, GenerationReport, MapGenerator, Workspace};
pub use geometry::{Direction, GeometryError, Half, MapGeometry, MapPos, Triangle};
pub use handlers::{ChannelChangeHandler, HandlerId, MapChange, MapChangeHandler};
pub use landscape::{GameTile, LandscapeTile, Paths, PlayerId};
pub use map::{Map, MapError};
pub use objects::{MapObject, Space};
pub use random::{MapRandom, SeedError};
pub use spiral::SpiralPattern;
pub use stats::MapStats;
pub use terrain::{Mineral, Terrain};
