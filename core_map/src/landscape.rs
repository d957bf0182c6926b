//! Per-position records: the generated landscape and the gameplay overlay.

use bitflags::bitflags;
use map_schema::{TilePayload, TileRecord};
use serde::{Deserialize, Serialize};

use crate::{
    geometry::{Direction, Half},
    objects::MapObject,
    terrain::{Mineral, Terrain},
};

/// Highest height after generation rescales the field.
pub const MAX_HEIGHT: u8 = 31;
/// Largest amount the persisted layout can hold.
pub const MAX_RESOURCE_AMOUNT: u8 = 31;
/// Owners are stored in two bits.
pub const MAX_PLAYERS: u8 = 4;

pub type PlayerId = u8;

/// Landscape of one vertex: its height, the two triangles hanging below it
/// and whatever sits on it. `terrain_up` is the triangle `pos, down,
/// down-right`; `terrain_down` is `pos, right, down-right`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LandscapeTile {
    pub height: u8,
    pub terrain_up: Terrain,
    pub terrain_down: Terrain,
    pub mineral: Mineral,
    /// Deposit size, or the fish count on water.
    pub resource_amount: u8,
    pub object: MapObject,
}

impl LandscapeTile {
    pub fn terrain(&self, half: Half) -> Terrain {
        match half {
            Half::Up => self.terrain_up,
            Half::Down => self.terrain_down,
        }
    }

    pub fn set_terrain(&mut self, half: Half, terrain: Terrain) {
        match half {
            Half::Up => self.terrain_up = terrain,
            Half::Down => self.terrain_down = terrain,
        }
    }
}

bitflags! {
    /// Road connectivity, one bit per direction.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct Paths: u8 {
        const RIGHT = 1 << 0;
        const DOWN_RIGHT = 1 << 1;
        const DOWN = 1 << 2;
        const LEFT = 1 << 3;
        const UP_LEFT = 1 << 4;
        const UP = 1 << 5;
    }
}

impl Paths {
    pub fn from_direction(dir: Direction) -> Paths {
        Paths::from_bits_truncate(1 << dir.index())
    }

    pub fn has(self, dir: Direction) -> bool {
        self.contains(Paths::from_direction(dir))
    }

    pub fn directions(self) -> impl Iterator<Item = Direction> {
        Direction::ALL.into_iter().filter(move |dir| self.has(*dir))
    }
}

/// Mutable gameplay state layered over the landscape after generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GameTile {
    pub paths: Paths,
    pub owner: Option<PlayerId>,
    /// Flag/building table index, meaningful only under such objects.
    pub object_index: u16,
    pub serf_index: u16,
    pub idle_serf: bool,
}

/// Pack both records into the persisted layout.
pub fn to_record(landscape: &LandscapeTile, game: &GameTile) -> TileRecord {
    let payload = if landscape.object.uses_index() {
        TilePayload::ObjectIndex(game.object_index)
    } else {
        TilePayload::Deposit {
            mineral: landscape.mineral.code(),
            amount: landscape.resource_amount,
        }
    };
    TileRecord {
        paths: game.paths.bits(),
        height: landscape.height,
        owner: game.owner,
        terrain_up: landscape.terrain_up.code(),
        terrain_down: landscape.terrain_down.code(),
        object: landscape.object.code(),
        idle_serf: game.idle_serf,
        payload,
        serf_index: game.serf_index,
    }
}

/// Why a persisted record could not be turned back into typed tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFault {
    Terrain(u8),
    Object(u8),
    Mineral(u8),
}

pub fn from_record(record: &TileRecord) -> Result<(LandscapeTile, GameTile), RecordFault> {
    let terrain_up =
        Terrain::from_code(record.terrain_up).ok_or(RecordFault::Terrain(record.terrain_up))?;
    let terrain_down =
        Terrain::from_code(record.terrain_down).ok_or(RecordFault::Terrain(record.terrain_down))?;
    let object = MapObject::from_code(record.object).ok_or(RecordFault::Object(record.object))?;
    let (mineral, resource_amount, object_index) = match record.payload {
        TilePayload::Deposit { mineral, amount } => (
            Mineral::from_code(mineral).ok_or(RecordFault::Mineral(mineral))?,
            amount,
            0,
        ),
        TilePayload::ObjectIndex(index) => (Mineral::None, 0, index),
    };
    Ok((
        LandscapeTile {
            height: record.height,
            terrain_up,
            terrain_down,
            mineral,
            resource_amount,
            object,
        },
        GameTile {
            paths: Paths::from_bits_truncate(record.paths),
            owner: record.owner,
            object_index,
            serf_index: record.serf_index,
            idle_serf: record.idle_serf,
        },
    ))
}
