//! Persisted and wire representations of a generated hex map.
//!
//! The tile record layout is fixed: eight bytes per map position, in
//! row-major position order. Save files and multiplayer map transfer both
//! rely on it, so every field position below is part of the format.

use ahash::RandomState;
use serde::{Deserialize, Serialize};
use std::hash::{BuildHasher, Hasher};
use thiserror::Error;

/// Size in bytes of a single persisted tile.
pub const TILE_RECORD_SIZE: usize = 8;

/// Highest object code whose payload slot holds an object-table index
/// instead of a mineral deposit (flag, small building, large building, castle).
pub const LAST_INDEXED_OBJECT: u8 = 4;

const PATH_MASK: u8 = 0x3f;
const HEIGHT_MASK: u8 = 0x1f;
const OWNER_SHIFT: u8 = 5;
const OWNER_MASK: u8 = 0x03;
const OWNER_PRESENT: u8 = 0x80;
const OBJECT_MASK: u8 = 0x7f;
const IDLE_SERF_BIT: u8 = 0x80;
const MINERAL_SHIFT: u8 = 5;
const AMOUNT_MASK: u8 = 0x1f;

/// Whether an object code stores an object-table index in the payload slot.
pub fn object_uses_index(object: u8) -> bool {
    (1..=LAST_INDEXED_OBJECT).contains(&object)
}

/// Contents of the 16-bit payload slot of a tile record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TilePayload {
    /// Mineral type (3 bits) and resource amount (5 bits).
    Deposit { mineral: u8, amount: u8 },
    /// Index into the flag/building table.
    ObjectIndex(u16),
}

impl Default for TilePayload {
    fn default() -> Self {
        TilePayload::Deposit {
            mineral: 0,
            amount: 0,
        }
    }
}

/// Raw, untyped view of one persisted tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TileRecord {
    pub paths: u8,
    pub height: u8,
    pub owner: Option<u8>,
    pub terrain_up: u8,
    pub terrain_down: u8,
    pub object: u8,
    pub idle_serf: bool,
    pub payload: TilePayload,
    pub serf_index: u16,
}

impl TileRecord {
    pub fn to_bytes(&self) -> [u8; TILE_RECORD_SIZE] {
        let mut out = [0u8; TILE_RECORD_SIZE];
        out[0] = self.paths & PATH_MASK;
        out[1] = self.height & HEIGHT_MASK;
        if let Some(owner) = self.owner {
            out[1] |= OWNER_PRESENT | ((owner & OWNER_MASK) << OWNER_SHIFT);
        }
        out[2] = (self.terrain_up << 4) | (self.terrain_down & 0x0f);
        out[3] = self.object & OBJECT_MASK;
        if self.idle_serf {
            out[3] |= IDLE_SERF_BIT;
        }
        match self.payload {
            TilePayload::Deposit { mineral, amount } => {
                out[4] = (mineral << MINERAL_SHIFT) | (amount & AMOUNT_MASK);
            }
            TilePayload::ObjectIndex(index) => {
                out[4..6].copy_from_slice(&index.to_le_bytes());
            }
        }
        out[6..8].copy_from_slice(&self.serf_index.to_le_bytes());
        out
    }

    pub fn from_bytes(data: &[u8; TILE_RECORD_SIZE]) -> Self {
        let object = data[3] & OBJECT_MASK;
        let owner = if data[1] & OWNER_PRESENT != 0 {
            Some((data[1] >> OWNER_SHIFT) & OWNER_MASK)
        } else {
            None
        };
        let payload = if object_uses_index(object) {
            TilePayload::ObjectIndex(u16::from_le_bytes([data[4], data[5]]))
        } else {
            TilePayload::Deposit {
                mineral: data[4] >> MINERAL_SHIFT,
                amount: data[4] & AMOUNT_MASK,
            }
        };
        Self {
            paths: data[0] & PATH_MASK,
            height: data[1] & HEIGHT_MASK,
            owner,
            terrain_up: data[2] >> 4,
            terrain_down: data[2] & 0x0f,
            object,
            idle_serf: data[3] & IDLE_SERF_BIT != 0,
            payload,
            serf_index: u16::from_le_bytes([data[6], data[7]]),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("tile buffer holds {actual} bytes, expected {expected}")]
    SizeMismatch { expected: usize, actual: usize },
    #[error("snapshot dimensions {cols}x{rows} do not match {tiles} tiles")]
    DimensionMismatch { cols: u32, rows: u32, tiles: usize },
}

pub fn encode_tiles(records: &[TileRecord]) -> Vec<u8> {
    let mut out = Vec::with_capacity(records.len() * TILE_RECORD_SIZE);
    for record in records {
        out.extend_from_slice(&record.to_bytes());
    }
    out
}

pub fn decode_tiles(data: &[u8], tile_count: usize) -> Result<Vec<TileRecord>, SchemaError> {
    let expected = tile_count * TILE_RECORD_SIZE;
    if data.len() != expected {
        return Err(SchemaError::SizeMismatch {
            expected,
            actual: data.len(),
        });
    }
    Ok(data
        .chunks_exact(TILE_RECORD_SIZE)
        .map(|chunk| {
            let mut bytes = [0u8; TILE_RECORD_SIZE];
            bytes.copy_from_slice(chunk);
            TileRecord::from_bytes(&bytes)
        })
        .collect())
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SnapshotHeader {
    pub cols: u32,
    pub rows: u32,
    pub seed: u64,
    pub generator: String,
    pub hash: u64,
}

/// A whole map in persisted tile layout plus the parameters that produced it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MapSnapshot {
    pub header: SnapshotHeader,
    pub tiles: Vec<u8>,
}

impl MapSnapshot {
    pub fn new(cols: u32, rows: u32, seed: u64, generator: &str, records: &[TileRecord]) -> Self {
        Self {
            header: SnapshotHeader {
                cols,
                rows,
                seed,
                generator: generator.to_string(),
                hash: 0,
            },
            tiles: encode_tiles(records),
        }
    }

    pub fn finalize(mut self) -> Self {
        self.header.hash = hash_snapshot(&self);
        self
    }

    pub fn records(&self) -> Result<Vec<TileRecord>, SchemaError> {
        let tiles = (self.header.cols as usize) * (self.header.rows as usize);
        if tiles * TILE_RECORD_SIZE != self.tiles.len() {
            return Err(SchemaError::DimensionMismatch {
                cols: self.header.cols,
                rows: self.header.rows,
                tiles: self.tiles.len() / TILE_RECORD_SIZE,
            });
        }
        decode_tiles(&self.tiles, tiles)
    }
}

pub fn hash_snapshot(snapshot: &MapSnapshot) -> u64 {
    let mut clone = snapshot.clone();
    clone.header.hash = 0;
    let encoded = bincode::serialize(&clone).expect("snapshot serialization for hashing");
    let mut hasher = RandomState::with_seeds(0, 0, 0, 0).build_hasher();
    hasher.write(&encoded);
    hasher.finish()
}

pub fn encode_snapshot(snapshot: &MapSnapshot) -> bincode::Result<Vec<u8>> {
    bincode::serialize(snapshot)
}

pub fn decode_snapshot(data: &[u8]) -> bincode::Result<MapSnapshot> {
    bincode::deserialize(data)
}

pub fn encode_snapshot_json(snapshot: &MapSnapshot) -> serde_json::Result<String> {
    serde_json::to_string(snapshot)
}
