use serde::{Deserialize, Serialize};

/// Terrain band of one triangular half-tile. The order matters: generation
/// predicates test bands as inclusive ranges.
#[repr(u8)]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum Terrain {
    #[default]
    Water0 = 0,
    Water1 = 1,
    Water2 = 2,
    Water3 = 3,
    Grass0 = 4,
    Grass1 = 5,
    Grass2 = 6,
    Grass3 = 7,
    Desert0 = 8,
    Desert1 = 9,
    Desert2 = 10,
    Tundra0 = 11,
    Tundra1 = 12,
    Tundra2 = 13,
    Snow0 = 14,
    Snow1 = 15,
}

impl Terrain {
    pub const ALL: [Terrain; 16] = [
        Terrain::Water0,
        Terrain::Water1,
        Terrain::Water2,
        Terrain::Water3,
        Terrain::Grass0,
        Terrain::Grass1,
        Terrain::Grass2,
        Terrain::Grass3,
        Terrain::Desert0,
        Terrain::Desert1,
        Terrain::Desert2,
        Terrain::Tundra0,
        Terrain::Tundra1,
        Terrain::Tundra2,
        Terrain::Snow0,
        Terrain::Snow1,
    ];

    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Terrain> {
        Self::ALL.get(code as usize).copied()
    }

    #[inline]
    pub fn is_water(self) -> bool {
        self <= Terrain::Water3
    }

    #[inline]
    pub fn is_grass(self) -> bool {
        (Terrain::Grass0..=Terrain::Grass3).contains(&self)
    }

    #[inline]
    pub fn is_desert(self) -> bool {
        (Terrain::Desert0..=Terrain::Desert2).contains(&self)
    }

    /// Mountains: the only bands that carry mineral deposits.
    #[inline]
    pub fn is_tundra(self) -> bool {
        (Terrain::Tundra0..=Terrain::Tundra2).contains(&self)
    }

    #[inline]
    pub fn is_snow(self) -> bool {
        self >= Terrain::Snow0
    }

    #[inline]
    pub fn in_range(self, min: Terrain, max: Terrain) -> bool {
        min <= self && self <= max
    }

    /// Band for the sum of a triangle's three rebased corner heights.
    pub fn from_height_sum(sum: i32) -> Terrain {
        match sum {
            s if s < 3 => Terrain::Water0,
            s if s < 384 => Terrain::Grass1,
            s if s < 416 => Terrain::Grass2,
            s if s < 448 => Terrain::Tundra0,
            s if s < 480 => Terrain::Tundra1,
            s if s < 512 => Terrain::Tundra2,
            s if s < 544 => Terrain::Snow0,
            _ => Terrain::Snow1,
        }
    }
}

#[repr(u8)]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum Mineral {
    #[default]
    None = 0,
    Gold = 1,
    Iron = 2,
    Coal = 3,
    Stone = 4,
}

impl Mineral {
    pub const DEPOSITS: [Mineral; 4] = [Mineral::Gold, Mineral::Iron, Mineral::Coal, Mineral::Stone];

    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Mineral> {
        match code {
            0 => Some(Mineral::None),
            1 => Some(Mineral::Gold),
            2 => Some(Mineral::Iron),
            3 => Some(Mineral::Coal),
            4 => Some(Mineral::Stone),
            _ => None,
        }
    }
}
