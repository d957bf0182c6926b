//! Objects that can occupy a map position, with their persisted codes.

use serde::{Deserialize, Serialize};

/// How an object affects movement and construction around it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Space {
    Open,
    Filled,
    Semipassable,
    Impassable,
}

/// Placed object. Variants carrying a `u8` hold the sprite variant; the
/// persisted code is `base + variant`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MapObject {
    #[default]
    None,
    Flag,
    SmallBuilding,
    LargeBuilding,
    Castle,
    Tree(u8),
    Pine(u8),
    Palm(u8),
    WaterTree(u8),
    Stone(u8),
    Sandstone(u8),
    Cross,
    Stub,
    Boulder,
    Cadaver(u8),
    WaterStone(u8),
    Cactus(u8),
    DeadTree,
    FelledPine(u8),
    FelledTree(u8),
    NewPine,
    NewTree,
    Seeds(u8),
    FieldExpired,
    Field(u8),
}

/// `(base code, variant count)` of every variant family.
const TREE: (u8, u8) = (8, 8);
const PINE: (u8, u8) = (16, 8);
const PALM: (u8, u8) = (24, 4);
const WATER_TREE: (u8, u8) = (28, 4);
const STONE: (u8, u8) = (72, 8);
const SANDSTONE: (u8, u8) = (80, 2);
const CADAVER: (u8, u8) = (86, 2);
const WATER_STONE: (u8, u8) = (88, 2);
const CACTUS: (u8, u8) = (90, 2);
const FELLED_PINE: (u8, u8) = (93, 5);
const FELLED_TREE: (u8, u8) = (98, 5);
const SEEDS: (u8, u8) = (105, 6);
const FIELD: (u8, u8) = (112, 6);

/// Out-of-range variants settle on the last member of their family.
fn member((base, count): (u8, u8), variant: u8) -> u8 {
    base + variant.min(count - 1)
}

fn family(code: u8, (base, count): (u8, u8)) -> Option<u8> {
    (base..base + count).contains(&code).then(|| code - base)
}

impl MapObject {
    pub fn code(self) -> u8 {
        use MapObject::*;
        match self {
            None => 0,
            Flag => 1,
            SmallBuilding => 2,
            LargeBuilding => 3,
            Castle => 4,
            Tree(v) => member(TREE, v),
            Pine(v) => member(PINE, v),
            Palm(v) => member(PALM, v),
            WaterTree(v) => member(WATER_TREE, v),
            Stone(v) => member(STONE, v),
            Sandstone(v) => member(SANDSTONE, v),
            Cross => 82,
            Stub => 83,
            Boulder => 84,
            Cadaver(v) => member(CADAVER, v),
            WaterStone(v) => member(WATER_STONE, v),
            Cactus(v) => member(CACTUS, v),
            DeadTree => 92,
            FelledPine(v) => member(FELLED_PINE, v),
            FelledTree(v) => member(FELLED_TREE, v),
            NewPine => 103,
            NewTree => 104,
            Seeds(v) => member(SEEDS, v),
            FieldExpired => 111,
            Field(v) => member(FIELD, v),
        }
    }

    /// The object with its variant pulled back into its family's range.
    pub fn normalized(self) -> MapObject {
        MapObject::from_code(self.code()).unwrap_or(self)
    }

    pub fn from_code(code: u8) -> Option<MapObject> {
        use MapObject::*;
        let object = match code {
            0 => None,
            1 => Flag,
            2 => SmallBuilding,
            3 => LargeBuilding,
            4 => Castle,
            82 => Cross,
            83 => Stub,
            84 => Boulder,
            92 => DeadTree,
            103 => NewPine,
            104 => NewTree,
            111 => FieldExpired,
            _ => {
                let families: [(fn(u8) -> MapObject, (u8, u8)); 13] = [
                    (Tree, TREE),
                    (Pine, PINE),
                    (Palm, PALM),
                    (WaterTree, WATER_TREE),
                    (Stone, STONE),
                    (Sandstone, SANDSTONE),
                    (Cadaver, CADAVER),
                    (WaterStone, WATER_STONE),
                    (Cactus, CACTUS),
                    (FelledPine, FELLED_PINE),
                    (FelledTree, FELLED_TREE),
                    (Seeds, SEEDS),
                    (Field, FIELD),
                ];
                return families
                    .iter()
                    .find_map(|(make, range)| family(code, *range).map(make));
            }
        };
        Some(object)
    }

    /// Flags and buildings keep an object-table index in their tile.
    pub fn uses_index(self) -> bool {
        map_schema::object_uses_index(self.code())
    }

    pub fn is_none(self) -> bool {
        self == MapObject::None
    }

    pub fn space(self) -> Space {
        use MapObject::*;
        match self {
            None | Seeds(_) | Field(_) | FieldExpired => Space::Open,
            Flag | Tree(_) | Pine(_) | Palm(_) | WaterTree(_) | Cross | DeadTree
            | FelledPine(_) | FelledTree(_) | NewPine | NewTree => Space::Filled,
            Stub | Boulder | Cadaver(_) | Cactus(_) => Space::Semipassable,
            SmallBuilding | LargeBuilding | Castle | Stone(_) | Sandstone(_) | WaterStone(_) => {
                Space::Impassable
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversized_variants_stay_in_their_family() {
        assert_eq!(MapObject::Tree(9).code(), 15);
        assert_ne!(MapObject::Tree(9).code(), MapObject::Pine(1).code());
        assert_eq!(MapObject::Field(255).code(), 117);
        assert_eq!(MapObject::Seeds(6).normalized(), MapObject::Seeds(5));
        assert_eq!(MapObject::Palm(2).normalized(), MapObject::Palm(2));
        assert_eq!(MapObject::Castle.normalized(), MapObject::Castle);
    }

    #[test]
    fn every_code_round_trips() {
        let mut known = 0;
        for code in 0..=127u8 {
            if let Some(object) = MapObject::from_code(code) {
                assert_eq!(object.code(), code);
                known += 1;
            }
        }
        assert_eq!(known, 5 + 8 + 8 + 4 + 4 + 8 + 2 + 3 + 2 + 2 + 2 + 1 + 5 + 5 + 2 + 6 + 1 + 6);
        assert_eq!(MapObject::from_code(5), None);
    }

    #[test]
    fn only_flags_and_buildings_use_index() {
        assert!(MapObject::Flag.uses_index());
        assert!(MapObject::Castle.uses_index());
        assert!(!MapObject::Tree(3).uses_index());
        assert!(!MapObject::None.uses_index());
    }

    #[test]
    fn obstacles_are_impassable() {
        assert_eq!(MapObject::Stone(2).space(), Space::Impassable);
        assert_eq!(MapObject::WaterStone(1).space(), Space::Impassable);
        assert_eq!(MapObject::Tree(0).space(), Space::Filled);
        assert!(MapObject::Boulder.space() < Space::Impassable);
    }
}
