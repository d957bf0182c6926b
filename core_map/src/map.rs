//! The map facade: owns the generated landscape and the gameplay overlay,
//! and routes every mutation through the registered change handlers.

use map_schema::{MapSnapshot, SchemaError, TileRecord};
use thiserror::Error;

use crate::{
    config::{MapConfigError, MapGenConfig},
    generator::{ClassicMapGenerator, GenerationReport, MapGenerator, Workspace},
    geometry::{Direction, GeometryError, MapGeometry, MapPos},
    handlers::{HandlerId, MapChangeHandler},
    hashing,
    landscape::{
        self, GameTile, LandscapeTile, Paths, PlayerId, RecordFault, MAX_HEIGHT, MAX_PLAYERS,
    },
    objects::MapObject,
    spiral::SpiralPattern,
    terrain::{Mineral, Terrain},
};

#[derive(Debug, Error)]
pub enum MapError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error(transparent)]
    Config(#[from] MapConfigError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("landscape holds {actual} tiles, grid needs {expected}")]
    TileCount { expected: usize, actual: usize },
    #[error("tile {index} holds an unknown code: {fault:?}")]
    InvalidRecord { index: usize, fault: RecordFault },
    #[error("road from {pos} towards {dir:?} already exists")]
    RoadExists { pos: MapPos, dir: Direction },
    #[error("road crosses occupied position {0}")]
    RoadBlocked(MapPos),
    #[error("no road leaves {pos} towards {dir:?}")]
    NoRoad { pos: MapPos, dir: Direction },
    #[error("road from {0} does not end at a flag")]
    RoadUnterminated(MapPos),
}

pub struct Map {
    geometry: MapGeometry,
    spiral: SpiralPattern,
    seed: u64,
    generator: String,
    landscape: Vec<LandscapeTile>,
    game: Vec<GameTile>,
    handlers: Vec<(HandlerId, Box<dyn MapChangeHandler>)>,
    next_handler: u32,
}

impl std::fmt::Debug for Map {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Map")
            .field("cols", &self.geometry.cols())
            .field("rows", &self.geometry.rows())
            .field("seed", &self.seed)
            .field("generator", &self.generator)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

impl Map {
    /// Generate a map with the classic pipeline.
    pub fn generate(config: &MapGenConfig) -> Result<Self, MapError> {
        Self::with_generator(config, &ClassicMapGenerator).map(|(map, _)| map)
    }

    pub fn with_generator(
        config: &MapGenConfig,
        generator: &dyn MapGenerator,
    ) -> Result<(Self, GenerationReport), MapError> {
        config.validate()?;
        let geometry = MapGeometry::new(config.size)?;
        let mut workspace = Workspace::new(geometry, config);
        let report = generator.generate(&mut workspace);
        let mut map = Self::assemble(geometry, workspace.spiral, workspace.tiles);
        map.seed = config.seed;
        map.generator = generator.name().to_string();
        Ok((map, report))
    }

    /// Wrap an existing landscape, e.g. one built by hand in a test.
    pub fn from_landscape(
        geometry: MapGeometry,
        landscape: Vec<LandscapeTile>,
    ) -> Result<Self, MapError> {
        if landscape.len() != geometry.tile_count() {
            return Err(MapError::TileCount {
                expected: geometry.tile_count(),
                actual: landscape.len(),
            });
        }
        Ok(Self::assemble(geometry, SpiralPattern::new(), landscape))
    }

    pub fn from_records(geometry: MapGeometry, records: &[TileRecord]) -> Result<Self, MapError> {
        if records.len() != geometry.tile_count() {
            return Err(MapError::TileCount {
                expected: geometry.tile_count(),
                actual: records.len(),
            });
        }
        let mut landscape_tiles = Vec::with_capacity(records.len());
        let mut game_tiles = Vec::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            let (tile, game) =
                landscape::from_record(record).map_err(|fault| MapError::InvalidRecord {
                    index,
                    fault,
                })?;
            landscape_tiles.push(tile);
            game_tiles.push(game);
        }
        let mut map = Self::assemble(geometry, SpiralPattern::new(), landscape_tiles);
        map.game = game_tiles;
        Ok(map)
    }

    pub fn from_snapshot(snapshot: &MapSnapshot) -> Result<Self, MapError> {
        let geometry = MapGeometry::from_dimensions(snapshot.header.cols, snapshot.header.rows)?;
        let records = snapshot.records()?;
        let mut map = Self::from_records(geometry, &records)?;
        map.seed = snapshot.header.seed;
        map.generator = snapshot.header.generator.clone();
        Ok(map)
    }

    fn assemble(
        geometry: MapGeometry,
        spiral: SpiralPattern,
        landscape: Vec<LandscapeTile>,
    ) -> Self {
        let game = vec![GameTile::default(); landscape.len()];
        Self {
            geometry,
            spiral,
            seed: 0,
            generator: String::new(),
            landscape,
            game,
            handlers: Vec::new(),
            next_handler: 0,
        }
    }

    pub fn records(&self) -> Vec<TileRecord> {
        self.landscape
            .iter()
            .zip(&self.game)
            .map(|(tile, game)| landscape::to_record(tile, game))
            .collect()
    }

    pub fn to_snapshot(&self) -> MapSnapshot {
        MapSnapshot::new(
            self.geometry.cols(),
            self.geometry.rows(),
            self.seed,
            &self.generator,
            &self.records(),
        )
        .finalize()
    }

    /// FNV-1a over the persisted tile layout.
    pub fn fingerprint(&self) -> u64 {
        hashing::fingerprint(&map_schema::encode_tiles(&self.records()))
    }

    pub fn geometry(&self) -> &MapGeometry {
        &self.geometry
    }

    pub fn spiral(&self) -> &SpiralPattern {
        &self.spiral
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn generator_name(&self) -> &str {
        &self.generator
    }

    pub fn landscape(&self) -> &[LandscapeTile] {
        &self.landscape
    }

    pub fn game_tiles(&self) -> &[GameTile] {
        &self.game
    }

    // Queries

    #[inline]
    pub fn tile(&self, pos: MapPos) -> &LandscapeTile {
        &self.landscape[pos.index()]
    }

    #[inline]
    pub fn game_tile(&self, pos: MapPos) -> &GameTile {
        &self.game[pos.index()]
    }

    pub fn height(&self, pos: MapPos) -> u8 {
        self.tile(pos).height
    }

    pub fn terrain_up(&self, pos: MapPos) -> Terrain {
        self.tile(pos).terrain_up
    }

    pub fn terrain_down(&self, pos: MapPos) -> Terrain {
        self.tile(pos).terrain_down
    }

    pub fn object(&self, pos: MapPos) -> MapObject {
        self.tile(pos).object
    }

    pub fn mineral(&self, pos: MapPos) -> Mineral {
        self.tile(pos).mineral
    }

    pub fn resource_amount(&self, pos: MapPos) -> u8 {
        self.tile(pos).resource_amount
    }

    pub fn has_owner(&self, pos: MapPos) -> bool {
        self.game_tile(pos).owner.is_some()
    }

    pub fn owner(&self, pos: MapPos) -> Option<PlayerId> {
        self.game_tile(pos).owner
    }

    pub fn paths(&self, pos: MapPos) -> Paths {
        self.game_tile(pos).paths
    }

    pub fn has_path(&self, pos: MapPos, dir: Direction) -> bool {
        self.paths(pos).has(dir)
    }

    pub fn serf_index(&self, pos: MapPos) -> u16 {
        self.game_tile(pos).serf_index
    }

    pub fn has_serf(&self, pos: MapPos) -> bool {
        self.serf_index(pos) != 0
    }

    pub fn idle_serf(&self, pos: MapPos) -> bool {
        self.game_tile(pos).idle_serf
    }

    pub fn object_index(&self, pos: MapPos) -> u16 {
        self.game_tile(pos).object_index
    }

    /// Whether every triangle around `pos` is water.
    pub fn is_in_water(&self, pos: MapPos) -> bool {
        self.types_within(pos, Terrain::Water0, Terrain::Water3)
    }

    /// Whether every triangle around `pos` lies in `min..=max`.
    pub fn types_within(&self, pos: MapPos, min: Terrain, max: Terrain) -> bool {
        self.geometry
            .triangles_around(pos)
            .into_iter()
            .all(|tri| self.tile(tri.pos).terrain(tri.half).in_range(min, max))
    }

    pub fn distance(&self, a: MapPos, b: MapPos) -> u32 {
        self.geometry.distance(a, b)
    }

    pub fn move_dir(&self, pos: MapPos, dir: Direction) -> MapPos {
        self.geometry.move_dir(pos, dir)
    }

    pub fn pos_add_spirally(&self, pos: MapPos, index: usize) -> MapPos {
        self.spiral.pos_add_spirally(&self.geometry, pos, index)
    }

    // Handlers

    pub fn add_handler(&mut self, handler: Box<dyn MapChangeHandler>) -> HandlerId {
        let id = HandlerId(self.next_handler);
        self.next_handler += 1;
        self.handlers.push((id, handler));
        id
    }

    pub fn remove_handler(&mut self, id: HandlerId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(existing, _)| *existing != id);
        self.handlers.len() != before
    }

    fn notify(&mut self, mut call: impl FnMut(&mut dyn MapChangeHandler)) {
        for (_, handler) in self.handlers.iter_mut() {
            call(handler.as_mut());
        }
    }

    // Mutations

    /// Set the height of a vertex. The surrounding triangles change shape
    /// too, so the vertex and each neighbour are reported.
    pub fn set_height(&mut self, pos: MapPos, height: u8) {
        assert!(height <= MAX_HEIGHT, "height {height} above {MAX_HEIGHT}");
        self.landscape[pos.index()].height = height;
        let neighbors = self.geometry.neighbors(pos);
        self.notify(|handler| {
            handler.on_height_changed(pos);
            for n in neighbors {
                handler.on_height_changed(n);
            }
        });
    }

    /// Replace the object at `pos`, returning the previous one.
    pub fn set_object(&mut self, pos: MapPos, object: MapObject) -> MapObject {
        let object = object.normalized();
        let old = std::mem::replace(&mut self.landscape[pos.index()].object, object);
        if !object.uses_index() {
            self.game[pos.index()].object_index = 0;
        }
        tracing::trace!(target: "hexmap::map", %pos, ?old, new = ?object, "map.object.set");
        if old.is_none() {
            self.notify(|handler| handler.on_object_placed(pos, object));
        } else {
            self.notify(|handler| handler.on_object_changed(pos, old, object));
        }
        old
    }

    /// Swap in `new` only if `expected` is still there.
    pub fn exchange_object(&mut self, pos: MapPos, expected: MapObject, new: MapObject) -> bool {
        if self.object(pos) != expected {
            return false;
        }
        let new = new.normalized();
        self.landscape[pos.index()].object = new;
        self.notify(|handler| handler.on_object_exchanged(pos, expected, new));
        true
    }

    pub fn remove_object(&mut self, pos: MapPos) -> MapObject {
        self.set_object(pos, MapObject::None)
    }

    fn set_path_bits(&mut self, pos: MapPos, dir: Direction, present: bool) {
        let other = self.geometry.move_dir(pos, dir);
        self.game[pos.index()]
            .paths
            .set(Paths::from_direction(dir), present);
        self.game[other.index()]
            .paths
            .set(Paths::from_direction(dir.reverse()), present);
    }

    /// Connect `pos` with its neighbour in `dir`, on both ends.
    pub fn add_path(&mut self, pos: MapPos, dir: Direction) {
        self.set_path_bits(pos, dir, true);
        self.notify(|handler| handler.on_road_segment_placed(pos, &[dir]));
    }

    pub fn delete_path(&mut self, pos: MapPos, dir: Direction) {
        self.set_path_bits(pos, dir, false);
        self.notify(|handler| handler.on_road_segment_deleted(pos, &[dir]));
    }

    /// Lay a road from `source` along `dirs`. Positions strictly between the
    /// ends must be free of objects and other roads. Nothing changes unless
    /// the whole route is valid.
    pub fn place_road_segment(
        &mut self,
        source: MapPos,
        dirs: &[Direction],
    ) -> Result<MapPos, MapError> {
        let mut pos = source;
        for (step, &dir) in dirs.iter().enumerate() {
            if self.has_path(pos, dir) {
                return Err(MapError::RoadExists { pos, dir });
            }
            pos = self.geometry.move_dir(pos, dir);
            let interior = step + 1 < dirs.len();
            if interior && (!self.object(pos).is_none() || !self.paths(pos).is_empty()) {
                return Err(MapError::RoadBlocked(pos));
            }
        }

        let mut pos = source;
        for &dir in dirs {
            self.set_path_bits(pos, dir, true);
            pos = self.geometry.move_dir(pos, dir);
        }
        tracing::debug!(
            target: "hexmap::map",
            %source,
            end = %pos,
            length = dirs.len(),
            "map.road.placed"
        );
        self.notify(|handler| handler.on_road_segment_placed(source, dirs));
        Ok(pos)
    }

    /// Remove the road leaving `pos` towards `dir`, following it until the
    /// next flag. Returns the directions walked.
    pub fn remove_road_segment(
        &mut self,
        pos: MapPos,
        dir: Direction,
    ) -> Result<Vec<Direction>, MapError> {
        if !self.has_path(pos, dir) {
            return Err(MapError::NoRoad { pos, dir });
        }
        let mut route = vec![dir];
        let mut current = self.geometry.move_dir(pos, dir);
        let mut incoming = dir.reverse();
        while self.object(current) != MapObject::Flag {
            let next = self
                .paths(current)
                .directions()
                .find(|&d| d != incoming)
                .ok_or(MapError::RoadUnterminated(pos))?;
            if route.len() > self.geometry.tile_count() {
                return Err(MapError::RoadUnterminated(pos));
            }
            route.push(next);
            current = self.geometry.move_dir(current, next);
            incoming = next.reverse();
        }

        let mut at = pos;
        for &step in &route {
            self.set_path_bits(at, step, false);
            at = self.geometry.move_dir(at, step);
        }
        tracing::debug!(
            target: "hexmap::map",
            source = %pos,
            length = route.len(),
            "map.road.removed"
        );
        self.notify(|handler| handler.on_road_segment_deleted(pos, &route));
        Ok(route)
    }

    pub fn set_owner(&mut self, pos: MapPos, owner: PlayerId) {
        assert!(owner < MAX_PLAYERS, "player {owner} out of range");
        self.game[pos.index()].owner = Some(owner);
        self.notify(|handler| handler.on_owner_changed(pos, Some(owner)));
    }

    pub fn clear_owner(&mut self, pos: MapPos) {
        self.game[pos.index()].owner = None;
        self.notify(|handler| handler.on_owner_changed(pos, None));
    }

    pub fn set_serf_index(&mut self, pos: MapPos, index: u16) {
        self.game[pos.index()].serf_index = index;
    }

    pub fn set_idle_serf(&mut self, pos: MapPos, idle: bool) {
        self.game[pos.index()].idle_serf = idle;
    }

    /// Only meaningful under flags and buildings.
    pub fn set_object_index(&mut self, pos: MapPos, index: u16) {
        debug_assert!(self.object(pos).uses_index());
        self.game[pos.index()].object_index = index;
    }

    /// Mine up to `amount` from the deposit at `pos`; returns what is left.
    /// An exhausted deposit clears its mineral.
    pub fn remove_ore(&mut self, pos: MapPos, amount: u8) -> u8 {
        let tile = &mut self.landscape[pos.index()];
        if tile.mineral == Mineral::None {
            return 0;
        }
        tile.resource_amount = tile.resource_amount.saturating_sub(amount);
        if tile.resource_amount == 0 {
            tile.mineral = Mineral::None;
        }
        tile.resource_amount
    }

    /// Catch up to `amount` fish at a water vertex; returns what is left.
    pub fn remove_fish(&mut self, pos: MapPos, amount: u8) -> u8 {
        if !self.is_in_water(pos) {
            return 0;
        }
        let tile = &mut self.landscape[pos.index()];
        tile.resource_amount = tile.resource_amount.saturating_sub(amount);
        tile.resource_amount
    }
}
