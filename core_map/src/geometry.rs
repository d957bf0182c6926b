//! Toroidal rhomboid grid arithmetic.
//!
//! Positions are vertices of a triangular lattice laid out as a skewed
//! (rhomboid) grid. Both dimensions are powers of two so every wrap is a
//! bitmask, which keeps position arithmetic identical on every platform.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Smallest accepted size code / grid dimension.
pub const MIN_MAP_SIZE: u32 = 3;
/// Largest accepted size code.
pub const MAX_MAP_SIZE: u32 = 20;

/// Linear index of a vertex on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MapPos(u32);

impl MapPos {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for MapPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The six hex directions in clockwise order.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Right = 0,
    DownRight = 1,
    Down = 2,
    Left = 3,
    UpLeft = 4,
    Up = 5,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::Right,
        Direction::DownRight,
        Direction::Down,
        Direction::Left,
        Direction::UpLeft,
        Direction::Up,
    ];

    pub fn from_index(index: usize) -> Direction {
        Self::ALL[index % 6]
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Column/row delta of one step.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Right => (1, 0),
            Direction::DownRight => (1, 1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::UpLeft => (-1, -1),
            Direction::Up => (0, -1),
        }
    }

    pub fn reverse(self) -> Direction {
        self.turn(3)
    }

    /// Rotate clockwise by `steps` sixths of a turn.
    pub fn turn(self, steps: usize) -> Direction {
        Self::from_index(self.index() + steps)
    }
}

/// Which of the two triangles hanging below a vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Half {
    /// Corners `pos`, `down(pos)`, `down_right(pos)`.
    Up,
    /// Corners `pos`, `right(pos)`, `down_right(pos)`.
    Down,
}

/// A triangular half-tile, addressed by the vertex it hangs from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triangle {
    pub pos: MapPos,
    pub half: Half,
}

impl Triangle {
    pub fn up(pos: MapPos) -> Self {
        Self { pos, half: Half::Up }
    }

    pub fn down(pos: MapPos) -> Self {
        Self {
            pos,
            half: Half::Down,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GeometryError {
    #[error("map size {0} is below the minimum of {MIN_MAP_SIZE}")]
    SizeTooSmall(u32),
    #[error("map size {0} exceeds the maximum of {MAX_MAP_SIZE}")]
    SizeTooLarge(u32),
    #[error("grid dimensions {cols}x{rows} must be at least {MIN_MAP_SIZE}x{MIN_MAP_SIZE}")]
    DimensionsTooSmall { cols: u32, rows: u32 },
    #[error("grid dimensions {cols}x{rows} must be powers of two")]
    NotPowerOfTwo { cols: u32, rows: u32 },
}

/// Dimensions and wrap masks of a toroidal grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapGeometry {
    size: Option<u32>,
    cols: u32,
    rows: u32,
    col_mask: u32,
    row_mask: u32,
    row_shift: u32,
}

impl MapGeometry {
    /// Build the grid for a size code: each step of two doubles both axes.
    pub fn new(size: u32) -> Result<Self, GeometryError> {
        if size < MIN_MAP_SIZE {
            return Err(GeometryError::SizeTooSmall(size));
        }
        if size > MAX_MAP_SIZE {
            return Err(GeometryError::SizeTooLarge(size));
        }
        let cols = 1u32 << ((size >> 1) + 5);
        let rows = 1u32 << (((size - 1) >> 1) + 5);
        let mut geometry = Self::from_dimensions(cols, rows)?;
        geometry.size = Some(size);
        Ok(geometry)
    }

    pub fn from_dimensions(cols: u32, rows: u32) -> Result<Self, GeometryError> {
        if cols < MIN_MAP_SIZE || rows < MIN_MAP_SIZE {
            return Err(GeometryError::DimensionsTooSmall { cols, rows });
        }
        if !cols.is_power_of_two() || !rows.is_power_of_two() {
            return Err(GeometryError::NotPowerOfTwo { cols, rows });
        }
        Ok(Self {
            size: None,
            cols,
            rows,
            col_mask: cols - 1,
            row_mask: rows - 1,
            row_shift: cols.trailing_zeros(),
        })
    }

    pub fn size(&self) -> Option<u32> {
        self.size
    }

    #[inline]
    pub fn cols(&self) -> u32 {
        self.cols
    }

    #[inline]
    pub fn rows(&self) -> u32 {
        self.rows
    }

    #[inline]
    pub fn col_mask(&self) -> u32 {
        self.col_mask
    }

    #[inline]
    pub fn row_mask(&self) -> u32 {
        self.row_mask
    }

    #[inline]
    pub fn tile_count(&self) -> usize {
        (self.cols as usize) * (self.rows as usize)
    }

    /// Number of 32x32 regions; cluster counts in generation scale with it.
    pub fn region_count(&self) -> usize {
        (((self.cols >> 5) * (self.rows >> 5)) as usize).max(1)
    }

    /// Position of a column/row pair. Out-of-range coordinates are a caller bug.
    #[inline]
    pub fn pos(&self, col: u32, row: u32) -> MapPos {
        assert!(
            col < self.cols && row < self.rows,
            "coordinate ({col}, {row}) outside {}x{} grid",
            self.cols,
            self.rows
        );
        MapPos((row << self.row_shift) | col)
    }

    /// Position for a raw linear index, checked against the grid extent.
    pub fn pos_from_index(&self, index: usize) -> MapPos {
        assert!(index < self.tile_count(), "position index {index} outside grid");
        MapPos(index as u32)
    }

    #[inline]
    pub fn col(&self, pos: MapPos) -> u32 {
        pos.0 & self.col_mask
    }

    #[inline]
    pub fn row(&self, pos: MapPos) -> u32 {
        (pos.0 >> self.row_shift) & self.row_mask
    }

    /// Add a signed column/row offset, wrapping on both axes.
    #[inline]
    pub fn pos_add(&self, pos: MapPos, dx: i32, dy: i32) -> MapPos {
        let col = (self.col(pos) as i32).wrapping_add(dx) as u32 & self.col_mask;
        let row = (self.row(pos) as i32).wrapping_add(dy) as u32 & self.row_mask;
        MapPos((row << self.row_shift) | col)
    }

    #[inline]
    pub fn move_dir(&self, pos: MapPos, dir: Direction) -> MapPos {
        let (dx, dy) = dir.delta();
        self.pos_add(pos, dx, dy)
    }

    pub fn move_n(&self, pos: MapPos, dir: Direction, steps: i32) -> MapPos {
        let (dx, dy) = dir.delta();
        self.pos_add(pos, dx * steps, dy * steps)
    }

    #[inline]
    pub fn move_right(&self, pos: MapPos) -> MapPos {
        self.move_dir(pos, Direction::Right)
    }

    #[inline]
    pub fn move_down(&self, pos: MapPos) -> MapPos {
        self.move_dir(pos, Direction::Down)
    }

    #[inline]
    pub fn move_down_right(&self, pos: MapPos) -> MapPos {
        self.move_dir(pos, Direction::DownRight)
    }

    #[inline]
    pub fn move_left(&self, pos: MapPos) -> MapPos {
        self.move_dir(pos, Direction::Left)
    }

    #[inline]
    pub fn move_up_left(&self, pos: MapPos) -> MapPos {
        self.move_dir(pos, Direction::UpLeft)
    }

    #[inline]
    pub fn move_up(&self, pos: MapPos) -> MapPos {
        self.move_dir(pos, Direction::Up)
    }

    pub fn neighbors(&self, pos: MapPos) -> [MapPos; 6] {
        Direction::ALL.map(|dir| self.move_dir(pos, dir))
    }

    /// Hex distance along the shortest wrap.
    pub fn distance(&self, a: MapPos, b: MapPos) -> u32 {
        let dx = wrap_delta(self.col(b) as i32 - self.col(a) as i32, self.cols as i32);
        let dy = wrap_delta(self.row(b) as i32 - self.row(a) as i32, self.rows as i32);
        let mut best = u32::MAX;
        for x in [dx, dx - self.cols as i32] {
            for y in [dy, dy - self.rows as i32] {
                best = best.min(hex_length(x, y));
            }
        }
        best
    }

    pub fn triangle_corners(&self, triangle: Triangle) -> [MapPos; 3] {
        let pos = triangle.pos;
        let second = match triangle.half {
            Half::Up => self.move_down(pos),
            Half::Down => self.move_right(pos),
        };
        [pos, second, self.move_down_right(pos)]
    }

    /// The six triangles sharing `pos` as a corner.
    pub fn triangles_around(&self, pos: MapPos) -> [Triangle; 6] {
        let up_left = self.move_up_left(pos);
        [
            Triangle::up(pos),
            Triangle::down(self.move_left(pos)),
            Triangle::up(up_left),
            Triangle::down(up_left),
            Triangle::up(self.move_up(pos)),
            Triangle::down(pos),
        ]
    }

    /// The two triangles bordering the edge from `pos` towards `dir`.
    pub fn edge_triangles(&self, pos: MapPos, dir: Direction) -> [Triangle; 2] {
        match dir {
            Direction::Right => [Triangle::down(pos), Triangle::up(self.move_up(pos))],
            Direction::DownRight => [Triangle::up(pos), Triangle::down(pos)],
            Direction::Down => [Triangle::up(pos), Triangle::down(self.move_left(pos))],
            Direction::Left => [
                Triangle::down(self.move_left(pos)),
                Triangle::up(self.move_up_left(pos)),
            ],
            Direction::UpLeft => {
                let up_left = self.move_up_left(pos);
                [Triangle::up(up_left), Triangle::down(up_left)]
            }
            Direction::Up => [
                Triangle::down(self.move_up_left(pos)),
                Triangle::up(self.move_up(pos)),
            ],
        }
    }

    /// All positions in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = MapPos> {
        (0..self.tile_count() as u32).map(MapPos)
    }
}

fn wrap_delta(delta: i32, extent: i32) -> i32 {
    delta.rem_euclid(extent)
}

/// Hex length of a column/row offset on the rhomboid lattice.
pub fn hex_length(dx: i32, dy: i32) -> u32 {
    if (dx >= 0) == (dy >= 0) {
        dx.unsigned_abs().max(dy.unsigned_abs())
    } else {
        dx.unsigned_abs() + dy.unsigned_abs()
    }
}
