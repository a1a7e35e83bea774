use std::fmt;

use thiserror::Error;

/// Occupancy classification of one grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum TileCode {
    #[default]
    Empty = 0,
    Wall = 1,
    TopSurface = 2,
    NonTopSurface = 3,
}

impl TileCode {
    pub fn is_occupied_by_object(self) -> bool {
        matches!(self, Self::TopSurface | Self::NonTopSurface)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct GridPos {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl GridPos {
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }

    pub fn above(self) -> Self {
        Self {
            z: self.z + 1,
            ..self
        }
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GridError {
    #[error(
        "invalid grid dimensions {width}x{height}x{depth}: width and height must be at least 2 and depth at least 1"
    )]
    InvalidDimensions { width: u32, height: u32, depth: u32 },
    #[error("grid {width}x{height}x{depth} exceeds the limit of {} cells", MAX_GRID_CELLS)]
    TooLarge { width: u32, height: u32, depth: u32 },
}

/// Upper bound on `width * height * depth` for one room.
pub const MAX_GRID_CELLS: usize = 1 << 20;

/// Room volume indexed by `(x, y, z)`.
///
/// The `x = 0` and `y = 0` planes are `Wall` for every layer. They are set by
/// [`OccupancyGrid::create`] and can never be written afterwards.
///
/// `get`/`set` treat out-of-range coordinates as a caller bug and panic;
/// `try_get` is the checked variant for unvalidated input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccupancyGrid {
    width: u32,
    height: u32,
    depth: u32,
    cells: Vec<TileCode>,
}

impl OccupancyGrid {
    pub fn create(width: u32, height: u32, depth: u32) -> Result<Self, GridError> {
        if width < 2 || height < 2 || depth < 1 {
            return Err(GridError::InvalidDimensions {
                width,
                height,
                depth,
            });
        }
        let len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|area| area.checked_mul(depth as usize))
            .filter(|&len| len <= MAX_GRID_CELLS)
            .ok_or(GridError::TooLarge {
                width,
                height,
                depth,
            })?;
        let mut grid = Self {
            width,
            height,
            depth,
            cells: vec![TileCode::Empty; len],
        };
        for z in 0..depth {
            for y in 0..height {
                let index = grid.index_unchecked(0, y, z);
                grid.cells[index] = TileCode::Wall;
            }
            for x in 0..width {
                let index = grid.index_unchecked(x, 0, z);
                grid.cells[index] = TileCode::Wall;
            }
        }
        Ok(grid)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn dimensions(&self) -> (u32, u32, u32) {
        (self.width, self.height, self.depth)
    }

    pub fn contains(&self, x: u32, y: u32, z: u32) -> bool {
        x < self.width && y < self.height && z < self.depth
    }

    pub fn contains_pos(&self, pos: GridPos) -> bool {
        self.contains(pos.x, pos.y, pos.z)
    }

    pub fn get(&self, x: u32, y: u32, z: u32) -> TileCode {
        self.cells[self.checked_index(x, y, z)]
    }

    pub fn get_pos(&self, pos: GridPos) -> TileCode {
        self.get(pos.x, pos.y, pos.z)
    }

    pub fn try_get(&self, x: i64, y: i64, z: i64) -> Option<TileCode> {
        let x = u32::try_from(x).ok()?;
        let y = u32::try_from(y).ok()?;
        let z = u32::try_from(z).ok()?;
        if !self.contains(x, y, z) {
            return None;
        }
        Some(self.cells[self.index_unchecked(x, y, z)])
    }

    /// Writes a non-wall code into a non-wall cell.
    ///
    /// Panics when the coordinate is out of bounds, when the target cell is a
    /// wall, or when `code` is `Wall`.
    pub fn set(&mut self, x: u32, y: u32, z: u32, code: TileCode) {
        let index = self.checked_index(x, y, z);
        assert!(
            self.cells[index] != TileCode::Wall,
            "attempted to overwrite wall cell ({x}, {y}, {z})"
        );
        assert!(
            code != TileCode::Wall,
            "wall cells are fixed at room creation; cannot set ({x}, {y}, {z}) to Wall"
        );
        self.cells[index] = code;
    }

    pub fn set_pos(&mut self, pos: GridPos, code: TileCode) {
        self.set(pos.x, pos.y, pos.z, code);
    }

    /// Cells in x-major, then y, then z order.
    pub fn iter(&self) -> impl Iterator<Item = (GridPos, TileCode)> + '_ {
        let (width, height, depth) = self.dimensions();
        (0..width).flat_map(move |x| {
            (0..height).flat_map(move |y| {
                (0..depth).map(move |z| {
                    let code = self.cells[self.index_unchecked(x, y, z)];
                    (GridPos { x, y, z }, code)
                })
            })
        })
    }

    pub fn count(&self, code: TileCode) -> usize {
        self.cells.iter().filter(|cell| **cell == code).count()
    }

    fn checked_index(&self, x: u32, y: u32, z: u32) -> usize {
        assert!(
            self.contains(x, y, z),
            "grid access out of bounds: ({x}, {y}, {z}) in {}x{}x{} grid",
            self.width,
            self.height,
            self.depth
        );
        self.index_unchecked(x, y, z)
    }

    fn index_unchecked(&self, x: u32, y: u32, z: u32) -> usize {
        (z as usize * self.height as usize + y as usize) * self.width as usize + x as usize
    }
}
