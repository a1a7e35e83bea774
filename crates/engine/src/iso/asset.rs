use std::fmt;

use serde::{Deserialize, Serialize};

use super::grid::{GridPos, OccupancyGrid, TileCode};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(pub String);

impl AssetId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Movement and hit-test family of a placeable asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetKind {
    /// Floor-standing, can host a surface item on top.
    #[serde(rename = "floor item")]
    FloorItem,
    #[serde(rename = "non top floor item")]
    NonTopFloorItem,
    /// Rides on top of furniture or rests on the floor.
    #[serde(rename = "surface item")]
    SurfaceItem,
    #[serde(rename = "wall item")]
    WallItem,
}

impl AssetKind {
    pub const ALL: [AssetKind; 4] = [
        AssetKind::FloorItem,
        AssetKind::NonTopFloorItem,
        AssetKind::SurfaceItem,
        AssetKind::WallItem,
    ];

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "floor item" => Some(Self::FloorItem),
            "non top floor item" => Some(Self::NonTopFloorItem),
            "surface item" => Some(Self::SurfaceItem),
            "wall item" => Some(Self::WallItem),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::FloorItem => "floor item",
            Self::NonTopFloorItem => "non top floor item",
            Self::SurfaceItem => "surface item",
            Self::WallItem => "wall item",
        }
    }

    pub fn is_floor_standing(self) -> bool {
        matches!(self, Self::FloorItem | Self::NonTopFloorItem)
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sprite-sheet cell of an object. For wall items `col` is the wall face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Orientation {
    pub col: u32,
    pub row: u32,
}

impl Orientation {
    pub const ROTATION_STEPS: u32 = 4;

    pub const fn new(col: u32, row: u32) -> Self {
        Self { col, row }
    }
}

/// One of the two visible wall planes.
///
/// `East` faces belong to wall segments on the `y = 0` row; items mounted on
/// them live on the `y = 1` row. `North` faces belong to the `x = 0` column
/// and carry items on the `x = 1` column. Both meet at the corner cell
/// `(1, 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WallFace {
    East,
    North,
}

impl WallFace {
    pub const CORNER: (u32, u32) = (1, 1);
    pub const ALL: [WallFace; 2] = [WallFace::East, WallFace::North];

    pub fn from_col(col: u32) -> Option<Self> {
        match col {
            0 => Some(Self::East),
            1 => Some(Self::North),
            _ => None,
        }
    }

    pub fn col(self) -> u32 {
        match self {
            Self::East => 0,
            Self::North => 1,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::East => Self::North,
            Self::North => Self::East,
        }
    }

    /// Floor cell a wall segment at `(x, y, z)` exposes through this face.
    pub fn adjacent_cell(self, wall: GridPos) -> GridPos {
        match self {
            Self::East => GridPos::new(wall.x, wall.y + 1, wall.z),
            Self::North => GridPos::new(wall.x + 1, wall.y, wall.z),
        }
    }

    /// A face is exposed when the cell it looks onto is in bounds and not wall.
    pub fn is_exposed(self, grid: &OccupancyGrid, wall: GridPos) -> bool {
        let adjacent = self.adjacent_cell(wall);
        grid.contains_pos(adjacent) && grid.get_pos(adjacent) != TileCode::Wall
    }

    /// True when `pos` lies on the interior plane that mounts to this face.
    pub fn holds(self, pos: GridPos) -> bool {
        match self {
            Self::East => pos.y == 1 && pos.x >= 1,
            Self::North => pos.x == 1 && pos.y >= 1,
        }
    }
}
