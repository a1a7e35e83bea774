use super::asset::{AssetId, AssetKind, Orientation, WallFace};
use super::grid::{GridPos, OccupancyGrid, TileCode};

pub const ANIMATION_FRAMES: u32 = 4;
pub const ANIMATION_TICKS_PER_FRAME: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedObject {
    pub position: GridPos,
    pub orientation: Orientation,
    pub asset_id: AssetId,
    pub kind: AssetKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PieceState {
    Unplaced,
    Moving,
    Placed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GhostAnimation {
    pub frame: u32,
    pub timer: u32,
}

/// Object being positioned before placement. Claims no grid cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GhostObject {
    pub position: GridPos,
    pub orientation: Orientation,
    pub asset_id: AssetId,
    pub kind: AssetKind,
    pub state: PieceState,
    pub animation: GhostAnimation,
}

impl GhostObject {
    pub fn new(asset_id: AssetId, kind: AssetKind, position: GridPos) -> Self {
        let orientation = match kind {
            AssetKind::WallItem if position.y != 1 && position.x == 1 => {
                Orientation::new(WallFace::North.col(), 0)
            }
            _ => Orientation::default(),
        };
        Self {
            position,
            orientation,
            asset_id,
            kind,
            state: PieceState::Unplaced,
            animation: GhostAnimation::default(),
        }
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn wall_face(&self) -> Option<WallFace> {
        match self.kind {
            AssetKind::WallItem => WallFace::from_col(self.orientation.col),
            _ => None,
        }
    }

    /// Advances the walk cycle. Frames only step while the ghost moves.
    pub fn animate(&mut self, moving: bool) {
        self.animation.timer += 1;
        if moving && self.animation.timer > ANIMATION_TICKS_PER_FRAME {
            self.animation.frame = (self.animation.frame + 1) % ANIMATION_FRAMES;
            self.animation.timer = 0;
        }
    }

    pub fn to_placed(&self) -> PlacedObject {
        PlacedObject {
            position: self.position,
            orientation: self.orientation,
            asset_id: self.asset_id.clone(),
            kind: self.kind,
        }
    }
}

/// Applies `(dx, dy, dz)` under the rules of the ghost's asset kind.
///
/// Horizontal axes are clamped to the grid before the rules run. On success
/// the ghost moves and enters `Moving`; on failure nothing changes. A placed
/// ghost never moves.
pub fn attempt_move(ghost: &mut GhostObject, dx: i32, dy: i32, dz: i32, grid: &OccupancyGrid) -> bool {
    if ghost.state == PieceState::Placed || !grid.contains_pos(ghost.position) {
        return false;
    }

    let target = match ghost.kind {
        kind if kind.is_floor_standing() => {
            floor_candidate(ghost.position, dx, dy, grid).map(|pos| (pos, ghost.orientation))
        }
        AssetKind::SurfaceItem => {
            surface_candidate(ghost.position, dx, dy, dz, grid).map(|pos| (pos, ghost.orientation))
        }
        // Only wall items carry a face.
        _ => {
            let Some(face) = ghost.wall_face() else {
                return false;
            };
            wall_candidate(ghost.position, face, dx, dy, dz, grid).map(|(pos, face)| {
                let orientation = Orientation::new(face.col(), ghost.orientation.row);
                (pos, orientation)
            })
        }
    };

    match target {
        Some((position, orientation)) => {
            ghost.position = position;
            ghost.orientation = orientation;
            ghost.state = PieceState::Moving;
            true
        }
        None => false,
    }
}

/// Commits the ghost into the grid when its cell is empty.
pub fn place(ghost: &mut GhostObject, grid: &mut OccupancyGrid) -> bool {
    if ghost.state == PieceState::Placed || !grid.contains_pos(ghost.position) {
        return false;
    }
    if grid.get_pos(ghost.position) != TileCode::Empty {
        return false;
    }
    let code = match ghost.kind {
        AssetKind::FloorItem => TileCode::TopSurface,
        AssetKind::NonTopFloorItem | AssetKind::SurfaceItem | AssetKind::WallItem => {
            TileCode::NonTopSurface
        }
    };
    grid.set_pos(ghost.position, code);
    ghost.state = PieceState::Placed;
    true
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickedUp {
    pub base: PlacedObject,
    pub stacked: Option<PlacedObject>,
}

impl PickedUp {
    pub fn into_vec(self) -> Vec<PlacedObject> {
        let mut objects = vec![self.base];
        objects.extend(self.stacked);
        objects
    }
}

/// Removes the object at `pos` plus any surface item resting on it.
///
/// Returns `None` unless the cell holds an object code and a matching record
/// exists in `placed`. Both cells are reset to `Empty`.
pub fn pick_up(pos: GridPos, grid: &mut OccupancyGrid, placed: &mut Vec<PlacedObject>) -> Option<PickedUp> {
    if !grid.contains_pos(pos) {
        return None;
    }
    let code = grid.get_pos(pos);
    if !code.is_occupied_by_object() {
        return None;
    }
    let base_index = placed.iter().position(|object| object.position == pos)?;

    let above = pos.above();
    let stacked_index = if code == TileCode::TopSurface && grid.contains_pos(above) {
        placed
            .iter()
            .position(|object| object.position == above && object.kind == AssetKind::SurfaceItem)
    } else {
        None
    };

    let (base, stacked) = match stacked_index {
        Some(stacked_index) if stacked_index > base_index => {
            let stacked = placed.remove(stacked_index);
            (placed.remove(base_index), Some(stacked))
        }
        Some(stacked_index) => {
            let base = placed.remove(base_index);
            (base, Some(placed.remove(stacked_index)))
        }
        None => (placed.remove(base_index), None),
    };
    if stacked.is_some() {
        grid.set_pos(above, TileCode::Empty);
    }
    grid.set_pos(pos, TileCode::Empty);

    Some(PickedUp { base, stacked })
}

/// Turns the ghost. Wall items only switch faces on the corner cell.
pub fn rotate(ghost: &mut GhostObject, grid: &OccupancyGrid) -> bool {
    if ghost.state == PieceState::Placed {
        return false;
    }
    match ghost.kind {
        AssetKind::WallItem => {
            let Some(face) = ghost.wall_face() else {
                return false;
            };
            let (cx, cy) = WallFace::CORNER;
            if ghost.position.x != cx || ghost.position.y != cy {
                return false;
            }
            if grid.try_get(cx as i64, cy as i64, ghost.position.z as i64) != Some(TileCode::Empty) {
                return false;
            }
            ghost.orientation.col = face.opposite().col();
            true
        }
        _ => {
            ghost.orientation.col = (ghost.orientation.col + 1) % Orientation::ROTATION_STEPS;
            true
        }
    }
}

fn clamp_axis(value: u32, delta: i32, len: u32) -> u32 {
    let max = len.saturating_sub(1) as i64;
    (value as i64 + delta as i64).clamp(0, max) as u32
}

fn floor_candidate(from: GridPos, dx: i32, dy: i32, grid: &OccupancyGrid) -> Option<GridPos> {
    let candidate = GridPos::new(
        clamp_axis(from.x, dx, grid.width()),
        clamp_axis(from.y, dy, grid.height()),
        0,
    );
    (grid.get_pos(candidate) == TileCode::Empty).then_some(candidate)
}

fn surface_candidate(from: GridPos, dx: i32, dy: i32, dz: i32, grid: &OccupancyGrid) -> Option<GridPos> {
    let candidate = GridPos::new(
        clamp_axis(from.x, dx, grid.width()),
        clamp_axis(from.y, dy, grid.height()),
        clamp_axis(from.z, dz, grid.depth()),
    );

    match grid.get_pos(candidate) {
        TileCode::Wall | TileCode::NonTopSurface => None,
        TileCode::TopSurface => {
            let bumped = candidate.above();
            (grid.contains_pos(bumped) && grid.get_pos(bumped) == TileCode::Empty).then_some(bumped)
        }
        TileCode::Empty => {
            if candidate.z == 0 {
                return Some(candidate);
            }
            let below = GridPos { z: candidate.z - 1, ..candidate };
            match grid.get_pos(below) {
                TileCode::TopSurface => Some(candidate),
                TileCode::Empty if candidate.z == 1 => Some(below),
                TileCode::Empty | TileCode::NonTopSurface | TileCode::Wall => None,
            }
        }
    }
}

fn wall_candidate(
    from: GridPos,
    face: WallFace,
    dx: i32,
    dy: i32,
    dz: i32,
    grid: &OccupancyGrid,
) -> Option<(GridPos, WallFace)> {
    if !face.holds(from) {
        return None;
    }
    let z = clamp_axis(from.z, dz, grid.depth());
    let (along, across, along_len, across_len) = match face {
        WallFace::East => (dx, dy, grid.width(), grid.height()),
        WallFace::North => (dy, dx, grid.height(), grid.width()),
    };
    let along_pos = match face {
        WallFace::East => from.x,
        WallFace::North => from.y,
    };

    let (along_pos, face) = match (along, across) {
        (_, 0) => {
            let next = clamp_axis(along_pos, along, along_len);
            if next == 0 {
                // Pushing into the far wall from the corner wraps onto the other face.
                if along_pos != 1 {
                    return None;
                }
                (1, face.opposite())
            } else {
                (next, face)
            }
        }
        (0, across) if across > 0 && along_pos == 1 => {
            let next = clamp_axis(1, across, across_len);
            (next, face.opposite())
        }
        _ => return None,
    };

    let candidate = match face {
        WallFace::East => GridPos::new(along_pos, 1, z),
        WallFace::North => GridPos::new(1, along_pos, z),
    };
    (grid.get_pos(candidate) == TileCode::Empty).then_some((candidate, face))
}
