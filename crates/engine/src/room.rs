use thiserror::Error;
use tracing::{debug, info};

use crate::content::{AssetCatalog, AssetCategory};
use crate::iso::{
    attempt_move, pick_up, place, rotate, wall_attachment_cell, AssetId, AssetKind, Drawable,
    GhostObject, GridError, GridPos, IsoProjection, IsoView, OccupancyGrid, Orientation, PickedUp,
    PlacedObject, TileCode, Vec2, WallFace, WallHit, DEFAULT_BASE_TILE_WIDTH_PX,
    DEFAULT_LAYER_SPACING, DEFAULT_REFERENCE_RESOLUTION,
};

#[derive(Debug, Clone, PartialEq)]
pub struct RoomConfig {
    pub grid_width: u32,
    pub grid_height: u32,
    pub grid_depth: u32,
    pub base_tile_width: u32,
    pub reference_resolution: (u32, u32),
    pub layer_spacing: f32,
    /// Grid origin as a fraction of the window size.
    pub camera_anchor: (f32, f32),
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            grid_width: 12,
            grid_height: 12,
            grid_depth: 5,
            base_tile_width: DEFAULT_BASE_TILE_WIDTH_PX,
            reference_resolution: DEFAULT_REFERENCE_RESOLUTION,
            layer_spacing: DEFAULT_LAYER_SPACING,
            camera_anchor: (0.5, 0.37),
        }
    }
}

impl RoomConfig {
    pub fn view_for_window(&self, window_size: (u32, u32)) -> IsoView {
        let projection = IsoProjection::for_display(
            self.base_tile_width,
            window_size,
            self.reference_resolution,
            self.layer_spacing,
        );
        let camera_offset = Vec2::new(
            (window_size.0 as f32 * self.camera_anchor.0).round(),
            (window_size.1 as f32 * self.camera_anchor.1).round(),
        );
        IsoView::new(projection, camera_offset)
    }
}

/// Persisted form of a placed object; the kind is resolved from the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementRecord {
    pub position: GridPos,
    pub orientation: Orientation,
    pub asset_id: AssetId,
}

impl From<&PlacedObject> for PlacementRecord {
    fn from(object: &PlacedObject) -> Self {
        Self {
            position: object.position,
            orientation: object.orientation,
            asset_id: object.asset_id.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlacementError {
    #[error("asset '{id}' is not in the catalog")]
    UnknownAsset { id: AssetId },
    #[error("asset '{id}' is a {found}, expected {expected}")]
    WrongCategory {
        id: AssetId,
        expected: &'static str,
        found: &'static str,
    },
    #[error("no asset is selected")]
    NoSelection,
    #[error("object {index} at {position} lies outside the room")]
    OutOfBounds { index: usize, position: GridPos },
    #[error("object {index} at {position} overlaps a {found:?} cell")]
    CellOccupied {
        index: usize,
        position: GridPos,
        found: TileCode,
    },
    #[error("object {index} at {position} cannot rest there: {reason}")]
    InvalidResting {
        index: usize,
        position: GridPos,
        reason: &'static str,
    },
    #[error(transparent)]
    Grid(#[from] GridError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedAsset {
    pub id: AssetId,
    pub kind: AssetKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionChange {
    Selected(AssetId),
    Deselected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomDrawable {
    Floor,
    Wall,
    /// Index into [`Room::placed`].
    Object(usize),
    Ghost,
}

/// One decorating session: the occupancy grid, its placed objects and at most one ghost.
#[derive(Debug, Clone)]
pub struct Room {
    grid: OccupancyGrid,
    placed: Vec<PlacedObject>,
    ghost: Option<GhostObject>,
    selected: Option<SelectedAsset>,
    floor_skin: Option<AssetId>,
    wall_skin: Option<AssetId>,
}

impl Room {
    pub fn create(width: u32, height: u32, depth: u32) -> Result<Self, GridError> {
        let grid = OccupancyGrid::create(width, height, depth)?;
        info!(width, height, depth, "room_created");
        Ok(Self {
            grid,
            placed: Vec::new(),
            ghost: None,
            selected: None,
            floor_skin: None,
            wall_skin: None,
        })
    }

    pub fn from_config(config: &RoomConfig) -> Result<Self, GridError> {
        Self::create(config.grid_width, config.grid_height, config.grid_depth)
    }

    pub fn grid(&self) -> &OccupancyGrid {
        &self.grid
    }

    pub fn placed(&self) -> &[PlacedObject] {
        &self.placed
    }

    pub fn ghost(&self) -> Option<&GhostObject> {
        self.ghost.as_ref()
    }

    pub fn selected(&self) -> Option<&SelectedAsset> {
        self.selected.as_ref()
    }

    pub fn floor_skin(&self) -> Option<&AssetId> {
        self.floor_skin.as_ref()
    }

    pub fn wall_skin(&self) -> Option<&AssetId> {
        self.wall_skin.as_ref()
    }

    pub fn records(&self) -> Vec<PlacementRecord> {
        self.placed.iter().map(PlacementRecord::from).collect()
    }

    /// Selecting the current asset again deselects it. Either way the ghost is dropped.
    pub fn select_asset(
        &mut self,
        catalog: &AssetCatalog,
        id: &AssetId,
    ) -> Result<SelectionChange, PlacementError> {
        let kind = placeable_kind(catalog, id)?;
        self.ghost = None;
        if self.selected.as_ref().is_some_and(|selected| &selected.id == id) {
            self.selected = None;
            info!(asset = %id, "asset_deselected");
            return Ok(SelectionChange::Deselected);
        }
        self.selected = Some(SelectedAsset {
            id: id.clone(),
            kind,
        });
        info!(asset = %id, kind = %kind, "asset_selected");
        Ok(SelectionChange::Selected(id.clone()))
    }

    pub fn deselect(&mut self) -> bool {
        self.ghost = None;
        self.selected.take().is_some()
    }

    /// Replaces the ghost with a new one of the selected asset at `position`.
    ///
    /// Returns `Ok(false)` when the selected asset cannot stand there.
    pub fn spawn_ghost(&mut self, position: GridPos) -> Result<bool, PlacementError> {
        let selected = self.selected.as_ref().ok_or(PlacementError::NoSelection)?;
        if !self.grid.contains_pos(position) {
            return Ok(false);
        }
        let ghost = GhostObject::new(selected.id.clone(), selected.kind, position);
        Ok(self.install_ghost(ghost))
    }

    /// Spawns a wall item ghost on the floor cell in front of `hit`.
    pub fn spawn_wall_ghost(&mut self, hit: WallHit) -> Result<bool, PlacementError> {
        let selected = self.selected.as_ref().ok_or(PlacementError::NoSelection)?;
        if selected.kind != AssetKind::WallItem {
            return Ok(false);
        }
        let Some(cell) = wall_attachment_cell(hit, &self.grid) else {
            return Ok(false);
        };
        let ghost = GhostObject::new(selected.id.clone(), selected.kind, cell)
            .with_orientation(Orientation::new(hit.face.col(), 0));
        Ok(self.install_ghost(ghost))
    }

    fn install_ghost(&mut self, mut ghost: GhostObject) -> bool {
        // A null move snaps the ghost to where its rules let it rest.
        if !attempt_move(&mut ghost, 0, 0, 0, &self.grid) {
            debug!(position = %ghost.position, asset = %ghost.asset_id, "ghost_spawn_rejected");
            return false;
        }
        info!(position = %ghost.position, asset = %ghost.asset_id, "ghost_spawned");
        self.ghost = Some(ghost);
        true
    }

    pub fn discard_ghost(&mut self) -> bool {
        let discarded = self.ghost.take();
        if let Some(ghost) = &discarded {
            info!(asset = %ghost.asset_id, "ghost_discarded");
        }
        discarded.is_some()
    }

    pub fn move_ghost(&mut self, dx: i32, dy: i32, dz: i32) -> bool {
        let Some(ghost) = self.ghost.as_mut() else {
            return false;
        };
        let moved = attempt_move(ghost, dx, dy, dz, &self.grid);
        if !moved {
            debug!(dx, dy, dz, position = %ghost.position, "move_rejected");
        }
        moved
    }

    pub fn animate_ghost(&mut self, moving: bool) {
        if let Some(ghost) = self.ghost.as_mut() {
            ghost.animate(moving);
        }
    }

    pub fn rotate_ghost(&mut self) -> bool {
        match self.ghost.as_mut() {
            Some(ghost) => rotate(ghost, &self.grid),
            None => false,
        }
    }

    /// Places the ghost. On success the ghost is consumed and the new object returned.
    pub fn place_ghost(&mut self) -> Option<PlacedObject> {
        let ghost = self.ghost.as_mut()?;
        if !place(ghost, &mut self.grid) {
            debug!(position = %ghost.position, "place_rejected");
            return None;
        }
        let object = ghost.to_placed();
        self.ghost = None;
        info!(
            x = object.position.x,
            y = object.position.y,
            z = object.position.z,
            asset = %object.asset_id,
            "object_placed"
        );
        self.placed.push(object.clone());
        Some(object)
    }

    pub fn pick_up(&mut self, position: GridPos) -> Option<PickedUp> {
        let picked = pick_up(position, &mut self.grid, &mut self.placed)?;
        info!(
            x = position.x,
            y = position.y,
            z = position.z,
            asset = %picked.base.asset_id,
            stacked = picked.stacked.is_some(),
            "object_picked_up"
        );
        Some(picked)
    }

    /// Empties the room, keeping selection and skins.
    pub fn reset(&mut self) -> Result<(), GridError> {
        let (width, height, depth) = self.grid.dimensions();
        self.grid = OccupancyGrid::create(width, height, depth)?;
        self.placed.clear();
        self.ghost = None;
        info!(width, height, depth, "room_reset");
        Ok(())
    }

    pub fn set_floor_skin(
        &mut self,
        catalog: &AssetCatalog,
        id: Option<AssetId>,
    ) -> Result<(), PlacementError> {
        if let Some(id) = &id {
            expect_category(catalog, id, AssetCategory::FloorSkin)?;
        }
        self.floor_skin = id;
        Ok(())
    }

    pub fn set_wall_skin(
        &mut self,
        catalog: &AssetCatalog,
        id: Option<AssetId>,
    ) -> Result<(), PlacementError> {
        if let Some(id) = &id {
            expect_category(catalog, id, AssetCategory::WallSkin)?;
        }
        self.wall_skin = id;
        Ok(())
    }

    /// Rebuilds the room from saved records, or leaves it untouched on error.
    pub fn restore(
        &mut self,
        catalog: &AssetCatalog,
        records: &[PlacementRecord],
        floor_skin: Option<AssetId>,
        wall_skin: Option<AssetId>,
    ) -> Result<(), PlacementError> {
        if let Some(id) = &floor_skin {
            expect_category(catalog, id, AssetCategory::FloorSkin)?;
        }
        if let Some(id) = &wall_skin {
            expect_category(catalog, id, AssetCategory::WallSkin)?;
        }

        let (width, height, depth) = self.grid.dimensions();
        let mut grid = OccupancyGrid::create(width, height, depth)?;
        let mut placed = Vec::with_capacity(records.len());

        for (index, record) in records.iter().enumerate() {
            let kind = placeable_kind(catalog, &record.asset_id)?;
            let position = record.position;
            if !grid.contains_pos(position) {
                return Err(PlacementError::OutOfBounds { index, position });
            }
            let found = grid.get_pos(position);
            if found != TileCode::Empty {
                return Err(PlacementError::CellOccupied {
                    index,
                    position,
                    found,
                });
            }
            check_resting_shape(index, kind, record)?;

            let mut ghost = GhostObject::new(record.asset_id.clone(), kind, position)
                .with_orientation(record.orientation);
            if !place(&mut ghost, &mut grid) {
                return Err(PlacementError::CellOccupied {
                    index,
                    position,
                    found: grid.get_pos(position),
                });
            }
            placed.push(ghost.to_placed());
        }

        for (index, object) in placed.iter().enumerate() {
            if object.kind != AssetKind::SurfaceItem || object.position.z == 0 {
                continue;
            }
            let below = GridPos {
                z: object.position.z - 1,
                ..object.position
            };
            if grid.get_pos(below) != TileCode::TopSurface {
                return Err(PlacementError::InvalidResting {
                    index,
                    position: object.position,
                    reason: "surface item above the floor needs a top surface below it",
                });
            }
        }

        self.grid = grid;
        self.placed = placed;
        self.ghost = None;
        self.floor_skin = floor_skin;
        self.wall_skin = wall_skin;
        info!(objects = self.placed.len(), "room_restored");
        Ok(())
    }

    /// Everything to paint this frame, not yet depth sorted.
    pub fn drawables(&self) -> Vec<Drawable<RoomDrawable>> {
        let (width, height, _) = self.grid.dimensions();
        let mut drawables = Vec::new();
        for x in 0..width {
            for y in 0..height {
                if self.grid.get(x, y, 0) != TileCode::Wall {
                    drawables.push(Drawable::floor_tile(x, y, RoomDrawable::Floor));
                }
            }
        }
        for (position, code) in self.grid.iter() {
            if code == TileCode::Wall {
                drawables.push(Drawable::wall_segment(position, RoomDrawable::Wall));
            }
        }
        for (index, object) in self.placed.iter().enumerate() {
            let pos = object.position;
            drawables.push(Drawable::sprite(
                pos.x,
                pos.y,
                Some(pos.z),
                RoomDrawable::Object(index),
            ));
        }
        if let Some(ghost) = &self.ghost {
            let pos = ghost.position;
            drawables.push(Drawable::sprite(pos.x, pos.y, Some(pos.z), RoomDrawable::Ghost));
        }
        drawables
    }
}

fn placeable_kind(catalog: &AssetCatalog, id: &AssetId) -> Result<AssetKind, PlacementError> {
    let def = catalog
        .get(id)
        .ok_or_else(|| PlacementError::UnknownAsset { id: id.clone() })?;
    def.category
        .placeable_kind()
        .ok_or_else(|| PlacementError::WrongCategory {
            id: id.clone(),
            expected: "placeable item",
            found: category_label(def.category),
        })
}

fn expect_category(
    catalog: &AssetCatalog,
    id: &AssetId,
    expected: AssetCategory,
) -> Result<(), PlacementError> {
    let def = catalog
        .get(id)
        .ok_or_else(|| PlacementError::UnknownAsset { id: id.clone() })?;
    if def.category != expected {
        return Err(PlacementError::WrongCategory {
            id: id.clone(),
            expected: category_label(expected),
            found: category_label(def.category),
        });
    }
    Ok(())
}

fn category_label(category: AssetCategory) -> &'static str {
    match category {
        AssetCategory::Furniture(kind) => kind.as_str(),
        AssetCategory::FloorSkin => "floor skin",
        AssetCategory::WallSkin => "wall skin",
    }
}

fn check_resting_shape(
    index: usize,
    kind: AssetKind,
    record: &PlacementRecord,
) -> Result<(), PlacementError> {
    let position = record.position;
    let invalid = |reason| PlacementError::InvalidResting {
        index,
        position,
        reason,
    };
    match kind {
        kind if kind.is_floor_standing() && position.z != 0 => {
            Err(invalid("floor-standing items must stay on layer 0"))
        }
        AssetKind::WallItem => match WallFace::from_col(record.orientation.col) {
            Some(face) if face.holds(position) => Ok(()),
            Some(_) => Err(invalid("wall item is not next to the wall it faces")),
            None => Err(invalid("wall item orientation must name a wall face")),
        },
        _ => Ok(()),
    }
}
