use engine::iso::{hit_test_floor, hit_test_object, hit_test_wall, AssetId, AssetKind, GridPos};
use engine::{
    AssetCatalog, InputAction, InputSnapshot, KeyEdge, Scene, SceneCommand, SceneWorld,
    SelectionChange,
};
use tracing::{debug, info, warn};

use super::storage::{self, LoadOutcome};

mod controls;

use controls::{ghost_blink_visible, MoveRepeat};

/// The single decorating scene: mouse picks cells, keys steer the ghost.
#[derive(Debug, Default)]
pub(crate) struct RoomScene {
    move_repeat: MoveRepeat,
}

impl RoomScene {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn handle_selection_keys(&mut self, input: &InputSnapshot, world: &mut SceneWorld) {
        if input.key_pressed(KeyEdge::Deselect) {
            let (room, _) = world.room_and_catalog_mut();
            if room.deselect() {
                world.set_status_line(Some("selection cleared".to_string()));
            }
        }

        let step = match (
            input.key_pressed(KeyEdge::NextAsset),
            input.key_pressed(KeyEdge::PrevAsset),
        ) {
            (true, false) => Some(1),
            (false, true) => Some(-1),
            _ => None,
        };
        if let Some(step) = step {
            let (room, catalog) = world.room_and_catalog_mut();
            let current = room.selected().map(|selected| selected.id.clone());
            let Some(next) = AssetCatalog::cycle(catalog.placeable(), current.as_ref(), step)
            else {
                world.set_status_line(Some("catalog has no furniture".to_string()));
                return;
            };
            if current.as_ref() == Some(&next) {
                return;
            }
            let status = match room.select_asset(catalog, &next) {
                Ok(SelectionChange::Selected(id)) => format!("selected {}", display_name(catalog, &id)),
                Ok(SelectionChange::Deselected) => "selection cleared".to_string(),
                Err(err) => {
                    warn!(error = %err, asset = %next, "select_failed");
                    format!("cannot select {next}: {err}")
                }
            };
            world.set_status_line(Some(status));
        }
    }

    fn handle_skin_keys(&mut self, input: &InputSnapshot, world: &mut SceneWorld) {
        let mut changed = false;
        let (room, catalog) = world.room_and_catalog_mut();
        if input.key_pressed(KeyEdge::CycleFloorSkin) {
            let next = AssetCatalog::cycle(catalog.floor_skins(), room.floor_skin(), 1);
            match room.set_floor_skin(catalog, next) {
                Ok(()) => changed = true,
                Err(err) => warn!(error = %err, "floor_skin_failed"),
            }
        }
        if input.key_pressed(KeyEdge::CycleWallSkin) {
            let next = AssetCatalog::cycle(catalog.wall_skins(), room.wall_skin(), 1);
            match room.set_wall_skin(catalog, next) {
                Ok(()) => changed = true,
                Err(err) => warn!(error = %err, "wall_skin_failed"),
            }
        }
        if changed {
            let floor = room.floor_skin().map(|id| id.to_string());
            let wall = room.wall_skin().map(|id| id.to_string());
            info!(floor = ?floor, wall = ?wall, "skins_changed");
            autosave(world);
        }
    }

    fn handle_room_keys(&mut self, input: &InputSnapshot, world: &mut SceneWorld) {
        if input.key_pressed(KeyEdge::NewRoom) {
            match world.room_mut().reset() {
                Ok(()) => {
                    world.set_status_line(Some("new room".to_string()));
                    autosave(world);
                }
                Err(err) => warn!(error = %err, "room_reset_failed"),
            }
        }
        if input.key_pressed(KeyEdge::Save) {
            save(world);
        }
        if input.key_pressed(KeyEdge::Load) {
            load(world);
        }
    }

    fn handle_clicks(&mut self, input: &InputSnapshot, world: &mut SceneWorld) {
        let Some(pointer) = input.cursor_position_px() else {
            return;
        };

        if input.left_click_pressed() {
            let view = *world.view();
            let room = world.room_mut();
            let Some(selected_kind) = room.selected().map(|selected| selected.kind) else {
                world.set_status_line(Some("select an asset with [ or ] first".to_string()));
                return;
            };
            let spawned = if selected_kind == AssetKind::WallItem {
                match hit_test_wall(pointer, room.grid(), &view) {
                    Some(hit) => room.spawn_wall_ghost(hit),
                    None => Ok(false),
                }
            } else {
                match hit_test_floor(pointer, room.grid(), &view) {
                    Some((x, y)) => room.spawn_ghost(GridPos::new(x, y, 0)),
                    None => Ok(false),
                }
            };
            match spawned {
                Ok(true) => world.set_status_line(None),
                Ok(false) => debug!(x = pointer.x, y = pointer.y, "click_missed_valid_cell"),
                Err(err) => warn!(error = %err, "ghost_spawn_failed"),
            }
        }

        if input.right_click_pressed() {
            let view = *world.view();
            let (room, catalog) = world.room_and_catalog_mut();
            let Some(position) =
                hit_test_object(pointer, room.grid(), room.placed(), &view).map(|object| object.position)
            else {
                return;
            };
            let Some(picked) = room.pick_up(position) else {
                return;
            };
            // The picked-up base becomes the selection so it can be placed again.
            let reselect = room
                .selected()
                .map_or(true, |selected| selected.id != picked.base.asset_id);
            if reselect {
                if let Err(err) = room.select_asset(catalog, &picked.base.asset_id) {
                    warn!(error = %err, "reselect_failed");
                }
            }
            let status = match &picked.stacked {
                Some(stacked) => format!(
                    "picked up {} and {}",
                    display_name(catalog, &picked.base.asset_id),
                    display_name(catalog, &stacked.asset_id)
                ),
                None => format!("picked up {}", display_name(catalog, &picked.base.asset_id)),
            };
            world.set_status_line(Some(status));
            autosave(world);
        }
    }

    fn handle_ghost_keys(&mut self, input: &InputSnapshot, world: &mut SceneWorld) {
        let room = world.room_mut();
        let moved = match self.move_repeat.step(input) {
            Some((dx, dy, dz)) => room.move_ghost(dx, dy, dz),
            None => false,
        };
        if input.key_pressed(KeyEdge::Rotate) {
            room.rotate_ghost();
        }
        room.animate_ghost(moved);

        if input.key_pressed(KeyEdge::Place) {
            if let Some(object) = room.place_ghost() {
                let name = display_name(world.catalog(), &object.asset_id);
                world.set_status_line(Some(format!("placed {name} at {}", object.position)));
                autosave(world);
            } else if room.ghost().is_some() {
                world.set_status_line(Some("cannot place here".to_string()));
            }
        }
    }
}

impl Scene for RoomScene {
    fn load(&mut self, world: &mut SceneWorld) {
        self.move_repeat = MoveRepeat::default();
        load(world);
        info!(
            assets = world.catalog().len(),
            objects = world.room().placed().len(),
            "room_scene_loaded"
        );
    }

    fn update(
        &mut self,
        _fixed_dt_seconds: f32,
        input: &InputSnapshot,
        world: &mut SceneWorld,
    ) -> SceneCommand {
        if input.quit_requested() || input.is_down(InputAction::Quit) {
            return SceneCommand::Quit;
        }

        let hovered = input
            .cursor_position_px()
            .and_then(|pointer| hit_test_floor(pointer, world.room().grid(), world.view()));
        world.set_hovered_cell(hovered);

        self.handle_selection_keys(input, world);
        self.handle_skin_keys(input, world);
        self.handle_room_keys(input, world);
        self.handle_clicks(input, world);
        self.handle_ghost_keys(input, world);

        world.set_ghost_visible(ghost_blink_visible(world.tick()));
        SceneCommand::None
    }

    fn render(&mut self, _world: &SceneWorld) {}

    fn unload(&mut self, world: &mut SceneWorld) {
        world.room_mut().discard_ghost();
        info!(objects = world.room().placed().len(), "room_scene_unloaded");
    }

    fn debug_title(&self, world: &SceneWorld) -> Option<String> {
        let room = world.room();
        let selection = room
            .selected()
            .map(|selected| display_name(world.catalog(), &selected.id))
            .unwrap_or_else(|| "nothing".to_string());
        let mut title = format!(
            "Room Designer | holding {selection} | {} objects",
            room.placed().len()
        );
        if let Some(status) = &world.visual_state().status_line {
            title.push_str(" | ");
            title.push_str(status);
        }
        Some(title)
    }
}

fn display_name(catalog: &AssetCatalog, id: &AssetId) -> String {
    catalog
        .get(id)
        .map(|def| def.name.clone())
        .unwrap_or_else(|| id.to_string())
}

fn save(world: &mut SceneWorld) {
    match storage::save_room(world.room(), &world.app_paths().save_dir) {
        Ok(path) => {
            info!(path = %path.display(), objects = world.room().placed().len(), "save_written");
            world.set_status_line(Some("saved".to_string()));
        }
        Err(err) => {
            warn!(error = %err, "save_failed");
            world.set_status_line(Some(format!("save failed: {err}")));
        }
    }
}

fn autosave(world: &mut SceneWorld) {
    if let Err(err) = storage::save_room(world.room(), &world.app_paths().save_dir) {
        warn!(error = %err, "autosave_failed");
        world.set_status_line(Some(format!("autosave failed: {err}")));
    }
}

fn load(world: &mut SceneWorld) {
    let save_dir = world.app_paths().save_dir.clone();
    let (room, catalog) = world.room_and_catalog_mut();
    let status = match storage::load_room(room, catalog, &save_dir) {
        Ok(LoadOutcome::Loaded { path, objects }) => {
            info!(path = %path.display(), objects, "load_applied");
            format!("loaded {objects} objects")
        }
        Ok(LoadOutcome::NoSaveFile { path }) => {
            info!(path = %path.display(), "load_skipped_no_save");
            return;
        }
        Err(err) => {
            warn!(error = %err, "load_failed");
            format!("load failed: {err}")
        }
    };
    world.set_status_line(Some(status));
}

pub(crate) fn build_room_scene() -> Box<dyn Scene> {
    Box::new(RoomScene::new())
}

#[cfg(test)]
mod tests;
