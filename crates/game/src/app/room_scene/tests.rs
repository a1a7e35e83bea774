use std::fs;

use engine::iso::{
    exposed_wall_faces, floor_tile_center, object_pick_center, wall_face_quad, AssetKind, Vec2,
    WallFace,
};
use engine::{AppPaths, AssetCategory, AssetDefinition, Room, RoomConfig};
use tempfile::TempDir;

use super::*;
use crate::app::storage::save_file_path;

fn def(id: &str, name: &str, category: AssetCategory) -> AssetDefinition {
    AssetDefinition {
        id: AssetId::new(id),
        name: name.to_string(),
        description: String::new(),
        category,
        price: 20,
        sprite_sheet: format!("furniture/{id}"),
    }
}

fn test_catalog() -> AssetCatalog {
    AssetCatalog::from_definitions(vec![
        def("table", "Oak Table", AssetCategory::Furniture(AssetKind::FloorItem)),
        def("vase", "Blue Vase", AssetCategory::Furniture(AssetKind::SurfaceItem)),
        def("painting", "Harbor Painting", AssetCategory::Furniture(AssetKind::WallItem)),
        def("oak_floor", "Oak Floor", AssetCategory::FloorSkin),
        def("brick_wall", "Brick Wall", AssetCategory::WallSkin),
    ])
}

fn test_world(temp: &TempDir) -> SceneWorld {
    let paths = AppPaths::from_root(temp.path().to_path_buf());
    fs::create_dir_all(&paths.save_dir).expect("save dir");
    SceneWorld::new(RoomConfig::default(), test_catalog(), paths, (1280, 720)).expect("world")
}

fn cell_pointer(world: &SceneWorld, x: u32, y: u32) -> Vec2 {
    floor_tile_center(world.view(), x, y, 0)
}

fn tick(scene: &mut RoomScene, world: &mut SceneWorld, input: InputSnapshot) -> SceneCommand {
    scene.update(1.0 / 15.0, &input, world)
}

fn press(edge: KeyEdge) -> InputSnapshot {
    InputSnapshot::empty().with_key_pressed(edge, true)
}

fn left_click_at(pointer: Vec2) -> InputSnapshot {
    InputSnapshot::empty()
        .with_cursor_position_px(Some(pointer))
        .with_left_click_pressed(true)
}

fn right_click_at(pointer: Vec2) -> InputSnapshot {
    InputSnapshot::empty()
        .with_cursor_position_px(Some(pointer))
        .with_right_click_pressed(true)
}

fn select(scene: &mut RoomScene, world: &mut SceneWorld, id: &str) {
    for _ in 0..world.catalog().len() {
        if world.room().selected().map(|selected| selected.id.as_str()) == Some(id) {
            return;
        }
        tick(scene, world, press(KeyEdge::NextAsset));
    }
    panic!("could not select {id}");
}

fn place_table_at(scene: &mut RoomScene, world: &mut SceneWorld, x: u32, y: u32) {
    select(scene, world, "table");
    let pointer = cell_pointer(world, x, y);
    tick(scene, world, left_click_at(pointer));
    tick(scene, world, press(KeyEdge::Place));
}

#[test]
fn escape_and_window_close_quit() {
    let temp = TempDir::new().expect("temp");
    let mut world = test_world(&temp);
    let mut scene = RoomScene::new();

    let escape = InputSnapshot::empty().with_action_down(InputAction::Quit, true);
    assert_eq!(tick(&mut scene, &mut world, escape), SceneCommand::Quit);
    let close = InputSnapshot::empty().with_quit_requested(true);
    assert_eq!(tick(&mut scene, &mut world, close), SceneCommand::Quit);
    assert_eq!(
        tick(&mut scene, &mut world, InputSnapshot::empty()),
        SceneCommand::None
    );
}

#[test]
fn click_without_selection_only_reports_status() {
    let temp = TempDir::new().expect("temp");
    let mut world = test_world(&temp);
    let mut scene = RoomScene::new();

    let pointer = cell_pointer(&world, 4, 4);
    tick(&mut scene, &mut world, left_click_at(pointer));

    assert!(world.room().ghost().is_none());
    assert!(world.visual_state().status_line.is_some());
}

#[test]
fn bracket_keys_cycle_through_placeable_assets() {
    let temp = TempDir::new().expect("temp");
    let mut world = test_world(&temp);
    let mut scene = RoomScene::new();

    tick(&mut scene, &mut world, press(KeyEdge::NextAsset));
    assert_eq!(world.room().selected().map(|s| s.id.as_str()), Some("table"));
    tick(&mut scene, &mut world, press(KeyEdge::NextAsset));
    assert_eq!(world.room().selected().map(|s| s.id.as_str()), Some("vase"));
    tick(&mut scene, &mut world, press(KeyEdge::PrevAsset));
    tick(&mut scene, &mut world, press(KeyEdge::PrevAsset));
    assert_eq!(world.room().selected().map(|s| s.id.as_str()), Some("painting"));

    tick(&mut scene, &mut world, press(KeyEdge::Deselect));
    assert!(world.room().selected().is_none());
}

#[test]
fn click_spawns_ghost_and_arrows_move_it() {
    let temp = TempDir::new().expect("temp");
    let mut world = test_world(&temp);
    let mut scene = RoomScene::new();
    select(&mut scene, &mut world, "table");

    let pointer = cell_pointer(&world, 4, 4);
    tick(&mut scene, &mut world, left_click_at(pointer));
    let ghost = world.room().ghost().expect("ghost");
    assert_eq!(ghost.position, GridPos::new(4, 4, 0));

    let left = InputSnapshot::empty().with_action_down(InputAction::MoveLeft, true);
    tick(&mut scene, &mut world, left);
    assert_eq!(
        world.room().ghost().map(|ghost| ghost.position),
        Some(GridPos::new(3, 4, 0))
    );
    // Held key waits out the repeat delay before the next step.
    tick(&mut scene, &mut world, left);
    assert_eq!(
        world.room().ghost().map(|ghost| ghost.position),
        Some(GridPos::new(3, 4, 0))
    );
    tick(&mut scene, &mut world, left);
    assert_eq!(
        world.room().ghost().map(|ghost| ghost.position),
        Some(GridPos::new(2, 4, 0))
    );
}

#[test]
fn hover_tracks_the_floor_cell_under_the_cursor() {
    let temp = TempDir::new().expect("temp");
    let mut world = test_world(&temp);
    let mut scene = RoomScene::new();

    let pointer = cell_pointer(&world, 6, 2);
    let hover = InputSnapshot::empty().with_cursor_position_px(Some(pointer));
    tick(&mut scene, &mut world, hover);
    assert_eq!(world.visual_state().hovered_cell, Some((6, 2)));

    tick(&mut scene, &mut world, InputSnapshot::empty());
    assert_eq!(world.visual_state().hovered_cell, None);
}

#[test]
fn placing_autosaves_the_room() {
    let temp = TempDir::new().expect("temp");
    let mut world = test_world(&temp);
    let mut scene = RoomScene::new();

    place_table_at(&mut scene, &mut world, 5, 5);

    assert!(world.room().ghost().is_none());
    assert_eq!(world.room().placed().len(), 1);
    let save_path = save_file_path(&world.app_paths().save_dir);
    let raw = fs::read_to_string(save_path).expect("autosave written");
    assert!(raw.contains("\"table\""), "{raw}");
}

#[test]
fn surface_item_click_on_table_lands_on_top() {
    let temp = TempDir::new().expect("temp");
    let mut world = test_world(&temp);
    let mut scene = RoomScene::new();
    place_table_at(&mut scene, &mut world, 5, 5);

    select(&mut scene, &mut world, "vase");
    let pointer = cell_pointer(&world, 5, 5);
    tick(&mut scene, &mut world, left_click_at(pointer));
    assert_eq!(
        world.room().ghost().map(|ghost| ghost.position),
        Some(GridPos::new(5, 5, 1))
    );
}

#[test]
fn right_click_picks_up_and_reselects_the_object() {
    let temp = TempDir::new().expect("temp");
    let mut world = test_world(&temp);
    let mut scene = RoomScene::new();
    place_table_at(&mut scene, &mut world, 5, 5);
    select(&mut scene, &mut world, "vase");

    let object = world.room().placed()[0].clone();
    let pointer = object_pick_center(world.view(), &object);
    tick(&mut scene, &mut world, right_click_at(pointer));

    assert!(world.room().placed().is_empty());
    assert_eq!(world.room().selected().map(|s| s.id.as_str()), Some("table"));
    let status = world.visual_state().status_line.clone().unwrap_or_default();
    assert!(status.contains("Oak Table"), "{status}");

    let mut reloaded = Room::from_config(world.room_config()).expect("room");
    let outcome = storage::load_room(&mut reloaded, world.catalog(), &world.app_paths().save_dir)
        .expect("load");
    assert!(matches!(outcome, LoadOutcome::Loaded { objects: 0, .. }));
}

#[test]
fn wall_items_attach_to_the_clicked_wall_face() {
    let temp = TempDir::new().expect("temp");
    let mut world = test_world(&temp);
    let mut scene = RoomScene::new();
    select(&mut scene, &mut world, "painting");

    let hit = exposed_wall_faces(world.room().grid())
        .find(|hit| hit.face == WallFace::East && hit.position.x == 5 && hit.position.z == 0)
        .expect("east wall face");
    let quad = wall_face_quad(world.view(), hit.position, hit.face);
    let centroid = Vec2::new(
        quad.iter().map(|corner| corner.x).sum::<f32>() / 4.0,
        quad.iter().map(|corner| corner.y).sum::<f32>() / 4.0,
    );
    tick(&mut scene, &mut world, left_click_at(centroid));

    let ghost = world.room().ghost().expect("wall ghost");
    assert_eq!(ghost.kind, AssetKind::WallItem);
    assert!(ghost.wall_face().is_some());
}

#[test]
fn skin_keys_cycle_and_persist() {
    let temp = TempDir::new().expect("temp");
    let mut world = test_world(&temp);
    let mut scene = RoomScene::new();

    tick(&mut scene, &mut world, press(KeyEdge::CycleFloorSkin));
    tick(&mut scene, &mut world, press(KeyEdge::CycleWallSkin));
    assert_eq!(world.room().floor_skin(), Some(&AssetId::new("oak_floor")));
    assert_eq!(world.room().wall_skin(), Some(&AssetId::new("brick_wall")));

    let raw = fs::read_to_string(save_file_path(&world.app_paths().save_dir)).expect("save");
    assert!(raw.contains("oak_floor"), "{raw}");
}

#[test]
fn new_room_key_clears_objects_and_keeps_selection() {
    let temp = TempDir::new().expect("temp");
    let mut world = test_world(&temp);
    let mut scene = RoomScene::new();
    place_table_at(&mut scene, &mut world, 5, 5);
    select(&mut scene, &mut world, "vase");

    tick(&mut scene, &mut world, press(KeyEdge::NewRoom));
    assert!(world.room().placed().is_empty());
    assert_eq!(world.room().selected().map(|s| s.id.as_str()), Some("vase"));
}

#[test]
fn scene_load_restores_the_previous_session() {
    let temp = TempDir::new().expect("temp");
    {
        let mut world = test_world(&temp);
        let mut scene = RoomScene::new();
        place_table_at(&mut scene, &mut world, 5, 5);
        place_table_at(&mut scene, &mut world, 7, 3);
        assert_eq!(world.room().placed().len(), 2);
    }

    let mut world = test_world(&temp);
    let mut scene = RoomScene::new();
    scene.load(&mut world);
    assert_eq!(world.room().placed().len(), 2);
    assert_eq!(
        world.visual_state().status_line.as_deref(),
        Some("loaded 2 objects")
    );
}

#[test]
fn corrupt_save_leaves_room_empty_and_reports() {
    let temp = TempDir::new().expect("temp");
    let mut world = test_world(&temp);
    fs::write(save_file_path(&world.app_paths().save_dir), "{ not json").expect("write");

    let mut scene = RoomScene::new();
    scene.load(&mut world);
    assert!(world.room().placed().is_empty());
    let status = world.visual_state().status_line.clone().unwrap_or_default();
    assert!(status.starts_with("load failed"), "{status}");
}

#[test]
fn debug_title_names_the_selection() {
    let temp = TempDir::new().expect("temp");
    let mut world = test_world(&temp);
    let mut scene = RoomScene::new();
    assert_eq!(
        scene.debug_title(&world).as_deref(),
        Some("Room Designer | holding nothing | 0 objects")
    );

    select(&mut scene, &mut world, "painting");
    let title = scene.debug_title(&world).unwrap_or_default();
    assert!(title.contains("holding Harbor Painting"), "{title}");
}
