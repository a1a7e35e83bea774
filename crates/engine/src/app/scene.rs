use super::input::{ActionStates, InputAction, KeyEdge, KeyEdges};
use crate::content::AssetCatalog;
use crate::iso::{GridError, IsoView, Vec2};
use crate::room::{Room, RoomConfig};
use crate::AppPaths;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    Quit,
}

/// Input as seen by one fixed tick. Click and key edges fire in exactly one snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    quit_requested: bool,
    actions: ActionStates,
    edges: KeyEdges,
    cursor_position_px: Option<Vec2>,
    left_click_pressed: bool,
    right_click_pressed: bool,
    window_width: u32,
    window_height: u32,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        quit_requested: bool,
        actions: ActionStates,
        edges: KeyEdges,
        cursor_position_px: Option<Vec2>,
        left_click_pressed: bool,
        right_click_pressed: bool,
        window_width: u32,
        window_height: u32,
    ) -> Self {
        Self {
            quit_requested,
            actions,
            edges,
            cursor_position_px,
            left_click_pressed,
            right_click_pressed,
            window_width,
            window_height,
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    pub fn key_pressed(&self, edge: KeyEdge) -> bool {
        self.edges.is_pressed(edge)
    }

    pub fn with_quit_requested(mut self, quit_requested: bool) -> Self {
        self.quit_requested = quit_requested;
        self
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set(action, is_down);
        self
    }

    pub fn with_key_pressed(mut self, edge: KeyEdge, pressed: bool) -> Self {
        self.edges.set(edge, pressed);
        self
    }

    pub fn with_cursor_position_px(mut self, cursor_position_px: Option<Vec2>) -> Self {
        self.cursor_position_px = cursor_position_px;
        self
    }

    pub fn with_left_click_pressed(mut self, left_click_pressed: bool) -> Self {
        self.left_click_pressed = left_click_pressed;
        self
    }

    pub fn with_right_click_pressed(mut self, right_click_pressed: bool) -> Self {
        self.right_click_pressed = right_click_pressed;
        self
    }

    pub fn with_window_size(mut self, window_size: (u32, u32)) -> Self {
        self.window_width = window_size.0;
        self.window_height = window_size.1;
        self
    }

    pub fn cursor_position_px(&self) -> Option<Vec2> {
        self.cursor_position_px
    }

    pub fn left_click_pressed(&self) -> bool {
        self.left_click_pressed
    }

    pub fn right_click_pressed(&self) -> bool {
        self.right_click_pressed
    }

    pub fn window_size(&self) -> (u32, u32) {
        (self.window_width, self.window_height)
    }
}

/// Presentation-only state the scene hands to the renderer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneVisualState {
    pub hovered_cell: Option<(u32, u32)>,
    pub ghost_visible: bool,
    pub status_line: Option<String>,
}

pub struct SceneWorld {
    room: Room,
    room_config: RoomConfig,
    view: IsoView,
    window_size: (u32, u32),
    catalog: AssetCatalog,
    app_paths: AppPaths,
    visual_state: SceneVisualState,
    tick: u64,
}

impl SceneWorld {
    pub fn new(
        room_config: RoomConfig,
        catalog: AssetCatalog,
        app_paths: AppPaths,
        window_size: (u32, u32),
    ) -> Result<Self, GridError> {
        let room = Room::from_config(&room_config)?;
        let view = room_config.view_for_window(window_size);
        Ok(Self {
            room,
            room_config,
            view,
            window_size,
            catalog,
            app_paths,
            visual_state: SceneVisualState {
                ghost_visible: true,
                ..SceneVisualState::default()
            },
            tick: 0,
        })
    }

    pub fn room(&self) -> &Room {
        &self.room
    }

    pub fn room_mut(&mut self) -> &mut Room {
        &mut self.room
    }

    /// Borrows the room mutably alongside the catalog it validates against.
    pub fn room_and_catalog_mut(&mut self) -> (&mut Room, &AssetCatalog) {
        (&mut self.room, &self.catalog)
    }

    pub fn room_config(&self) -> &RoomConfig {
        &self.room_config
    }

    pub fn view(&self) -> &IsoView {
        &self.view
    }

    pub fn window_size(&self) -> (u32, u32) {
        self.window_size
    }

    /// Rebuilds the projection; zero-sized windows (minimized) keep the last view.
    pub fn set_window_size(&mut self, window_size: (u32, u32)) {
        if window_size.0 == 0 || window_size.1 == 0 || window_size == self.window_size {
            return;
        }
        self.window_size = window_size;
        self.view = self.room_config.view_for_window(window_size);
    }

    pub fn catalog(&self) -> &AssetCatalog {
        &self.catalog
    }

    pub fn app_paths(&self) -> &AppPaths {
        &self.app_paths
    }

    pub fn visual_state(&self) -> &SceneVisualState {
        &self.visual_state
    }

    pub fn set_hovered_cell(&mut self, hovered_cell: Option<(u32, u32)>) {
        self.visual_state.hovered_cell = hovered_cell;
    }

    pub fn set_ghost_visible(&mut self, visible: bool) {
        self.visual_state.ghost_visible = visible;
    }

    pub fn set_status_line(&mut self, status_line: Option<String>) {
        self.visual_state.status_line = status_line;
    }

    /// Fixed ticks run since the world was created.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub(crate) fn advance_tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }
}

pub trait Scene {
    fn load(&mut self, world: &mut SceneWorld);
    fn update(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
        world: &mut SceneWorld,
    ) -> SceneCommand;
    fn render(&mut self, world: &SceneWorld);
    fn unload(&mut self, world: &mut SceneWorld);
    fn debug_title(&self, _world: &SceneWorld) -> Option<String> {
        None
    }
}

pub(crate) struct SceneRunner {
    scene: Box<dyn Scene>,
    world: SceneWorld,
    is_loaded: bool,
}

impl SceneRunner {
    pub(crate) fn new(scene: Box<dyn Scene>, world: SceneWorld) -> Self {
        Self {
            scene,
            world,
            is_loaded: false,
        }
    }

    pub(crate) fn load(&mut self) {
        if self.is_loaded {
            return;
        }
        self.scene.load(&mut self.world);
        self.is_loaded = true;
    }

    pub(crate) fn update(&mut self, fixed_dt_seconds: f32, input: &InputSnapshot) -> SceneCommand {
        if !self.is_loaded {
            return SceneCommand::None;
        }
        let command = self.scene.update(fixed_dt_seconds, input, &mut self.world);
        self.world.advance_tick();
        command
    }

    pub(crate) fn render(&mut self) {
        self.scene.render(&self.world);
    }

    pub(crate) fn world(&self) -> &SceneWorld {
        &self.world
    }

    pub(crate) fn world_mut(&mut self) -> &mut SceneWorld {
        &mut self.world
    }

    pub(crate) fn debug_title(&self) -> Option<String> {
        self.scene.debug_title(&self.world)
    }

    pub(crate) fn shutdown(&mut self) {
        if self.is_loaded {
            self.scene.unload(&mut self.world);
            self.is_loaded = false;
        }
    }
}
