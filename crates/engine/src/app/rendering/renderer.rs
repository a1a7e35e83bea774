use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::ImageReader;
use pixels::{Error, Pixels, SurfaceTexture};
use tracing::warn;
use winit::window::Window;

use crate::app::SceneWorld;
use crate::content::AssetDefinition;
use crate::iso::{
    render_order, wall_face_quad, AssetId, AssetKind, GridPos, IsoView, OccupancyGrid,
    Orientation, Vec2, WallFace,
};
use crate::room::RoomDrawable;
use crate::sprite_sheets::{sheet_cell_rect, sprite_sheet_path};

use super::raster::{
    clear, diamond, draw_polygon_outline, draw_sprite_cell_anchored, fill_polygon, shade,
    LoadedSprite,
};

const CLEAR_COLOR: [u8; 4] = [20, 22, 28, 255];
const FLOOR_PALETTE: [[u8; 4]; 4] = [
    [150, 122, 92, 255],
    [196, 190, 178, 255],
    [112, 134, 104, 255],
    [86, 96, 124, 255],
];
const WALL_PALETTE: [[u8; 4]; 4] = [
    [214, 206, 190, 255],
    [170, 196, 206, 255],
    [222, 184, 170, 255],
    [150, 150, 160, 255],
];
const FLOOR_CHECKER_SHADE: f32 = 0.92;
const FLOOR_EDGE_SHADE: f32 = 0.8;
const EAST_FACE_SHADE: f32 = 0.9;
const NORTH_FACE_SHADE: f32 = 0.72;
const WALL_EDGE_SHADE: f32 = 0.6;
const LEFT_SIDE_SHADE: f32 = 0.75;
const RIGHT_SIDE_SHADE: f32 = 0.6;
const GHOST_TINT: f32 = 1.25;
const HOVER_HIGHLIGHT_COLOR: [u8; 4] = [255, 210, 70, 255];
const WALL_PANEL_INSET: f32 = 0.25;

pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    width: u32,
    height: u32,
    sprites_dir: PathBuf,
    sprite_cache: HashMap<String, Option<LoadedSprite>>,
    warned_missing_sprite_keys: HashSet<String>,
}

impl Renderer {
    pub fn new(window: Arc<Window>, sprites_dir: PathBuf) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            width: size.width,
            height: size.height,
            sprites_dir,
            sprite_cache: HashMap::new(),
            warned_missing_sprite_keys: HashSet::new(),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        self.width = width;
        self.height = height;
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width, height, window);
        Pixels::new(width, height, surface)
    }

    pub(crate) fn render_world(&mut self, world: &SceneWorld) -> Result<(), Error> {
        if self.width == 0 || self.height == 0 {
            return Ok(());
        }

        let room = world.room();
        let catalog = world.catalog();
        let view = world.view();

        let sheet_for = |id: &AssetId| catalog.get(id).map(|def| def.sprite_sheet.as_str());
        let mut sheet_keys: Vec<&str> = room
            .placed()
            .iter()
            .filter_map(|object| sheet_for(&object.asset_id))
            .collect();
        if let Some(key) = room.ghost().and_then(|ghost| sheet_for(&ghost.asset_id)) {
            sheet_keys.push(key);
        }
        for key in sheet_keys {
            ensure_sprite_cached(
                &mut self.sprite_cache,
                &mut self.warned_missing_sprite_keys,
                &self.sprites_dir,
                key,
            );
        }

        let sprite_cache = &self.sprite_cache;
        let sprite_for = |id: &AssetId| {
            sheet_for(id)
                .and_then(|key| sprite_cache.get(key))
                .and_then(Option::as_ref)
        };
        let floor_color = skin_color(&FLOOR_PALETTE, catalog.floor_skins(), room.floor_skin());
        let wall_color = skin_color(&WALL_PALETTE, catalog.wall_skins(), room.wall_skin());
        let (width, height) = (self.width, self.height);
        let frame = self.pixels.frame_mut();
        clear(frame, CLEAR_COLOR);

        for drawable in render_order(room.drawables()) {
            match drawable.payload {
                RoomDrawable::Floor => {
                    let color = if (drawable.x + drawable.y) % 2 == 0 {
                        floor_color
                    } else {
                        shade(floor_color, FLOOR_CHECKER_SHADE)
                    };
                    draw_floor_tile(frame, width, height, view, drawable.x, drawable.y, color);
                }
                RoomDrawable::Wall => {
                    let position = GridPos::new(drawable.x, drawable.y, drawable.z.unwrap_or(0));
                    draw_wall_segment(frame, width, height, view, room.grid(), position, wall_color);
                }
                RoomDrawable::Object(index) => {
                    let Some(object) = room.placed().get(index) else {
                        continue;
                    };
                    let item = ItemVisual {
                        position: object.position,
                        kind: object.kind,
                        orientation: object.orientation,
                        sheet_cell: (object.orientation.col, object.orientation.row),
                        tint: 1.0,
                    };
                    draw_item(frame, width, height, view, &item, sprite_for(&object.asset_id));
                }
                RoomDrawable::Ghost => {
                    let Some(ghost) = room.ghost() else {
                        continue;
                    };
                    if !world.visual_state().ghost_visible {
                        continue;
                    }
                    let item = ItemVisual {
                        position: ghost.position,
                        kind: ghost.kind,
                        orientation: ghost.orientation,
                        sheet_cell: (ghost.orientation.col, ghost.animation.frame),
                        tint: GHOST_TINT,
                    };
                    draw_item(frame, width, height, view, &item, sprite_for(&ghost.asset_id));
                }
            }
        }

        if let Some((x, y)) = world.visual_state().hovered_cell {
            let projection = &view.projection;
            let corners = diamond(
                view.cell_to_screen(x, y, 0),
                projection.half_tile_width(),
                projection.half_tile_height(),
            );
            draw_polygon_outline(frame, width, &corners, HOVER_HIGHLIGHT_COLOR);
        }

        self.pixels.render()
    }
}

/// What the renderer needs to paint one placed object or the ghost.
#[derive(Debug, Clone, Copy)]
struct ItemVisual {
    position: GridPos,
    kind: AssetKind,
    orientation: Orientation,
    sheet_cell: (u32, u32),
    tint: f32,
}

fn skin_color<'a>(
    palette: &[[u8; 4]],
    skins: impl Iterator<Item = &'a AssetDefinition>,
    active: Option<&AssetId>,
) -> [u8; 4] {
    let index = active
        .and_then(|id| skins.into_iter().position(|def| &def.id == id))
        .unwrap_or(0);
    palette[index % palette.len()]
}

fn draw_floor_tile(
    frame: &mut [u8],
    width: u32,
    height: u32,
    view: &IsoView,
    x: u32,
    y: u32,
    color: [u8; 4],
) {
    let projection = &view.projection;
    let corners = diamond(
        view.cell_to_screen(x, y, 0),
        projection.half_tile_width(),
        projection.half_tile_height(),
    );
    fill_polygon(frame, width, height, &corners, color);
    draw_polygon_outline(frame, width, &corners, shade(color, FLOOR_EDGE_SHADE));
}

/// Faces of `wall` that look onto an in-bounds, non-wall cell.
fn visible_faces(grid: &OccupancyGrid, wall: GridPos) -> impl Iterator<Item = WallFace> + '_ {
    WallFace::ALL
        .into_iter()
        .filter(move |face| face.is_exposed(grid, wall))
}

fn draw_wall_segment(
    frame: &mut [u8],
    width: u32,
    height: u32,
    view: &IsoView,
    grid: &OccupancyGrid,
    wall: GridPos,
    color: [u8; 4],
) {
    for face in visible_faces(grid, wall) {
        let face_color = match face {
            WallFace::East => shade(color, EAST_FACE_SHADE),
            WallFace::North => shade(color, NORTH_FACE_SHADE),
        };
        let quad = wall_face_quad(view, wall, face);
        fill_polygon(frame, width, height, &quad, face_color);
        draw_polygon_outline(frame, width, &quad, shade(face_color, WALL_EDGE_SHADE));
    }
}

fn draw_item(
    frame: &mut [u8],
    width: u32,
    height: u32,
    view: &IsoView,
    item: &ItemVisual,
    sprite: Option<&LoadedSprite>,
) {
    let projection = &view.projection;
    let pos = item.position;
    let top = view.cell_to_screen(pos.x, pos.y, pos.z);
    let base_anchor = top.offset(0.0, projection.tile_height());

    if let Some(sprite) = sprite {
        let (col, row) = item.sheet_cell;
        if let Some(cell) = sheet_cell_rect(sprite.width, sprite.height, col, row) {
            draw_sprite_cell_anchored(
                frame,
                width,
                height,
                sprite,
                cell,
                base_anchor,
                projection.tile_width(),
            );
            return;
        }
    }

    let color = shade(placeholder_color(item.kind), item.tint);
    if item.kind == AssetKind::WallItem {
        if let Some(panel) = wall_panel(view, item) {
            fill_polygon(frame, width, height, &panel, color);
            draw_polygon_outline(frame, width, &panel, shade(color, WALL_EDGE_SHADE));
        }
        return;
    }
    for face in placeholder_prism(view, top, placeholder_height_layers(item.kind)) {
        let (polygon, factor) = face;
        fill_polygon(frame, width, height, &polygon, shade(color, factor));
    }
}

fn placeholder_color(kind: AssetKind) -> [u8; 4] {
    match kind {
        AssetKind::FloorItem => [176, 132, 88, 255],
        AssetKind::NonTopFloorItem => [120, 150, 190, 255],
        AssetKind::SurfaceItem => [200, 120, 150, 255],
        AssetKind::WallItem => [130, 180, 120, 255],
    }
}

/// Placeholder block height in layers. Floor items fill their layer since items stack on top.
fn placeholder_height_layers(kind: AssetKind) -> f32 {
    match kind {
        AssetKind::FloorItem => 1.0,
        AssetKind::NonTopFloorItem => 0.8,
        AssetKind::SurfaceItem => 0.4,
        AssetKind::WallItem => 0.0,
    }
}

/// Left side, right side and lid of a flat-shaded block standing on the diamond below `top`.
fn placeholder_prism(view: &IsoView, top: Vec2, height_layers: f32) -> [([Vec2; 4], f32); 3] {
    let projection = &view.projection;
    let hw = projection.half_tile_width();
    let hh = projection.half_tile_height();
    let lift = projection.layer_height() * height_layers;
    let base = diamond(top, hw, hh);
    let lid = diamond(top.offset(0.0, -lift), hw, hh);
    [
        ([lid[3], lid[2], base[2], base[3]], LEFT_SIDE_SHADE),
        ([lid[2], lid[1], base[1], base[2]], RIGHT_SIDE_SHADE),
        (lid, 1.0),
    ]
}

/// Inset quad on the wall face the item hangs on.
fn wall_panel(view: &IsoView, item: &ItemVisual) -> Option<[Vec2; 4]> {
    let face = WallFace::from_col(item.orientation.col)?;
    let pos = item.position;
    let wall = match face {
        WallFace::East => GridPos::new(pos.x, pos.y.checked_sub(1)?, pos.z),
        WallFace::North => GridPos::new(pos.x.checked_sub(1)?, pos.y, pos.z),
    };
    let quad = wall_face_quad(view, wall, face);
    let center = Vec2::new(
        quad.iter().map(|p| p.x).sum::<f32>() / 4.0,
        quad.iter().map(|p| p.y).sum::<f32>() / 4.0,
    );
    Some(quad.map(|corner| {
        Vec2::new(
            corner.x + (center.x - corner.x) * WALL_PANEL_INSET,
            corner.y + (center.y - corner.y) * WALL_PANEL_INSET,
        )
    }))
}

fn ensure_sprite_cached(
    cache: &mut HashMap<String, Option<LoadedSprite>>,
    warned_missing_sprite_keys: &mut HashSet<String>,
    sprites_dir: &Path,
    key: &str,
) {
    if cache.contains_key(key) {
        return;
    }
    let sprite = match resolve_sprite_image_path(sprites_dir, key) {
        Ok(path) => match load_sprite_rgba(&path) {
            Ok(sprite) => Some(sprite),
            Err(reason) => {
                warn_sprite_load_once(
                    warned_missing_sprite_keys,
                    key,
                    Some(path.as_path()),
                    reason.as_str(),
                );
                None
            }
        },
        Err(reason) => {
            warn_sprite_load_once(warned_missing_sprite_keys, key, None, reason.as_str());
            None
        }
    };
    cache.insert(key.to_string(), sprite);
}

fn resolve_sprite_image_path(sprites_dir: &Path, key: &str) -> Result<PathBuf, String> {
    sprite_sheet_path(sprites_dir, key).map_err(|error| format!("invalid_key:{error}"))
}

fn load_sprite_rgba(path: &Path) -> Result<LoadedSprite, String> {
    let reader = ImageReader::open(path).map_err(|error| format!("file_open_failed:{error}"))?;
    let decoded = reader
        .decode()
        .map_err(|error| format!("decode_failed:{error}"))?;
    let image = decoded.to_rgba8();
    Ok(LoadedSprite {
        width: image.width(),
        height: image.height(),
        rgba: image.into_raw(),
    })
}

fn warn_sprite_load_once(
    warned_keys: &mut HashSet<String>,
    key: &str,
    resolved_path: Option<&Path>,
    reason: &str,
) {
    if !warned_keys.insert(key.to_string()) {
        return;
    }
    let path_display = resolved_path
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "<unresolved>".to_string());
    warn!(
        sprite_key = key,
        path = %path_display,
        reason = reason,
        "renderer_sprite_load_failed_using_placeholder"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{AssetCatalog, AssetCategory};
    use crate::iso::IsoProjection;
    use tempfile::TempDir;

    fn test_view() -> IsoView {
        IsoView::new(IsoProjection::new(64, 1.5), Vec2::new(640.0, 200.0))
    }

    fn skin(id: &str, category: AssetCategory) -> AssetDefinition {
        AssetDefinition {
            id: AssetId::new(id),
            name: id.to_string(),
            description: String::new(),
            category,
            price: 0,
            sprite_sheet: format!("skins/{id}"),
        }
    }

    #[test]
    fn renderer_type_is_non_generic() {
        fn assert_non_generic(_: Option<Renderer>) {}
        assert_non_generic(None);
    }

    #[test]
    fn skin_color_follows_catalog_position() {
        let catalog = AssetCatalog::from_definitions(vec![
            skin("oak", AssetCategory::FloorSkin),
            skin("brick", AssetCategory::WallSkin),
            skin("tile", AssetCategory::FloorSkin),
        ]);
        let tile = AssetId::new("tile");
        assert_eq!(skin_color(&FLOOR_PALETTE, catalog.floor_skins(), None), FLOOR_PALETTE[0]);
        assert_eq!(
            skin_color(&FLOOR_PALETTE, catalog.floor_skins(), Some(&tile)),
            FLOOR_PALETTE[1]
        );
        assert_eq!(
            skin_color(&WALL_PALETTE, catalog.wall_skins(), Some(&tile)),
            WALL_PALETTE[0]
        );
    }

    #[test]
    fn only_faces_onto_the_room_are_visible() {
        let grid = OccupancyGrid::create(6, 6, 2).expect("grid");
        let corner: Vec<WallFace> = visible_faces(&grid, GridPos::new(0, 0, 0)).collect();
        assert!(corner.is_empty());

        let back_wall: Vec<WallFace> = visible_faces(&grid, GridPos::new(3, 0, 1)).collect();
        assert_eq!(back_wall, vec![WallFace::East]);

        let side_wall: Vec<WallFace> = visible_faces(&grid, GridPos::new(0, 3, 1)).collect();
        assert_eq!(side_wall, vec![WallFace::North]);
    }

    #[test]
    fn placeholder_prism_rises_by_layer_height() {
        let view = test_view();
        let top = view.cell_to_screen(3, 3, 0);
        let [left, right, lid] = placeholder_prism(&view, top, 1.0);
        let lift = view.projection.layer_height();

        assert_eq!(lid.0[0], top.offset(0.0, -lift));
        assert_eq!(left.0[2], top.offset(0.0, view.projection.tile_height()));
        assert_eq!(right.0[3], left.0[2]);
        assert!(left.1 > right.1);
    }

    #[test]
    fn wall_panel_sits_inside_its_face() {
        let view = test_view();
        let item = ItemVisual {
            position: GridPos::new(4, 1, 2),
            kind: AssetKind::WallItem,
            orientation: Orientation::new(WallFace::East.col(), 0),
            sheet_cell: (0, 0),
            tint: 1.0,
        };
        let panel = wall_panel(&view, &item).expect("panel");
        let face = wall_face_quad(&view, GridPos::new(4, 0, 2), WallFace::East);
        for corner in panel {
            assert!(crate::iso::point_in_polygon(corner, &face));
        }

        let off_wall = ItemVisual {
            position: GridPos::new(0, 0, 0),
            orientation: Orientation::new(WallFace::North.col(), 0),
            ..item
        };
        assert!(wall_panel(&view, &off_wall).is_none());
    }

    #[test]
    fn missing_sheet_is_cached_as_placeholder_and_warned_once() {
        let temp = TempDir::new().expect("temp");
        let mut cache = HashMap::new();
        let mut warned = HashSet::new();

        ensure_sprite_cached(&mut cache, &mut warned, temp.path(), "furniture/missing");
        ensure_sprite_cached(&mut cache, &mut warned, temp.path(), "furniture/missing");
        ensure_sprite_cached(&mut cache, &mut warned, temp.path(), r"bad\key");

        assert!(matches!(cache.get("furniture/missing"), Some(None)));
        assert!(matches!(cache.get(r"bad\key"), Some(None)));
        assert_eq!(warned.len(), 2);
    }

    #[test]
    fn sprite_path_resolution_rejects_bad_keys() {
        let temp = TempDir::new().expect("temp");
        assert!(resolve_sprite_image_path(temp.path(), "../escape").is_err());
        let path = resolve_sprite_image_path(temp.path(), "furniture/lamp").expect("path");
        assert_eq!(path, temp.path().join("furniture").join("lamp.png"));
        assert!(load_sprite_rgba(&path).is_err());
    }
}
