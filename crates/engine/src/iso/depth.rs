use super::grid::GridPos;

/// Added to sprites whose layer is unknown so they paint over their floor tile.
pub const UNTRACKED_Z_SPRITE_BIAS: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawableKind {
    FloorTile,
    WallSegment,
    Sprite,
}

/// One paintable item. `payload` is whatever the renderer needs to draw it.
#[derive(Debug, Clone, PartialEq)]
pub struct Drawable<T> {
    pub kind: DrawableKind,
    pub x: u32,
    pub y: u32,
    pub z: Option<u32>,
    pub payload: T,
}

impl<T> Drawable<T> {
    pub fn floor_tile(x: u32, y: u32, payload: T) -> Self {
        Self {
            kind: DrawableKind::FloorTile,
            x,
            y,
            z: None,
            payload,
        }
    }

    pub fn wall_segment(pos: GridPos, payload: T) -> Self {
        Self {
            kind: DrawableKind::WallSegment,
            x: pos.x,
            y: pos.y,
            z: Some(pos.z),
            payload,
        }
    }

    pub fn sprite(x: u32, y: u32, z: Option<u32>, payload: T) -> Self {
        Self {
            kind: DrawableKind::Sprite,
            x,
            y,
            z,
            payload,
        }
    }

    pub fn depth_key(&self) -> f32 {
        let planar = (self.x + self.y) as f32;
        match (self.kind, self.z) {
            (DrawableKind::FloorTile, _) => planar,
            (_, Some(z)) => planar + z as f32,
            (DrawableKind::WallSegment, None) => planar,
            (DrawableKind::Sprite, None) => planar + UNTRACKED_Z_SPRITE_BIAS,
        }
    }
}

pub fn depth_key_for_cell(pos: GridPos) -> f32 {
    (pos.x + pos.y + pos.z) as f32
}

/// Back-to-front paint order. Equal keys keep their input order.
pub fn render_order<T>(mut drawables: Vec<Drawable<T>>) -> Vec<Drawable<T>> {
    drawables.sort_by(|a, b| a.depth_key().total_cmp(&b.depth_key()));
    drawables
}

/// Concatenates floor tiles, wall segments and sprites, then orders them.
pub fn render_order_layers<T>(
    floor_tiles: Vec<Drawable<T>>,
    wall_segments: Vec<Drawable<T>>,
    sprites: Vec<Drawable<T>>,
) -> Vec<Drawable<T>> {
    let mut all = floor_tiles;
    all.extend(wall_segments);
    all.extend(sprites);
    render_order(all)
}
