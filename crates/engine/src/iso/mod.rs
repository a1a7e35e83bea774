mod asset;
mod depth;
mod grid;
mod hit_test;
mod placement;
mod transform;

pub use asset::{AssetId, AssetKind, Orientation, WallFace};
pub use depth::{
    depth_key_for_cell, render_order, render_order_layers, Drawable, DrawableKind,
    UNTRACKED_Z_SPRITE_BIAS,
};
pub use grid::{GridError, GridPos, OccupancyGrid, TileCode, MAX_GRID_CELLS};
pub use hit_test::{
    anchor_lift, exposed_wall_faces, floor_tile_center, hit_test_floor, hit_test_object,
    hit_test_wall, object_pick_center, point_in_diamond, point_in_pick_region, point_in_polygon,
    wall_attachment_cell, wall_face_quad, WallHit,
};
pub use placement::{
    attempt_move, pick_up, place, rotate, GhostAnimation, GhostObject, PickedUp, PieceState,
    PlacedObject, ANIMATION_FRAMES, ANIMATION_TICKS_PER_FRAME,
};
pub use transform::{
    IsoProjection, IsoView, Vec2, DEFAULT_BASE_TILE_WIDTH_PX, DEFAULT_LAYER_SPACING,
    DEFAULT_REFERENCE_RESOLUTION, MIN_TILE_WIDTH_PX,
};
