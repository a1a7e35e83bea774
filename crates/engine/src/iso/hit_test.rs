//! Pointer-to-room resolution: floor diamonds, wall faces and placed objects.

use super::asset::{AssetKind, WallFace};
use super::depth::depth_key_for_cell;
use super::grid::{GridPos, OccupancyGrid, TileCode};
use super::placement::PlacedObject;
use super::transform::{IsoView, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WallHit {
    /// The wall segment cell, on the `x = 0` or `y = 0` plane.
    pub position: GridPos,
    pub face: WallFace,
}

/// Strict diamond test: points on the outline belong to no tile.
pub fn point_in_diamond(point: Vec2, center: Vec2, half_width: f32, half_height: f32) -> bool {
    if half_width <= 0.0 || half_height <= 0.0 {
        return false;
    }
    let dx = (point.x - center.x).abs() / half_width;
    let dy = (point.y - center.y).abs() / half_height;
    dx + dy < 1.0
}

/// Even-odd ray cast against a closed polygon.
pub fn point_in_polygon(point: Vec2, polygon: &[Vec2]) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let a = polygon[i];
        let b = polygon[j];
        if (a.y > point.y) != (b.y > point.y) {
            let cross_x = (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x;
            if point.x < cross_x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Inclusive pick region, twice as tall as the floor diamond.
pub fn point_in_pick_region(point: Vec2, center: Vec2, width: f32, height: f32) -> bool {
    if width <= 0.0 || height <= 0.0 {
        return false;
    }
    let dx = (point.x - center.x).abs() / (width * 0.5);
    let dy = (point.y - center.y).abs() / height;
    dx + dy <= 1.0
}

pub fn floor_tile_center(view: &IsoView, x: u32, y: u32, z: u32) -> Vec2 {
    view.cell_to_screen(x, y, z)
        .offset(0.0, view.projection.half_tile_height())
}

/// Floor cell under the pointer, skipping wall cells.
pub fn hit_test_floor(pointer: Vec2, grid: &OccupancyGrid, view: &IsoView) -> Option<(u32, u32)> {
    let half_width = view.projection.half_tile_width();
    let half_height = view.projection.half_tile_height();

    let mut cells: Vec<(u32, u32)> = (0..grid.width())
        .flat_map(|x| (0..grid.height()).map(move |y| (x, y)))
        .filter(|&(x, y)| grid.get(x, y, 0) != TileCode::Wall)
        .collect();
    cells.sort_by(|a, b| (b.0 + b.1).cmp(&(a.0 + a.1)).then(b.0.cmp(&a.0)));

    cells.into_iter().find(|&(x, y)| {
        point_in_diamond(pointer, floor_tile_center(view, x, y, 0), half_width, half_height)
    })
}

/// Screen quad of one wall face, ordered top edge then bottom edge.
pub fn wall_face_quad(view: &IsoView, wall: GridPos, face: WallFace) -> [Vec2; 4] {
    let projection = &view.projection;
    let top = view.cell_to_screen(wall.x, wall.y, wall.z);
    let hw = projection.half_tile_width();
    let hh = projection.half_tile_height();
    let h = projection.tile_height();
    let lift = projection.layer_height();
    let side = match face {
        WallFace::East => -hw,
        WallFace::North => hw,
    };
    [
        Vec2::new(top.x + side, top.y + hh - lift),
        Vec2::new(top.x, top.y + h - lift),
        Vec2::new(top.x, top.y + h),
        Vec2::new(top.x + side, top.y + hh),
    ]
}

/// Wall faces with an in-bounds, non-wall cell in front of them.
pub fn exposed_wall_faces(grid: &OccupancyGrid) -> impl Iterator<Item = WallHit> + '_ {
    grid.iter()
        .filter(|(_, code)| *code == TileCode::Wall)
        .flat_map(|(position, _)| {
            WallFace::ALL
                .into_iter()
                .map(move |face| WallHit { position, face })
        })
        .filter(|hit| hit.face.is_exposed(grid, hit.position))
}

/// Wall face under the pointer. Candidates are tried nearest-first.
pub fn hit_test_wall(pointer: Vec2, grid: &OccupancyGrid, view: &IsoView) -> Option<WallHit> {
    let mut candidates: Vec<(WallHit, Vec2)> = exposed_wall_faces(grid)
        .map(|hit| {
            let base = view.cell_to_screen(hit.position.x, hit.position.y, 0);
            (hit, base)
        })
        .collect();
    candidates.sort_by(|(a_hit, a_base), (b_hit, b_base)| {
        b_base
            .y
            .total_cmp(&a_base.y)
            .then(b_base.x.total_cmp(&a_base.x))
            .then(b_hit.position.z.cmp(&a_hit.position.z))
    });

    candidates
        .into_iter()
        .map(|(hit, _)| hit)
        .find(|hit| point_in_polygon(pointer, &wall_face_quad(view, hit.position, hit.face)))
}

/// Floor cell a wall item mounted on `hit` occupies, if it is free.
pub fn wall_attachment_cell(hit: WallHit, grid: &OccupancyGrid) -> Option<GridPos> {
    let cell = hit.face.adjacent_cell(hit.position);
    (grid.contains_pos(cell) && grid.get_pos(cell) == TileCode::Empty).then_some(cell)
}

/// Lift of an object's visual center above its floor diamond, in tile heights.
pub fn anchor_lift(kind: AssetKind) -> f32 {
    match kind {
        AssetKind::FloorItem | AssetKind::NonTopFloorItem => 0.5,
        AssetKind::SurfaceItem => 0.25,
        AssetKind::WallItem => 1.0,
    }
}

pub fn object_pick_center(view: &IsoView, object: &PlacedObject) -> Vec2 {
    let tile_height = view.projection.tile_height();
    let pos = object.position;
    floor_tile_center(view, pos.x, pos.y, pos.z).offset(0.0, -anchor_lift(object.kind) * tile_height)
}

/// Placed object under the pointer, preferring the one drawn last.
pub fn hit_test_object<'a>(
    pointer: Vec2,
    grid: &OccupancyGrid,
    placed: &'a [PlacedObject],
    view: &IsoView,
) -> Option<&'a PlacedObject> {
    let width = view.projection.tile_width();
    let height = view.projection.tile_height();

    let mut ordered: Vec<&PlacedObject> = placed
        .iter()
        .filter(|object| {
            grid.contains_pos(object.position) && grid.get_pos(object.position).is_occupied_by_object()
        })
        .collect();
    ordered.sort_by(|a, b| {
        depth_key_for_cell(a.position).total_cmp(&depth_key_for_cell(b.position))
    });

    ordered
        .into_iter()
        .rev()
        .find(|object| point_in_pick_region(pointer, object_pick_center(view, object), width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iso::asset::{AssetId, Orientation};
    use crate::iso::transform::IsoProjection;

    fn view() -> IsoView {
        IsoView::new(IsoProjection::new(64, 1.5), Vec2::new(640.0, 200.0))
    }

    fn grid() -> OccupancyGrid {
        OccupancyGrid::create(12, 12, 5).expect("grid")
    }

    fn object(kind: AssetKind, x: u32, y: u32, z: u32) -> PlacedObject {
        PlacedObject {
            position: GridPos::new(x, y, z),
            orientation: Orientation::default(),
            asset_id: AssetId::new("thing"),
            kind,
        }
    }

    #[test]
    fn diamond_accepts_center_and_rejects_outline() {
        let center = Vec2::new(10.0, 10.0);
        assert!(point_in_diamond(center, center, 32.0, 16.0));
        assert!(point_in_diamond(Vec2::new(25.0, 14.0), center, 32.0, 16.0));
        assert!(!point_in_diamond(Vec2::new(42.0, 10.0), center, 32.0, 16.0));
        assert!(!point_in_diamond(Vec2::new(10.0, 26.0), center, 32.0, 16.0));
        assert!(!point_in_diamond(Vec2::new(40.0, 24.0), center, 32.0, 16.0));
    }

    #[test]
    fn polygon_ray_cast_handles_inside_and_outside() {
        let square = [
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(0.0, 10.0),
        ];
        assert!(point_in_polygon(Vec2::new(5.0, 5.0), &square));
        assert!(!point_in_polygon(Vec2::new(15.0, 5.0), &square));
        assert!(!point_in_polygon(Vec2::new(5.0, -1.0), &square));
        assert!(!point_in_polygon(Vec2::new(5.0, 5.0), &square[..2]));
    }

    #[test]
    fn pick_region_is_inclusive() {
        let center = Vec2::new(0.0, 0.0);
        assert!(point_in_pick_region(Vec2::new(32.0, 0.0), center, 64.0, 32.0));
        assert!(point_in_pick_region(Vec2::new(0.0, -32.0), center, 64.0, 32.0));
        assert!(!point_in_pick_region(Vec2::new(0.0, 33.0), center, 64.0, 32.0));
    }

    #[test]
    fn floor_hit_at_tile_center_returns_that_tile() {
        let grid = grid();
        let view = view();
        for (x, y) in [(1, 1), (3, 7), (11, 11), (6, 2)] {
            let center = floor_tile_center(&view, x, y, 0);
            assert_eq!(hit_test_floor(center, &grid, &view), Some((x, y)));
        }
    }

    #[test]
    fn floor_hit_on_shared_corner_matches_at_most_one_tile() {
        let grid = grid();
        let view = view();
        let corner = view.cell_to_screen(4, 4, 0).offset(0.0, view.projection.tile_height());
        let hit = hit_test_floor(corner, &grid, &view);

        let projection = view.projection;
        let matches = (1..12)
            .flat_map(|x| (1..12).map(move |y| (x, y)))
            .filter(|&(x, y)| {
                point_in_diamond(
                    corner,
                    floor_tile_center(&view, x, y, 0),
                    projection.half_tile_width(),
                    projection.half_tile_height(),
                )
            })
            .count();
        assert!(matches <= 1);
        assert_eq!(hit.is_some(), matches == 1);
    }

    #[test]
    fn floor_hit_skips_wall_cells_and_empty_space() {
        let grid = grid();
        let view = view();
        let wall_center = floor_tile_center(&view, 0, 5, 0);
        assert_eq!(hit_test_floor(wall_center, &grid, &view), None);
        assert_eq!(hit_test_floor(Vec2::new(-5000.0, -5000.0), &grid, &view), None);
    }

    #[test]
    fn wall_hit_resolves_east_and_north_faces() {
        let grid = grid();
        let view = view();

        let east = wall_face_quad(&view, GridPos::new(5, 0, 2), WallFace::East);
        let inside = Vec2::new((east[0].x + east[1].x) * 0.5, (east[0].y + east[2].y) * 0.5 + 4.0);
        assert_eq!(
            hit_test_wall(inside, &grid, &view),
            Some(WallHit {
                position: GridPos::new(5, 0, 2),
                face: WallFace::East
            })
        );

        let north = wall_face_quad(&view, GridPos::new(0, 3, 0), WallFace::North);
        let inside = Vec2::new((north[0].x + north[1].x) * 0.5, (north[0].y + north[2].y) * 0.5 + 4.0);
        assert_eq!(
            hit_test_wall(inside, &grid, &view),
            Some(WallHit {
                position: GridPos::new(0, 3, 0),
                face: WallFace::North
            })
        );
    }

    #[test]
    fn corner_and_outer_faces_are_not_exposed() {
        let grid = grid();
        let faces: Vec<WallHit> = exposed_wall_faces(&grid).collect();
        assert!(!faces.iter().any(|hit| hit.position.x == 0 && hit.position.y == 0));
        assert!(!faces
            .iter()
            .any(|hit| hit.position.y == 0 && hit.face == WallFace::North));
        assert_eq!(faces.len(), (11 + 11) * 5);
    }

    #[test]
    fn attachment_cell_follows_face_and_requires_empty() {
        let mut grid = grid();
        let east = WallHit {
            position: GridPos::new(4, 0, 1),
            face: WallFace::East,
        };
        let north = WallHit {
            position: GridPos::new(0, 4, 1),
            face: WallFace::North,
        };
        assert_eq!(wall_attachment_cell(east, &grid), Some(GridPos::new(4, 1, 1)));
        assert_eq!(wall_attachment_cell(north, &grid), Some(GridPos::new(1, 4, 1)));
        grid.set(4, 1, 1, TileCode::NonTopSurface);
        assert_eq!(wall_attachment_cell(east, &grid), None);
    }

    #[test]
    fn object_hit_prefers_front_object() {
        let mut grid = grid();
        grid.set(4, 4, 0, TileCode::NonTopSurface);
        grid.set(5, 5, 0, TileCode::NonTopSurface);
        let placed = vec![
            object(AssetKind::NonTopFloorItem, 5, 5, 0),
            object(AssetKind::NonTopFloorItem, 4, 4, 0),
        ];
        let view = view();
        let center = object_pick_center(&view, &placed[0]);
        let hit = hit_test_object(center, &grid, &placed, &view).expect("hit");
        assert_eq!(hit.position, GridPos::new(5, 5, 0));

        let between = object_pick_center(&view, &placed[1]).offset(0.0, 12.0);
        let hit = hit_test_object(between, &grid, &placed, &view).expect("hit");
        assert_eq!(hit.position, GridPos::new(5, 5, 0));
    }

    #[test]
    fn object_hit_ignores_records_without_grid_cell() {
        let grid = grid();
        let placed = vec![object(AssetKind::FloorItem, 5, 5, 0)];
        let view = view();
        let center = object_pick_center(&view, &placed[0]);
        assert!(hit_test_object(center, &grid, &placed, &view).is_none());
    }

    #[test]
    fn anchor_lift_depends_on_kind() {
        let view = view();
        let floor = object_pick_center(&view, &object(AssetKind::FloorItem, 3, 3, 0));
        let wall = object_pick_center(&view, &object(AssetKind::WallItem, 3, 3, 0));
        let surface = object_pick_center(&view, &object(AssetKind::SurfaceItem, 3, 3, 0));
        assert!(wall.y < floor.y);
        assert!(floor.y < surface.y);
    }
}
