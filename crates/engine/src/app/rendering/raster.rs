use crate::iso::{point_in_polygon, Vec2};
use crate::sprite_sheets::CellRect;

#[derive(Debug)]
pub(crate) struct LoadedSprite {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) rgba: Vec<u8>,
}

pub(crate) fn clear(frame: &mut [u8], color: [u8; 4]) {
    for chunk in frame.chunks_exact_mut(4) {
        chunk.copy_from_slice(&color);
    }
}

pub(crate) fn write_pixel_rgba_clipped(
    frame: &mut [u8],
    width: usize,
    x: i32,
    y: i32,
    color: [u8; 4],
) {
    if x < 0 || y < 0 || x as usize >= width {
        return;
    }
    let x = x as usize;
    let y = y as usize;
    let Some(pixel_offset) = y.checked_mul(width).and_then(|row| row.checked_add(x)) else {
        return;
    };
    let Some(byte_offset) = pixel_offset.checked_mul(4) else {
        return;
    };
    let Some(end) = byte_offset.checked_add(4) else {
        return;
    };
    if end > frame.len() {
        return;
    }
    frame[byte_offset..end].copy_from_slice(&color);
}

pub(crate) fn shade(color: [u8; 4], factor: f32) -> [u8; 4] {
    let scale = |channel: u8| (channel as f32 * factor).round().clamp(0.0, 255.0) as u8;
    [scale(color[0]), scale(color[1]), scale(color[2]), color[3]]
}

/// Fills every pixel whose center lies inside `polygon`.
pub(crate) fn fill_polygon(frame: &mut [u8], width: u32, height: u32, polygon: &[Vec2], color: [u8; 4]) {
    if polygon.len() < 3 || width == 0 || height == 0 {
        return;
    }
    let (mut min_x, mut min_y) = (f32::INFINITY, f32::INFINITY);
    let (mut max_x, mut max_y) = (f32::NEG_INFINITY, f32::NEG_INFINITY);
    for point in polygon {
        min_x = min_x.min(point.x);
        min_y = min_y.min(point.y);
        max_x = max_x.max(point.x);
        max_y = max_y.max(point.y);
    }
    if !(min_x.is_finite() && min_y.is_finite() && max_x.is_finite() && max_y.is_finite()) {
        return;
    }

    let left = (min_x.floor() as i32).max(0);
    let top = (min_y.floor() as i32).max(0);
    let right = (max_x.ceil() as i32).min(width as i32);
    let bottom = (max_y.ceil() as i32).min(height as i32);
    for y in top..bottom {
        for x in left..right {
            let center = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
            if point_in_polygon(center, polygon) {
                write_pixel_rgba_clipped(frame, width as usize, x, y, color);
            }
        }
    }
}

pub(crate) fn draw_line(frame: &mut [u8], width: u32, from: Vec2, to: Vec2, color: [u8; 4]) {
    let (mut x0, mut y0) = (from.x.round() as i32, from.y.round() as i32);
    let (x1, y1) = (to.x.round() as i32, to.y.round() as i32);
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let step_x = if x0 < x1 { 1 } else { -1 };
    let step_y = if y0 < y1 { 1 } else { -1 };
    let mut error = dx + dy;
    loop {
        write_pixel_rgba_clipped(frame, width as usize, x0, y0, color);
        if x0 == x1 && y0 == y1 {
            break;
        }
        let doubled = 2 * error;
        if doubled >= dy {
            error += dy;
            x0 += step_x;
        }
        if doubled <= dx {
            error += dx;
            y0 += step_y;
        }
    }
}

pub(crate) fn draw_polygon_outline(frame: &mut [u8], width: u32, polygon: &[Vec2], color: [u8; 4]) {
    for (index, &from) in polygon.iter().enumerate() {
        let to = polygon[(index + 1) % polygon.len()];
        draw_line(frame, width, from, to, color);
    }
}

/// Diamond corners for a tile whose top vertex is `top`: top, right, bottom, left.
pub(crate) fn diamond(top: Vec2, half_width: f32, half_height: f32) -> [Vec2; 4] {
    [
        top,
        top.offset(half_width, half_height),
        top.offset(0.0, half_height * 2.0),
        top.offset(-half_width, half_height),
    ]
}

/// Blits one sheet cell scaled to `dest_width`, with its bottom edge centered on `anchor`.
pub(crate) fn draw_sprite_cell_anchored(
    frame: &mut [u8],
    width: u32,
    height: u32,
    sprite: &LoadedSprite,
    cell: CellRect,
    anchor: Vec2,
    dest_width: f32,
) {
    if cell.width == 0 || cell.height == 0 || width == 0 || height == 0 {
        return;
    }
    let expected_rgba_len = sprite.width as usize * sprite.height as usize * 4;
    if sprite.rgba.len() < expected_rgba_len
        || cell.x + cell.width > sprite.width
        || cell.y + cell.height > sprite.height
    {
        return;
    }
    if !(dest_width.is_finite() && dest_width > 0.0) {
        return;
    }

    let scale = dest_width / cell.width as f32;
    let inv_scale = scale.recip();
    let scaled_w = (cell.width as f32 * scale).round().max(1.0) as i32;
    let scaled_h = (cell.height as f32 * scale).round().max(1.0) as i32;
    let left = anchor.x.round() as i32 - scaled_w / 2;
    let top = anchor.y.round() as i32 - scaled_h;
    let right = left + scaled_w;
    let bottom = top + scaled_h;

    let draw_left = left.max(0);
    let draw_top = top.max(0);
    let draw_right = right.min(width as i32);
    let draw_bottom = bottom.min(height as i32);
    if draw_left >= draw_right || draw_top >= draw_bottom {
        return;
    }

    let frame_width = width as usize;
    let sprite_width = sprite.width as usize;
    for out_y in draw_top..draw_bottom {
        let dy = out_y - top;
        let src_y = ((dy as f32) * inv_scale).floor() as u32;
        let src_y = (cell.y + src_y.min(cell.height - 1)) as usize;
        let src_row_offset = src_y * sprite_width * 4;
        let dst_row_offset = out_y as usize * frame_width * 4;

        for out_x in draw_left..draw_right {
            let dx = out_x - left;
            let src_x = ((dx as f32) * inv_scale).floor() as u32;
            let src_x = (cell.x + src_x.min(cell.width - 1)) as usize;
            let src_offset = src_row_offset + src_x * 4;
            let alpha = sprite.rgba[src_offset + 3];
            if alpha == 0 {
                continue;
            }
            let dst_offset = dst_row_offset + out_x as usize * 4;
            frame[dst_offset] = sprite.rgba[src_offset];
            frame[dst_offset + 1] = sprite.rgba[src_offset + 1];
            frame[dst_offset + 2] = sprite.rgba[src_offset + 2];
            frame[dst_offset + 3] = alpha;
        }
    }
}
