use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpriteKeyError {
    #[error("sprite key must not be empty")]
    Empty,
    #[error("sprite key must not start with '/'")]
    LeadingSlash,
    #[error("sprite key must not contain '\\\\'")]
    Backslash,
    #[error("sprite key must not contain '..'")]
    ParentTraversal,
    #[error("sprite key contains invalid character '{character}'")]
    InvalidCharacter { character: char },
}

pub const SHEET_CELLS_PER_SIDE: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Pixel rect of cell `(col, row)` on a sheet split into 10x10 equal cells.
pub fn sheet_cell_rect(sheet_width: u32, sheet_height: u32, col: u32, row: u32) -> Option<CellRect> {
    let width = sheet_width / SHEET_CELLS_PER_SIDE;
    let height = sheet_height / SHEET_CELLS_PER_SIDE;
    if width == 0 || height == 0 || col >= SHEET_CELLS_PER_SIDE || row >= SHEET_CELLS_PER_SIDE {
        return None;
    }
    Some(CellRect {
        x: col * width,
        y: row * height,
        width,
        height,
    })
}

/// `<sprites_dir>/<key>.png`.
pub fn sprite_sheet_path(sprites_dir: &Path, key: &str) -> Result<PathBuf, SpriteKeyError> {
    validate_sprite_key(key)?;
    let mut path = sprites_dir.to_path_buf();
    for segment in key.split('/') {
        path.push(segment);
    }
    path.set_extension("png");
    Ok(path)
}

pub fn validate_sprite_key(key: &str) -> Result<(), SpriteKeyError> {
    if key.is_empty() {
        return Err(SpriteKeyError::Empty);
    }
    if key.starts_with('/') {
        return Err(SpriteKeyError::LeadingSlash);
    }
    if key.contains('\\') {
        return Err(SpriteKeyError::Backslash);
    }
    if key.contains("..") {
        return Err(SpriteKeyError::ParentTraversal);
    }
    for ch in key.chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() || matches!(ch, '_' | '/' | '-') {
            continue;
        }
        return Err(SpriteKeyError::InvalidCharacter { character: ch });
    }
    Ok(())
}
