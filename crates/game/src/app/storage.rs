use std::fmt::Display;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use engine::iso::{AssetId, GridPos, Orientation};
use engine::{write_text_atomic, AssetCatalog, AssetCategory, PlacementError, PlacementRecord, Room};
use serde::{Deserialize, Serialize};

pub(crate) const SAVE_VERSION: u32 = 1;
pub(crate) const SAVE_FILE_NAME: &str = "room.save.json";

pub(crate) type SaveLoadResult<T> = Result<T, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct SavedGrid {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) depth: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct SavedObject {
    pub(crate) x: u32,
    pub(crate) y: u32,
    pub(crate) z: u32,
    pub(crate) col: u32,
    pub(crate) row: u32,
    pub(crate) asset_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct SavedRoom {
    pub(crate) save_version: u32,
    pub(crate) grid: SavedGrid,
    #[serde(default)]
    pub(crate) floor_skin: Option<String>,
    #[serde(default)]
    pub(crate) wall_skin: Option<String>,
    pub(crate) objects: Vec<SavedObject>,
}

/// Outcome of looking for a save file at startup or on request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LoadOutcome {
    Loaded { path: PathBuf, objects: usize },
    NoSaveFile { path: PathBuf },
}

pub(crate) fn save_file_path(save_dir: &Path) -> PathBuf {
    save_dir.join(SAVE_FILE_NAME)
}

pub(crate) fn build_saved_room(room: &Room) -> SavedRoom {
    let (width, height, depth) = room.grid().dimensions();
    SavedRoom {
        save_version: SAVE_VERSION,
        grid: SavedGrid {
            width,
            height,
            depth,
        },
        floor_skin: room.floor_skin().map(|id| id.as_str().to_string()),
        wall_skin: room.wall_skin().map(|id| id.as_str().to_string()),
        objects: room
            .records()
            .into_iter()
            .map(|record| SavedObject {
                x: record.position.x,
                y: record.position.y,
                z: record.position.z,
                col: record.orientation.col,
                row: record.orientation.row,
                asset_id: record.asset_id.as_str().to_string(),
            })
            .collect(),
    }
}

pub(crate) fn save_room(room: &Room, save_dir: &Path) -> SaveLoadResult<PathBuf> {
    let save = build_saved_room(room);
    let path = save_file_path(save_dir);
    let json = serde_json::to_string_pretty(&save)
        .map_err(|error| format!("encode save json: {error}"))?;
    write_text_atomic(&path, &json)
        .map_err(|error| format!("write save '{}': {error}", path.display()))?;
    Ok(path)
}

/// Reads, validates and applies the save file. The room is untouched on any error.
pub(crate) fn load_room(
    room: &mut Room,
    catalog: &AssetCatalog,
    save_dir: &Path,
) -> SaveLoadResult<LoadOutcome> {
    let path = save_file_path(save_dir);
    let raw = match fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            return Ok(LoadOutcome::NoSaveFile { path });
        }
        Err(error) => return Err(format!("read save '{}': {error}", path.display())),
    };
    let save = parse_saved_room_json(&raw)?;
    validate_saved_room(&save, room, catalog)?;

    let records: Vec<PlacementRecord> = save
        .objects
        .iter()
        .map(|object| PlacementRecord {
            position: GridPos::new(object.x, object.y, object.z),
            orientation: Orientation::new(object.col, object.row),
            asset_id: AssetId::new(object.asset_id.as_str()),
        })
        .collect();
    room.restore(
        catalog,
        &records,
        save.floor_skin.as_deref().map(AssetId::new),
        save.wall_skin.as_deref().map(AssetId::new),
    )
    .map_err(|error| validation_err(&placement_error_path(&error), error.to_string()))?;

    Ok(LoadOutcome::Loaded {
        path,
        objects: records.len(),
    })
}

pub(crate) fn parse_saved_room_json(raw: &str) -> SaveLoadResult<SavedRoom> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    match serde_path_to_error::deserialize::<_, SavedRoom>(&mut deserializer) {
        Ok(save) => Ok(save),
        Err(error) => {
            let path = error.path().to_string();
            let source = error.into_inner();
            if path.is_empty() || path == "." {
                Err(format!("parse save json: {source}"))
            } else {
                Err(format!("parse save json at {path}: {source}"))
            }
        }
    }
}

fn validation_err(path: &str, message: impl Into<String>) -> String {
    format!("validation failed at {path}: {}", message.into())
}

fn expected_actual(path: &str, expected: impl Display, actual: impl Display) -> String {
    validation_err(path, format!("expected {expected}, got {actual}"))
}

pub(crate) fn validate_saved_room(
    save: &SavedRoom,
    room: &Room,
    catalog: &AssetCatalog,
) -> SaveLoadResult<()> {
    if save.save_version != SAVE_VERSION {
        return Err(expected_actual(
            "save_version",
            SAVE_VERSION,
            save.save_version,
        ));
    }
    let (width, height, depth) = room.grid().dimensions();
    let grid = save.grid;
    if (grid.width, grid.height, grid.depth) != (width, height, depth) {
        return Err(expected_actual(
            "grid",
            format!("{width}x{height}x{depth}"),
            format!("{}x{}x{}", grid.width, grid.height, grid.depth),
        ));
    }
    validate_skin(catalog, "floor_skin", save.floor_skin.as_deref(), AssetCategory::FloorSkin)?;
    validate_skin(catalog, "wall_skin", save.wall_skin.as_deref(), AssetCategory::WallSkin)?;

    for (index, object) in save.objects.iter().enumerate() {
        let path = format!("objects[{index}]");
        if object.x >= width || object.y >= height || object.z >= depth {
            return Err(expected_actual(
                &path,
                format!("cell inside {width}x{height}x{depth}"),
                format!("({}, {}, {})", object.x, object.y, object.z),
            ));
        }
        let id = AssetId::new(object.asset_id.as_str());
        if catalog.kind_of(&id).is_none() {
            return Err(validation_err(
                &format!("{path}.asset_id"),
                format!("unknown placeable asset '{}'", object.asset_id),
            ));
        }
    }
    Ok(())
}

fn validate_skin(
    catalog: &AssetCatalog,
    path: &str,
    skin: Option<&str>,
    expected: AssetCategory,
) -> SaveLoadResult<()> {
    let Some(raw) = skin else {
        return Ok(());
    };
    match catalog.get(&AssetId::new(raw)) {
        Some(def) if def.category == expected => Ok(()),
        Some(_) => Err(validation_err(path, format!("asset '{raw}' is not a {path}"))),
        None => Err(validation_err(path, format!("unknown asset '{raw}'"))),
    }
}

fn placement_error_path(error: &PlacementError) -> String {
    match error {
        PlacementError::OutOfBounds { index, .. }
        | PlacementError::CellOccupied { index, .. }
        | PlacementError::InvalidResting { index, .. } => format!("objects[{index}]"),
        _ => "objects".to_string(),
    }
}
