use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod app;
pub mod content;
pub mod iso;
pub mod room;
pub mod sprite_sheets;

pub use app::{
    run_app, AppError, InputAction, InputSnapshot, KeyEdge, LoopConfig, Renderer, Scene,
    SceneCommand, SceneVisualState, SceneWorld,
};
pub use content::{
    compile_catalog, parse_catalog_document, write_text_atomic, AssetCatalog, AssetCategory,
    AssetDefinition, CatalogError, CatalogErrorCode, SourceLocation,
};
pub use room::{
    PlacementError, PlacementRecord, Room, RoomConfig, RoomDrawable, SelectedAsset,
    SelectionChange,
};

pub const ROOT_ENV_VAR: &str = "ROOMDS_ROOT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    pub root: PathBuf,
    pub assets_dir: PathBuf,
    pub catalog_dir: PathBuf,
    pub sprites_dir: PathBuf,
    pub save_dir: PathBuf,
}

impl AppPaths {
    /// Standard layout below a project root. Nothing is created on disk.
    pub fn from_root(root: PathBuf) -> Self {
        let assets_dir = root.join("assets");
        let base_dir = assets_dir.join("base");
        Self {
            catalog_dir: base_dir.join("catalog"),
            sprites_dir: base_dir.join("sprites"),
            save_dir: root.join("saves"),
            assets_dir,
            root,
        }
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("failed to resolve current executable path: {0}")]
    CurrentExe(#[source] std::io::Error),
    #[error("current executable path has no parent directory: {0}")]
    ExeHasNoParent(PathBuf),
    #[error("failed to create save directory at {path}: {source}")]
    CreateSaveDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(
        "ROOMDS_ROOT is set but does not point to a valid project root: {path}\n\
A valid root must contain Cargo.toml and either crates/ or assets/."
    )]
    InvalidEnvRoot { path: PathBuf },
    #[error(
        "Could not detect project root by walking upward from executable directory: {start_dir}\n\
Expected a directory containing Cargo.toml and either crates/ or assets/.\n\
Set {env_var} explicitly, for example:\n\
PowerShell: $env:{env_var}=\"C:\\path\\to\\room-designer\"\n\
Bash/zsh: export {env_var}=\"/path/to/room-designer\""
    )]
    RootNotFound {
        start_dir: PathBuf,
        env_var: &'static str,
    },
}

pub fn resolve_app_paths() -> Result<AppPaths, StartupError> {
    let paths = AppPaths::from_root(resolve_root()?);

    fs::create_dir_all(&paths.save_dir).map_err(|source| StartupError::CreateSaveDir {
        path: paths.save_dir.clone(),
        source,
    })?;

    Ok(paths)
}

fn resolve_root() -> Result<PathBuf, StartupError> {
    match env::var(ROOT_ENV_VAR) {
        Ok(value) => {
            let raw = PathBuf::from(value);
            let normalized = normalize_path(&raw);
            if is_repo_marker(&normalized) {
                Ok(normalized)
            } else {
                Err(StartupError::InvalidEnvRoot { path: normalized })
            }
        }
        Err(env::VarError::NotPresent) => {
            let exe = env::current_exe().map_err(StartupError::CurrentExe)?;
            let exe_dir = exe
                .parent()
                .map(Path::to_path_buf)
                .ok_or_else(|| StartupError::ExeHasNoParent(exe.clone()))?;

            for candidate in exe_dir.ancestors() {
                if is_repo_marker(candidate) {
                    return Ok(normalize_path(candidate));
                }
            }

            Err(StartupError::RootNotFound {
                start_dir: normalize_path(&exe_dir),
                env_var: ROOT_ENV_VAR,
            })
        }
        Err(source) => Err(StartupError::EnvVar {
            var: ROOT_ENV_VAR,
            source,
        }),
    }
}

fn is_repo_marker(path: &Path) -> bool {
    let cargo_toml = path.join("Cargo.toml").is_file();
    let has_crates = path.join("crates").is_dir();
    let has_assets = path.join("assets").is_dir();

    cargo_toml && (has_crates || has_assets)
}

fn normalize_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
