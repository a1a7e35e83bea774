use engine::{LoopConfig, RoomConfig, Scene};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use super::room_scene;

const GRID_ENV_VAR: &str = "ROOMDS_GRID";
const TPS_ENV_VAR: &str = "ROOMDS_TPS";
const MAX_TPS: u32 = 240;
const MAX_GRID_AXIS: u32 = 64;

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) room_config: RoomConfig,
    pub(crate) scene: Box<dyn Scene>,
}

pub(crate) fn build_app() -> AppWiring {
    init_tracing();
    info!("=== Room Designer Startup ===");

    let mut config = LoopConfig::default();
    if let Some(tps) = read_env_override(TPS_ENV_VAR, parse_tps) {
        config.target_tps = tps;
    }

    let mut room_config = RoomConfig::default();
    if let Some((width, height, depth)) = read_env_override(GRID_ENV_VAR, parse_grid_dimensions) {
        room_config.grid_width = width;
        room_config.grid_height = height;
        room_config.grid_depth = depth;
    }
    info!(
        width = room_config.grid_width,
        height = room_config.grid_height,
        depth = room_config.grid_depth,
        target_tps = config.target_tps,
        "room_config"
    );

    AppWiring {
        config,
        room_config,
        scene: room_scene::build_room_scene(),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

/// Unset variables fall back silently; malformed ones are logged and ignored.
fn read_env_override<T>(name: &str, parse: fn(&str) -> Result<T, String>) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match parse(&raw) {
        Ok(value) => Some(value),
        Err(reason) => {
            warn!(var = name, value = %raw, reason = %reason, "env_override_ignored");
            None
        }
    }
}

/// Parses `WxHxD`, e.g. `12x12x5`.
fn parse_grid_dimensions(raw: &str) -> Result<(u32, u32, u32), String> {
    let parts: Vec<&str> = raw.trim().split(['x', 'X']).collect();
    let [width, height, depth] = parts.as_slice() else {
        return Err(format!("expected WxHxD, got '{raw}'"));
    };
    let parse_axis = |axis: &str, name: &str| -> Result<u32, String> {
        let value = axis
            .trim()
            .parse::<u32>()
            .map_err(|_| format!("{name} '{axis}' is not a positive integer"))?;
        if !(1..=MAX_GRID_AXIS).contains(&value) {
            return Err(format!("{name} {value} is outside 1..={MAX_GRID_AXIS}"));
        }
        Ok(value)
    };
    let width = parse_axis(*width, "width")?;
    let height = parse_axis(*height, "height")?;
    let depth = parse_axis(*depth, "depth")?;
    // One wall row plus at least one floor row.
    if width < 2 || height < 2 {
        return Err(format!("room {width}x{height} leaves no floor inside the walls"));
    }
    Ok((width, height, depth))
}

fn parse_tps(raw: &str) -> Result<u32, String> {
    match raw.trim().parse::<u32>() {
        Ok(tps) if (1..=MAX_TPS).contains(&tps) => Ok(tps),
        Ok(tps) => Err(format!("{tps} is outside 1..={MAX_TPS}")),
        Err(_) => Err(format!("'{raw}' is not an integer")),
    }
}
