use std::path::PathBuf;

use engine::{
    compile_interaction_defs, resolve_app_paths, ContentCompileError, LoopConfig, StartupError,
};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::room::{load_room, RoomLoadError};
use super::scene::RoomScene;
use super::script::{load_script, InputScript, ScriptError};

const DEFAULT_ROOM_FILE: &str = "demo_room.json";

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error("interaction defs failed to compile: {0}")]
    Content(#[from] ContentCompileError),
    #[error(transparent)]
    Room(#[from] RoomLoadError),
    #[error(transparent)]
    Script(#[from] ScriptError),
    #[error("{0}\nusage: adventure_game [--room <file.json>] [--script <file.json>]")]
    Usage(String),
}

#[derive(Debug, Default, PartialEq, Eq)]
struct LaunchArgs {
    room: Option<PathBuf>,
    script: Option<PathBuf>,
}

pub(crate) enum LaunchMode {
    Window,
    Script(InputScript),
}

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) scene: RoomScene,
    pub(crate) mode: LaunchMode,
}

pub(crate) fn build_app(
    args: impl IntoIterator<Item = String>,
) -> Result<AppWiring, BootstrapError> {
    let args = parse_args(args)?;
    let paths = resolve_app_paths()?;
    info!(root = %paths.root.display(), "app_root_resolved");

    let defs = compile_interaction_defs(&paths.interaction_defs_dir)?;
    let room_path = args
        .room
        .unwrap_or_else(|| paths.rooms_dir.join(DEFAULT_ROOM_FILE));
    let room = load_room(&room_path)?;
    info!(
        room = room.name.as_str(),
        path = %room_path.display(),
        "room_file_loaded"
    );

    let config = LoopConfig {
        window_title: format!("Adventure | {}", room.name),
        cursor_axis_x: defs.settings.cursor_axis_x.clone(),
        cursor_axis_y: defs.settings.cursor_axis_y.clone(),
        ..LoopConfig::default()
    };
    let mode = match args.script {
        Some(path) => LaunchMode::Script(load_script(&path)?),
        None => LaunchMode::Window,
    };

    Ok(AppWiring {
        config,
        scene: RoomScene::new(defs, room),
        mode,
    })
}

pub(crate) fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<LaunchArgs, BootstrapError> {
    let mut parsed = LaunchArgs::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        let slot = match arg.as_str() {
            "--room" => &mut parsed.room,
            "--script" => &mut parsed.script,
            other => return Err(BootstrapError::Usage(format!("unknown argument '{other}'"))),
        };
        if slot.is_some() {
            return Err(BootstrapError::Usage(format!("{arg} given more than once")));
        }
        let value = args
            .next()
            .ok_or_else(|| BootstrapError::Usage(format!("{arg} requires a file path")))?;
        *slot = Some(PathBuf::from(value));
    }
    Ok(parsed)
}
