use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use engine::interaction::{InteractionSaveState, SaveStateError};
use engine::{
    world_to_screen_px, HotspotRegistry, InputAction, InputDevice, RawInputFrame, Scene,
    SceneCommand,
};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use super::collaborators::FiredInteraction;
use super::scene::RoomScene;

const DEFAULT_DT_SECONDS: f32 = 1.0 / 60.0;
const MAX_REPEAT: u32 = 100_000;

#[derive(Debug, Error)]
pub(crate) enum ScriptError {
    #[error("read script '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse script json at {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("script frame {index}: {message}")]
    InvalidFrame { index: usize, message: String },
    #[error("script dt must be finite and > 0, got {0}")]
    InvalidDt(f32),
    #[error("serialize interaction state: {0}")]
    SaveState(#[from] SaveStateError),
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
struct PointDto {
    x: f32,
    y: f32,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
struct WindowDto {
    width: u32,
    height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ActionDto {
    CycleVerbForward,
    CycleVerbBackward,
    ToggleLook,
    NextTarget,
    PreviousTarget,
    StopInteraction,
    Quit,
}

impl From<ActionDto> for InputAction {
    fn from(value: ActionDto) -> Self {
        match value {
            ActionDto::CycleVerbForward => InputAction::CycleVerbForward,
            ActionDto::CycleVerbBackward => InputAction::CycleVerbBackward,
            ActionDto::ToggleLook => InputAction::ToggleLook,
            ActionDto::NextTarget => InputAction::NextTarget,
            ActionDto::PreviousTarget => InputAction::PreviousTarget,
            ActionDto::StopInteraction => InputAction::StopInteraction,
            ActionDto::Quit => InputAction::Quit,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
enum DeviceDto {
    #[default]
    MouseAndKeyboard,
    Touch,
    Controller,
}

impl From<DeviceDto> for InputDevice {
    fn from(value: DeviceDto) -> Self {
        match value {
            DeviceDto::MouseAndKeyboard => InputDevice::MouseAndKeyboard,
            DeviceDto::Touch => InputDevice::Touch,
            DeviceDto::Controller => InputDevice::Controller,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FrameDto {
    #[serde(default)]
    pointer_px: Option<PointDto>,
    #[serde(default)]
    pointer_world: Option<PointDto>,
    #[serde(default)]
    primary_pressed: bool,
    #[serde(default)]
    primary_down: bool,
    #[serde(default)]
    secondary_pressed: bool,
    #[serde(default)]
    actions: Vec<ActionDto>,
    #[serde(default)]
    device: DeviceDto,
    #[serde(default)]
    axes: BTreeMap<String, f32>,
    #[serde(default)]
    repeat: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScriptDto {
    #[serde(default)]
    window: Option<WindowDto>,
    #[serde(default)]
    dt: Option<f32>,
    frames: Vec<FrameDto>,
}

/// A recorded input session: fixed-step frames replayed against a room scene.
#[derive(Debug)]
pub(crate) struct InputScript {
    window: (u32, u32),
    dt_seconds: f32,
    frames: Vec<FrameDto>,
}

#[derive(Debug)]
pub(crate) struct ScriptReport {
    pub(crate) ticks: u64,
    pub(crate) quit_requested: bool,
    pub(crate) fired: Vec<FiredInteraction>,
    pub(crate) final_state: InteractionSaveState,
}

impl ScriptReport {
    pub(crate) fn final_state_json(&self) -> Result<String, ScriptError> {
        Ok(self.final_state.to_json()?)
    }
}

pub(crate) fn load_script(path: &Path) -> Result<InputScript, ScriptError> {
    let raw = fs::read_to_string(path).map_err(|source| ScriptError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_script(&raw)
}

pub(crate) fn parse_script(raw: &str) -> Result<InputScript, ScriptError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    let dto = serde_path_to_error::deserialize::<_, ScriptDto>(&mut deserializer).map_err(
        |error| {
            let path = error.path().to_string();
            ScriptError::Parse {
                path: if path.is_empty() { ".".to_string() } else { path },
                source: error.into_inner(),
            }
        },
    )?;

    let dt_seconds = dto.dt.unwrap_or(DEFAULT_DT_SECONDS);
    if !dt_seconds.is_finite() || dt_seconds <= 0.0 {
        return Err(ScriptError::InvalidDt(dt_seconds));
    }
    for (index, frame) in dto.frames.iter().enumerate() {
        if frame.pointer_px.is_some() && frame.pointer_world.is_some() {
            return Err(ScriptError::InvalidFrame {
                index,
                message: "pointer_px and pointer_world are mutually exclusive".to_string(),
            });
        }
        if frame.repeat == Some(0) || frame.repeat.is_some_and(|repeat| repeat > MAX_REPEAT) {
            return Err(ScriptError::InvalidFrame {
                index,
                message: format!("repeat must be in 1..={MAX_REPEAT}"),
            });
        }
    }

    let window = dto
        .window
        .map(|window| (window.width, window.height))
        .unwrap_or((1280, 720));
    Ok(InputScript {
        window,
        dt_seconds,
        frames: dto.frames,
    })
}

impl InputScript {
    fn frame(&self, dto: &FrameDto, world: &HotspotRegistry) -> RawInputFrame {
        let pointer_px = match (dto.pointer_px, dto.pointer_world) {
            (Some(px), _) => Some(engine::Vec2::new(px.x, px.y)),
            (None, Some(point)) => Some(world_to_screen_px(
                world.camera(),
                self.window,
                engine::Vec2::new(point.x, point.y),
            )),
            (None, None) => None,
        };
        let mut frame = RawInputFrame::empty()
            .with_window_size(self.window)
            .with_device(dto.device.into())
            .with_pointer_px(pointer_px)
            .with_primary_down(dto.primary_down)
            .with_primary_pressed(dto.primary_pressed)
            .with_secondary_pressed(dto.secondary_pressed);
        for action in &dto.actions {
            frame = frame.with_action_pressed((*action).into());
        }
        for (name, value) in &dto.axes {
            frame = frame.with_axis(name, *value);
        }
        frame
    }

    /// Loads `scene`, feeds every frame, and unloads it. A quit action stops the
    /// replay early.
    pub(crate) fn replay(&self, scene: &mut RoomScene) -> ScriptReport {
        let mut world = HotspotRegistry::default();
        scene.load(&mut world);

        let mut ticks = 0_u64;
        let mut quit_requested = false;
        'frames: for (index, dto) in self.frames.iter().enumerate() {
            let repeat = dto.repeat.unwrap_or(1);
            for _ in 0..repeat {
                let frame = self.frame(dto, &world);
                ticks += 1;
                if scene.step(self.dt_seconds, &frame, &mut world) == SceneCommand::Quit {
                    debug!(frame = index, "script_quit_requested");
                    quit_requested = true;
                    break 'frames;
                }
            }
        }

        let report = ScriptReport {
            ticks,
            quit_requested,
            fired: scene.transcript().to_vec(),
            final_state: scene.save_state(),
        };
        scene.unload(&mut world);
        info!(
            ticks = report.ticks,
            fired = report.fired.len(),
            quit = report.quit_requested,
            "script_replayed"
        );
        report
    }
}
