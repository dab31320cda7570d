use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, MouseButton, Touch, TouchPhase, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowBuilder;

use crate::interaction::{DEFAULT_CURSOR_AXIS_X, DEFAULT_CURSOR_AXIS_Y};

use super::input::{ActionStates, InputDevice};
use super::{HotspotRegistry, InputAction, RawInputFrame, Scene, SceneCommand, Vec2};

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    /// Axis names the keyboard stick (IJKL) publishes on every frame.
    pub cursor_axis_x: String,
    pub cursor_axis_y: String,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Adventure".to_string(),
            window_width: 1280,
            window_height: 720,
            target_tps: 60,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            cursor_axis_x: DEFAULT_CURSOR_AXIS_X.to_string(),
            cursor_axis_y: DEFAULT_CURSOR_AXIS_Y.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

pub fn run_app(config: LoopConfig, mut scene: Box<dyn Scene>) -> Result<(), AppError> {
    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = WindowBuilder::new()
        .with_title(config.window_title.clone())
        .with_inner_size(LogicalSize::new(
            config.window_width as f64,
            config.window_height as f64,
        ))
        .build(&event_loop)
        .map_err(AppError::CreateWindow)?;

    event_loop.set_control_flow(ControlFlow::Poll);

    let target_tps = config.target_tps.max(1);
    let max_frame_delta =
        normalize_non_zero_duration(config.max_frame_delta, Duration::from_millis(250));
    let max_ticks_per_frame = config.max_ticks_per_frame.max(1);
    let fixed_dt = Duration::from_secs_f64(1.0 / target_tps as f64);
    let fixed_dt_seconds = fixed_dt.as_secs_f32();

    let initial_size = window.inner_size();
    let mut input_collector = InputCollector::new(initial_size.width, initial_size.height)
        .with_cursor_axes(config.cursor_axis_x.clone(), config.cursor_axis_y.clone());
    let mut world = HotspotRegistry::default();
    scene.load(&mut world);
    info!(hotspot_count = world.len(), "scene_loaded");
    info!(
        target_tps,
        max_frame_delta_ms = max_frame_delta.as_millis() as u64,
        max_ticks_per_frame,
        "loop_config"
    );

    let mut accumulator = Duration::ZERO;
    let mut last_frame_instant = Instant::now();
    let mut last_applied_title: Option<String> = None;

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    info!(reason = "window_close", "shutdown_requested");
                    window_target.exit();
                }
                WindowEvent::Resized(new_size) => {
                    input_collector.set_window_size(new_size.width, new_size.height);
                }
                WindowEvent::ScaleFactorChanged { .. } => {
                    let size = window.inner_size();
                    input_collector.set_window_size(size.width, size.height);
                }
                WindowEvent::CursorMoved { position, .. } => {
                    input_collector.set_cursor_position_px(position.x as f32, position.y as f32);
                }
                WindowEvent::CursorLeft { .. } => {
                    input_collector.clear_cursor_position();
                }
                WindowEvent::MouseInput { state, button, .. } => {
                    input_collector.handle_mouse_input(button, state);
                }
                WindowEvent::Touch(touch) => {
                    input_collector.handle_touch(&touch);
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    if event.repeat {
                        return;
                    }
                    let is_pressed = event.state == ElementState::Pressed;
                    input_collector.update_action_state_from_physical_key(event.physical_key, is_pressed);
                    if input_collector.quit_requested {
                        info!(reason = "escape_key", "shutdown_requested");
                        window_target.exit();
                    }
                }
                WindowEvent::RedrawRequested => {
                    let now = Instant::now();
                    let raw_frame_dt = now.saturating_duration_since(last_frame_instant);
                    last_frame_instant = now;

                    let clamped_frame_dt = clamp_frame_delta(raw_frame_dt, max_frame_delta);
                    accumulator = accumulator.saturating_add(clamped_frame_dt);

                    let step_plan = plan_sim_steps(accumulator, fixed_dt, max_ticks_per_frame);
                    for _ in 0..step_plan.ticks_to_run {
                        let frame = input_collector.frame_for_tick();
                        if scene.update(fixed_dt_seconds, &frame, &mut world) == SceneCommand::Quit {
                            info!(reason = "scene_command", "shutdown_requested");
                            window_target.exit();
                            break;
                        }
                    }
                    accumulator = step_plan.remaining_accumulator;

                    if step_plan.dropped_backlog > Duration::ZERO {
                        warn!(
                            dropped_backlog_ms = step_plan.dropped_backlog.as_millis() as u64,
                            max_ticks_per_frame, "sim_clamp_triggered"
                        );
                    }

                    let next_title = scene.debug_title(&world);
                    if next_title != last_applied_title {
                        match &next_title {
                            Some(title) => window.set_title(title),
                            None => window.set_title(&config.window_title),
                        }
                        last_applied_title = next_title;
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                window.request_redraw();
            }
            Event::LoopExiting => {
                scene.unload(&mut world);
                info!("shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

/// Accumulates winit events between fixed ticks and hands out one edge-triggered
/// [`RawInputFrame`] per tick.
#[derive(Debug, Default)]
struct InputCollector {
    quit_requested: bool,
    device: InputDevice,
    actions_down: ActionStates,
    actions_pressed: ActionStates,
    cursor_position_px: Option<Vec2>,
    primary_is_down: bool,
    primary_pressed_edge: bool,
    secondary_is_down: bool,
    secondary_pressed_edge: bool,
    primary_finger: Option<u64>,
    stick: [bool; 4],
    cursor_axis_x: String,
    cursor_axis_y: String,
    window_width: u32,
    window_height: u32,
}

const STICK_LEFT: usize = 0;
const STICK_RIGHT: usize = 1;
const STICK_UP: usize = 2;
const STICK_DOWN: usize = 3;

impl InputCollector {
    fn new(window_width: u32, window_height: u32) -> Self {
        Self {
            window_width,
            window_height,
            cursor_axis_x: DEFAULT_CURSOR_AXIS_X.to_string(),
            cursor_axis_y: DEFAULT_CURSOR_AXIS_Y.to_string(),
            ..Self::default()
        }
    }

    fn with_cursor_axes(mut self, x: String, y: String) -> Self {
        self.cursor_axis_x = x;
        self.cursor_axis_y = y;
        self
    }

    fn frame_for_tick(&mut self) -> RawInputFrame {
        let mut axes = BTreeMap::new();
        let horizontal = stick_axis(self.stick[STICK_LEFT], self.stick[STICK_RIGHT]);
        let vertical = stick_axis(self.stick[STICK_DOWN], self.stick[STICK_UP]);
        if !self.cursor_axis_x.is_empty() {
            axes.insert(self.cursor_axis_x.clone(), horizontal);
        }
        if !self.cursor_axis_y.is_empty() {
            axes.insert(self.cursor_axis_y.clone(), vertical);
        }

        let frame = RawInputFrame::new(
            self.device,
            self.cursor_position_px,
            self.primary_is_down || self.primary_pressed_edge,
            self.primary_pressed_edge,
            self.secondary_pressed_edge,
            self.actions_down,
            self.actions_pressed,
            axes,
            self.window_width,
            self.window_height,
        );
        self.primary_pressed_edge = false;
        self.secondary_pressed_edge = false;
        self.actions_pressed.clear();
        frame
    }

    fn update_action_state_from_physical_key(&mut self, key: PhysicalKey, is_pressed: bool) {
        let PhysicalKey::Code(code) = key else {
            return;
        };
        if let Some(slot) = stick_slot(code) {
            self.stick[slot] = is_pressed;
            if is_pressed {
                self.device = InputDevice::Controller;
            }
            return;
        }
        let Some(action) = action_for_key(code) else {
            return;
        };
        if is_pressed && !self.actions_down.is_down(action) {
            self.actions_pressed.set(action, true);
        }
        self.actions_down.set(action, is_pressed);
        if action == InputAction::Quit && is_pressed {
            self.quit_requested = true;
        }
    }

    fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_width = width;
        self.window_height = height;
    }

    fn set_cursor_position_px(&mut self, x: f32, y: f32) {
        self.cursor_position_px = Some(Vec2 { x, y });
        if self.device == InputDevice::Controller {
            self.device = InputDevice::MouseAndKeyboard;
        }
    }

    fn clear_cursor_position(&mut self) {
        self.cursor_position_px = None;
    }

    fn handle_mouse_input(&mut self, button: MouseButton, state: ElementState) {
        self.device = InputDevice::MouseAndKeyboard;
        match button {
            MouseButton::Left => self.set_primary(state == ElementState::Pressed),
            MouseButton::Right => self.set_secondary(state == ElementState::Pressed),
            _ => {}
        }
    }

    fn handle_touch(&mut self, touch: &Touch) {
        let position = Vec2 {
            x: touch.location.x as f32,
            y: touch.location.y as f32,
        };
        self.handle_touch_phase(touch.id, touch.phase, position);
    }

    /// First finger drives the primary button; any further finger landing while it
    /// is down reports a secondary press.
    fn handle_touch_phase(&mut self, finger: u64, phase: TouchPhase, position: Vec2) {
        self.device = InputDevice::Touch;
        match phase {
            TouchPhase::Started => match self.primary_finger {
                None => {
                    self.primary_finger = Some(finger);
                    self.cursor_position_px = Some(position);
                    self.set_primary(true);
                }
                Some(_) => self.secondary_pressed_edge = true,
            },
            TouchPhase::Moved => {
                if self.primary_finger == Some(finger) {
                    self.cursor_position_px = Some(position);
                }
            }
            TouchPhase::Ended | TouchPhase::Cancelled => {
                if self.primary_finger == Some(finger) {
                    self.primary_finger = None;
                    self.cursor_position_px = Some(position);
                    self.set_primary(false);
                }
            }
        }
    }

    fn set_primary(&mut self, is_down: bool) {
        if is_down && !self.primary_is_down {
            self.primary_pressed_edge = true;
        }
        self.primary_is_down = is_down;
    }

    fn set_secondary(&mut self, is_down: bool) {
        if is_down && !self.secondary_is_down {
            self.secondary_pressed_edge = true;
        }
        self.secondary_is_down = is_down;
    }
}

fn action_for_key(code: KeyCode) -> Option<InputAction> {
    match code {
        KeyCode::KeyE | KeyCode::PageDown => Some(InputAction::CycleVerbForward),
        KeyCode::KeyQ | KeyCode::PageUp => Some(InputAction::CycleVerbBackward),
        KeyCode::KeyF => Some(InputAction::ToggleLook),
        KeyCode::Tab | KeyCode::ArrowRight => Some(InputAction::NextTarget),
        KeyCode::ArrowLeft => Some(InputAction::PreviousTarget),
        KeyCode::Space => Some(InputAction::StopInteraction),
        KeyCode::Escape => Some(InputAction::Quit),
        _ => None,
    }
}

fn stick_slot(code: KeyCode) -> Option<usize> {
    match code {
        KeyCode::KeyJ => Some(STICK_LEFT),
        KeyCode::KeyL => Some(STICK_RIGHT),
        KeyCode::KeyI => Some(STICK_UP),
        KeyCode::KeyK => Some(STICK_DOWN),
        _ => None,
    }
}

fn stick_axis(negative: bool, positive: bool) -> f32 {
    f32::from(u8::from(positive)) - f32::from(u8::from(negative))
}

#[derive(Debug, Clone, Copy)]
struct StepPlan {
    ticks_to_run: u32,
    remaining_accumulator: Duration,
    dropped_backlog: Duration,
}

fn plan_sim_steps(
    mut accumulator: Duration,
    fixed_dt: Duration,
    max_ticks_per_frame: u32,
) -> StepPlan {
    let mut ticks_to_run = 0u32;

    while accumulator >= fixed_dt && ticks_to_run < max_ticks_per_frame {
        accumulator = accumulator.saturating_sub(fixed_dt);
        ticks_to_run = ticks_to_run.saturating_add(1);
    }

    let dropped_backlog = if accumulator >= fixed_dt {
        std::mem::take(&mut accumulator)
    } else {
        Duration::ZERO
    };
    StepPlan {
        ticks_to_run,
        remaining_accumulator: accumulator,
        dropped_backlog,
    }
}

fn clamp_frame_delta(frame_dt: Duration, max_frame_delta: Duration) -> Duration {
    frame_dt.min(max_frame_delta)
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}
