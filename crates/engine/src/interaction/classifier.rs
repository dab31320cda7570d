use std::collections::HashSet;

use tracing::{debug, warn};

use crate::app::{InputDevice, RawInputFrame, Vec2};

use super::settings::InteractionSettings;
use super::types::{ClickState, DragState};

const MAX_AIM_SMOOTHING: f32 = 0.999;

/// World and UI facts the drag priority list depends on, sampled by the caller
/// before classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DragSignals {
    /// A carried item is selected and drag-and-drop is enabled for it.
    pub item_drag_drop: bool,
    pub ui_drag_element: bool,
    pub arrow_prompt_active: bool,
    pub holding_physical_object: bool,
    pub camera_drag_controlled: bool,
    pub pointer_over_target: bool,
    pub pointer_over_ui: bool,
}

#[derive(Debug, Clone)]
struct ClassifierConfig {
    click_lockout_seconds: f32,
    double_press_window_seconds: f32,
    drag_threshold: f32,
    free_drag_movement: bool,
    cursor_axis_x: String,
    cursor_axis_y: String,
    aim_axis_x: String,
    aim_axis_y: String,
    simulated_cursor_speed: f32,
    aim_smoothing: f32,
}

impl ClassifierConfig {
    fn from_settings(settings: &InteractionSettings) -> Self {
        Self {
            click_lockout_seconds: settings.click_lockout_seconds.max(0.0),
            double_press_window_seconds: settings.double_press_window_seconds.max(0.0),
            drag_threshold: settings.drag_threshold.max(0.0),
            free_drag_movement: settings.free_drag_movement,
            cursor_axis_x: settings.cursor_axis_x.clone(),
            cursor_axis_y: settings.cursor_axis_y.clone(),
            aim_axis_x: settings.aim_axis_x.clone(),
            aim_axis_y: settings.aim_axis_y.clone(),
            simulated_cursor_speed: settings.simulated_cursor_speed.max(0.0),
            aim_smoothing: settings.aim_smoothing.clamp(0.0, MAX_AIM_SMOOTHING),
        }
    }
}

/// Turns raw device frames into one click state and one drag state per frame.
#[derive(Debug)]
pub struct InputClassifier {
    config: ClassifierConfig,
    click_lockout: f32,
    double_press_window: f32,
    click_state: ClickState,
    drag_state: DragState,
    ended_drag: Option<DragState>,
    pointer_px: Option<Vec2>,
    simulated_cursor: Option<Vec2>,
    last_sample: Option<Vec2>,
    drag_delta: Vec2,
    drag_distance_px: f32,
    aim_delta: Vec2,
    window_size: (u32, u32),
    device: InputDevice,
    warned_axes: HashSet<String>,
}

impl InputClassifier {
    pub fn new(settings: &InteractionSettings) -> Self {
        Self {
            config: ClassifierConfig::from_settings(settings),
            click_lockout: 0.0,
            double_press_window: 0.0,
            click_state: ClickState::Idle,
            drag_state: DragState::None,
            ended_drag: None,
            pointer_px: None,
            simulated_cursor: None,
            last_sample: None,
            drag_delta: Vec2::ZERO,
            drag_distance_px: 0.0,
            aim_delta: Vec2::ZERO,
            window_size: (0, 0),
            device: InputDevice::default(),
            warned_axes: HashSet::new(),
        }
    }

    pub fn click_state(&self) -> ClickState {
        self.click_state
    }

    pub fn drag_state(&self) -> DragState {
        self.drag_state
    }

    /// Drag state that finished on this frame, if any.
    pub fn ended_drag(&self) -> Option<DragState> {
        self.ended_drag
    }

    pub fn pointer_px(&self) -> Option<Vec2> {
        self.pointer_px
    }

    pub fn drag_delta(&self) -> Vec2 {
        self.drag_delta
    }

    pub fn aim_delta(&self) -> Vec2 {
        self.aim_delta
    }

    pub fn window_size(&self) -> (u32, u32) {
        self.window_size
    }

    pub fn device(&self) -> InputDevice {
        self.device
    }

    /// Marks this frame's click as handled so no later reader sees it.
    pub fn consume_click(&mut self) {
        self.click_state = ClickState::Idle;
    }

    pub fn update(&mut self, dt_seconds: f32, frame: &RawInputFrame, signals: &DragSignals) {
        let dt_seconds = if dt_seconds.is_finite() {
            dt_seconds.max(0.0)
        } else {
            0.0
        };
        self.device = frame.device();
        self.window_size = frame.window_size();
        self.click_lockout = (self.click_lockout - dt_seconds).max(0.0);
        self.double_press_window = (self.double_press_window - dt_seconds).max(0.0);

        self.pointer_px = match frame.device() {
            InputDevice::Controller => Some(self.integrate_simulated_cursor(dt_seconds, frame)),
            InputDevice::MouseAndKeyboard | InputDevice::Touch => frame.pointer_px(),
        };
        self.update_aim(frame);

        self.click_state = self.classify_click(frame);
        self.update_drag(signals);
    }

    fn classify_click(&mut self, frame: &RawInputFrame) -> ClickState {
        let previous = self.click_state;
        if frame.secondary_pressed() {
            return ClickState::SecondaryPress;
        }

        if frame.primary_pressed() {
            if self.double_press_window > 0.0 && self.click_lockout <= 0.0 {
                self.click_lockout = self.config.click_lockout_seconds;
                self.double_press_window = 0.0;
                return ClickState::DoublePress;
            }
            if self.click_lockout <= 0.0 {
                self.click_lockout = self.config.click_lockout_seconds;
                self.double_press_window = self.config.double_press_window_seconds;
                return ClickState::SinglePress;
            }
            debug!(lockout = self.click_lockout, "click_swallowed_by_lockout");
            return ClickState::Idle;
        }

        if frame.primary_down() {
            return ClickState::Held;
        }

        if previous == ClickState::Held && self.click_lockout <= 0.0 {
            ClickState::Released
        } else {
            ClickState::Idle
        }
    }

    fn update_drag(&mut self, signals: &DragSignals) {
        let previous = self.drag_state;
        let pointer = self.pointer_px;

        if self.click_state != ClickState::Held {
            if self.click_state.is_primary_press() {
                self.drag_distance_px = 0.0;
            }
            self.drag_state = DragState::None;
            self.ended_drag = (previous != DragState::None).then_some(previous);
            self.drag_delta = Vec2::ZERO;
            self.last_sample = pointer;
            return;
        }
        self.ended_drag = None;

        let step = match (self.last_sample, pointer) {
            (Some(last), Some(current)) => current.sub(last),
            _ => Vec2::ZERO,
        };
        self.drag_distance_px += step.length();

        let next = self.resolve_drag_state(signals);
        if next != previous && next != DragState::None {
            self.drag_delta = Vec2::ZERO;
            debug!(from = ?previous, to = ?next, "drag_state_entered");
        } else {
            self.drag_delta = step;
        }
        self.last_sample = pointer;
        self.drag_state = next;
    }

    fn normalized_drag_distance(&self) -> f32 {
        let (width, height) = self.window_size;
        let diagonal = ((width as f32).powi(2) + (height as f32).powi(2)).sqrt();
        if diagonal <= f32::EPSILON {
            0.0
        } else {
            self.drag_distance_px / diagonal
        }
    }

    fn resolve_drag_state(&self, signals: &DragSignals) -> DragState {
        if signals.item_drag_drop {
            return if self.normalized_drag_distance() > self.config.drag_threshold {
                DragState::DraggingInventoryItem
            } else {
                DragState::PreDragInventory
            };
        }
        if signals.ui_drag_element {
            return DragState::DraggingUiElement;
        }
        if signals.arrow_prompt_active && self.device.is_touch() {
            return DragState::DraggingScreenArrow;
        }
        if signals.holding_physical_object {
            return DragState::DraggingPhysicalObject;
        }
        if signals.camera_drag_controlled && !signals.pointer_over_target {
            return DragState::RotatingAttachedCamera;
        }
        if self.config.free_drag_movement && !signals.pointer_over_ui && !signals.pointer_over_target
        {
            return DragState::DraggingCharacter;
        }
        DragState::None
    }

    fn integrate_simulated_cursor(&mut self, dt_seconds: f32, frame: &RawInputFrame) -> Vec2 {
        let (width, height) = frame.window_size();
        let center = Vec2::new(width as f32 * 0.5, height as f32 * 0.5);
        let cursor = self.simulated_cursor.unwrap_or(center);

        let horizontal = self.read_axis(frame, AxisSlot::CursorX);
        let vertical = self.read_axis(frame, AxisSlot::CursorY);
        let speed = self.config.simulated_cursor_speed * dt_seconds;
        let moved = Vec2::new(
            (cursor.x + horizontal * speed).clamp(0.0, width as f32),
            (cursor.y - vertical * speed).clamp(0.0, height as f32),
        );
        self.simulated_cursor = Some(moved);
        moved
    }

    fn update_aim(&mut self, frame: &RawInputFrame) {
        let raw = Vec2::new(
            self.read_axis(frame, AxisSlot::AimX),
            self.read_axis(frame, AxisSlot::AimY),
        );
        let smoothing = self.config.aim_smoothing;
        self.aim_delta = self.aim_delta.scale(smoothing).add(raw.scale(1.0 - smoothing));
    }

    fn read_axis(&mut self, frame: &RawInputFrame, slot: AxisSlot) -> f32 {
        let name = match slot {
            AxisSlot::CursorX => &self.config.cursor_axis_x,
            AxisSlot::CursorY => &self.config.cursor_axis_y,
            AxisSlot::AimX => &self.config.aim_axis_x,
            AxisSlot::AimY => &self.config.aim_axis_y,
        };
        if name.is_empty() {
            return 0.0;
        }
        match frame.axis(name) {
            Ok(value) if value.is_finite() => value,
            Ok(_) => 0.0,
            Err(error) => {
                if self.warned_axes.insert(name.clone()) {
                    warn!(axis = %name, error = %error, "input_axis_missing");
                }
                0.0
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum AxisSlot {
    CursorX,
    CursorY,
    AimX,
    AimY,
}
