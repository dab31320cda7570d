use std::collections::BTreeMap;

use thiserror::Error;

use super::scene::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    CycleVerbForward,
    CycleVerbBackward,
    ToggleLook,
    NextTarget,
    PreviousTarget,
    StopInteraction,
    Quit,
}

const ACTION_COUNT: usize = 7;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ActionStates {
    down: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub(crate) fn set(&mut self, action: InputAction, is_down: bool) {
        self.down[action.index()] = is_down;
    }

    pub(crate) fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }

    pub(crate) fn clear(&mut self) {
        self.down = [false; ACTION_COUNT];
    }
}

impl InputAction {
    const fn index(self) -> usize {
        match self {
            InputAction::CycleVerbForward => 0,
            InputAction::CycleVerbBackward => 1,
            InputAction::ToggleLook => 2,
            InputAction::NextTarget => 3,
            InputAction::PreviousTarget => 4,
            InputAction::StopInteraction => 5,
            InputAction::Quit => 6,
        }
    }
}

/// Device profile that produced a frame. Touch frames report the first finger as
/// the primary button and a second finger landing as the secondary press.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InputDevice {
    #[default]
    MouseAndKeyboard,
    Touch,
    Controller,
}

impl InputDevice {
    pub fn is_touch(self) -> bool {
        matches!(self, Self::Touch)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputMappingError {
    #[error("input axis '{name}' is not defined by the active device mapping")]
    MissingAxis { name: String },
}

/// Raw device state for one fixed tick. Press fields are edges: they are true only
/// on the tick the button or finger went down.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawInputFrame {
    device: InputDevice,
    pointer_px: Option<Vec2>,
    primary_down: bool,
    primary_pressed: bool,
    secondary_pressed: bool,
    actions_down: ActionStates,
    actions_pressed: ActionStates,
    axes: BTreeMap<String, f32>,
    window_width: u32,
    window_height: u32,
}

impl RawInputFrame {
    pub fn empty() -> Self {
        Self::default()
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        device: InputDevice,
        pointer_px: Option<Vec2>,
        primary_down: bool,
        primary_pressed: bool,
        secondary_pressed: bool,
        actions_down: ActionStates,
        actions_pressed: ActionStates,
        axes: BTreeMap<String, f32>,
        window_width: u32,
        window_height: u32,
    ) -> Self {
        Self {
            device,
            pointer_px,
            primary_down,
            primary_pressed,
            secondary_pressed,
            actions_down,
            actions_pressed,
            axes,
            window_width,
            window_height,
        }
    }

    pub fn with_device(mut self, device: InputDevice) -> Self {
        self.device = device;
        self
    }

    pub fn with_pointer_px(mut self, pointer_px: Option<Vec2>) -> Self {
        self.pointer_px = pointer_px;
        self
    }

    /// Marks the primary button as newly pressed this tick (and therefore down).
    pub fn with_primary_pressed(mut self, pressed: bool) -> Self {
        self.primary_pressed = pressed;
        self.primary_down |= pressed;
        self
    }

    pub fn with_primary_down(mut self, down: bool) -> Self {
        self.primary_down = down;
        self
    }

    pub fn with_secondary_pressed(mut self, pressed: bool) -> Self {
        self.secondary_pressed = pressed;
        self
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions_down.set(action, is_down);
        self
    }

    pub fn with_action_pressed(mut self, action: InputAction) -> Self {
        self.actions_pressed.set(action, true);
        self.actions_down.set(action, true);
        self
    }

    pub fn with_axis(mut self, name: &str, value: f32) -> Self {
        self.axes.insert(name.to_string(), value);
        self
    }

    pub fn with_window_size(mut self, window_size: (u32, u32)) -> Self {
        self.window_width = window_size.0;
        self.window_height = window_size.1;
        self
    }

    pub fn device(&self) -> InputDevice {
        self.device
    }

    pub fn pointer_px(&self) -> Option<Vec2> {
        self.pointer_px
    }

    pub fn primary_down(&self) -> bool {
        self.primary_down
    }

    pub fn primary_pressed(&self) -> bool {
        self.primary_pressed
    }

    pub fn secondary_pressed(&self) -> bool {
        self.secondary_pressed
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions_down.is_down(action)
    }

    pub fn was_pressed(&self, action: InputAction) -> bool {
        self.actions_pressed.is_down(action)
    }

    pub fn axis(&self, name: &str) -> Result<f32, InputMappingError> {
        self.axes
            .get(name)
            .copied()
            .ok_or_else(|| InputMappingError::MissingAxis {
                name: name.to_string(),
            })
    }

    pub fn window_size(&self) -> (u32, u32) {
        (self.window_width, self.window_height)
    }
}
