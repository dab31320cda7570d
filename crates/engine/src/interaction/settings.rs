use super::types::{CursorIconId, DoubleClickApproach, InteractionPhilosophy, VerbBinding};

pub const DEFAULT_CURSOR_AXIS_X: &str = "CursorHorizontal";
pub const DEFAULT_CURSOR_AXIS_Y: &str = "CursorVertical";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TargetingMode {
    #[default]
    PointerQuery,
    ProximityNearest,
    ProximityCycle,
}

impl TargetingMode {
    pub fn is_proximity(self) -> bool {
        !matches!(self, Self::PointerQuery)
    }
}

/// Input that selects the look verb under the context-sensitive philosophy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LookInput {
    #[default]
    SecondaryPress,
    ToggleAction,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InteractionSettings {
    pub philosophy: InteractionPhilosophy,
    pub click_lockout_seconds: f32,
    pub double_press_window_seconds: f32,
    /// Fraction of the screen diagonal the pointer must travel before a drag counts.
    pub drag_threshold: f32,
    pub inventory_drag_drop: bool,
    pub free_drag_movement: bool,
    pub fire_on_release: bool,
    pub targeting: TargetingMode,
    pub interactive_layer_mask: u32,
    /// Maximum character-to-hotspot distance for pointer targeting. `None` is unlimited.
    pub pointer_query_range: Option<f32>,
    pub detector_radius: f32,
    pub auto_disable_unhandled: bool,
    pub context_look_input: LookInput,
    pub reset_cursor_after_interaction: bool,
    pub clear_item_after_interaction: bool,
    pub deselect_item_on_empty_click: bool,
    pub walk_on_empty_click: bool,
    pub cycle_inventory_cursors: bool,
    pub double_click_approach: DoubleClickApproach,
    pub arrival_threshold: f32,
    pub unhandled_use: Option<VerbBinding>,
    pub unhandled_give: Option<VerbBinding>,
    /// Empty names disable the axis.
    pub cursor_axis_x: String,
    pub cursor_axis_y: String,
    pub aim_axis_x: String,
    pub aim_axis_y: String,
    pub simulated_cursor_speed: f32,
    /// Exponential smoothing factor in `[0, 1)`. Zero passes the raw aim through.
    pub aim_smoothing: f32,
    pub allow_interaction_in_cutscenes: bool,
}

impl Default for InteractionSettings {
    fn default() -> Self {
        Self {
            philosophy: InteractionPhilosophy::ContextSensitive,
            click_lockout_seconds: 0.1,
            double_press_window_seconds: 0.4,
            drag_threshold: 0.02,
            inventory_drag_drop: false,
            free_drag_movement: false,
            fire_on_release: false,
            targeting: TargetingMode::PointerQuery,
            interactive_layer_mask: u32::MAX,
            pointer_query_range: None,
            detector_radius: 1.0,
            auto_disable_unhandled: false,
            context_look_input: LookInput::SecondaryPress,
            reset_cursor_after_interaction: true,
            clear_item_after_interaction: false,
            deselect_item_on_empty_click: true,
            walk_on_empty_click: false,
            cycle_inventory_cursors: false,
            double_click_approach: DoubleClickApproach::Ignore,
            arrival_threshold: 0.1,
            unhandled_use: None,
            unhandled_give: None,
            cursor_axis_x: DEFAULT_CURSOR_AXIS_X.to_string(),
            cursor_axis_y: DEFAULT_CURSOR_AXIS_Y.to_string(),
            aim_axis_x: String::new(),
            aim_axis_y: String::new(),
            simulated_cursor_speed: 600.0,
            aim_smoothing: 0.0,
            allow_interaction_in_cutscenes: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorIcon {
    pub id: CursorIconId,
    pub label: String,
    pub allow_cycling: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CursorIconTable {
    icons: Vec<CursorIcon>,
}

impl CursorIconTable {
    pub fn new(mut icons: Vec<CursorIcon>) -> Self {
        icons.sort_by_key(|icon| icon.id);
        icons.dedup_by_key(|icon| icon.id);
        Self { icons }
    }

    pub fn get(&self, id: CursorIconId) -> Option<&CursorIcon> {
        self.icons
            .binary_search_by_key(&id, |icon| icon.id)
            .ok()
            .map(|index| &self.icons[index])
    }

    pub fn contains(&self, id: CursorIconId) -> bool {
        self.get(id).is_some()
    }

    pub fn label(&self, id: CursorIconId) -> Option<&str> {
        self.get(id).map(|icon| icon.label.as_str())
    }

    /// Icons missing from the table are treated as cyclable.
    pub fn allows_cycling(&self, id: CursorIconId) -> bool {
        self.get(id).map(|icon| icon.allow_cycling).unwrap_or(true)
    }

    pub fn icons(&self) -> &[CursorIcon] {
        &self.icons
    }

    pub fn len(&self) -> usize {
        self.icons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.icons.is_empty()
    }
}
