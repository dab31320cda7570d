use serde::{Deserialize, Serialize};

use crate::app::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HotspotId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub u32);

/// Index into the cursor icon table. Verb labels are looked up by this index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CursorIconId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbSource {
    Use,
    Examine,
    InventoryCombination,
    /// Fallback action run when nothing else matched.
    Unhandled,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ApproachMode {
    #[default]
    None,
    WalkTo,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DoubleClickApproach {
    #[default]
    Ignore,
    Run,
    Snap,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VerbBinding {
    pub icon: CursorIconId,
    pub source: VerbSource,
    /// Item this binding reacts to. Only meaningful for inventory combinations.
    pub item: Option<ItemId>,
    pub disabled: bool,
    pub single_interaction_only: bool,
    pub approach: ApproachMode,
    /// Per-binding double-click behaviour. `None` defers to the global setting.
    pub double_click: Option<DoubleClickApproach>,
    pub consumes_item: bool,
}

impl VerbBinding {
    fn with_source(icon: CursorIconId, source: VerbSource, item: Option<ItemId>) -> Self {
        Self {
            icon,
            source,
            item,
            disabled: false,
            single_interaction_only: false,
            approach: ApproachMode::None,
            double_click: None,
            consumes_item: false,
        }
    }

    pub fn use_verb(icon: CursorIconId) -> Self {
        Self::with_source(icon, VerbSource::Use, None)
    }

    pub fn examine(icon: CursorIconId) -> Self {
        Self::with_source(icon, VerbSource::Examine, None)
    }

    pub fn combine(icon: CursorIconId, item: ItemId) -> Self {
        Self::with_source(icon, VerbSource::InventoryCombination, Some(item))
    }

    pub fn unhandled(icon: CursorIconId) -> Self {
        Self::with_source(icon, VerbSource::Unhandled, None)
    }

    pub fn walk_to(mut self) -> Self {
        self.approach = ApproachMode::WalkTo;
        self
    }

    pub fn with_double_click(mut self, approach: DoubleClickApproach) -> Self {
        self.double_click = Some(approach);
        self
    }

    pub fn consuming(mut self) -> Self {
        self.consumes_item = true;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    pub fn single_interaction_only(mut self) -> Self {
        self.single_interaction_only = true;
        self
    }

    pub fn is_available(&self) -> bool {
        !self.disabled
    }

    pub fn is_unhandled(&self) -> bool {
        self.source == VerbSource::Unhandled
    }
}

fn first_available<'a>(
    bindings: &'a [VerbBinding],
    mut predicate: impl FnMut(&VerbBinding) -> bool,
) -> Option<&'a VerbBinding> {
    bindings
        .iter()
        .find(|binding| binding.is_available() && predicate(binding))
}

#[derive(Debug, Clone, PartialEq)]
pub struct Hotspot {
    pub id: HotspotId,
    pub label: String,
    /// World-space center of the clickable area.
    pub anchor: Vec2,
    pub half_extents: Vec2,
    pub walk_to: Option<Vec2>,
    /// Maximum character distance from the anchor. `None` means unlimited.
    pub interaction_boundary: Option<f32>,
    pub proximity_radius: f32,
    pub layer: u32,
    pub enabled: bool,
    pub bindings: Vec<VerbBinding>,
    pub unhandled_use: Option<VerbBinding>,
    pub unhandled_inventory: Option<VerbBinding>,
}

impl Hotspot {
    pub fn new(id: HotspotId, label: impl Into<String>, anchor: Vec2) -> Self {
        Self {
            id,
            label: label.into(),
            anchor,
            half_extents: Vec2 { x: 0.5, y: 0.5 },
            walk_to: None,
            interaction_boundary: None,
            proximity_radius: 0.5,
            layer: 1,
            enabled: true,
            bindings: Vec::new(),
            unhandled_use: None,
            unhandled_inventory: None,
        }
    }

    pub fn with_binding(mut self, binding: VerbBinding) -> Self {
        self.bindings.push(binding);
        self
    }

    pub fn has_use_verb(&self) -> bool {
        self.default_use_binding().is_some()
    }

    pub fn has_look_verb(&self) -> bool {
        self.look_binding().is_some()
    }

    pub fn default_use_binding(&self) -> Option<&VerbBinding> {
        first_available(&self.bindings, |binding| binding.source == VerbSource::Use)
    }

    pub fn look_binding(&self) -> Option<&VerbBinding> {
        first_available(&self.bindings, |binding| binding.source == VerbSource::Examine)
    }

    pub fn binding_for_icon(&self, icon: CursorIconId) -> Option<&VerbBinding> {
        first_available(&self.bindings, |binding| {
            binding.icon == icon
                && matches!(binding.source, VerbSource::Use | VerbSource::Examine)
        })
    }

    pub fn binding_for_item(&self, item: ItemId) -> Option<&VerbBinding> {
        first_available(&self.bindings, |binding| {
            binding.source == VerbSource::InventoryCombination && binding.item == Some(item)
        })
    }

    /// Verbs offered on the auxiliary verb surface.
    pub fn menu_bindings(&self) -> Vec<VerbBinding> {
        self.bindings
            .iter()
            .filter(|binding| {
                binding.is_available()
                    && matches!(binding.source, VerbSource::Use | VerbSource::Examine)
            })
            .cloned()
            .collect()
    }

    pub fn is_single_interaction(&self) -> bool {
        self.menu_bindings().len() == 1
    }

    pub fn walk_anchor(&self) -> Vec2 {
        self.walk_to.unwrap_or(self.anchor)
    }

    pub fn contains_world_point(&self, point: Vec2) -> bool {
        (point.x - self.anchor.x).abs() <= self.half_extents.x
            && (point.y - self.anchor.y).abs() <= self.half_extents.y
    }

    pub fn within_boundary(&self, character_position: Vec2) -> bool {
        match self.interaction_boundary {
            Some(boundary) => character_position.distance_sq(self.anchor) <= boundary * boundary,
            None => true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ItemSelectMode {
    #[default]
    Use,
    Give,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CarriedItem {
    pub id: ItemId,
    pub label: String,
    pub select_mode: ItemSelectMode,
    /// Bindings run when another item is used on this one, plus its own look verb.
    pub bindings: Vec<VerbBinding>,
    pub drag_drop_only: bool,
    pub consumable: bool,
}

impl CarriedItem {
    pub fn new(id: ItemId, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            select_mode: ItemSelectMode::Use,
            bindings: Vec::new(),
            drag_drop_only: false,
            consumable: false,
        }
    }

    pub fn with_binding(mut self, binding: VerbBinding) -> Self {
        self.bindings.push(binding);
        self
    }

    pub fn binding_for_item(&self, item: ItemId) -> Option<&VerbBinding> {
        first_available(&self.bindings, |binding| {
            binding.source == VerbSource::InventoryCombination && binding.item == Some(item)
        })
    }

    pub fn look_binding(&self) -> Option<&VerbBinding> {
        first_available(&self.bindings, |binding| binding.source == VerbSource::Examine)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ArmedVerb {
    #[default]
    NoVerb,
    IconVerb(CursorIconId),
    CarriedItemVerb(ItemId),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ClickState {
    #[default]
    Idle,
    SinglePress,
    DoublePress,
    SecondaryPress,
    Held,
    Released,
}

impl ClickState {
    pub fn is_primary_press(self) -> bool {
        matches!(self, Self::SinglePress | Self::DoublePress)
    }
}

/// Resolved by priority: inventory item, UI element, screen arrow, physical
/// object, attached camera, then character.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    None,
    DraggingCharacter,
    DraggingInventoryItem,
    DraggingUiElement,
    DraggingPhysicalObject,
    RotatingAttachedCamera,
    DraggingScreenArrow,
    PreDragInventory,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InteractionPhilosophy {
    #[default]
    ContextSensitive,
    ChooseInteractionThenTarget,
    ChooseTargetThenInteraction,
    CustomScript,
}

impl InteractionPhilosophy {
    /// Whether an icon verb may stay armed while a carried item is selected.
    pub fn keeps_icon_with_item(self) -> bool {
        matches!(self, Self::ChooseInteractionThenTarget)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExecutionContext {
    #[default]
    Interactive,
    Paused,
    Cutscene,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FiringTarget {
    Hotspot(HotspotId),
    Item(ItemId),
}
