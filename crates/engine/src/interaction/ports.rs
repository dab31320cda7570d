use std::collections::BTreeMap;

use crate::app::{HotspotRegistry, Vec2};

use super::types::{ArmedVerb, CarriedItem, FiringTarget, HotspotId, ItemId, VerbBinding};

pub trait MovementService {
    /// Waypoints from `from` to `to`, or `None` when no path exists.
    fn compute_path(&mut self, from: Vec2, to: Vec2) -> Option<Vec<Vec2>>;
    fn move_along(&mut self, waypoints: &[Vec2], run: bool);
    fn is_path_active(&self) -> bool;
    fn halt(&mut self);
    fn character_position(&self) -> Vec2;
    fn snap_to(&mut self, position: Vec2);
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionRequest {
    pub binding: VerbBinding,
    pub target: FiringTarget,
    pub carried_item: Option<ItemId>,
    pub double_click: bool,
}

pub trait ExecutionLayer {
    fn invoke(&mut self, request: &ExecutionRequest);
}

pub trait UiLayer {
    fn is_pointer_over_blocking_surface(&self) -> bool;

    fn has_consumed_input(&self) -> bool {
        false
    }

    /// Identifier of a UI element that has claimed the current drag.
    fn active_drag_element(&self) -> Option<u64> {
        None
    }

    fn arrow_prompt_active(&self) -> bool {
        false
    }

    fn notify_verb_armed(&mut self, verb: ArmedVerb);
    fn notify_target_changed(&mut self, target: Option<HotspotId>);
    fn open_verb_surface(&mut self, target: HotspotId, verbs: &[VerbBinding]);
    fn request_close_auxiliary_verb_surface(&mut self);
}

pub trait ItemCatalog {
    fn item(&self, id: ItemId) -> Option<&CarriedItem>;
}

#[derive(Debug, Clone, Default)]
pub struct ItemTable {
    items: BTreeMap<ItemId, CarriedItem>,
}

impl ItemTable {
    pub fn insert(&mut self, item: CarriedItem) {
        self.items.insert(item.id, item);
    }

    pub fn remove(&mut self, id: ItemId) -> Option<CarriedItem> {
        self.items.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CarriedItem> {
        self.items.values()
    }
}

impl ItemCatalog for ItemTable {
    fn item(&self, id: ItemId) -> Option<&CarriedItem> {
        self.items.get(&id)
    }
}

/// Collaborators handed to the dispatcher for one frame.
pub struct InteractionPorts<'a> {
    pub hotspots: &'a mut HotspotRegistry,
    pub movement: &'a mut dyn MovementService,
    pub execution: &'a mut dyn ExecutionLayer,
    pub ui: &'a mut dyn UiLayer,
    pub items: &'a dyn ItemCatalog,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    Superseded,
    TargetLost,
    Paused,
    Stopped,
    Halted,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InteractionEvent {
    VerbFired {
        binding: VerbBinding,
        target: FiringTarget,
        carried_item: Option<ItemId>,
    },
    TargetReached {
        target: FiringTarget,
    },
    TargetChanged {
        previous: Option<HotspotId>,
        current: Option<HotspotId>,
    },
    DoubleClickDetected {
        pointer_px: Option<Vec2>,
    },
    InteractionCancelled {
        target: FiringTarget,
        reason: CancelReason,
    },
    UnhandledInteraction {
        target: FiringTarget,
        carried_item: Option<ItemId>,
    },
    VerbSurfaceOpened {
        target: HotspotId,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InteractionEventKind {
    VerbFired,
    TargetReached,
    TargetChanged,
    DoubleClickDetected,
    InteractionCancelled,
    UnhandledInteraction,
    VerbSurfaceOpened,
}

impl InteractionEvent {
    fn kind(&self) -> InteractionEventKind {
        match self {
            Self::VerbFired { .. } => InteractionEventKind::VerbFired,
            Self::TargetReached { .. } => InteractionEventKind::TargetReached,
            Self::TargetChanged { .. } => InteractionEventKind::TargetChanged,
            Self::DoubleClickDetected { .. } => InteractionEventKind::DoubleClickDetected,
            Self::InteractionCancelled { .. } => InteractionEventKind::InteractionCancelled,
            Self::UnhandledInteraction { .. } => InteractionEventKind::UnhandledInteraction,
            Self::VerbSurfaceOpened { .. } => InteractionEventKind::VerbSurfaceOpened,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InteractionEventCounts {
    pub total: u32,
    pub verb_fired: u32,
    pub target_reached: u32,
    pub target_changed: u32,
    pub double_click_detected: u32,
    pub interaction_cancelled: u32,
    pub unhandled_interaction: u32,
    pub verb_surface_opened: u32,
}

impl InteractionEventCounts {
    fn record(&mut self, kind: InteractionEventKind) {
        self.total = self.total.saturating_add(1);
        let slot = match kind {
            InteractionEventKind::VerbFired => &mut self.verb_fired,
            InteractionEventKind::TargetReached => &mut self.target_reached,
            InteractionEventKind::TargetChanged => &mut self.target_changed,
            InteractionEventKind::DoubleClickDetected => &mut self.double_click_detected,
            InteractionEventKind::InteractionCancelled => &mut self.interaction_cancelled,
            InteractionEventKind::UnhandledInteraction => &mut self.unhandled_interaction,
            InteractionEventKind::VerbSurfaceOpened => &mut self.verb_surface_opened,
        };
        *slot = slot.saturating_add(1);
    }
}

/// Events are visible for the tick that emitted them; the next tick's rollover
/// folds them into `last_tick_counts`.
#[derive(Debug, Default)]
pub struct InteractionEventBus {
    current_tick_events: Vec<InteractionEvent>,
    last_tick_counts: InteractionEventCounts,
}

impl InteractionEventBus {
    pub(crate) fn emit(&mut self, event: InteractionEvent) {
        self.current_tick_events.push(event);
    }

    pub fn iter_emitted_so_far(&self) -> impl Iterator<Item = &InteractionEvent> {
        self.current_tick_events.iter()
    }

    pub(crate) fn finish_tick_rollover(&mut self) {
        let mut counts = InteractionEventCounts::default();
        for event in &self.current_tick_events {
            counts.record(event.kind());
        }
        self.last_tick_counts = counts;
        self.current_tick_events.clear();
    }

    pub fn last_tick_counts(&self) -> InteractionEventCounts {
        self.last_tick_counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::CursorIconId;

    #[test]
    fn rollover_counts_by_kind_and_clears_current_tick() {
        let mut bus = InteractionEventBus::default();
        bus.emit(InteractionEvent::TargetChanged {
            previous: None,
            current: Some(HotspotId(1)),
        });
        bus.emit(InteractionEvent::VerbFired {
            binding: VerbBinding::use_verb(CursorIconId(1)),
            target: FiringTarget::Hotspot(HotspotId(1)),
            carried_item: None,
        });
        bus.emit(InteractionEvent::VerbFired {
            binding: VerbBinding::use_verb(CursorIconId(1)),
            target: FiringTarget::Hotspot(HotspotId(1)),
            carried_item: None,
        });
        assert_eq!(bus.iter_emitted_so_far().count(), 3);

        bus.finish_tick_rollover();
        let counts = bus.last_tick_counts();
        assert_eq!(counts.total, 3);
        assert_eq!(counts.verb_fired, 2);
        assert_eq!(counts.target_changed, 1);
        assert_eq!(bus.iter_emitted_so_far().count(), 0);

        bus.finish_tick_rollover();
        assert_eq!(bus.last_tick_counts(), InteractionEventCounts::default());
    }

    #[test]
    fn item_table_lookup() {
        let mut table = ItemTable::default();
        table.insert(CarriedItem::new(ItemId(4), "key"));
        assert_eq!(table.item(ItemId(4)).map(|item| item.label.as_str()), Some("key"));
        assert!(table.item(ItemId(5)).is_none());
        assert!(table.remove(ItemId(4)).is_some());
        assert!(table.is_empty());
    }
}
