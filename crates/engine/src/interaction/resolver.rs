use tracing::debug;

use crate::app::{HotspotRegistry, Vec2};

use super::ports::{InteractionEvent, InteractionEventBus, UiLayer};
use super::settings::{InteractionSettings, TargetingMode};
use super::types::{CarriedItem, Hotspot, HotspotId};

/// Per-frame facts the resolver reads.
#[derive(Debug, Clone, Copy)]
pub struct ResolveInput<'a> {
    pub pointer_px: Option<Vec2>,
    pub window_size: (u32, u32),
    pub character_position: Vec2,
    pub carried_item: Option<&'a CarriedItem>,
    pub interactive: bool,
    /// +1 for next target, -1 for previous, 0 to keep.
    pub cycle_step: i32,
}

#[derive(Debug, Default)]
pub struct TargetResolver {
    active: Option<HotspotId>,
    manual: Option<Option<HotspotId>>,
}

impl TargetResolver {
    pub fn active_target(&self) -> Option<HotspotId> {
        self.active
    }

    /// Hands targeting to script control until `release_manual_target`.
    pub fn set_manual_target(&mut self, target: Option<HotspotId>) {
        self.manual = Some(target);
    }

    pub fn release_manual_target(&mut self) {
        self.manual = None;
    }

    pub fn is_manual(&self) -> bool {
        self.manual.is_some()
    }

    /// Recomputes the active target. Returns true when it changed.
    pub fn resolve(
        &mut self,
        settings: &InteractionSettings,
        input: &ResolveInput<'_>,
        hotspots: &mut HotspotRegistry,
        ui: &mut dyn UiLayer,
        events: &mut InteractionEventBus,
    ) -> bool {
        let next = if !input.interactive {
            None
        } else if let Some(manual) = self.manual {
            manual
        } else if settings.targeting.is_proximity() {
            self.resolve_proximity(settings, input, hotspots)
        } else {
            resolve_pointer(settings, input, hotspots)
        };
        self.apply(next, hotspots, ui, events)
    }

    /// Drops the active target immediately, with the usual notifications.
    pub fn clear(
        &mut self,
        hotspots: &mut HotspotRegistry,
        ui: &mut dyn UiLayer,
        events: &mut InteractionEventBus,
    ) -> bool {
        self.apply(None, hotspots, ui, events)
    }

    fn apply(
        &mut self,
        next: Option<HotspotId>,
        hotspots: &mut HotspotRegistry,
        ui: &mut dyn UiLayer,
        events: &mut InteractionEventBus,
    ) -> bool {
        if next == self.active {
            return false;
        }
        let previous = self.active;
        self.active = next;
        hotspots.set_highlighted_hotspot(next);
        ui.notify_target_changed(next);
        events.emit(InteractionEvent::TargetChanged {
            previous,
            current: next,
        });
        debug!(previous = ?previous, current = ?next, "target_changed");
        true
    }

    fn resolve_proximity(
        &self,
        settings: &InteractionSettings,
        input: &ResolveInput<'_>,
        hotspots: &HotspotRegistry,
    ) -> Option<HotspotId> {
        let mut candidates = hotspots
            .overlapping_hotspots(input.character_position, settings.detector_radius)
            .into_iter()
            .filter(|(id, _)| {
                hotspots.get(*id).is_some_and(|hotspot| {
                    hotspot.layer & settings.interactive_layer_mask != 0
                        && is_valid_candidate(hotspot, settings, input)
                })
            })
            .collect::<Vec<_>>();
        // Stable sort keeps query order among equal distances.
        candidates.sort_by(|a, b| a.1.total_cmp(&b.1));

        let nearest = candidates.first().map(|(id, _)| *id)?;
        if settings.targeting != TargetingMode::ProximityCycle {
            return Some(nearest);
        }

        let Some(current_index) = self
            .active
            .and_then(|active| candidates.iter().position(|(id, _)| *id == active))
        else {
            return Some(nearest);
        };
        let count = candidates.len() as i32;
        let index = (current_index as i32 + input.cycle_step).rem_euclid(count) as usize;
        Some(candidates[index].0)
    }
}

fn resolve_pointer(
    settings: &InteractionSettings,
    input: &ResolveInput<'_>,
    hotspots: &HotspotRegistry,
) -> Option<HotspotId> {
    let pointer = input.pointer_px?;
    let hit = hotspots
        .pick_hotspots_at_cursor(pointer, input.window_size, settings.interactive_layer_mask)
        .into_iter()
        .find(|id| match (settings.pointer_query_range, hotspots.get(*id)) {
            (Some(range), Some(hotspot)) => {
                input.character_position.distance_sq(hotspot.anchor) <= range * range
            }
            (None, Some(_)) => true,
            (_, None) => false,
        })?;
    let hotspot = hotspots.get(hit)?;
    is_valid_candidate(hotspot, settings, input).then_some(hit)
}

pub(crate) fn is_valid_candidate(
    hotspot: &Hotspot,
    settings: &InteractionSettings,
    input: &ResolveInput<'_>,
) -> bool {
    if !hotspot.enabled || !hotspot.within_boundary(input.character_position) {
        return false;
    }
    match input.carried_item {
        Some(item) if settings.auto_disable_unhandled => hotspot.binding_for_item(item.id).is_some(),
        _ => true,
    }
}
