use tracing::{debug, warn};

use super::settings::{CursorIconTable, InteractionSettings};
use super::types::{ArmedVerb, CursorIconId, InteractionPhilosophy, ItemId, VerbBinding, VerbSource};

pub const NO_CYCLE_INDEX: i32 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleDirection {
    Forward,
    Backward,
}

/// Steps from `current` to the next index accepted by `cyclable`, wrapping through
/// `NO_CYCLE_INDEX` at either end of the list.
pub fn step_cycle_index(
    len: usize,
    current: i32,
    direction: CycleDirection,
    mut cyclable: impl FnMut(usize) -> bool,
) -> i32 {
    let len = len as i32;
    let mut index = current.clamp(NO_CYCLE_INDEX, len);
    for _ in 0..=len {
        index = match direction {
            CycleDirection::Forward => index + 1,
            CycleDirection::Backward => index - 1,
        };
        if index < NO_CYCLE_INDEX {
            index = len - 1;
        }
        if index < 0 || index >= len {
            return NO_CYCLE_INDEX;
        }
        if cyclable(index as usize) {
            return index;
        }
    }
    NO_CYCLE_INDEX
}

#[derive(Debug)]
pub struct VerbSelector {
    philosophy: InteractionPhilosophy,
    cycle_inventory_cursors: bool,
    armed_icon: Option<CursorIconId>,
    carried: Option<ItemId>,
    last_carried: Option<ItemId>,
    cycle_index: i32,
    item_before_cycle: Option<ItemId>,
    global_cycle_index: i32,
}

impl VerbSelector {
    pub fn new(settings: &InteractionSettings) -> Self {
        Self {
            philosophy: settings.philosophy,
            cycle_inventory_cursors: settings.cycle_inventory_cursors,
            armed_icon: None,
            carried: None,
            last_carried: None,
            cycle_index: NO_CYCLE_INDEX,
            item_before_cycle: None,
            global_cycle_index: NO_CYCLE_INDEX,
        }
    }

    /// A selected item takes precedence in the reported verb.
    pub fn armed_verb(&self) -> ArmedVerb {
        match (self.carried, self.armed_icon) {
            (Some(item), _) => ArmedVerb::CarriedItemVerb(item),
            (None, Some(icon)) => ArmedVerb::IconVerb(icon),
            (None, None) => ArmedVerb::NoVerb,
        }
    }

    pub fn armed_icon(&self) -> Option<CursorIconId> {
        self.armed_icon
    }

    pub fn carried_item(&self) -> Option<ItemId> {
        self.carried
    }

    pub fn last_carried_item(&self) -> Option<ItemId> {
        self.last_carried
    }

    pub fn cycle_index(&self) -> i32 {
        self.cycle_index
    }

    pub fn arm_verb(&mut self, icon: CursorIconId) -> ArmedVerb {
        self.armed_icon = Some(icon);
        if !self.philosophy.keeps_icon_with_item() {
            self.carried = None;
        }
        self.global_cycle_index = NO_CYCLE_INDEX;
        self.verify_exclusion()
    }

    pub fn arm_carried_item(&mut self, item: ItemId) -> ArmedVerb {
        if self.carried != Some(item) {
            self.reset_cycle();
        }
        self.carried = Some(item);
        self.last_carried = Some(item);
        if !self.philosophy.keeps_icon_with_item() {
            self.armed_icon = None;
        }
        self.verify_exclusion()
    }

    pub fn clear_carried_item(&mut self) -> ArmedVerb {
        if self.carried.take().is_some() {
            self.reset_cycle();
        }
        self.armed_verb()
    }

    pub fn clear_icon(&mut self) -> ArmedVerb {
        self.armed_icon = None;
        self.global_cycle_index = NO_CYCLE_INDEX;
        self.armed_verb()
    }

    pub fn reset_to_pointer(&mut self) -> ArmedVerb {
        self.armed_icon = None;
        self.carried = None;
        self.reset_cycle();
        self.global_cycle_index = NO_CYCLE_INDEX;
        ArmedVerb::NoVerb
    }

    fn reset_cycle(&mut self) {
        self.cycle_index = NO_CYCLE_INDEX;
        self.item_before_cycle = None;
    }

    /// Called whenever the owning target changes. A verb armed by the cycle is
    /// dropped and the item carried before the cycle started is reselected.
    pub fn leave_cycle(&mut self) -> ArmedVerb {
        if self.cycle_index == NO_CYCLE_INDEX {
            self.item_before_cycle = None;
            return self.armed_verb();
        }
        self.cycle_index = NO_CYCLE_INDEX;
        self.restore_item_before_cycle()
    }

    fn restore_item_before_cycle(&mut self) -> ArmedVerb {
        self.armed_icon = None;
        self.carried = self.item_before_cycle.take();
        if let Some(item) = self.carried {
            self.last_carried = Some(item);
        }
        self.verify_exclusion()
    }

    fn is_cyclable(&self, binding: &VerbBinding, icons: &CursorIconTable) -> bool {
        if binding.disabled || binding.single_interaction_only || !icons.allows_cycling(binding.icon)
        {
            return false;
        }
        match binding.source {
            VerbSource::Use | VerbSource::Examine => true,
            VerbSource::InventoryCombination => {
                self.cycle_inventory_cursors && binding.item.is_some()
            }
            VerbSource::Unhandled => false,
        }
    }

    /// Steps through `bindings` and arms whatever the new index addresses.
    pub fn cycle(
        &mut self,
        direction: CycleDirection,
        bindings: &[VerbBinding],
        icons: &CursorIconTable,
    ) -> ArmedVerb {
        if self.cycle_index == NO_CYCLE_INDEX {
            self.item_before_cycle = self.carried;
        }
        let next = step_cycle_index(bindings.len(), self.cycle_index, direction, |index| {
            self.is_cyclable(&bindings[index], icons)
        });
        self.cycle_index = next;
        debug!(direction = ?direction, cycle_index = next, "verb_cycle_step");

        let Some(binding) = usize::try_from(next).ok().and_then(|index| bindings.get(index)) else {
            return self.restore_item_before_cycle();
        };

        match (binding.source, binding.item) {
            (VerbSource::InventoryCombination, Some(item)) => {
                self.carried = Some(item);
                self.last_carried = Some(item);
                if !self.philosophy.keeps_icon_with_item() {
                    self.armed_icon = None;
                }
            }
            _ => {
                self.armed_icon = Some(binding.icon);
                if !self.philosophy.keeps_icon_with_item() {
                    self.carried = None;
                }
            }
        }
        self.verify_exclusion()
    }

    /// Steps the armed icon through every cyclable icon of the table.
    pub fn cycle_global(&mut self, direction: CycleDirection, icons: &CursorIconTable) -> ArmedVerb {
        let entries = icons.icons();
        let next = step_cycle_index(entries.len(), self.global_cycle_index, direction, |index| {
            entries[index].allow_cycling
        });
        self.global_cycle_index = next;
        self.armed_icon = usize::try_from(next)
            .ok()
            .and_then(|index| entries.get(index))
            .map(|icon| icon.id);
        if self.armed_icon.is_some() && !self.philosophy.keeps_icon_with_item() {
            self.carried = None;
        }
        self.verify_exclusion()
    }

    pub(crate) fn restore(
        &mut self,
        armed_icon: Option<CursorIconId>,
        carried: Option<ItemId>,
        cycle_index: i32,
    ) -> ArmedVerb {
        self.armed_icon = armed_icon;
        self.carried = carried;
        if carried.is_some() {
            self.last_carried = carried;
        }
        self.cycle_index = cycle_index.max(NO_CYCLE_INDEX);
        self.item_before_cycle = None;
        self.global_cycle_index = NO_CYCLE_INDEX;
        self.verify_exclusion()
    }

    fn verify_exclusion(&mut self) -> ArmedVerb {
        if self.armed_icon.is_some()
            && self.carried.is_some()
            && !self.philosophy.keeps_icon_with_item()
        {
            warn!(
                philosophy = ?self.philosophy,
                icon = ?self.armed_icon,
                item = ?self.carried,
                "armed_verb_exclusion_violated"
            );
            return self.reset_to_pointer();
        }
        self.armed_verb()
    }
}
