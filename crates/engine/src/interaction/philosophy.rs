use crate::app::Vec2;

use super::firing::PendingFiring;
use super::settings::{InteractionSettings, LookInput};
use super::types::{
    CarriedItem, ClickState, CursorIconId, DragState, FiringTarget, Hotspot, HotspotId,
    InteractionPhilosophy, ItemId, VerbBinding,
};

/// Everything a philosophy handler may look at for one frame.
#[derive(Debug, Clone, Copy)]
pub(crate) struct DispatchView<'a> {
    pub settings: &'a InteractionSettings,
    pub click: ClickState,
    pub ended_drag: Option<DragState>,
    pub target: Option<&'a Hotspot>,
    pub carried: Option<&'a CarriedItem>,
    pub armed_icon: Option<CursorIconId>,
    pub look_toggled: bool,
    pub verb_surface_open: bool,
    pub pointer_world: Option<Vec2>,
}

impl DispatchView<'_> {
    pub fn primary_trigger(&self) -> bool {
        if self.settings.fire_on_release {
            self.click == ClickState::Released
        } else {
            self.click.is_primary_press()
        }
    }

    pub fn secondary(&self) -> bool {
        self.click == ClickState::SecondaryPress
    }

    fn double_click(&self) -> bool {
        self.click == ClickState::DoublePress
    }

    /// Fires the target's binding for the armed icon, or the unhandled path when
    /// the target has none. `None` when no icon is armed.
    fn armed_icon_decision(&self, target: &Hotspot) -> Option<Decision> {
        let icon = self.armed_icon?;
        Some(match target.binding_for_icon(icon) {
            Some(binding) => self.fire_on_target(target, binding),
            None => Decision::Unhandled {
                target: target.id,
                item: None,
                double_click: self.double_click(),
            },
        })
    }

    fn fire_on_target(&self, target: &Hotspot, binding: &VerbBinding) -> Decision {
        Decision::Fire(
            PendingFiring::new(binding.clone(), FiringTarget::Hotspot(target.id))
                .with_double_click(self.double_click()),
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Decision {
    Idle,
    Fire(PendingFiring),
    Unhandled {
        target: HotspotId,
        item: Option<ItemId>,
        double_click: bool,
    },
    OpenVerbSurface(HotspotId),
    CloseVerbSurface,
    CycleIcons,
    DeselectItem,
    WalkTo(Vec2),
}

type PhilosophyHandler = fn(&DispatchView<'_>) -> Decision;

const HANDLERS: [(InteractionPhilosophy, PhilosophyHandler); 4] = [
    (InteractionPhilosophy::ContextSensitive, context_sensitive),
    (
        InteractionPhilosophy::ChooseInteractionThenTarget,
        choose_interaction_then_target,
    ),
    (
        InteractionPhilosophy::ChooseTargetThenInteraction,
        choose_target_then_interaction,
    ),
    (InteractionPhilosophy::CustomScript, custom_script),
];

pub(crate) fn decide(philosophy: InteractionPhilosophy, view: &DispatchView<'_>) -> Decision {
    HANDLERS
        .iter()
        .find(|(key, _)| *key == philosophy)
        .map(|(_, handler)| handler(view))
        .unwrap_or(Decision::Idle)
}

/// Releasing a dragged inventory item over a target uses it there.
fn drop_decision(view: &DispatchView<'_>) -> Option<Decision> {
    if view.ended_drag != Some(DragState::DraggingInventoryItem) {
        return None;
    }
    let item = view.carried?;
    Some(match view.target {
        Some(target) => combine_decision(view, target, item),
        None => Decision::Idle,
    })
}

fn combine_decision(view: &DispatchView<'_>, target: &Hotspot, item: &CarriedItem) -> Decision {
    match target.binding_for_item(item.id) {
        Some(binding) => Decision::Fire(
            PendingFiring::new(binding.clone(), FiringTarget::Hotspot(target.id))
                .with_item(Some(item.id))
                .with_double_click(view.double_click()),
        ),
        None => Decision::Unhandled {
            target: target.id,
            item: Some(item.id),
            double_click: view.double_click(),
        },
    }
}

fn empty_click_decision(view: &DispatchView<'_>) -> Decision {
    if view.carried.is_some() && view.settings.deselect_item_on_empty_click {
        return Decision::DeselectItem;
    }
    match view.pointer_world {
        Some(point) if view.settings.walk_on_empty_click => Decision::WalkTo(point),
        _ => Decision::Idle,
    }
}

fn context_sensitive(view: &DispatchView<'_>) -> Decision {
    if let Some(decision) = drop_decision(view) {
        return decision;
    }

    if view.secondary() {
        if view.carried.is_some() {
            return Decision::DeselectItem;
        }
        if view.settings.context_look_input != LookInput::SecondaryPress {
            return Decision::Idle;
        }
        return match view.target.and_then(|target| target.look_binding().map(|b| (target, b))) {
            Some((target, binding)) => view.fire_on_target(target, binding),
            None => Decision::Idle,
        };
    }

    if !view.primary_trigger() {
        return Decision::Idle;
    }
    let Some(target) = view.target else {
        return empty_click_decision(view);
    };
    if let Some(item) = view.carried {
        return combine_decision(view, target, item);
    }
    if let Some(decision) = view.armed_icon_decision(target) {
        return decision;
    }

    let look = target.look_binding();
    let chosen = if view.look_toggled && look.is_some() {
        look
    } else {
        target.default_use_binding().or(look)
    };
    match chosen {
        Some(binding) => view.fire_on_target(target, binding),
        None => Decision::Unhandled {
            target: target.id,
            item: None,
            double_click: view.double_click(),
        },
    }
}

fn choose_interaction_then_target(view: &DispatchView<'_>) -> Decision {
    if let Some(decision) = drop_decision(view) {
        return decision;
    }

    if view.secondary() {
        return if view.carried.is_some() {
            Decision::DeselectItem
        } else {
            Decision::CycleIcons
        };
    }

    if !view.primary_trigger() {
        return Decision::Idle;
    }
    let Some(target) = view.target else {
        return empty_click_decision(view);
    };
    if let Some(item) = view.carried {
        return combine_decision(view, target, item);
    }

    view.armed_icon_decision(target)
        .unwrap_or_else(|| Decision::WalkTo(target.walk_anchor()))
}

fn choose_target_then_interaction(view: &DispatchView<'_>) -> Decision {
    if view.verb_surface_open {
        return if view.primary_trigger() || view.secondary() {
            Decision::CloseVerbSurface
        } else {
            Decision::Idle
        };
    }
    if let Some(decision) = drop_decision(view) {
        return decision;
    }

    if view.secondary() {
        return if view.carried.is_some() {
            Decision::DeselectItem
        } else {
            Decision::Idle
        };
    }

    if !view.primary_trigger() {
        return Decision::Idle;
    }
    let Some(target) = view.target else {
        return empty_click_decision(view);
    };
    if let Some(item) = view.carried {
        return combine_decision(view, target, item);
    }
    if let Some(decision) = view.armed_icon_decision(target) {
        return decision;
    }

    let verbs = target.menu_bindings();
    match verbs.as_slice() {
        [] => Decision::Unhandled {
            target: target.id,
            item: None,
            double_click: view.double_click(),
        },
        [only] => view.fire_on_target(target, only),
        _ => Decision::OpenVerbSurface(target.id),
    }
}

fn custom_script(_view: &DispatchView<'_>) -> Decision {
    Decision::Idle
}
