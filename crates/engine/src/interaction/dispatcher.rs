use tracing::{debug, info, warn};

use crate::app::{screen_to_world_px, InputAction, RawInputFrame, Vec2};

use super::classifier::{DragSignals, InputClassifier};
use super::firing::{plan_approach, ApproachPlan, InteractionTask, PendingFiring, TaskPoll};
use super::philosophy::{self, Decision, DispatchView};
use super::ports::{
    CancelReason, ExecutionRequest, InteractionEvent, InteractionEventBus, InteractionPorts,
    ItemCatalog,
};
use super::resolver::{ResolveInput, TargetResolver};
use super::save::{InteractionSaveState, INTERACTION_SAVE_VERSION};
use super::selector::{CycleDirection, VerbSelector};
use super::settings::{CursorIconTable, InteractionSettings, LookInput};
use super::types::{
    ArmedVerb, CarriedItem, ClickState, CursorIconId, DragState, ExecutionContext, FiringTarget,
    HotspotId, InteractionPhilosophy, ItemId, ItemSelectMode, VerbBinding, VerbSource,
};

/// Coordinates the classifier, resolver and selector once per frame and turns
/// their combined state into at most one firing.
#[derive(Debug)]
pub struct InteractionDispatcher {
    settings: InteractionSettings,
    icons: CursorIconTable,
    classifier: InputClassifier,
    resolver: TargetResolver,
    selector: VerbSelector,
    events: InteractionEventBus,
    task: Option<InteractionTask>,
    next_task_id: u64,
    context: ExecutionContext,
    ignore_input_requested: bool,
    ignore_input_latched: bool,
    verb_surface: Option<HotspotId>,
    look_toggled: bool,
}

impl InteractionDispatcher {
    pub fn new(
        settings: InteractionSettings,
        icons: CursorIconTable,
        classifier: InputClassifier,
        resolver: TargetResolver,
        selector: VerbSelector,
    ) -> Self {
        for (hook, binding) in [
            ("unhandled_use", &settings.unhandled_use),
            ("unhandled_give", &settings.unhandled_give),
        ] {
            if let Some(binding) = binding {
                if !icons.is_empty() && !icons.contains(binding.icon) {
                    warn!(hook, icon = binding.icon.0, "fallback_binding_icon_unknown");
                }
            }
        }

        Self {
            settings,
            icons,
            classifier,
            resolver,
            selector,
            events: InteractionEventBus::default(),
            task: None,
            next_task_id: 1,
            context: ExecutionContext::Interactive,
            ignore_input_requested: false,
            ignore_input_latched: false,
            verb_surface: None,
            look_toggled: false,
        }
    }

    pub fn from_settings(settings: InteractionSettings, icons: CursorIconTable) -> Self {
        let classifier = InputClassifier::new(&settings);
        let selector = VerbSelector::new(&settings);
        Self::new(settings, icons, classifier, TargetResolver::default(), selector)
    }

    pub fn settings(&self) -> &InteractionSettings {
        &self.settings
    }

    pub fn icons(&self) -> &CursorIconTable {
        &self.icons
    }

    pub fn click_state(&self) -> ClickState {
        self.classifier.click_state()
    }

    pub fn drag_state(&self) -> DragState {
        self.classifier.drag_state()
    }

    pub fn pointer_px(&self) -> Option<Vec2> {
        self.classifier.pointer_px()
    }

    pub fn drag_delta(&self) -> Vec2 {
        self.classifier.drag_delta()
    }

    pub fn aim_delta(&self) -> Vec2 {
        self.classifier.aim_delta()
    }

    pub fn active_target(&self) -> Option<HotspotId> {
        self.resolver.active_target()
    }

    pub fn armed_verb(&self) -> ArmedVerb {
        self.selector.armed_verb()
    }

    pub fn armed_icon(&self) -> Option<CursorIconId> {
        self.selector.armed_icon()
    }

    pub fn carried_item(&self) -> Option<ItemId> {
        self.selector.carried_item()
    }

    pub fn cycle_index(&self) -> i32 {
        self.selector.cycle_index()
    }

    pub fn events(&self) -> &InteractionEventBus {
        &self.events
    }

    pub fn execution_context(&self) -> ExecutionContext {
        self.context
    }

    pub fn has_active_task(&self) -> bool {
        self.task.is_some()
    }

    pub fn verb_surface_target(&self) -> Option<HotspotId> {
        self.verb_surface
    }

    pub fn look_toggled(&self) -> bool {
        self.look_toggled
    }

    pub fn is_interactive(&self) -> bool {
        match self.context {
            ExecutionContext::Interactive => true,
            ExecutionContext::Paused => false,
            ExecutionContext::Cutscene => self.settings.allow_interaction_in_cutscenes,
        }
    }

    /// Suppresses dispatch for the current frame. Cleared at the top of the next one.
    pub fn ignore_input_this_frame(&mut self) {
        self.ignore_input_requested = true;
    }

    pub fn set_manual_target(&mut self, target: Option<HotspotId>) {
        self.resolver.set_manual_target(target);
    }

    pub fn release_manual_target(&mut self) {
        self.resolver.release_manual_target();
    }

    pub fn tick(&mut self, dt_seconds: f32, frame: &RawInputFrame, ports: &mut InteractionPorts<'_>) {
        self.begin_frame(dt_seconds, frame, ports);
        self.dispatch(ports);
    }

    /// Classifier, resolver and selector steps, in that order.
    pub fn begin_frame(
        &mut self,
        dt_seconds: f32,
        frame: &RawInputFrame,
        ports: &mut InteractionPorts<'_>,
    ) {
        self.events.finish_tick_rollover();
        self.ignore_input_latched = std::mem::take(&mut self.ignore_input_requested);

        if frame.was_pressed(InputAction::StopInteraction) {
            self.stop_interaction(ports);
        }

        let items = ports.items;
        let carried = carried_item(&self.selector, items);
        let signals = DragSignals {
            item_drag_drop: carried.is_some_and(|item| {
                self.settings.inventory_drag_drop || item.drag_drop_only
            }),
            ui_drag_element: ports.ui.active_drag_element().is_some(),
            arrow_prompt_active: ports.ui.arrow_prompt_active(),
            holding_physical_object: ports.hotspots.grabbed_object().is_some(),
            camera_drag_controlled: ports.hotspots.camera().drag_controlled,
            pointer_over_target: self.resolver.active_target().is_some(),
            pointer_over_ui: ports.ui.is_pointer_over_blocking_surface(),
        };
        self.classifier.update(dt_seconds, frame, &signals);
        if self.classifier.click_state() == ClickState::DoublePress {
            self.events.emit(InteractionEvent::DoubleClickDetected {
                pointer_px: self.classifier.pointer_px(),
            });
        }

        let interactive = self.is_interactive();
        let cycle_step = i32::from(frame.was_pressed(InputAction::NextTarget))
            - i32::from(frame.was_pressed(InputAction::PreviousTarget));
        let input = ResolveInput {
            pointer_px: self.classifier.pointer_px(),
            window_size: self.classifier.window_size(),
            character_position: ports.movement.character_position(),
            carried_item: carried,
            interactive,
            cycle_step,
        };
        let changed = self.resolver.resolve(
            &self.settings,
            &input,
            &mut *ports.hotspots,
            &mut *ports.ui,
            &mut self.events,
        );
        if changed {
            let before = self.selector.armed_verb();
            let after = self.selector.leave_cycle();
            notify_if_changed(before, after, ports);
            self.look_toggled = false;
        }

        if !interactive {
            return;
        }
        if frame.was_pressed(InputAction::CycleVerbForward) {
            self.cycle_verb(CycleDirection::Forward, ports);
        }
        if frame.was_pressed(InputAction::CycleVerbBackward) {
            self.cycle_verb(CycleDirection::Backward, ports);
        }
        if frame.was_pressed(InputAction::ToggleLook)
            && self.settings.context_look_input == LookInput::ToggleAction
        {
            self.look_toggled = !self.look_toggled;
            debug!(look_toggled = self.look_toggled, "look_toggle_flipped");
        }
    }

    /// Task polling, the shared input gate, then the active philosophy's handler.
    pub fn dispatch(&mut self, ports: &mut InteractionPorts<'_>) {
        self.poll_task(ports);

        if ports.ui.is_pointer_over_blocking_surface()
            || ports.ui.has_consumed_input()
            || self.ignore_input_latched
            || !self.is_interactive()
        {
            return;
        }

        let items = ports.items;
        let decision = {
            let target = self
                .resolver
                .active_target()
                .and_then(|id| ports.hotspots.get(id));
            let pointer_world = self.classifier.pointer_px().map(|pointer| {
                screen_to_world_px(
                    ports.hotspots.camera(),
                    self.classifier.window_size(),
                    pointer,
                )
            });
            let view = DispatchView {
                settings: &self.settings,
                click: self.classifier.click_state(),
                ended_drag: self.classifier.ended_drag(),
                target,
                carried: carried_item(&self.selector, items),
                armed_icon: self.selector.armed_icon(),
                look_toggled: self.look_toggled,
                verb_surface_open: self.verb_surface.is_some(),
                pointer_world,
            };
            philosophy::decide(self.settings.philosophy, &view)
        };

        if decision != Decision::Idle {
            self.classifier.consume_click();
        }
        self.apply_decision(decision, ports);
    }

    fn apply_decision(&mut self, decision: Decision, ports: &mut InteractionPorts<'_>) {
        match decision {
            Decision::Idle => {}
            Decision::Fire(pending) => self.fire(pending, ports),
            Decision::Unhandled {
                target,
                item,
                double_click,
            } => {
                self.fire_unhandled(FiringTarget::Hotspot(target), item, double_click, ports);
            }
            Decision::OpenVerbSurface(target) => self.open_verb_surface(target, ports),
            Decision::CloseVerbSurface => self.close_verb_surface(ports),
            Decision::CycleIcons => {
                let before = self.selector.armed_verb();
                let after = self.selector.cycle_global(CycleDirection::Forward, &self.icons);
                notify_if_changed(before, after, ports);
            }
            Decision::DeselectItem => {
                let before = self.selector.armed_verb();
                let after = self.selector.clear_carried_item();
                notify_if_changed(before, after, ports);
            }
            Decision::WalkTo(point) => self.walk_to(point, ports),
        }
    }

    pub fn cycle_verb_forward(&mut self, ports: &mut InteractionPorts<'_>) -> ArmedVerb {
        self.cycle_verb(CycleDirection::Forward, ports)
    }

    pub fn cycle_verb_backward(&mut self, ports: &mut InteractionPorts<'_>) -> ArmedVerb {
        self.cycle_verb(CycleDirection::Backward, ports)
    }

    fn cycle_verb(&mut self, direction: CycleDirection, ports: &mut InteractionPorts<'_>) -> ArmedVerb {
        let before = self.selector.armed_verb();
        let after = if self.settings.philosophy == InteractionPhilosophy::ChooseInteractionThenTarget
        {
            self.selector.cycle_global(direction, &self.icons)
        } else if let Some(target) = self
            .resolver
            .active_target()
            .and_then(|id| ports.hotspots.get(id))
        {
            self.selector.cycle(direction, &target.bindings, &self.icons)
        } else if let Some(item) = carried_item(&self.selector, ports.items) {
            self.selector.cycle(direction, &item.bindings, &self.icons)
        } else {
            before
        };
        notify_if_changed(before, after, ports);
        after
    }

    pub fn arm_verb(&mut self, icon: CursorIconId, ports: &mut InteractionPorts<'_>) -> ArmedVerb {
        if !self.icons.is_empty() && !self.icons.contains(icon) {
            debug!(icon = icon.0, "arming_icon_outside_table");
        }
        let before = self.selector.armed_verb();
        let after = self.selector.arm_verb(icon);
        notify_if_changed(before, after, ports);
        after
    }

    pub fn arm_carried_item(&mut self, item: ItemId, ports: &mut InteractionPorts<'_>) -> ArmedVerb {
        let before = self.selector.armed_verb();
        if ports.items.item(item).is_none() {
            warn!(item = item.0, "arm_unknown_item_ignored");
            return before;
        }
        let after = self.selector.arm_carried_item(item);
        notify_if_changed(before, after, ports);
        after
    }

    pub fn clear_carried_item(&mut self, ports: &mut InteractionPorts<'_>) -> ArmedVerb {
        let before = self.selector.armed_verb();
        let after = self.selector.clear_carried_item();
        notify_if_changed(before, after, ports);
        after
    }

    /// Runs `verb` against `target` regardless of the configured philosophy.
    /// Returns false when nothing was invoked or scheduled.
    pub fn fire_explicit(
        &mut self,
        verb: ArmedVerb,
        target: FiringTarget,
        ports: &mut InteractionPorts<'_>,
    ) -> bool {
        let carried = match verb {
            ArmedVerb::CarriedItemVerb(item) => Some(item),
            ArmedVerb::NoVerb | ArmedVerb::IconVerb(_) => None,
        };
        let binding = match target {
            FiringTarget::Hotspot(id) => {
                let Some(hotspot) = ports.hotspots.get(id).filter(|hotspot| hotspot.enabled) else {
                    debug!(hotspot = id.0, "explicit_fire_target_unavailable");
                    return false;
                };
                match verb {
                    ArmedVerb::NoVerb => hotspot
                        .default_use_binding()
                        .or_else(|| hotspot.look_binding()),
                    ArmedVerb::IconVerb(icon) => hotspot.binding_for_icon(icon),
                    ArmedVerb::CarriedItemVerb(item) => hotspot.binding_for_item(item),
                }
                .cloned()
            }
            FiringTarget::Item(id) => {
                let Some(item) = ports.items.item(id) else {
                    debug!(item = id.0, "explicit_fire_item_unavailable");
                    return false;
                };
                match verb {
                    ArmedVerb::NoVerb => item.look_binding(),
                    ArmedVerb::IconVerb(icon) => item.bindings.iter().find(|binding| {
                        binding.is_available()
                            && binding.icon == icon
                            && matches!(binding.source, VerbSource::Use | VerbSource::Examine)
                    }),
                    ArmedVerb::CarriedItemVerb(other) => item.binding_for_item(other),
                }
                .cloned()
            }
        };

        match binding {
            Some(binding) => {
                self.fire(
                    PendingFiring::new(binding, target).with_item(carried),
                    ports,
                );
                true
            }
            None => self.fire_unhandled(target, carried, false, ports),
        }
    }

    /// Picks a verb from the open auxiliary verb surface.
    pub fn select_surface_verb(&mut self, icon: CursorIconId, ports: &mut InteractionPorts<'_>) -> bool {
        let Some(target) = self.verb_surface else {
            debug!(icon = icon.0, "surface_verb_without_open_surface");
            return false;
        };
        self.close_verb_surface(ports);
        let binding = ports
            .hotspots
            .get(target)
            .and_then(|hotspot| hotspot.binding_for_icon(icon))
            .cloned();
        match binding {
            Some(binding) => {
                self.fire(
                    PendingFiring::new(binding, FiringTarget::Hotspot(target)),
                    ports,
                );
                true
            }
            None => self.fire_unhandled(FiringTarget::Hotspot(target), None, false, ports),
        }
    }

    pub fn set_execution_context(
        &mut self,
        context: ExecutionContext,
        ports: &mut InteractionPorts<'_>,
    ) {
        if context == self.context {
            return;
        }
        info!(from = ?self.context, to = ?context, "execution_context_changed");
        self.context = context;
        if !self.is_interactive() {
            self.cancel_in_flight(CancelReason::Paused, ports);
        }
    }

    pub fn stop_interaction(&mut self, ports: &mut InteractionPorts<'_>) {
        self.cancel_in_flight(CancelReason::Stopped, ports);
    }

    pub fn save_state(&self) -> InteractionSaveState {
        InteractionSaveState {
            save_version: INTERACTION_SAVE_VERSION,
            armed_icon: self.selector.armed_icon(),
            carried_item: self.selector.carried_item(),
            cycle_index: self.selector.cycle_index(),
        }
    }

    /// Unknown icon or item ids fall back to pointer mode for that part.
    pub fn restore_state(
        &mut self,
        state: &InteractionSaveState,
        ports: &mut InteractionPorts<'_>,
    ) -> ArmedVerb {
        let armed_icon = state.armed_icon.filter(|icon| {
            let known = self.icons.contains(*icon);
            if !known {
                warn!(icon = icon.0, "restored_icon_unknown");
            }
            known
        });
        let carried = state.carried_item.filter(|item| {
            let known = ports.items.item(*item).is_some();
            if !known {
                warn!(item = item.0, "restored_item_unknown");
            }
            known
        });
        let before = self.selector.armed_verb();
        let after = self.selector.restore(armed_icon, carried, state.cycle_index);
        notify_if_changed(before, after, ports);
        after
    }

    fn cancel_in_flight(&mut self, reason: CancelReason, ports: &mut InteractionPorts<'_>) {
        if let Some(task) = self.task.take() {
            self.cancel_task(task, reason, ports);
        }
        self.close_verb_surface(ports);
        self.look_toggled = false;
        self.ignore_input_requested = false;
        self.ignore_input_latched = false;
    }

    fn cancel_task(
        &mut self,
        task: InteractionTask,
        reason: CancelReason,
        ports: &mut InteractionPorts<'_>,
    ) {
        ports.movement.halt();
        self.events.emit(InteractionEvent::InteractionCancelled {
            target: task.pending.target,
            reason,
        });
        info!(task_id = task.id, reason = ?reason, "interaction_cancelled");

        if reason == CancelReason::TargetLost && self.settings.reset_cursor_after_interaction {
            let before = self.selector.armed_verb();
            let after = self.selector.clear_icon();
            notify_if_changed(before, after, ports);
        }
    }

    fn poll_task(&mut self, ports: &mut InteractionPorts<'_>) {
        let Some(task) = self.task.as_ref() else {
            return;
        };
        if !self.task_target_valid(task, ports) {
            if let Some(task) = self.task.take() {
                self.cancel_task(task, CancelReason::TargetLost, ports);
            }
            return;
        }

        let poll = task.poll(
            ports.movement.character_position(),
            ports.movement.is_path_active(),
            self.settings.arrival_threshold,
        );
        match poll {
            TaskPoll::Pending => {}
            TaskPoll::Arrived => {
                if let Some(task) = self.task.take() {
                    self.events.emit(InteractionEvent::TargetReached {
                        target: task.pending.target,
                    });
                    debug!(task_id = task.id, "interaction_target_reached");
                    self.execute(task.pending, ports);
                }
            }
            TaskPoll::Halted => {
                if let Some(task) = self.task.take() {
                    self.cancel_task(task, CancelReason::Halted, ports);
                }
            }
        }
    }

    fn task_target_valid(&self, task: &InteractionTask, ports: &InteractionPorts<'_>) -> bool {
        let character = ports.movement.character_position();
        let target_valid = match task.pending.target {
            FiringTarget::Hotspot(id) => ports
                .hotspots
                .get(id)
                .is_some_and(|hotspot| hotspot.enabled && hotspot.within_boundary(character)),
            FiringTarget::Item(id) => ports.items.item(id).is_some(),
        };
        let item_valid = match task.pending.carried_item {
            Some(item) => {
                self.selector.carried_item() == Some(item) && ports.items.item(item).is_some()
            }
            None => true,
        };
        target_valid && item_valid
    }

    fn fire_unhandled(
        &mut self,
        target: FiringTarget,
        item: Option<ItemId>,
        double_click: bool,
        ports: &mut InteractionPorts<'_>,
    ) -> bool {
        match self.fallback_binding(target, item, ports) {
            Some(binding) => {
                self.fire(
                    PendingFiring::new(binding, target)
                        .with_item(item)
                        .with_double_click(double_click)
                        .as_fallback(),
                    ports,
                );
                true
            }
            None => {
                self.events.emit(InteractionEvent::UnhandledInteraction {
                    target,
                    carried_item: item,
                });
                debug!(target = ?target, item = ?item, "interaction_unhandled_absorbed");
                false
            }
        }
    }

    fn fallback_binding(
        &self,
        target: FiringTarget,
        item: Option<ItemId>,
        ports: &InteractionPorts<'_>,
    ) -> Option<VerbBinding> {
        let local = match target {
            FiringTarget::Hotspot(id) => ports.hotspots.get(id).and_then(|hotspot| {
                if item.is_some() {
                    hotspot.unhandled_inventory.clone()
                } else {
                    hotspot.unhandled_use.clone()
                }
            }),
            FiringTarget::Item(_) => None,
        };
        let gives = item
            .and_then(|id| ports.items.item(id))
            .is_some_and(|item| item.select_mode == ItemSelectMode::Give);
        let global = if gives {
            self.settings.unhandled_give.clone()
        } else {
            self.settings.unhandled_use.clone()
        };
        local.or(global).filter(VerbBinding::is_available)
    }

    /// Shared firing protocol. Cancels any in-flight task, plans the approach,
    /// drops the highlight and either executes now or starts a walk task.
    fn fire(&mut self, pending: PendingFiring, ports: &mut InteractionPorts<'_>) {
        if let Some(previous) = self.task.take() {
            self.cancel_task(previous, CancelReason::Superseded, ports);
        }

        let walk_anchor = match pending.target {
            FiringTarget::Hotspot(id) => ports.hotspots.get(id).map(|hotspot| hotspot.walk_anchor()),
            FiringTarget::Item(_) => None,
        };
        let character = ports.movement.character_position();
        let plan = plan_approach(
            &pending,
            walk_anchor,
            character,
            self.settings.arrival_threshold,
            self.settings.double_click_approach,
        );
        if matches!(pending.target, FiringTarget::Hotspot(_)) {
            ports.hotspots.set_highlighted_hotspot(None);
        }

        match plan {
            ApproachPlan::Immediate => self.execute(pending, ports),
            ApproachPlan::Snap(destination) => {
                ports.movement.snap_to(destination);
                self.events.emit(InteractionEvent::TargetReached {
                    target: pending.target,
                });
                self.execute(pending, ports);
            }
            ApproachPlan::Walk { destination, run } => {
                start_movement(character, destination, run, ports);
                let id = self.next_task_id;
                self.next_task_id = self.next_task_id.wrapping_add(1);
                info!(task_id = id, target = ?pending.target, run, "interaction_walk_started");
                self.task = Some(InteractionTask {
                    id,
                    pending,
                    destination,
                });
            }
        }
    }

    fn execute(&mut self, pending: PendingFiring, ports: &mut InteractionPorts<'_>) {
        let request = ExecutionRequest {
            binding: pending.binding.clone(),
            target: pending.target,
            carried_item: pending.carried_item,
            double_click: pending.double_click,
        };
        ports.execution.invoke(&request);
        info!(
            target = ?pending.target,
            icon = pending.binding.icon.0,
            source = ?pending.binding.source,
            item = ?pending.carried_item,
            fallback = pending.fallback,
            "verb_fired"
        );
        self.events.emit(InteractionEvent::VerbFired {
            binding: pending.binding.clone(),
            target: pending.target,
            carried_item: pending.carried_item,
        });

        let before = self.selector.armed_verb();
        if self.settings.reset_cursor_after_interaction {
            self.selector.clear_icon();
        }
        if let Some(item) = pending.carried_item.filter(|_| !pending.fallback) {
            let consumable = ports.items.item(item).is_some_and(|item| item.consumable);
            if pending.binding.consumes_item
                || consumable
                || self.settings.clear_item_after_interaction
            {
                self.selector.clear_carried_item();
            }
        }
        self.look_toggled = false;
        notify_if_changed(before, self.selector.armed_verb(), ports);
    }

    fn walk_to(&mut self, point: Vec2, ports: &mut InteractionPorts<'_>) {
        if let Some(task) = self.task.take() {
            self.cancel_task(task, CancelReason::Superseded, ports);
        }
        let character = ports.movement.character_position();
        start_movement(character, point, false, ports);
        debug!(x = point.x, y = point.y, "walk_to_point");
    }

    fn open_verb_surface(&mut self, target: HotspotId, ports: &mut InteractionPorts<'_>) {
        let verbs = ports
            .hotspots
            .get(target)
            .map(|hotspot| hotspot.menu_bindings())
            .unwrap_or_default();
        ports.ui.open_verb_surface(target, &verbs);
        self.verb_surface = Some(target);
        self.events
            .emit(InteractionEvent::VerbSurfaceOpened { target });
        debug!(hotspot = target.0, verb_count = verbs.len(), "verb_surface_opened");
    }

    fn close_verb_surface(&mut self, ports: &mut InteractionPorts<'_>) {
        if self.verb_surface.take().is_some() {
            ports.ui.request_close_auxiliary_verb_surface();
        }
    }
}

fn carried_item<'i>(selector: &VerbSelector, items: &'i dyn ItemCatalog) -> Option<&'i CarriedItem> {
    selector.carried_item().and_then(|id| items.item(id))
}

fn notify_if_changed(before: ArmedVerb, after: ArmedVerb, ports: &mut InteractionPorts<'_>) {
    if before != after {
        ports.ui.notify_verb_armed(after);
        debug!(verb = ?after, "verb_armed");
    }
}

/// Paths to `destination`, degrading to a straight approach when no path exists.
fn start_movement(from: Vec2, destination: Vec2, run: bool, ports: &mut InteractionPorts<'_>) {
    let waypoints = match ports.movement.compute_path(from, destination) {
        Some(path) if !path.is_empty() => path,
        _ => {
            debug!(x = destination.x, y = destination.y, "path_not_found_direct_approach");
            vec![destination]
        }
    };
    ports.movement.move_along(&waypoints, run);
}
