use super::*;
use crate::app::{world_to_screen_px, Camera2D, HotspotRegistry, InputAction, RawInputFrame, Vec2};

const DT: f32 = 1.0 / 60.0;
const SETTLE: f32 = 0.5;
const WINDOW: (u32, u32) = (1280, 720);

const DOOR: HotspotId = HotspotId(1);
const CHEST: HotspotId = HotspotId(2);
const GATE: HotspotId = HotspotId(3);
const WELL: HotspotId = HotspotId(4);
const KEY: ItemId = ItemId(5);
const APPLE: ItemId = ItemId(6);

const USE: CursorIconId = CursorIconId(1);
const LOOK: CursorIconId = CursorIconId(2);
const TALK: CursorIconId = CursorIconId(3);
const SHRUG: CursorIconId = CursorIconId(7);

#[derive(Default)]
struct RecordingMovement {
    position: Vec2,
    path_active: bool,
    no_path: bool,
    walks: Vec<(Vec<Vec2>, bool)>,
    halts: u32,
    snaps: Vec<Vec2>,
}

impl MovementService for RecordingMovement {
    fn compute_path(&mut self, from: Vec2, to: Vec2) -> Option<Vec<Vec2>> {
        if self.no_path {
            None
        } else {
            Some(vec![from, to])
        }
    }

    fn move_along(&mut self, waypoints: &[Vec2], run: bool) {
        self.walks.push((waypoints.to_vec(), run));
        self.path_active = true;
    }

    fn is_path_active(&self) -> bool {
        self.path_active
    }

    fn halt(&mut self) {
        self.halts += 1;
        self.path_active = false;
    }

    fn character_position(&self) -> Vec2 {
        self.position
    }

    fn snap_to(&mut self, position: Vec2) {
        self.snaps.push(position);
        self.position = position;
        self.path_active = false;
    }
}

#[derive(Default)]
struct RecordingExecution {
    requests: Vec<ExecutionRequest>,
}

impl ExecutionLayer for RecordingExecution {
    fn invoke(&mut self, request: &ExecutionRequest) {
        self.requests.push(request.clone());
    }
}

#[derive(Default)]
struct RecordingUi {
    blocking: bool,
    armed: Vec<ArmedVerb>,
    targets: Vec<Option<HotspotId>>,
    opened: Vec<(HotspotId, Vec<VerbBinding>)>,
    close_requests: u32,
}

impl UiLayer for RecordingUi {
    fn is_pointer_over_blocking_surface(&self) -> bool {
        self.blocking
    }

    fn notify_verb_armed(&mut self, verb: ArmedVerb) {
        self.armed.push(verb);
    }

    fn notify_target_changed(&mut self, target: Option<HotspotId>) {
        self.targets.push(target);
    }

    fn open_verb_surface(&mut self, target: HotspotId, verbs: &[VerbBinding]) {
        self.opened.push((target, verbs.to_vec()));
    }

    fn request_close_auxiliary_verb_surface(&mut self) {
        self.close_requests += 1;
    }
}

struct Harness {
    world: HotspotRegistry,
    movement: RecordingMovement,
    execution: RecordingExecution,
    ui: RecordingUi,
    items: ItemTable,
}

impl Harness {
    fn new(hotspots: Vec<Hotspot>) -> Self {
        let mut world = HotspotRegistry::default();
        for hotspot in hotspots {
            world.insert(hotspot);
        }
        let mut items = ItemTable::default();
        items.insert(CarriedItem::new(KEY, "key"));
        items.insert(
            CarriedItem::new(APPLE, "apple").with_binding(VerbBinding::examine(LOOK)),
        );
        Self {
            world,
            movement: RecordingMovement::default(),
            execution: RecordingExecution::default(),
            ui: RecordingUi::default(),
            items,
        }
    }

    fn ports(&mut self) -> InteractionPorts<'_> {
        InteractionPorts {
            hotspots: &mut self.world,
            movement: &mut self.movement,
            execution: &mut self.execution,
            ui: &mut self.ui,
            items: &self.items,
        }
    }

    fn tick(&mut self, dispatcher: &mut InteractionDispatcher, dt: f32, frame: &RawInputFrame) {
        let mut ports = self.ports();
        dispatcher.tick(dt, frame, &mut ports);
    }

    fn settle(&mut self, dispatcher: &mut InteractionDispatcher, at: Vec2) {
        self.tick(dispatcher, SETTLE, &hover_at(at));
    }

    fn fired(&self) -> Vec<(CursorIconId, VerbSource, FiringTarget, Option<ItemId>)> {
        self.execution
            .requests
            .iter()
            .map(|request| {
                (
                    request.binding.icon,
                    request.binding.source,
                    request.target,
                    request.carried_item,
                )
            })
            .collect()
    }
}

fn icons() -> CursorIconTable {
    let icon = |id: CursorIconId, label: &str| CursorIcon {
        id,
        label: label.to_string(),
        allow_cycling: true,
    };
    CursorIconTable::new(vec![
        icon(USE, "Use"),
        icon(LOOK, "Look at"),
        icon(TALK, "Talk to"),
        CursorIcon {
            allow_cycling: false,
            ..icon(SHRUG, "Shrug")
        },
    ])
}

fn dispatcher(settings: InteractionSettings) -> InteractionDispatcher {
    InteractionDispatcher::from_settings(settings, icons())
}

fn pointer_at(world: Vec2) -> Vec2 {
    world_to_screen_px(&Camera2D::default(), WINDOW, world)
}

fn hover_at(world: Vec2) -> RawInputFrame {
    RawInputFrame::empty()
        .with_window_size(WINDOW)
        .with_pointer_px(Some(pointer_at(world)))
}

fn press_at(world: Vec2) -> RawInputFrame {
    hover_at(world).with_primary_pressed(true)
}

fn held_at(world: Vec2) -> RawInputFrame {
    hover_at(world).with_primary_down(true)
}

fn secondary_at(world: Vec2) -> RawInputFrame {
    hover_at(world).with_secondary_pressed(true)
}

fn door() -> Hotspot {
    Hotspot::new(DOOR, "door", Vec2::ZERO)
        .with_binding(VerbBinding::use_verb(USE))
        .with_binding(VerbBinding::examine(LOOK))
        .with_binding(VerbBinding::combine(USE, KEY))
}

fn gate_at(x: f32) -> Hotspot {
    let mut gate = Hotspot::new(GATE, "gate", Vec2::new(x, 0.0))
        .with_binding(VerbBinding::use_verb(USE).walk_to());
    gate.interaction_boundary = Some(3.0);
    gate
}

fn cancel_reasons(dispatcher: &InteractionDispatcher) -> Vec<CancelReason> {
    dispatcher
        .events()
        .iter_emitted_so_far()
        .filter_map(|event| match event {
            InteractionEvent::InteractionCancelled { reason, .. } => Some(*reason),
            _ => None,
        })
        .collect()
}

#[test]
fn context_sensitive_single_press_fires_use() {
    let mut harness = Harness::new(vec![door()]);
    let mut dispatcher = dispatcher(InteractionSettings::default());

    harness.tick(&mut dispatcher, DT, &press_at(Vec2::ZERO));

    assert_eq!(
        harness.fired(),
        vec![(USE, VerbSource::Use, FiringTarget::Hotspot(DOOR), None)]
    );
    assert_eq!(dispatcher.click_state(), ClickState::Idle);
    assert_eq!(harness.world.visual_state().highlighted_hotspot, None);
    assert_eq!(harness.ui.targets, vec![Some(DOOR)]);
}

#[test]
fn carried_item_fires_combination_instead_of_use() {
    let mut harness = Harness::new(vec![door()]);
    let mut dispatcher = dispatcher(InteractionSettings::default());
    {
        let mut ports = harness.ports();
        dispatcher.arm_carried_item(KEY, &mut ports);
    }

    harness.tick(&mut dispatcher, DT, &press_at(Vec2::ZERO));

    assert_eq!(
        harness.fired(),
        vec![(
            USE,
            VerbSource::InventoryCombination,
            FiringTarget::Hotspot(DOOR),
            Some(KEY)
        )]
    );
    // Not consumable and no clear-after policy, so the key stays selected.
    assert_eq!(dispatcher.carried_item(), Some(KEY));
}

#[test]
fn consumable_item_is_cleared_after_firing() {
    let mut harness = Harness::new(vec![door()]);
    let mut key = CarriedItem::new(KEY, "key");
    key.consumable = true;
    harness.items.insert(key);
    let mut dispatcher = dispatcher(InteractionSettings::default());
    {
        let mut ports = harness.ports();
        dispatcher.arm_carried_item(KEY, &mut ports);
    }

    harness.tick(&mut dispatcher, DT, &press_at(Vec2::ZERO));

    assert_eq!(harness.fired().len(), 1);
    assert_eq!(dispatcher.carried_item(), None);
    assert_eq!(harness.ui.armed.last(), Some(&ArmedVerb::NoVerb));
}

#[test]
fn verb_surface_opens_then_selected_verb_fires() {
    let chest = Hotspot::new(CHEST, "chest", Vec2::ZERO)
        .with_binding(VerbBinding::use_verb(USE))
        .with_binding(VerbBinding::examine(LOOK))
        .with_binding(VerbBinding::use_verb(TALK));
    let mut harness = Harness::new(vec![chest]);
    let mut dispatcher = dispatcher(InteractionSettings {
        philosophy: InteractionPhilosophy::ChooseTargetThenInteraction,
        ..InteractionSettings::default()
    });

    harness.tick(&mut dispatcher, DT, &press_at(Vec2::ZERO));
    assert!(harness.fired().is_empty());
    assert_eq!(harness.ui.opened.len(), 1);
    assert_eq!(harness.ui.opened[0].0, CHEST);
    assert_eq!(harness.ui.opened[0].1.len(), 3);
    assert_eq!(dispatcher.verb_surface_target(), Some(CHEST));

    harness.ui.blocking = true;
    harness.settle(&mut dispatcher, Vec2::ZERO);
    assert!(harness.fired().is_empty());

    let fired = {
        let mut ports = harness.ports();
        dispatcher.select_surface_verb(LOOK, &mut ports)
    };
    assert!(fired);
    assert_eq!(
        harness.fired(),
        vec![(LOOK, VerbSource::Examine, FiringTarget::Hotspot(CHEST), None)]
    );
    assert_eq!(harness.ui.close_requests, 1);
    assert_eq!(dispatcher.verb_surface_target(), None);
}

#[test]
fn click_elsewhere_closes_verb_surface() {
    let mut harness = Harness::new(vec![door()]);
    let mut dispatcher = dispatcher(InteractionSettings {
        philosophy: InteractionPhilosophy::ChooseTargetThenInteraction,
        ..InteractionSettings::default()
    });

    harness.tick(&mut dispatcher, DT, &press_at(Vec2::ZERO));
    assert_eq!(dispatcher.verb_surface_target(), Some(DOOR));
    harness.settle(&mut dispatcher, Vec2::ZERO);
    harness.tick(&mut dispatcher, DT, &press_at(Vec2::new(8.0, 8.0)));

    assert_eq!(dispatcher.verb_surface_target(), None);
    assert_eq!(harness.ui.close_requests, 1);
    assert!(harness.fired().is_empty());
}

#[test]
fn target_lost_while_walking_cancels_without_execution() {
    let mut harness = Harness::new(vec![gate_at(2.0)]);
    let mut dispatcher = dispatcher(InteractionSettings::default());
    {
        let mut ports = harness.ports();
        dispatcher.arm_verb(USE, &mut ports);
    }

    harness.tick(&mut dispatcher, DT, &press_at(Vec2::new(2.0, 0.0)));
    assert!(dispatcher.has_active_task());
    assert_eq!(harness.movement.walks.len(), 1);
    assert!(harness.fired().is_empty());
    assert_eq!(dispatcher.armed_verb(), ArmedVerb::IconVerb(USE));

    harness.world.set_anchor(GATE, Vec2::new(10.0, 0.0));
    harness.tick(&mut dispatcher, DT, &hover_at(Vec2::ZERO));

    assert!(!dispatcher.has_active_task());
    assert!(harness.fired().is_empty());
    assert_eq!(harness.movement.halts, 1);
    assert_eq!(cancel_reasons(&dispatcher), vec![CancelReason::TargetLost]);
    assert_eq!(dispatcher.armed_verb(), ArmedVerb::NoVerb);
}

#[test]
fn disabled_target_mid_walk_is_lost() {
    let mut harness = Harness::new(vec![gate_at(2.0)]);
    let mut dispatcher = dispatcher(InteractionSettings::default());

    harness.tick(&mut dispatcher, DT, &press_at(Vec2::new(2.0, 0.0)));
    harness.world.set_enabled(GATE, false);
    harness.tick(&mut dispatcher, DT, &hover_at(Vec2::new(2.0, 0.0)));

    assert!(!dispatcher.has_active_task());
    assert_eq!(cancel_reasons(&dispatcher), vec![CancelReason::TargetLost]);
}

#[test]
fn arrival_executes_walk_task_once() {
    let mut harness = Harness::new(vec![gate_at(2.0)]);
    let mut dispatcher = dispatcher(InteractionSettings::default());

    harness.tick(&mut dispatcher, DT, &press_at(Vec2::new(2.0, 0.0)));
    assert_eq!(
        harness.movement.walks,
        vec![(vec![Vec2::ZERO, Vec2::new(2.0, 0.0)], false)]
    );

    harness.movement.position = Vec2::new(1.95, 0.0);
    harness.tick(&mut dispatcher, DT, &hover_at(Vec2::new(2.0, 0.0)));
    assert_eq!(
        harness.fired(),
        vec![(USE, VerbSource::Use, FiringTarget::Hotspot(GATE), None)]
    );
    assert!(!dispatcher.has_active_task());

    harness.tick(&mut dispatcher, DT, &hover_at(Vec2::new(2.0, 0.0)));
    assert_eq!(harness.fired().len(), 1);
}

#[test]
fn halted_movement_cancels_task() {
    let mut harness = Harness::new(vec![gate_at(2.0)]);
    let mut dispatcher = dispatcher(InteractionSettings::default());

    harness.tick(&mut dispatcher, DT, &press_at(Vec2::new(2.0, 0.0)));
    harness.movement.path_active = false;
    harness.tick(&mut dispatcher, DT, &hover_at(Vec2::new(2.0, 0.0)));

    assert!(!dispatcher.has_active_task());
    assert_eq!(cancel_reasons(&dispatcher), vec![CancelReason::Halted]);
    assert!(harness.fired().is_empty());
}

#[test]
fn second_firing_cancels_outstanding_walk_first() {
    let mut well = Hotspot::new(WELL, "well", Vec2::new(-2.0, 0.0))
        .with_binding(VerbBinding::use_verb(USE).walk_to());
    well.walk_to = Some(Vec2::new(-2.0, -1.0));
    let mut harness = Harness::new(vec![gate_at(2.0), well]);
    let mut dispatcher = dispatcher(InteractionSettings::default());

    harness.tick(&mut dispatcher, DT, &press_at(Vec2::new(2.0, 0.0)));
    harness.settle(&mut dispatcher, Vec2::new(-2.0, 0.0));
    assert!(dispatcher.has_active_task());

    harness.tick(&mut dispatcher, DT, &press_at(Vec2::new(-2.0, 0.0)));
    assert_eq!(cancel_reasons(&dispatcher), vec![CancelReason::Superseded]);
    assert_eq!(harness.movement.halts, 1);
    assert_eq!(harness.movement.walks.len(), 2);
    assert!(harness.fired().is_empty());

    harness.movement.position = Vec2::new(-2.0, -1.0);
    harness.tick(&mut dispatcher, DT, &hover_at(Vec2::new(-2.0, 0.0)));
    assert_eq!(
        harness.fired(),
        vec![(USE, VerbSource::Use, FiringTarget::Hotspot(WELL), None)]
    );
}

#[test]
fn unmatched_verb_without_fallback_is_absorbed() {
    let mut harness = Harness::new(vec![door()]);
    let mut dispatcher = dispatcher(InteractionSettings {
        philosophy: InteractionPhilosophy::ChooseInteractionThenTarget,
        ..InteractionSettings::default()
    });
    {
        let mut ports = harness.ports();
        dispatcher.arm_verb(TALK, &mut ports);
    }

    harness.tick(&mut dispatcher, DT, &press_at(Vec2::ZERO));

    assert!(harness.fired().is_empty());
    assert!(dispatcher.events().iter_emitted_so_far().any(|event| matches!(
        event,
        InteractionEvent::UnhandledInteraction {
            target: FiringTarget::Hotspot(DOOR),
            carried_item: None
        }
    )));
}

#[test]
fn unmatched_verb_runs_global_fallback() {
    let mut harness = Harness::new(vec![door()]);
    let mut dispatcher = dispatcher(InteractionSettings {
        philosophy: InteractionPhilosophy::ChooseInteractionThenTarget,
        unhandled_use: Some(VerbBinding::unhandled(SHRUG)),
        ..InteractionSettings::default()
    });
    {
        let mut ports = harness.ports();
        dispatcher.arm_verb(TALK, &mut ports);
    }

    harness.tick(&mut dispatcher, DT, &press_at(Vec2::ZERO));

    assert_eq!(
        harness.fired(),
        vec![(SHRUG, VerbSource::Unhandled, FiringTarget::Hotspot(DOOR), None)]
    );
}

#[test]
fn hotspot_fallback_wins_over_global_for_items() {
    let mut hotspot = door();
    hotspot.unhandled_inventory = Some(VerbBinding::unhandled(LOOK));
    let mut harness = Harness::new(vec![hotspot]);
    let mut dispatcher = dispatcher(InteractionSettings {
        unhandled_use: Some(VerbBinding::unhandled(SHRUG)),
        ..InteractionSettings::default()
    });
    {
        let mut ports = harness.ports();
        dispatcher.arm_carried_item(APPLE, &mut ports);
    }

    harness.tick(&mut dispatcher, DT, &press_at(Vec2::ZERO));

    assert_eq!(
        harness.fired(),
        vec![(
            LOOK,
            VerbSource::Unhandled,
            FiringTarget::Hotspot(DOOR),
            Some(APPLE)
        )]
    );
    assert_eq!(dispatcher.carried_item(), Some(APPLE));
}

#[test]
fn arming_notifies_ui_and_keeps_exclusion() {
    let mut harness = Harness::new(vec![door()]);
    let mut dispatcher = dispatcher(InteractionSettings::default());
    let mut ports = harness.ports();

    dispatcher.arm_verb(USE, &mut ports);
    dispatcher.arm_carried_item(KEY, &mut ports);
    assert_eq!(dispatcher.armed_icon(), None);
    dispatcher.arm_verb(LOOK, &mut ports);
    assert_eq!(dispatcher.carried_item(), None);
    assert_eq!(
        dispatcher.arm_carried_item(ItemId(404), &mut ports),
        ArmedVerb::IconVerb(LOOK)
    );
    drop(ports);

    assert_eq!(
        harness.ui.armed,
        vec![
            ArmedVerb::IconVerb(USE),
            ArmedVerb::CarriedItemVerb(KEY),
            ArmedVerb::IconVerb(LOOK),
        ]
    );
}

#[test]
fn blocking_surface_and_ignore_latch_gate_dispatch() {
    let mut harness = Harness::new(vec![door()]);
    let mut dispatcher = dispatcher(InteractionSettings::default());

    harness.ui.blocking = true;
    harness.tick(&mut dispatcher, DT, &press_at(Vec2::ZERO));
    assert!(harness.fired().is_empty());
    harness.ui.blocking = false;
    harness.settle(&mut dispatcher, Vec2::ZERO);

    dispatcher.ignore_input_this_frame();
    harness.tick(&mut dispatcher, DT, &press_at(Vec2::ZERO));
    assert!(harness.fired().is_empty());
    harness.settle(&mut dispatcher, Vec2::ZERO);

    harness.tick(&mut dispatcher, DT, &press_at(Vec2::ZERO));
    assert_eq!(harness.fired().len(), 1);
}

#[test]
fn pausing_cancels_task_and_blocks_input_until_resumed() {
    let mut harness = Harness::new(vec![gate_at(2.0)]);
    let mut dispatcher = dispatcher(InteractionSettings::default());

    harness.tick(&mut dispatcher, DT, &press_at(Vec2::new(2.0, 0.0)));
    {
        let mut ports = harness.ports();
        dispatcher.set_execution_context(ExecutionContext::Paused, &mut ports);
    }
    assert!(!dispatcher.has_active_task());
    assert_eq!(cancel_reasons(&dispatcher), vec![CancelReason::Paused]);

    harness.settle(&mut dispatcher, Vec2::new(2.0, 0.0));
    harness.tick(&mut dispatcher, DT, &press_at(Vec2::new(2.0, 0.0)));
    assert_eq!(dispatcher.active_target(), None);
    assert!(!dispatcher.has_active_task());

    {
        let mut ports = harness.ports();
        dispatcher.set_execution_context(ExecutionContext::Interactive, &mut ports);
    }
    harness.settle(&mut dispatcher, Vec2::new(2.0, 0.0));
    harness.tick(&mut dispatcher, DT, &press_at(Vec2::new(2.0, 0.0)));
    assert!(dispatcher.has_active_task());
}

#[test]
fn cutscene_allows_interaction_only_when_configured() {
    let mut harness = Harness::new(vec![door()]);
    let mut dispatcher = dispatcher(InteractionSettings {
        allow_interaction_in_cutscenes: true,
        ..InteractionSettings::default()
    });
    {
        let mut ports = harness.ports();
        dispatcher.set_execution_context(ExecutionContext::Cutscene, &mut ports);
    }
    harness.tick(&mut dispatcher, DT, &press_at(Vec2::ZERO));
    assert_eq!(harness.fired().len(), 1);
}

#[test]
fn stop_action_cancels_walk() {
    let mut harness = Harness::new(vec![gate_at(2.0)]);
    let mut dispatcher = dispatcher(InteractionSettings::default());

    harness.tick(&mut dispatcher, DT, &press_at(Vec2::new(2.0, 0.0)));
    harness.tick(
        &mut dispatcher,
        DT,
        &hover_at(Vec2::new(2.0, 0.0)).with_action_pressed(InputAction::StopInteraction),
    );

    assert!(!dispatcher.has_active_task());
    assert_eq!(cancel_reasons(&dispatcher), vec![CancelReason::Stopped]);
}

#[test]
fn double_click_snaps_when_binding_asks() {
    let mut gate = gate_at(2.0);
    gate.bindings[0] = VerbBinding::use_verb(USE)
        .walk_to()
        .with_double_click(DoubleClickApproach::Snap);
    let mut harness = Harness::new(vec![gate]);
    let mut dispatcher = dispatcher(InteractionSettings {
        double_click_approach: DoubleClickApproach::Run,
        ..InteractionSettings::default()
    });

    harness.tick(&mut dispatcher, DT, &press_at(Vec2::new(2.0, 0.0)));
    harness.tick(&mut dispatcher, 0.15, &hover_at(Vec2::new(2.0, 0.0)));
    harness.tick(&mut dispatcher, DT, &press_at(Vec2::new(2.0, 0.0)));

    assert_eq!(harness.movement.snaps, vec![Vec2::new(2.0, 0.0)]);
    assert_eq!(harness.execution.requests.len(), 1);
    assert!(harness.execution.requests[0].double_click);
    assert!(dispatcher
        .events()
        .iter_emitted_so_far()
        .any(|event| matches!(event, InteractionEvent::DoubleClickDetected { .. })));
}

#[test]
fn double_click_runs_with_global_setting() {
    let mut harness = Harness::new(vec![gate_at(2.0)]);
    let mut dispatcher = dispatcher(InteractionSettings {
        double_click_approach: DoubleClickApproach::Run,
        ..InteractionSettings::default()
    });

    harness.tick(&mut dispatcher, DT, &press_at(Vec2::new(2.0, 0.0)));
    harness.tick(&mut dispatcher, 0.15, &hover_at(Vec2::new(2.0, 0.0)));
    harness.tick(&mut dispatcher, DT, &press_at(Vec2::new(2.0, 0.0)));

    let runs = harness
        .movement
        .walks
        .iter()
        .map(|(_, run)| *run)
        .collect::<Vec<_>>();
    assert_eq!(runs, vec![false, true]);
}

#[test]
fn missing_path_degrades_to_direct_approach() {
    let mut harness = Harness::new(vec![gate_at(2.0)]);
    harness.movement.no_path = true;
    let mut dispatcher = dispatcher(InteractionSettings::default());

    harness.tick(&mut dispatcher, DT, &press_at(Vec2::new(2.0, 0.0)));

    assert_eq!(
        harness.movement.walks,
        vec![(vec![Vec2::new(2.0, 0.0)], false)]
    );
    assert!(dispatcher.has_active_task());
}

#[test]
fn empty_click_walks_or_deselects() {
    let mut harness = Harness::new(vec![door()]);
    let mut dispatcher = dispatcher(InteractionSettings {
        walk_on_empty_click: true,
        ..InteractionSettings::default()
    });

    harness.tick(&mut dispatcher, DT, &press_at(Vec2::new(5.0, 5.0)));
    assert_eq!(
        harness.movement.walks,
        vec![(vec![Vec2::ZERO, Vec2::new(5.0, 5.0)], false)]
    );

    {
        let mut ports = harness.ports();
        dispatcher.arm_carried_item(KEY, &mut ports);
    }
    harness.settle(&mut dispatcher, Vec2::new(5.0, 5.0));
    harness.tick(&mut dispatcher, DT, &press_at(Vec2::new(5.0, 5.0)));
    assert_eq!(dispatcher.carried_item(), None);
    assert_eq!(harness.movement.walks.len(), 1);
}

#[test]
fn inventory_drop_over_target_fires_combination() {
    let mut harness = Harness::new(vec![door()]);
    let mut dispatcher = dispatcher(InteractionSettings {
        inventory_drag_drop: true,
        ..InteractionSettings::default()
    });
    {
        let mut ports = harness.ports();
        dispatcher.arm_carried_item(KEY, &mut ports);
    }
    let inventory_slot = Vec2::new(-15.0, -8.0);

    harness.ui.blocking = true;
    harness.tick(&mut dispatcher, DT, &press_at(inventory_slot));
    harness.ui.blocking = false;
    harness.tick(&mut dispatcher, DT, &held_at(Vec2::new(-8.0, -4.0)));
    assert_eq!(dispatcher.drag_state(), DragState::DraggingInventoryItem);
    harness.tick(&mut dispatcher, DT, &held_at(Vec2::ZERO));
    assert!(harness.fired().is_empty());

    harness.tick(&mut dispatcher, DT, &hover_at(Vec2::ZERO));
    assert_eq!(
        harness.fired(),
        vec![(
            USE,
            VerbSource::InventoryCombination,
            FiringTarget::Hotspot(DOOR),
            Some(KEY)
        )]
    );
}

#[test]
fn release_profile_fires_on_release() {
    let mut harness = Harness::new(vec![door()]);
    let mut dispatcher = dispatcher(InteractionSettings {
        fire_on_release: true,
        ..InteractionSettings::default()
    });

    harness.tick(&mut dispatcher, DT, &press_at(Vec2::ZERO));
    harness.tick(&mut dispatcher, 0.2, &held_at(Vec2::ZERO));
    assert!(harness.fired().is_empty());
    harness.tick(&mut dispatcher, DT, &hover_at(Vec2::ZERO));
    assert_eq!(harness.fired().len(), 1);
}

#[test]
fn look_toggle_fires_look_then_resets() {
    let mut harness = Harness::new(vec![door()]);
    let mut dispatcher = dispatcher(InteractionSettings {
        context_look_input: LookInput::ToggleAction,
        ..InteractionSettings::default()
    });

    harness.tick(
        &mut dispatcher,
        DT,
        &press_at(Vec2::ZERO).with_action_pressed(InputAction::ToggleLook),
    );

    assert_eq!(
        harness.fired(),
        vec![(LOOK, VerbSource::Examine, FiringTarget::Hotspot(DOOR), None)]
    );
    assert!(!dispatcher.look_toggled());
}

#[test]
fn secondary_press_cycles_icons_in_choose_interaction() {
    let mut harness = Harness::new(vec![door()]);
    let mut dispatcher = dispatcher(InteractionSettings {
        philosophy: InteractionPhilosophy::ChooseInteractionThenTarget,
        ..InteractionSettings::default()
    });

    harness.tick(&mut dispatcher, DT, &secondary_at(Vec2::ZERO));
    harness.tick(&mut dispatcher, DT, &secondary_at(Vec2::ZERO));
    assert_eq!(dispatcher.armed_verb(), ArmedVerb::IconVerb(LOOK));
    assert_eq!(
        harness.ui.armed,
        vec![ArmedVerb::IconVerb(USE), ArmedVerb::IconVerb(LOOK)]
    );

    harness.settle(&mut dispatcher, Vec2::ZERO);
    harness.tick(&mut dispatcher, DT, &press_at(Vec2::ZERO));
    assert_eq!(
        harness.fired(),
        vec![(LOOK, VerbSource::Examine, FiringTarget::Hotspot(DOOR), None)]
    );
    assert_eq!(dispatcher.armed_verb(), ArmedVerb::NoVerb);
}

#[test]
fn cycle_action_steps_through_target_verbs() {
    let mut harness = Harness::new(vec![door()]);
    let mut dispatcher = dispatcher(InteractionSettings::default());
    let cycle = hover_at(Vec2::ZERO).with_action_pressed(InputAction::CycleVerbForward);

    harness.tick(&mut dispatcher, DT, &cycle);
    assert_eq!(dispatcher.armed_verb(), ArmedVerb::IconVerb(USE));
    harness.tick(&mut dispatcher, DT, &cycle);
    assert_eq!(dispatcher.armed_verb(), ArmedVerb::IconVerb(LOOK));
    harness.tick(&mut dispatcher, DT, &cycle);
    assert_eq!(dispatcher.armed_verb(), ArmedVerb::NoVerb);
    assert_eq!(dispatcher.cycle_index(), NO_CYCLE_INDEX);

    harness.tick(&mut dispatcher, DT, &press_at(Vec2::ZERO));
    assert_eq!(
        harness.fired(),
        vec![(USE, VerbSource::Use, FiringTarget::Hotspot(DOOR), None)]
    );
}

#[test]
fn click_fires_the_cycled_verb() {
    let mut harness = Harness::new(vec![door()]);
    let mut dispatcher = dispatcher(InteractionSettings::default());
    let cycle = hover_at(Vec2::ZERO).with_action_pressed(InputAction::CycleVerbForward);

    harness.tick(&mut dispatcher, DT, &cycle);
    harness.tick(&mut dispatcher, DT, &cycle);
    assert_eq!(dispatcher.armed_verb(), ArmedVerb::IconVerb(LOOK));

    harness.tick(&mut dispatcher, DT, &press_at(Vec2::ZERO));
    assert_eq!(
        harness.fired(),
        vec![(LOOK, VerbSource::Examine, FiringTarget::Hotspot(DOOR), None)]
    );
    assert_eq!(dispatcher.armed_verb(), ArmedVerb::NoVerb);
}

#[test]
fn cycling_away_from_carried_item_fires_cycled_verb_alone() {
    let mut harness = Harness::new(vec![door()]);
    let mut dispatcher = dispatcher(InteractionSettings::default());
    {
        let mut ports = harness.ports();
        dispatcher.arm_carried_item(KEY, &mut ports);
    }
    let cycle = hover_at(Vec2::ZERO).with_action_pressed(InputAction::CycleVerbForward);

    harness.tick(&mut dispatcher, DT, &cycle);
    harness.tick(&mut dispatcher, DT, &cycle);
    assert_eq!(dispatcher.armed_verb(), ArmedVerb::IconVerb(LOOK));
    assert_eq!(dispatcher.carried_item(), None);

    harness.tick(&mut dispatcher, DT, &press_at(Vec2::ZERO));
    assert_eq!(
        harness.fired(),
        vec![(LOOK, VerbSource::Examine, FiringTarget::Hotspot(DOOR), None)]
    );
}

#[test]
fn leaving_target_mid_cycle_reselects_carried_item() {
    let mut harness = Harness::new(vec![door()]);
    let mut dispatcher = dispatcher(InteractionSettings::default());
    {
        let mut ports = harness.ports();
        dispatcher.arm_carried_item(KEY, &mut ports);
    }

    harness.tick(
        &mut dispatcher,
        DT,
        &hover_at(Vec2::ZERO).with_action_pressed(InputAction::CycleVerbForward),
    );
    assert_eq!(dispatcher.armed_verb(), ArmedVerb::IconVerb(USE));
    assert_eq!(dispatcher.carried_item(), None);

    harness.tick(&mut dispatcher, DT, &hover_at(Vec2::new(8.0, 8.0)));
    assert_eq!(dispatcher.armed_verb(), ArmedVerb::CarriedItemVerb(KEY));
    assert_eq!(dispatcher.armed_icon(), None);
    assert_eq!(dispatcher.cycle_index(), NO_CYCLE_INDEX);
    assert_eq!(
        harness.ui.armed.last(),
        Some(&ArmedVerb::CarriedItemVerb(KEY))
    );

    harness.settle(&mut dispatcher, Vec2::ZERO);
    harness.tick(&mut dispatcher, DT, &press_at(Vec2::ZERO));
    assert_eq!(
        harness.fired(),
        vec![(
            USE,
            VerbSource::InventoryCombination,
            FiringTarget::Hotspot(DOOR),
            Some(KEY)
        )]
    );
}

#[test]
fn custom_script_only_fires_explicitly() {
    let mut harness = Harness::new(vec![door()]);
    let mut dispatcher = dispatcher(InteractionSettings {
        philosophy: InteractionPhilosophy::CustomScript,
        ..InteractionSettings::default()
    });

    harness.tick(&mut dispatcher, DT, &press_at(Vec2::ZERO));
    assert!(harness.fired().is_empty());
    assert_eq!(dispatcher.active_target(), Some(DOOR));

    let mut ports = harness.ports();
    assert!(dispatcher.fire_explicit(
        ArmedVerb::IconVerb(LOOK),
        FiringTarget::Hotspot(DOOR),
        &mut ports
    ));
    assert!(!dispatcher.fire_explicit(
        ArmedVerb::IconVerb(TALK),
        FiringTarget::Hotspot(DOOR),
        &mut ports
    ));
    assert!(dispatcher.fire_explicit(ArmedVerb::NoVerb, FiringTarget::Item(APPLE), &mut ports));
    drop(ports);

    assert_eq!(
        harness.fired(),
        vec![
            (LOOK, VerbSource::Examine, FiringTarget::Hotspot(DOOR), None),
            (LOOK, VerbSource::Examine, FiringTarget::Item(APPLE), None),
        ]
    );
}

#[test]
fn event_counts_roll_over_each_tick() {
    let mut harness = Harness::new(vec![door()]);
    let mut dispatcher = dispatcher(InteractionSettings::default());

    harness.tick(&mut dispatcher, DT, &press_at(Vec2::ZERO));
    harness.tick(&mut dispatcher, DT, &hover_at(Vec2::ZERO));

    let counts = dispatcher.events().last_tick_counts();
    assert_eq!(counts.verb_fired, 1);
    assert_eq!(counts.target_changed, 1);
    assert_eq!(counts.total, 2);
}

#[test]
fn save_state_round_trips_and_drops_unknown_ids() {
    let mut harness = Harness::new(vec![door()]);
    let mut source = dispatcher(InteractionSettings {
        philosophy: InteractionPhilosophy::ChooseInteractionThenTarget,
        ..InteractionSettings::default()
    });
    {
        let mut ports = harness.ports();
        source.arm_verb(LOOK, &mut ports);
        source.arm_carried_item(KEY, &mut ports);
    }
    let json = source.save_state().to_json().expect("encode");

    let mut restored = dispatcher(InteractionSettings {
        philosophy: InteractionPhilosophy::ChooseInteractionThenTarget,
        ..InteractionSettings::default()
    });
    let state = InteractionSaveState::from_json(&json).expect("decode");
    {
        let mut ports = harness.ports();
        restored.restore_state(&state, &mut ports);
    }
    assert_eq!(restored.armed_icon(), Some(LOOK));
    assert_eq!(restored.carried_item(), Some(KEY));

    let unknown = InteractionSaveState {
        armed_icon: Some(CursorIconId(77)),
        carried_item: Some(ItemId(404)),
        ..state
    };
    let mut ports = harness.ports();
    assert_eq!(
        restored.restore_state(&unknown, &mut ports),
        ArmedVerb::NoVerb
    );
}
