use std::collections::{BTreeMap, VecDeque};

use engine::interaction::{
    ArmedVerb, CursorIconId, CursorIconTable, ExecutionLayer, ExecutionRequest, FiringTarget,
    Hotspot, HotspotId, ItemId, ItemTable, MovementService, UiLayer, VerbBinding,
};
use engine::Vec2;
use tracing::{debug, info};

const WAYPOINT_ARRIVAL_THRESHOLD: f32 = 0.05;

/// Walks the character along straight segments between waypoints. Rooms have no
/// walkable-area mesh, so every path is the direct segment to the destination.
#[derive(Debug, Clone)]
pub(crate) struct StraightLineMovement {
    position: Vec2,
    waypoints: VecDeque<Vec2>,
    running: bool,
    walk_speed: f32,
    run_speed: f32,
}

impl StraightLineMovement {
    pub(crate) fn new(position: Vec2, walk_speed: f32, run_speed: f32) -> Self {
        Self {
            position,
            waypoints: VecDeque::new(),
            running: false,
            walk_speed,
            run_speed,
        }
    }

    pub(crate) fn advance(&mut self, fixed_dt_seconds: f32) {
        let speed = if self.running {
            self.run_speed
        } else {
            self.walk_speed
        };
        let mut budget = fixed_dt_seconds;
        while let Some(&target) = self.waypoints.front() {
            let (next, arrived) = step_toward(
                self.position,
                target,
                speed,
                budget,
                WAYPOINT_ARRIVAL_THRESHOLD,
            );
            let travelled = next.sub(self.position).length();
            self.position = next;
            if !arrived {
                break;
            }
            self.waypoints.pop_front();
            if speed <= 0.0 {
                break;
            }
            budget = (budget - travelled / speed).max(0.0);
            if self.waypoints.is_empty() {
                debug!(x = self.position.x, y = self.position.y, "character_arrived");
            }
        }
    }
}

impl MovementService for StraightLineMovement {
    fn compute_path(&mut self, _from: Vec2, to: Vec2) -> Option<Vec<Vec2>> {
        Some(vec![to])
    }

    fn move_along(&mut self, waypoints: &[Vec2], run: bool) {
        self.waypoints = waypoints.iter().copied().collect();
        self.running = run;
    }

    fn is_path_active(&self) -> bool {
        !self.waypoints.is_empty()
    }

    fn halt(&mut self) {
        self.waypoints.clear();
    }

    fn character_position(&self) -> Vec2 {
        self.position
    }

    fn snap_to(&mut self, position: Vec2) {
        self.waypoints.clear();
        self.position = position;
    }
}

fn step_toward(
    current: Vec2,
    target: Vec2,
    speed: f32,
    fixed_dt_seconds: f32,
    arrival_threshold: f32,
) -> (Vec2, bool) {
    let delta = target.sub(current);
    let distance_sq = delta.length_sq();
    if distance_sq <= arrival_threshold * arrival_threshold {
        return (target, true);
    }

    let distance = distance_sq.sqrt();
    let max_step = speed * fixed_dt_seconds;
    if max_step >= distance {
        return (target, true);
    }

    (current.add(delta.scale(max_step / distance)), false)
}

/// One executed interaction, resolved to display labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FiredInteraction {
    pub(crate) verb: String,
    pub(crate) target: String,
    pub(crate) item: Option<String>,
    pub(crate) double_click: bool,
}

impl FiredInteraction {
    pub(crate) fn describe(&self) -> String {
        let mut line = match &self.item {
            Some(item) => format!("{} {} with {}", self.verb, self.target, item),
            None => format!("{} {}", self.verb, self.target),
        };
        if self.double_click {
            line.push_str(" (double-click)");
        }
        line
    }
}

/// Execution layer for the demo: resolves labels, logs, and keeps a transcript.
#[derive(Debug, Default)]
pub(crate) struct LoggingExecution {
    icon_labels: BTreeMap<CursorIconId, String>,
    hotspot_labels: BTreeMap<HotspotId, String>,
    item_labels: BTreeMap<ItemId, String>,
    transcript: Vec<FiredInteraction>,
}

impl LoggingExecution {
    pub(crate) fn new(
        icons: &CursorIconTable,
        hotspots: &[Hotspot],
        items: &ItemTable,
    ) -> Self {
        Self {
            icon_labels: icons
                .icons()
                .iter()
                .map(|icon| (icon.id, icon.label.clone()))
                .collect(),
            hotspot_labels: hotspots
                .iter()
                .map(|hotspot| (hotspot.id, hotspot.label.clone()))
                .collect(),
            item_labels: items
                .iter()
                .map(|item| (item.id, item.label.clone()))
                .collect(),
            transcript: Vec::new(),
        }
    }

    pub(crate) fn transcript(&self) -> &[FiredInteraction] {
        &self.transcript
    }

    fn verb_label(&self, binding: &VerbBinding) -> String {
        self.icon_labels
            .get(&binding.icon)
            .cloned()
            .unwrap_or_else(|| format!("verb#{}", binding.icon.0))
    }

    fn target_label(&self, target: FiringTarget) -> String {
        match target {
            FiringTarget::Hotspot(id) => self
                .hotspot_labels
                .get(&id)
                .cloned()
                .unwrap_or_else(|| format!("hotspot#{}", id.0)),
            FiringTarget::Item(id) => self
                .item_labels
                .get(&id)
                .cloned()
                .unwrap_or_else(|| format!("item#{}", id.0)),
        }
    }
}

impl ExecutionLayer for LoggingExecution {
    fn invoke(&mut self, request: &ExecutionRequest) {
        let fired = FiredInteraction {
            verb: self.verb_label(&request.binding),
            target: self.target_label(request.target),
            item: request.carried_item.map(|id| {
                self.item_labels
                    .get(&id)
                    .cloned()
                    .unwrap_or_else(|| format!("item#{}", id.0))
            }),
            double_click: request.double_click,
        };
        info!(
            verb = fired.verb.as_str(),
            target = fired.target.as_str(),
            item = fired.item.as_deref().unwrap_or("-"),
            source = ?request.binding.source,
            "interaction_executed"
        );
        self.transcript.push(fired);
    }
}

/// UI stand-in for a window without widgets. Nothing blocks the pointer; verb
/// surfaces are remembered so the scene can answer them.
#[derive(Debug, Default)]
pub(crate) struct HeadlessUi {
    armed: ArmedVerb,
    hovered: Option<HotspotId>,
    offered_surface: Option<(HotspotId, Vec<CursorIconId>)>,
}

impl HeadlessUi {
    pub(crate) fn armed(&self) -> ArmedVerb {
        self.armed
    }

    pub(crate) fn hovered(&self) -> Option<HotspotId> {
        self.hovered
    }

    pub(crate) fn take_offered_surface(&mut self) -> Option<(HotspotId, Vec<CursorIconId>)> {
        self.offered_surface.take()
    }
}

impl UiLayer for HeadlessUi {
    fn is_pointer_over_blocking_surface(&self) -> bool {
        false
    }

    fn notify_verb_armed(&mut self, verb: ArmedVerb) {
        self.armed = verb;
    }

    fn notify_target_changed(&mut self, target: Option<HotspotId>) {
        self.hovered = target;
    }

    fn open_verb_surface(&mut self, target: HotspotId, verbs: &[VerbBinding]) {
        self.offered_surface = Some((target, verbs.iter().map(|verb| verb.icon).collect()));
    }

    fn request_close_auxiliary_verb_surface(&mut self) {
        self.offered_surface = None;
    }
}
