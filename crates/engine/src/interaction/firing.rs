use crate::app::Vec2;

use super::types::{ApproachMode, DoubleClickApproach, FiringTarget, ItemId, VerbBinding};

/// A confirmed (verb, target) pair travelling from the philosophy handler to
/// the execution layer.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingFiring {
    pub binding: VerbBinding,
    pub target: FiringTarget,
    pub carried_item: Option<ItemId>,
    pub double_click: bool,
    /// Set when `binding` is an unhandled fallback rather than an authored match.
    pub fallback: bool,
}

impl PendingFiring {
    pub fn new(binding: VerbBinding, target: FiringTarget) -> Self {
        Self {
            binding,
            target,
            carried_item: None,
            double_click: false,
            fallback: false,
        }
    }

    pub fn with_item(mut self, item: Option<ItemId>) -> Self {
        self.carried_item = item;
        self
    }

    pub fn with_double_click(mut self, double_click: bool) -> Self {
        self.double_click = double_click;
        self
    }

    pub fn as_fallback(mut self) -> Self {
        self.fallback = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ApproachPlan {
    Immediate,
    Snap(Vec2),
    Walk { destination: Vec2, run: bool },
}

/// The binding's own double-click setting wins over the global one.
pub fn effective_double_click(
    binding: &VerbBinding,
    global: DoubleClickApproach,
    double_click: bool,
) -> DoubleClickApproach {
    if !double_click {
        return DoubleClickApproach::Ignore;
    }
    binding.double_click.unwrap_or(global)
}

pub fn plan_approach(
    pending: &PendingFiring,
    walk_anchor: Option<Vec2>,
    character_position: Vec2,
    arrival_threshold: f32,
    global_double_click: DoubleClickApproach,
) -> ApproachPlan {
    let Some(destination) = walk_anchor else {
        return ApproachPlan::Immediate;
    };
    if pending.binding.approach != ApproachMode::WalkTo {
        return ApproachPlan::Immediate;
    }
    let threshold = arrival_threshold.max(0.0);
    if character_position.distance_sq(destination) <= threshold * threshold {
        return ApproachPlan::Immediate;
    }
    match effective_double_click(&pending.binding, global_double_click, pending.double_click) {
        DoubleClickApproach::Snap => ApproachPlan::Snap(destination),
        DoubleClickApproach::Run => ApproachPlan::Walk {
            destination,
            run: true,
        },
        DoubleClickApproach::Ignore => ApproachPlan::Walk {
            destination,
            run: false,
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskPoll {
    Pending,
    Arrived,
    Halted,
}

/// Walk phase of a firing. Polled once per frame by the dispatcher; never blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionTask {
    pub id: u64,
    pub pending: PendingFiring,
    pub destination: Vec2,
}

impl InteractionTask {
    pub fn poll(&self, character_position: Vec2, path_active: bool, arrival_threshold: f32) -> TaskPoll {
        let threshold = arrival_threshold.max(0.0);
        if character_position.distance_sq(self.destination) <= threshold * threshold {
            TaskPoll::Arrived
        } else if !path_active {
            TaskPoll::Halted
        } else {
            TaskPoll::Pending
        }
    }
}
