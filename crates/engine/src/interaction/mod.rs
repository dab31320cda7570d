mod classifier;
mod dispatcher;
mod firing;
mod philosophy;
mod ports;
mod resolver;
mod save;
mod selector;
mod settings;
mod types;

pub use classifier::{DragSignals, InputClassifier};
pub use dispatcher::InteractionDispatcher;
pub use firing::{
    effective_double_click, plan_approach, ApproachPlan, InteractionTask, PendingFiring, TaskPoll,
};
pub use ports::{
    CancelReason, ExecutionLayer, ExecutionRequest, InteractionEvent, InteractionEventBus,
    InteractionEventCounts, InteractionPorts, ItemCatalog, ItemTable, MovementService, UiLayer,
};
pub use resolver::{ResolveInput, TargetResolver};
pub use save::{InteractionSaveState, SaveStateError, INTERACTION_SAVE_VERSION};
pub use selector::{step_cycle_index, CycleDirection, VerbSelector, NO_CYCLE_INDEX};
pub use settings::{
    CursorIcon, CursorIconTable, InteractionSettings, LookInput, TargetingMode,
    DEFAULT_CURSOR_AXIS_X, DEFAULT_CURSOR_AXIS_Y,
};
pub use types::{
    ApproachMode, ArmedVerb, CarriedItem, ClickState, CursorIconId, DoubleClickApproach,
    DragState, ExecutionContext, FiringTarget, Hotspot, HotspotId, InteractionPhilosophy, ItemId,
    ItemSelectMode, VerbBinding, VerbSource,
};

#[cfg(test)]
mod tests;
