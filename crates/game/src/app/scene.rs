use engine::interaction::{
    ArmedVerb, CursorIconTable, InteractionDispatcher, InteractionPorts, InteractionSaveState,
};
use engine::{HotspotRegistry, InputAction, InteractionDefs, RawInputFrame, Scene, SceneCommand};
use tracing::{debug, info, warn};

use super::collaborators::{FiredInteraction, HeadlessUi, LoggingExecution, StraightLineMovement};
use super::room::Room;

/// A single room driven by the interaction dispatcher. The character walks in
/// straight lines, executed verbs are logged, and the verb surface is answered
/// with its first entry because there is no widget layer to click on.
pub(crate) struct RoomScene {
    room: Room,
    icons: CursorIconTable,
    dispatcher: InteractionDispatcher,
    movement: StraightLineMovement,
    execution: LoggingExecution,
    ui: HeadlessUi,
}

impl RoomScene {
    pub(crate) fn new(defs: InteractionDefs, room: Room) -> Self {
        let movement =
            StraightLineMovement::new(room.character_spawn, room.walk_speed, room.run_speed);
        let execution = LoggingExecution::new(&defs.icons, &room.hotspots, &room.items);
        let icons = defs.icons.clone();
        let dispatcher = InteractionDispatcher::from_settings(defs.settings, defs.icons);
        Self {
            room,
            icons,
            dispatcher,
            movement,
            execution,
            ui: HeadlessUi::default(),
        }
    }

    pub(crate) fn transcript(&self) -> &[FiredInteraction] {
        self.execution.transcript()
    }

    #[cfg(test)]
    pub(crate) fn dispatcher(&self) -> &InteractionDispatcher {
        &self.dispatcher
    }

    pub(crate) fn save_state(&self) -> InteractionSaveState {
        self.dispatcher.save_state()
    }

    /// One fixed tick: character movement first, then the dispatcher.
    pub(crate) fn step(
        &mut self,
        fixed_dt_seconds: f32,
        input: &RawInputFrame,
        world: &mut HotspotRegistry,
    ) -> SceneCommand {
        if input.was_pressed(InputAction::Quit) {
            return SceneCommand::Quit;
        }

        self.movement.advance(fixed_dt_seconds);
        {
            let mut ports = InteractionPorts {
                hotspots: &mut *world,
                movement: &mut self.movement,
                execution: &mut self.execution,
                ui: &mut self.ui,
                items: &self.room.items,
            };
            self.dispatcher.tick(fixed_dt_seconds, input, &mut ports);
        }

        if let Some((target, verbs)) = self.ui.take_offered_surface() {
            let mut ports = InteractionPorts {
                hotspots: world,
                movement: &mut self.movement,
                execution: &mut self.execution,
                ui: &mut self.ui,
                items: &self.room.items,
            };
            match verbs.first() {
                Some(&icon) => {
                    debug!(hotspot = target.0, icon = icon.0, "verb_surface_auto_selected");
                    self.dispatcher.select_surface_verb(icon, &mut ports);
                }
                None => warn!(hotspot = target.0, "verb_surface_offered_no_verbs"),
            }
        }

        SceneCommand::None
    }

    fn armed_label(&self) -> String {
        match self.ui.armed() {
            ArmedVerb::NoVerb => "walk".to_string(),
            ArmedVerb::IconVerb(icon) => self
                .icons
                .label(icon)
                .map(str::to_string)
                .unwrap_or_else(|| format!("verb#{}", icon.0)),
            ArmedVerb::CarriedItemVerb(item) => self
                .room
                .items
                .iter()
                .find(|candidate| candidate.id == item)
                .map(|candidate| format!("use {}", candidate.label))
                .unwrap_or_else(|| format!("item#{}", item.0)),
        }
    }
}

impl Scene for RoomScene {
    fn load(&mut self, world: &mut HotspotRegistry) {
        world.clear();
        for hotspot in &self.room.hotspots {
            world.insert(hotspot.clone());
        }
        self.movement = StraightLineMovement::new(
            self.room.character_spawn,
            self.room.walk_speed,
            self.room.run_speed,
        );

        if let Some(item) = self.room.starting_item {
            let mut ports = InteractionPorts {
                hotspots: world,
                movement: &mut self.movement,
                execution: &mut self.execution,
                ui: &mut self.ui,
                items: &self.room.items,
            };
            self.dispatcher.arm_carried_item(item, &mut ports);
        }

        info!(
            room = self.room.name.as_str(),
            hotspots = self.room.hotspots.len(),
            items = self.room.items.len(),
            philosophy = ?self.dispatcher.settings().philosophy,
            "room_loaded"
        );
    }

    fn update(
        &mut self,
        fixed_dt_seconds: f32,
        input: &RawInputFrame,
        world: &mut HotspotRegistry,
    ) -> SceneCommand {
        self.step(fixed_dt_seconds, input, world)
    }

    fn unload(&mut self, world: &mut HotspotRegistry) {
        info!(
            room = self.room.name.as_str(),
            executed = self.execution.transcript().len(),
            "room_unloaded"
        );
        world.clear();
    }

    fn debug_title(&self, world: &HotspotRegistry) -> Option<String> {
        let target = self
            .ui
            .hovered()
            .and_then(|id| world.get(id))
            .map(|hotspot| hotspot.label.as_str())
            .unwrap_or("-");
        let busy = if self.dispatcher.has_active_task() {
            " | walking"
        } else {
            ""
        };
        Some(format!(
            "{} | {} | {}{}",
            self.room.name,
            self.armed_label(),
            target,
            busy
        ))
    }
}
