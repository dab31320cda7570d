use super::input::RawInputFrame;
use crate::interaction::{Hotspot, HotspotId};

pub const PIXELS_PER_WORLD: f32 = 32.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    Quit,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn sub(self, other: Vec2) -> Vec2 {
        Vec2 {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }

    pub fn add(self, other: Vec2) -> Vec2 {
        Vec2 {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    pub fn scale(self, factor: f32) -> Vec2 {
        Vec2 {
            x: self.x * factor,
            y: self.y * factor,
        }
    }

    pub fn length_sq(self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    pub fn length(self) -> f32 {
        self.length_sq().sqrt()
    }

    pub fn distance_sq(self, other: Vec2) -> f32 {
        self.sub(other).length_sq()
    }
}

pub const CAMERA_ZOOM_DEFAULT: f32 = 1.0;
pub const CAMERA_ZOOM_MIN: f32 = 0.5;
pub const CAMERA_ZOOM_MAX: f32 = 2.0;

#[derive(Debug, Clone, Copy)]
pub struct Camera2D {
    pub position: Vec2,
    pub zoom: f32,
    /// Set while the camera is steered by pointer drags instead of following the
    /// character.
    pub drag_controlled: bool,
}

impl Default for Camera2D {
    fn default() -> Self {
        Self {
            position: Vec2::default(),
            zoom: CAMERA_ZOOM_DEFAULT,
            drag_controlled: false,
        }
    }
}

impl Camera2D {
    pub fn effective_zoom(&self) -> f32 {
        clamp_camera_zoom(self.zoom)
    }
}

fn clamp_camera_zoom(zoom: f32) -> f32 {
    if !zoom.is_finite() {
        return CAMERA_ZOOM_DEFAULT;
    }
    zoom.clamp(CAMERA_ZOOM_MIN, CAMERA_ZOOM_MAX)
}

pub fn screen_to_world_px(camera: &Camera2D, window_size: (u32, u32), screen_px: Vec2) -> Vec2 {
    let pixels_per_world = PIXELS_PER_WORLD * camera.effective_zoom();
    Vec2 {
        x: (screen_px.x - window_size.0 as f32 * 0.5) / pixels_per_world + camera.position.x,
        y: (window_size.1 as f32 * 0.5 - screen_px.y) / pixels_per_world + camera.position.y,
    }
}

pub fn world_to_screen_px(camera: &Camera2D, window_size: (u32, u32), world: Vec2) -> Vec2 {
    let pixels_per_world = PIXELS_PER_WORLD * camera.effective_zoom();
    Vec2 {
        x: (world.x - camera.position.x) * pixels_per_world + window_size.0 as f32 * 0.5,
        y: window_size.1 as f32 * 0.5 - (world.y - camera.position.y) * pixels_per_world,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SceneVisualState {
    pub highlighted_hotspot: Option<HotspotId>,
}

#[derive(Debug, Clone)]
struct HotspotEntry {
    hotspot: Hotspot,
    applied_order: u64,
}

/// Hotspots of the current room plus the little bit of scene state the
/// interaction engine reads each tick (camera, grabbed object, highlight).
#[derive(Debug, Default)]
pub struct HotspotRegistry {
    entries: Vec<HotspotEntry>,
    next_applied_order: u64,
    camera: Camera2D,
    grabbed_object: Option<u64>,
    visual_state: SceneVisualState,
}

impl HotspotRegistry {
    /// Inserts or replaces a hotspot. Replacing keeps the original stacking order.
    pub fn insert(&mut self, hotspot: Hotspot) -> HotspotId {
        let id = hotspot.id;
        if let Some(entry) = self.entries.iter_mut().find(|entry| entry.hotspot.id == id) {
            entry.hotspot = hotspot;
            return id;
        }
        self.entries.push(HotspotEntry {
            hotspot,
            applied_order: self.next_applied_order,
        });
        self.next_applied_order = self.next_applied_order.saturating_add(1);
        id
    }

    pub fn remove(&mut self, id: HotspotId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.hotspot.id != id);
        if self.visual_state.highlighted_hotspot == Some(id) {
            self.visual_state.highlighted_hotspot = None;
        }
        before != self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.next_applied_order = 0;
        self.camera = Camera2D::default();
        self.grabbed_object = None;
        self.visual_state = SceneVisualState::default();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: HotspotId) -> Option<&Hotspot> {
        self.entries
            .iter()
            .find(|entry| entry.hotspot.id == id)
            .map(|entry| &entry.hotspot)
    }

    pub fn get_mut(&mut self, id: HotspotId) -> Option<&mut Hotspot> {
        self.entries
            .iter_mut()
            .find(|entry| entry.hotspot.id == id)
            .map(|entry| &mut entry.hotspot)
    }

    pub fn hotspots(&self) -> impl Iterator<Item = &Hotspot> {
        self.entries.iter().map(|entry| &entry.hotspot)
    }

    pub fn set_enabled(&mut self, id: HotspotId, enabled: bool) -> bool {
        match self.get_mut(id) {
            Some(hotspot) => {
                hotspot.enabled = enabled;
                true
            }
            None => false,
        }
    }

    pub fn set_anchor(&mut self, id: HotspotId, anchor: Vec2) -> bool {
        match self.get_mut(id) {
            Some(hotspot) => {
                hotspot.anchor = anchor;
                true
            }
            None => false,
        }
    }

    pub fn camera(&self) -> &Camera2D {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera2D {
        &mut self.camera
    }

    pub fn set_grabbed_object(&mut self, object: Option<u64>) {
        self.grabbed_object = object;
    }

    pub fn grabbed_object(&self) -> Option<u64> {
        self.grabbed_object
    }

    pub fn set_highlighted_hotspot(&mut self, highlighted: Option<HotspotId>) {
        self.visual_state.highlighted_hotspot = highlighted;
    }

    pub fn visual_state(&self) -> &SceneVisualState {
        &self.visual_state
    }

    /// All hotspots under the cursor on the given layers, topmost (last applied)
    /// first.
    pub fn pick_hotspots_at_cursor(
        &self,
        cursor_position_px: Vec2,
        window_size: (u32, u32),
        layer_mask: u32,
    ) -> Vec<HotspotId> {
        let cursor_world = screen_to_world_px(self.camera(), window_size, cursor_position_px);
        let mut hits = self
            .entries
            .iter()
            .filter(|entry| entry.hotspot.layer & layer_mask != 0)
            .filter(|entry| entry.hotspot.contains_world_point(cursor_world))
            .map(|entry| (entry.applied_order, entry.hotspot.id))
            .collect::<Vec<_>>();
        hits.sort_by(|a, b| b.0.cmp(&a.0));
        hits.into_iter().map(|(_, id)| id).collect()
    }

    pub fn pick_topmost_hotspot_at_cursor(
        &self,
        cursor_position_px: Vec2,
        window_size: (u32, u32),
        layer_mask: u32,
    ) -> Option<HotspotId> {
        self.pick_hotspots_at_cursor(cursor_position_px, window_size, layer_mask)
            .first()
            .copied()
    }

    /// Hotspots whose proximity volume overlaps a detector circle, in applied
    /// order, paired with the squared distance from the detector center.
    pub fn overlapping_hotspots(&self, center: Vec2, detector_radius: f32) -> Vec<(HotspotId, f32)> {
        self.entries
            .iter()
            .filter_map(|entry| {
                let hotspot = &entry.hotspot;
                let reach = detector_radius.max(0.0) + hotspot.proximity_radius.max(0.0);
                let distance_sq = center.distance_sq(hotspot.anchor);
                (distance_sq <= reach * reach).then_some((hotspot.id, distance_sq))
            })
            .collect()
    }
}

pub trait Scene {
    fn load(&mut self, world: &mut HotspotRegistry);
    fn update(
        &mut self,
        fixed_dt_seconds: f32,
        input: &RawInputFrame,
        world: &mut HotspotRegistry,
    ) -> SceneCommand;
    fn unload(&mut self, world: &mut HotspotRegistry);
    fn debug_title(&self, _world: &HotspotRegistry) -> Option<String> {
        None
    }
}
