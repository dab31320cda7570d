mod input;
mod loop_runner;
mod scene;

pub use input::{InputAction, InputDevice, InputMappingError, RawInputFrame};
pub use loop_runner::{run_app, AppError, LoopConfig};
pub use scene::{
    screen_to_world_px, world_to_screen_px, Camera2D, HotspotRegistry, Scene, SceneCommand,
    SceneVisualState, Vec2, CAMERA_ZOOM_DEFAULT, CAMERA_ZOOM_MAX, CAMERA_ZOOM_MIN,
    PIXELS_PER_WORLD,
};
