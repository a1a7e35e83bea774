mod input;
mod loop_runner;
mod metrics;
mod rendering;
mod scene;

pub use input::{InputAction, KeyEdge};
pub use loop_runner::{run_app, AppError, LoopConfig};
pub use rendering::Renderer;
pub use scene::{InputSnapshot, Scene, SceneCommand, SceneVisualState, SceneWorld};
