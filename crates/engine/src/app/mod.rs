mod input;
mod loop_runner;
mod scene;
mod timer;

pub use input::InputAction;
pub use loop_runner::{run_headless, AppError, InputSource, LoopConfig, LoopSummary, StopReason};
pub use scene::{
    Entity, EntityId, InputSnapshot, Scene, SceneCommand, SceneWorld, Transform, Vec3,
};
pub use timer::{TimerId, TimerQueue};
