//! Residual core for a receding-horizon planner driving a simulated
//! humanoid that pushes a wheeled board toward a moving goal.
//!
//! The crate computes, at every simulation step, the fixed-layout cost
//! vector the planner drives toward zero. It synthesizes a time-varying
//! reference pose from a sparse capture-keyframe library, continuously
//! re-anchored and banked onto the moving board, assembles the multi-term
//! residual against live sensor readings, relocates the goal when the
//! board reaches it, and reseeds simulation state on motion-mode switches.
//!
//! The physics engine, the planner itself, asset loading and rendering are
//! external collaborators: the host passes in a read-only [`TaskModel`]
//! and per-rollout [`SimState`] values and receives the residual vector
//! back. [`PushingTask::residual`] is pure and may run on cloned states
//! from many threads; [`PushingTask::transition`] mutates the canonical
//! state and must be serialized by the host.

pub mod clip;
pub mod error;
pub mod goal;
pub mod handles;
pub mod model;
pub mod params;
pub mod residual;
pub mod state;
pub mod synthesis;
pub mod task;
pub mod transition;

#[cfg(test)]
mod fixture;

pub use clip::{PlaybackCursor, KEYFRAME_FPS};
pub use error::{Result, TaskError};
pub use goal::{CoinFlip, RngCoin, ThreadCoin};
pub use handles::Handles;
pub use model::{MotionClip, TaskModel};
pub use params::GaitDefaults;
pub use state::{Contact, SimState};
pub use task::PushingTask;
pub use transition::ModeState;
