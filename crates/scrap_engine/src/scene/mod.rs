//! Scene management
//!
//! A [`SceneStateMachine`] owns every registered [`Scene`] and keeps at most
//! one of them active. Loading a scene always runs, in order:
//!
//! 1. the current scene's `on_deactivate`,
//! 2. [`World::dispose`](crate::ecs::World::dispose), freeing every entity,
//! 3. the target's `on_initialize`,
//! 4. the target's `on_activate`.
//!
//! Code that cannot reach the state machine (scheduler tasks, signal
//! callbacks, components) requests transitions through a [`SceneLoader`];
//! requests are processed at the end of the state machine's update.

mod base;
mod loader;
mod state_machine;

pub use base::{Scene, SceneContext, SceneState};
pub use loader::{SceneLoader, SceneRequest};
pub use state_machine::{SceneId, SceneStateMachine};

use thiserror::Error;

/// Scene management errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// No scene is registered under the name
    #[error("Scene '{0}' not found")]
    NotFound(String),

    /// The index is past the number of registered scenes
    #[error("Scene index {index} out of range ({count} scenes registered)")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Number of registered scenes
        count: usize,
    },
}
