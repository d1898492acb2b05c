//! Application trait and lifecycle management

use crate::engine::{Engine, EngineError};
use crate::scene::SceneError;
use thiserror::Error;

/// Application lifecycle trait
///
/// Implement this trait to create a game on top of the engine. A typical
/// application registers its scenes in `initialize` and loads the first one;
/// from then on the scenes and their components drive the game.
pub trait Application {
    /// Initialize the application
    ///
    /// Called once before the first frame. An error here ends the run before
    /// the main loop starts.
    fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError>;

    /// Called every frame after the scene update and before rendering
    ///
    /// # Arguments
    /// * `engine` - Mutable reference to the engine
    /// * `delta_time` - Time since last frame in seconds
    fn on_frame(&mut self, _engine: &mut Engine, _delta_time: f32) -> Result<(), AppError> {
        Ok(())
    }

    /// Cleanup the application
    ///
    /// Called once after the main loop ends and before the engine releases its
    /// scenes and resources.
    fn cleanup(&mut self, _engine: &mut Engine) {}
}

/// Application-level errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Engine error propagated to application level
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// A scene could not be loaded
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    /// Asset loading error
    #[error("Asset error: {0}")]
    Asset(String),

    /// Custom application error
    #[error("Application error: {0}")]
    Custom(String),
}
