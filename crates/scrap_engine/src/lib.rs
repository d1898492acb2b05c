//! # Scrap Engine
//!
//! A small 2D game engine built around an entity/component runtime and a
//! deferred draw-command renderer.
//!
//! ## Features
//!
//! - **Component runtime**: entities own ordered components whose
//!   awake/start/update/render hooks run safely across frame boundaries
//! - **Scene state machine**: one active scene, ordered transitions that free
//!   the previous scene's entities before the next one initializes
//! - **Deferred rendering**: draw commands are buffered during a frame and
//!   executed in submission order through a pluggable graphics backend
//! - **Shared resources**: reference-counted texture and mesh caches
//! - **Headless backends**: the whole loop runs without a window or GPU
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scrap_engine::prelude::*;
//!
//! struct Title;
//!
//! impl Scene for Title {
//!     fn name(&self) -> &str {
//!         "title"
//!     }
//!
//!     fn on_initialize(&mut self, ctx: &mut SceneContext<'_>) {
//!         let logo = ctx.world.spawn("logo");
//!         ctx.world.add_component(logo, SpriteRenderer::new().with_size(Vec2::new(4.0, 2.0)));
//!     }
//! }
//!
//! struct MyApp;
//!
//! impl Application for MyApp {
//!     fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
//!         engine.scenes_mut().add_scene(Title);
//!         engine.load_scene("title")?;
//!         Ok(())
//!     }
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut engine = Engine::headless(EngineConfig::default())?;
//!     engine.run(&mut MyApp)?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

// Core engine modules
pub mod core;
pub mod config;
pub mod foundation;

// Runtime
pub mod ecs;
pub mod events;
pub mod scene;

// Services behind backend traits
pub mod assets;
pub mod audio;
pub mod input;
pub mod platform;
pub mod render;

mod application;
mod engine;

pub use application::{AppError, Application};
pub use engine::{Engine, EngineError};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        AppError, Application, Engine, EngineError,
        core::{config::EngineConfig, context::EngineContext},
        ecs::{
            components::{AudioSource, Button, Easing, SpriteRenderer, Text, Tween, TweenTarget},
            Component, ComponentContext, EntityId, World,
        },
        events::{Signal, Subscription},
        foundation::{
            math::{Color, Vec2, Vec3},
            time::{FramePacer, PacingMode, Timer},
        },
        input::{KeyCode, MouseButton},
        render::{Camera, DrawCommand, TextureConfig},
        scene::{Scene, SceneContext, SceneError, SceneLoader},
    };
}
