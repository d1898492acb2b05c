//! Scene trait and the context its hooks run in

use crate::core::context::EngineContext;
use crate::ecs::World;
use crate::scene::SceneLoader;

/// Lifecycle state of a registered scene
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneState {
    /// Registered, never loaded
    Uninitialized,
    /// `on_initialize` ran, `on_activate` pending
    Initialized,
    /// The current scene
    Active,
    /// Was active, another scene took over; can be loaded again
    Inactive,
    /// Dropped by [`SceneStateMachine::dispose`](super::SceneStateMachine::dispose)
    Disposed,
}

/// What a scene hook can reach
pub struct SceneContext<'a> {
    /// World holding the scene's entities
    pub world: &'a mut World,
    /// Engine services
    pub engine: &'a mut EngineContext,
    /// Queue for requesting the next scene
    pub loader: &'a SceneLoader,
}

impl<'a> SceneContext<'a> {
    /// Bundle the pieces a scene hook works with
    pub fn new(world: &'a mut World, engine: &'a mut EngineContext, loader: &'a SceneLoader) -> Self {
        Self { world, engine, loader }
    }

    /// Request a scene load at the end of the current update
    pub fn load_scene(&self, name: &str) {
        self.loader.load(name);
    }
}

/// A named set of setup and teardown hooks
///
/// `on_initialize` typically spawns the scene's entities; everything spawned
/// into the world is freed when another scene is loaded.
pub trait Scene {
    /// Unique name the scene is registered and loaded under
    fn name(&self) -> &str;

    /// Called first when the scene is loaded
    fn on_initialize(&mut self, _ctx: &mut SceneContext<'_>) {}

    /// Called right after `on_initialize`
    fn on_activate(&mut self, _ctx: &mut SceneContext<'_>) {}

    /// Called before another scene is loaded
    fn on_deactivate(&mut self, _ctx: &mut SceneContext<'_>) {}

    /// Called every frame after the world update
    fn on_update(&mut self, _ctx: &mut SceneContext<'_>, _delta_time: f32) {}

    /// Called every frame after the world render pass
    fn on_render(&mut self, _ctx: &mut SceneContext<'_>) {}

    /// Called once when the state machine drops the scene
    fn on_dispose(&mut self) {}
}
