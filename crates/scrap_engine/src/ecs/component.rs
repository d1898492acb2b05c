//! Component trait and the context its hooks run in

use std::any::Any;

use crate::core::context::EngineContext;
use crate::ecs::{EntityId, Transform, World};
use crate::foundation::math::Vec2;

/// Identifier of a component, unique within its entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(pub u64);

/// Type-erasure helper implemented for every `'static` type
pub trait AsAny: Any {
    /// Borrow as [`Any`]
    fn as_any(&self) -> &dyn Any;
    /// Borrow mutably as [`Any`]
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Behavior attached to exactly one entity
///
/// Every hook has an empty default, so a component only implements the ones
/// it needs. For a component added in frame N, `awake` runs before `start`,
/// and both run before the first `update`.
pub trait Component: AsAny {
    /// Called once, before `start`
    fn awake(&mut self, _ctx: &mut ComponentContext<'_>) {}

    /// Called once, after every component in the batch has run `awake`
    fn start(&mut self, _ctx: &mut ComponentContext<'_>) {}

    /// Called every frame with the elapsed time in seconds
    fn update(&mut self, _ctx: &mut ComponentContext<'_>, _delta_time: f32) {}

    /// Called every frame during the render pass
    fn render(&mut self, _ctx: &mut ComponentContext<'_>) {}

    /// Called once before the component is freed, if it ran `awake`
    ///
    /// Runs when the component is removed, when its entity is destroyed and
    /// when the world is disposed. Cached textures and meshes go back to
    /// their allocators here.
    fn on_destroy(&mut self, _ctx: &mut ComponentContext<'_>) {}
}

/// What a component hook can reach
///
/// While a hook runs its own component is detached from the entity, so the
/// owning entity, its siblings and the rest of the world stay accessible.
pub struct ComponentContext<'a> {
    entity: EntityId,
    component: ComponentId,
    /// World the owning entity lives in
    pub world: &'a mut World,
    /// Engine services (renderer, input, allocators, ...)
    pub engine: &'a mut EngineContext,
}

impl<'a> ComponentContext<'a> {
    /// Build a context for `component` of `entity`
    pub fn new(entity: EntityId, component: ComponentId, world: &'a mut World, engine: &'a mut EngineContext) -> Self {
        Self {
            entity,
            component,
            world,
            engine,
        }
    }

    /// Owning entity
    pub const fn entity(&self) -> EntityId {
        self.entity
    }

    /// Id of the component whose hook is running
    pub const fn component_id(&self) -> ComponentId {
        self.component
    }

    /// Owning entity's transform
    pub fn transform(&self) -> Option<&Transform> {
        self.world.transform(self.entity)
    }

    /// Owning entity's transform, mutably
    pub fn transform_mut(&mut self) -> Option<&mut Transform> {
        self.world.transform_mut(self.entity)
    }

    /// Owning entity's world position
    pub fn world_position(&self) -> Vec2 {
        self.world.world_position(self.entity).unwrap_or_else(Vec2::zeros)
    }

    /// Owning entity's world rotation in degrees
    pub fn world_rotation(&self) -> f32 {
        self.world.world_rotation(self.entity).unwrap_or(0.0)
    }

    /// Owning entity's world scale
    pub fn world_scale(&self) -> Vec2 {
        self.world
            .world_scale(self.entity)
            .unwrap_or_else(|| Vec2::new(1.0, 1.0))
    }

    /// Sibling component of type `T` on the owning entity
    pub fn get_component<T: Component>(&self) -> Option<&T> {
        self.world.get_component::<T>(self.entity)
    }

    /// Sibling component of type `T` on the owning entity, mutably
    pub fn get_component_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.world.get_component_mut::<T>(self.entity)
    }

    /// Flag the running component for removal
    pub fn destroy_self(&mut self) {
        if let Some(entity) = self.world.entity_mut(self.entity) {
            entity.destroy_component(self.component);
        }
    }

    /// Flag the owning entity for removal
    pub fn destroy_entity(&mut self) {
        self.world.destroy(self.entity);
    }
}
