//! Entity/component runtime
//!
//! Entities ([`GameObject`]) live in the [`World`] arena and are addressed by
//! generational [`EntityId`] handles. Each entity owns its transform and an
//! ordered list of [`Component`] trait objects whose lifecycle hooks the world
//! drives once per frame:
//!
//! 1. destroyed entities and components are removed,
//! 2. newly added components run `awake`, then `start` (batch-wide),
//! 3. started components run `update`,
//! 4. during the render pass, started components run `render`.

pub mod collection;
pub mod component;
pub mod components;
pub mod entity;
pub mod scheduler;
pub mod transform;
pub mod world;

pub use collection::EntityCollection;
pub use component::{Component, ComponentContext, ComponentId};
pub use entity::{EntityId, GameObject, DEFAULT_ENTITY_NAME};
pub use scheduler::Scheduler;
pub use transform::Transform;
pub use world::World;

use thiserror::Error;

/// Entity/component errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// The handle does not refer to a live entity
    #[error("Entity {0:?} does not exist")]
    EntityNotFound(EntityId),

    /// Re-parenting would make an entity its own ancestor
    #[error("Parenting {child:?} under {parent:?} would create a cycle")]
    HierarchyCycle {
        /// Entity being re-parented
        child: EntityId,
        /// Requested parent
        parent: EntityId,
    },
}
