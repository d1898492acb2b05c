//! ECS World implementation
//!
//! The world is the single owner of every entity it creates. Its
//! [`EntityCollection`] decides which entities take part in the frame loop;
//! entities removed from the collection (destroyed, or dropped by
//! [`World::dispose`]) are freed here, nowhere else. Every component that ran
//! `awake` gets its `on_destroy` before it is freed.

use slotmap::SlotMap;

use crate::core::context::EngineContext;
use crate::ecs::entity::{ComponentSlot, LifecycleStage};
use crate::ecs::{Component, ComponentContext, ComponentId, EcsError, EntityCollection, EntityId, GameObject, Transform};
use crate::foundation::math::{rotate_vec2, Vec2};

/// Entity arena plus the collection driving its frame loop
#[derive(Default)]
pub struct World {
    entities: SlotMap<EntityId, GameObject>,
    collection: EntityCollection,
}

impl World {
    /// Create an empty world
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an entity with a transform and no other components
    ///
    /// The entity is owned by the world but does not take part in updates
    /// until it is [added](World::add).
    pub fn create_entity(&mut self, name: Option<&str>) -> EntityId {
        self.entities.insert_with_key(|id| GameObject::new(id, name))
    }

    /// Register an entity for the next update; see [`EntityCollection::add`]
    pub fn add(&mut self, entity: EntityId) -> bool {
        let Some(object) = self.entities.get(entity) else {
            log::warn!("Cannot add {:?}: entity does not exist", entity);
            return false;
        };
        self.collection.add(entity, object.name())
    }

    /// Create an entity and register it in one step
    pub fn spawn(&mut self, name: &str) -> EntityId {
        let entity = self.create_entity(Some(name));
        self.add(entity);
        entity
    }

    /// Entity behind a handle
    pub fn entity(&self, entity: EntityId) -> Option<&GameObject> {
        self.entities.get(entity)
    }

    /// Entity behind a handle, mutably
    pub fn entity_mut(&mut self, entity: EntityId) -> Option<&mut GameObject> {
        self.entities.get_mut(entity)
    }

    /// Whether the handle refers to an entity owned by this world
    pub fn contains(&self, entity: EntityId) -> bool {
        self.entities.contains_key(entity)
    }

    /// Entity registered under `name`
    pub fn find(&self, name: &str) -> Option<EntityId> {
        self.collection.find(name)
    }

    /// Registry of live and pending entities
    pub const fn collection(&self) -> &EntityCollection {
        &self.collection
    }

    /// Live entities in update order
    pub fn live_entities(&self) -> &[EntityId] {
        self.collection.live()
    }

    /// Number of entities owned by the world, registered or not
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Attach a component to an entity
    pub fn add_component<T: Component>(&mut self, entity: EntityId, component: T) -> Option<ComponentId> {
        self.entities
            .get_mut(entity)
            .map(|object| object.add_component(component))
    }

    /// Component of type `T` on an entity
    pub fn get_component<T: Component>(&self, entity: EntityId) -> Option<&T> {
        self.entities.get(entity)?.get_component::<T>()
    }

    /// Component of type `T` on an entity, mutably
    pub fn get_component_mut<T: Component>(&mut self, entity: EntityId) -> Option<&mut T> {
        self.entities.get_mut(entity)?.get_component_mut::<T>()
    }

    /// Flag an entity for removal on the next update
    pub fn destroy(&mut self, entity: EntityId) -> bool {
        self.entities
            .get_mut(entity)
            .map(GameObject::destroy)
            .is_some()
    }

    /// Transform of an entity
    pub fn transform(&self, entity: EntityId) -> Option<&Transform> {
        self.entities.get(entity).map(GameObject::transform)
    }

    /// Transform of an entity, mutably
    pub fn transform_mut(&mut self, entity: EntityId) -> Option<&mut Transform> {
        self.entities.get_mut(entity).map(GameObject::transform_mut)
    }

    /// Re-parent an entity, or detach it with `None`
    ///
    /// The child leaves its old parent's child list and joins the new one.
    pub fn set_parent(&mut self, child: EntityId, parent: Option<EntityId>) -> Result<(), EcsError> {
        if !self.entities.contains_key(child) {
            return Err(EcsError::EntityNotFound(child));
        }
        if let Some(parent) = parent {
            if !self.entities.contains_key(parent) {
                return Err(EcsError::EntityNotFound(parent));
            }
            if self.is_ancestor_or_self(child, parent) {
                return Err(EcsError::HierarchyCycle { child, parent });
            }
        }

        let old_parent = self.entities[child].transform().parent();
        if let Some(old) = old_parent {
            if let Some(object) = self.entities.get_mut(old) {
                object.transform_mut().remove_child_link(child);
            }
        }
        if let Some(parent) = parent {
            self.entities[parent].transform_mut().add_child_link(child);
        }
        self.entities[child].transform_mut().set_parent_link(parent);
        Ok(())
    }

    /// Whether `ancestor` is `entity` or one of its parents
    fn is_ancestor_or_self(&self, ancestor: EntityId, entity: EntityId) -> bool {
        let mut current = Some(entity);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.transform(id).and_then(Transform::parent);
        }
        false
    }

    /// World-space position of an entity
    pub fn world_position(&self, entity: EntityId) -> Option<Vec2> {
        let transform = self.transform(entity)?;
        match transform.parent().filter(|&p| self.contains(p)) {
            Some(parent) => {
                let parent_position = self.world_position(parent)?;
                let parent_rotation = self.world_rotation(parent)?;
                Some(parent_position + rotate_vec2(transform.position(), parent_rotation))
            }
            None => Some(transform.position()),
        }
    }

    /// World-space rotation of an entity in degrees
    pub fn world_rotation(&self, entity: EntityId) -> Option<f32> {
        let transform = self.transform(entity)?;
        match transform.parent().filter(|&p| self.contains(p)) {
            Some(parent) => Some(self.world_rotation(parent)? + transform.rotation()),
            None => Some(transform.rotation()),
        }
    }

    /// World-space scale of an entity
    pub fn world_scale(&self, entity: EntityId) -> Option<Vec2> {
        let transform = self.transform(entity)?;
        match transform.parent().filter(|&p| self.contains(p)) {
            Some(parent) => Some(self.world_scale(parent)?.component_mul(&transform.scale())),
            None => Some(transform.scale()),
        }
    }

    /// Run one frame of the entity lifecycle
    ///
    /// 1. Destroyed entities are torn down, unregistered and freed.
    /// 2. Pending entities, and live entities with new components, run every
    ///    `awake` and then every `start`; pending entities become live.
    /// 3. Every live entity runs its component updates.
    pub fn update(&mut self, delta_time: f32, engine: &mut EngineContext) {
        self.remove_destroyed(engine);

        let flushed = self.collection.take_pending();
        let mut startup: Vec<EntityId> = flushed.clone();
        startup.extend(self.collection.live().iter().copied().filter(|&id| {
            self.entities
                .get(id)
                .is_some_and(GameObject::has_pending_components)
        }));

        for &entity in &startup {
            self.run_component_awake(entity, engine);
        }
        for &entity in &startup {
            self.run_component_start(entity, engine);
        }
        if !flushed.is_empty() {
            log::trace!("Flushed {} pending entities", flushed.len());
        }
        self.collection.promote(flushed);

        let live = self.collection.live().to_vec();
        for entity in live {
            self.run_component_update(entity, delta_time, engine);
        }
    }

    /// Run the render hook of every live entity's started components
    pub fn render(&mut self, engine: &mut EngineContext) {
        let live = self.collection.live().to_vec();
        for entity in live {
            self.run_component_render(entity, engine);
        }
    }

    /// Tear down every component, then unregister and free every entity
    pub fn dispose(&mut self, engine: &mut EngineContext) {
        log::debug!("Disposing world with {} entities", self.entities.len());
        let entities: Vec<EntityId> = self.entities.keys().collect();
        for entity in entities {
            self.tear_down_components(entity, engine);
        }
        self.collection.dispose();
        self.entities.clear();
    }

    fn remove_destroyed(&mut self, engine: &mut EngineContext) {
        let destroyed: Vec<EntityId> = self
            .entities
            .iter()
            .filter(|(_, object)| object.is_destroyed())
            .map(|(id, _)| id)
            .collect();

        for entity in destroyed {
            self.tear_down_components(entity, engine);
            self.collection.remove(entity);
            let _ = self.set_parent(entity, None);
            if let Some(mut object) = self.entities.remove(entity) {
                for child in object.transform_mut().take_children() {
                    if let Some(child) = self.entities.get_mut(child) {
                        child.transform_mut().set_parent_link(None);
                    }
                }
                log::trace!("Freed entity '{}'", object.name());
            }
        }
    }

    /// Detach every component of an entity and run its `on_destroy`
    fn tear_down_components(&mut self, entity: EntityId, engine: &mut EngineContext) {
        let Some(object) = self.entities.get_mut(entity) else {
            return;
        };
        let slots = std::mem::take(&mut object.slots);
        object.just_added.clear();
        for slot in slots {
            self.tear_down(entity, slot, engine);
        }
    }

    /// Run `on_destroy` on a detached component, then drop it
    ///
    /// Components that never ran `awake` hold nothing and are dropped as is.
    fn tear_down(&mut self, entity: EntityId, slot: ComponentSlot, engine: &mut EngineContext) {
        if slot.stage == LifecycleStage::Added {
            return;
        }
        let Some(mut component) = slot.component else {
            return;
        };
        let mut ctx = ComponentContext::new(entity, slot.id, self, engine);
        component.on_destroy(&mut ctx);
    }

    /// Run `awake` on every just-added component of an entity
    pub fn run_component_awake(&mut self, entity: EntityId, engine: &mut EngineContext) {
        let Some(batch) = self.entities.get(entity).map(|object| object.just_added.clone()) else {
            return;
        };
        for id in batch {
            self.run_hook(entity, id, engine, LifecycleStage::Added, |component, ctx| {
                component.awake(ctx);
                Some(LifecycleStage::Awake)
            });
        }
    }

    /// Run `start` on every awakened just-added component, then clear them from the buffer
    pub fn run_component_start(&mut self, entity: EntityId, engine: &mut EngineContext) {
        let Some(batch) = self.entities.get(entity).map(|object| object.just_added.clone()) else {
            return;
        };
        for id in batch {
            self.run_hook(entity, id, engine, LifecycleStage::Awake, |component, ctx| {
                component.start(ctx);
                Some(LifecycleStage::Started)
            });
        }

        // Components added while starting stay queued for the next flush
        if let Some(object) = self.entities.get_mut(entity) {
            let GameObject { slots, just_added, .. } = object;
            just_added.retain(|id| {
                slots
                    .iter()
                    .find(|slot| slot.id == *id)
                    .is_some_and(|slot| slot.stage != LifecycleStage::Started && !slot.destroyed)
            });
        }
    }

    /// Run `update` on every started component, removing destroyed ones in the same pass
    pub fn run_component_update(&mut self, entity: EntityId, delta_time: f32, engine: &mut EngineContext) {
        let mut index = 0;
        loop {
            let Some(object) = self.entities.get_mut(entity) else {
                return;
            };
            let Some(slot) = object.slots.get(index) else {
                return;
            };
            if slot.destroyed {
                let removed = object.slots.remove(index);
                self.tear_down(entity, removed, engine);
                continue;
            }

            let id = slot.id;
            index += 1;
            self.run_hook(entity, id, engine, LifecycleStage::Started, |component, ctx| {
                component.update(ctx, delta_time);
                None
            });
        }
    }

    /// Run `render` on every started component in attachment order
    pub fn run_component_render(&mut self, entity: EntityId, engine: &mut EngineContext) {
        let Some(ids) = self
            .entities
            .get(entity)
            .map(|object| object.slots.iter().map(|slot| slot.id).collect::<Vec<_>>())
        else {
            return;
        };
        for id in ids {
            self.run_hook(entity, id, engine, LifecycleStage::Started, |component, ctx| {
                component.render(ctx);
                None
            });
        }
    }

    /// Detach one component, run `hook` on it, reattach it
    ///
    /// The hook only runs when the component is at `stage` and not destroyed.
    /// A returned stage replaces the component's current one.
    fn run_hook(
        &mut self,
        entity: EntityId,
        id: ComponentId,
        engine: &mut EngineContext,
        stage: LifecycleStage,
        hook: impl FnOnce(&mut dyn Component, &mut ComponentContext<'_>) -> Option<LifecycleStage>,
    ) {
        let Some(object) = self.entities.get_mut(entity) else {
            return;
        };
        match object.slot(id) {
            Some(slot) if slot.stage == stage && !slot.destroyed => {}
            _ => return,
        }
        let Some(mut component) = object.take_component(id) else {
            return;
        };

        let next_stage = {
            let mut ctx = ComponentContext::new(entity, id, self, engine);
            hook(component.as_mut(), &mut ctx)
        };

        if let Some(object) = self.entities.get_mut(entity) {
            object.restore_component(id, component);
            if let (Some(next), Some(slot)) = (next_stage, object.slot_mut(id)) {
                slot.stage = next;
            }
        }
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("entities", &self.entities.len())
            .field("live", &self.collection.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    struct Tracker {
        name: &'static str,
        log: Log,
    }

    impl Tracker {
        fn new(name: &'static str, log: &Log) -> Self {
            Self {
                name,
                log: Rc::clone(log),
            }
        }

        fn record(&self, hook: &str) {
            self.log.borrow_mut().push(format!("{}.{hook}", self.name));
        }
    }

    impl Component for Tracker {
        fn awake(&mut self, _ctx: &mut ComponentContext<'_>) {
            self.record("awake");
        }
        fn start(&mut self, _ctx: &mut ComponentContext<'_>) {
            self.record("start");
        }
        fn update(&mut self, _ctx: &mut ComponentContext<'_>, _delta_time: f32) {
            self.record("update");
        }
        fn render(&mut self, _ctx: &mut ComponentContext<'_>) {
            self.record("render");
        }
        fn on_destroy(&mut self, ctx: &mut ComponentContext<'_>) {
            assert!(ctx.world.contains(ctx.entity()));
            self.record("destroy");
        }
    }

    /// Destroys itself on its first update
    struct OneShot;

    impl Component for OneShot {
        fn update(&mut self, ctx: &mut ComponentContext<'_>, _delta_time: f32) {
            ctx.destroy_self();
        }
    }

    /// Adds a tracker to its own entity while updating
    struct Spawner {
        log: Log,
        done: bool,
    }

    impl Component for Spawner {
        fn update(&mut self, ctx: &mut ComponentContext<'_>, _delta_time: f32) {
            if !self.done {
                self.done = true;
                let entity = ctx.entity();
                ctx.world.add_component(entity, Tracker::new("late", &self.log));
            }
        }
    }

    fn new_log() -> Log {
        Rc::new(RefCell::new(Vec::new()))
    }

    #[test]
    fn test_awake_before_start_before_update() {
        let mut world = World::new();
        let mut engine = EngineContext::headless(800, 600);
        let log = new_log();

        let a = world.spawn("a");
        let b = world.spawn("b");
        world.add_component(a, Tracker::new("a", &log));
        world.add_component(b, Tracker::new("b", &log));

        world.update(0.016, &mut engine);
        assert_eq!(
            *log.borrow(),
            vec!["a.awake", "b.awake", "a.start", "b.start", "a.update", "b.update"]
        );

        log.borrow_mut().clear();
        world.update(0.016, &mut engine);
        assert_eq!(*log.borrow(), vec!["a.update", "b.update"]);
    }

    #[test]
    fn test_destroyed_entity_leaves_live_list_after_one_update() {
        let mut world = World::new();
        let mut engine = EngineContext::headless(800, 600);

        let doomed = world.spawn("doomed");
        let kept = world.spawn("kept");
        world.update(0.016, &mut engine);
        assert_eq!(world.live_entities(), &[doomed, kept]);

        world.destroy(doomed);
        world.update(0.016, &mut engine);

        assert_eq!(world.live_entities(), &[kept]);
        assert!(world.entity(doomed).is_none());
        assert_eq!(world.find("doomed"), None);
    }

    #[test]
    fn test_pending_entity_findable_before_first_update() {
        let mut world = World::new();
        let entity = world.spawn("player");

        assert_eq!(world.find("player"), Some(entity));
        assert!(world.live_entities().is_empty());
    }

    #[test]
    fn test_destroyed_component_removed_without_destroying_entity() {
        let mut world = World::new();
        let mut engine = EngineContext::headless(800, 600);
        let log = new_log();

        let entity = world.spawn("e");
        world.add_component(entity, OneShot);
        world.add_component(entity, Tracker::new("p", &log));

        world.update(0.016, &mut engine);
        assert!(world.get_component::<OneShot>(entity).is_none());

        world.update(0.016, &mut engine);
        let object = world.entity(entity).unwrap();
        assert_eq!(object.component_count(), 1);
        assert!(object.has_component::<Tracker>());
        assert!(world.live_entities().contains(&entity));
    }

    #[test]
    fn test_component_added_during_update_starts_next_frame() {
        let mut world = World::new();
        let mut engine = EngineContext::headless(800, 600);
        let log = new_log();

        let entity = world.spawn("e");
        world.add_component(
            entity,
            Spawner {
                log: Rc::clone(&log),
                done: false,
            },
        );

        world.update(0.016, &mut engine);
        world.render(&mut engine);
        assert!(log.borrow().is_empty());

        world.update(0.016, &mut engine);
        assert_eq!(*log.borrow(), vec!["late.awake", "late.start", "late.update"]);
    }

    #[test]
    fn test_child_world_position_follows_parent_rotation() {
        let mut world = World::new();
        let parent = world.spawn("parent");
        let child = world.spawn("child");

        world.transform_mut(parent).unwrap().set_position(Vec2::new(2.0, 0.0));
        world.transform_mut(parent).unwrap().set_rotation(90.0);
        world.transform_mut(child).unwrap().set_position(Vec2::new(1.0, 0.0));
        world.set_parent(child, Some(parent)).unwrap();

        let position = world.world_position(child).unwrap();
        assert_relative_eq!(position.x, 2.0, epsilon = 1e-5);
        assert_relative_eq!(position.y, 1.0, epsilon = 1e-5);
        assert_relative_eq!(world.world_rotation(child).unwrap(), 90.0);
    }

    #[test]
    fn test_world_scale_multiplies() {
        let mut world = World::new();
        let parent = world.spawn("parent");
        let child = world.spawn("child");
        world.transform_mut(parent).unwrap().set_scale(Vec2::new(2.0, 3.0));
        world.transform_mut(child).unwrap().set_scale(Vec2::new(0.5, 2.0));
        world.set_parent(child, Some(parent)).unwrap();

        let scale = world.world_scale(child).unwrap();
        assert_relative_eq!(scale.x, 1.0);
        assert_relative_eq!(scale.y, 6.0);
    }

    #[test]
    fn test_reparenting_keeps_both_sides_consistent() {
        let mut world = World::new();
        let a = world.spawn("a");
        let b = world.spawn("b");
        let child = world.spawn("child");

        world.set_parent(child, Some(a)).unwrap();
        world.set_parent(child, Some(b)).unwrap();
        assert!(world.transform(a).unwrap().children().is_empty());
        assert_eq!(world.transform(b).unwrap().children(), &[child]);
        assert_eq!(world.transform(child).unwrap().parent(), Some(b));

        world.set_parent(child, None).unwrap();
        assert!(world.transform(b).unwrap().children().is_empty());
        assert_eq!(world.transform(child).unwrap().parent(), None);
    }

    #[test]
    fn test_parent_cycle_rejected() {
        let mut world = World::new();
        let a = world.spawn("a");
        let b = world.spawn("b");
        world.set_parent(b, Some(a)).unwrap();

        assert_eq!(
            world.set_parent(a, Some(b)),
            Err(EcsError::HierarchyCycle { child: a, parent: b })
        );
        assert!(world.set_parent(a, Some(a)).is_err());
    }

    #[test]
    fn test_destroying_parent_detaches_children() {
        let mut world = World::new();
        let mut engine = EngineContext::headless(800, 600);
        let parent = world.spawn("parent");
        let child = world.spawn("child");
        world.set_parent(child, Some(parent)).unwrap();

        world.destroy(parent);
        world.update(0.016, &mut engine);
        assert_eq!(world.transform(child).unwrap().parent(), None);
        assert!(world.world_position(child).is_some());
    }

    #[test]
    fn test_dispose_frees_all_entities() {
        let mut world = World::new();
        let mut engine = EngineContext::headless(800, 600);
        world.spawn("a");
        world.create_entity(None);
        world.update(0.016, &mut engine);

        world.dispose(&mut engine);
        assert_eq!(world.entity_count(), 0);
        assert!(world.live_entities().is_empty());
        assert_eq!(world.find("a"), None);
    }

    #[test]
    fn test_destroyed_entity_tears_down_components() {
        let mut world = World::new();
        let mut engine = EngineContext::headless(800, 600);
        let log = new_log();
        let entity = world.spawn("e");
        world.add_component(entity, Tracker::new("p", &log));
        world.update(0.016, &mut engine);
        log.borrow_mut().clear();

        world.destroy(entity);
        world.update(0.016, &mut engine);
        assert_eq!(*log.borrow(), vec!["p.destroy"]);
        assert!(!world.contains(entity));
    }

    #[test]
    fn test_removed_component_torn_down_once() {
        let mut world = World::new();
        let mut engine = EngineContext::headless(800, 600);
        let log = new_log();
        let entity = world.spawn("e");
        let id = world.add_component(entity, Tracker::new("p", &log)).unwrap();
        world.update(0.016, &mut engine);

        world.entity_mut(entity).unwrap().destroy_component(id);
        world.update(0.016, &mut engine);
        world.dispose(&mut engine);
        assert_eq!(log.borrow().iter().filter(|entry| *entry == "p.destroy").count(), 1);
    }

    #[test]
    fn test_dispose_tears_down_only_awakened_components() {
        let mut world = World::new();
        let mut engine = EngineContext::headless(800, 600);
        let log = new_log();
        let old = world.spawn("old");
        world.add_component(old, Tracker::new("old", &log));
        world.update(0.016, &mut engine);
        let fresh = world.spawn("fresh");
        world.add_component(fresh, Tracker::new("fresh", &log));
        log.borrow_mut().clear();

        world.dispose(&mut engine);
        assert_eq!(*log.borrow(), vec!["old.destroy"]);
    }
}
