//! Entity implementation

use std::any::{Any, TypeId};

use crate::ecs::{Component, ComponentId, Transform};

slotmap::new_key_type! {
    /// Generational handle to an entity in a [`World`](super::World)
    pub struct EntityId;
}

/// Name given to entities created without one
pub const DEFAULT_ENTITY_NAME: &str = "New GameObject";

/// How far a component has come through its one-time hooks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LifecycleStage {
    Added,
    Awake,
    Started,
}

pub(crate) struct ComponentSlot {
    pub(crate) id: ComponentId,
    /// `None` while one of the component's hooks is running
    pub(crate) component: Option<Box<dyn Component>>,
    pub(crate) stage: LifecycleStage,
    pub(crate) destroyed: bool,
}

/// Named container of components
///
/// Every entity owns exactly one [`Transform`], created with it and never
/// removable. Other components are kept in attachment order.
pub struct GameObject {
    id: EntityId,
    name: String,
    transform: Transform,
    pub(crate) slots: Vec<ComponentSlot>,
    pub(crate) just_added: Vec<ComponentId>,
    next_component_id: u64,
    destroyed: bool,
}

impl GameObject {
    pub(crate) fn new(id: EntityId, name: Option<&str>) -> Self {
        Self {
            id,
            name: name.unwrap_or(DEFAULT_ENTITY_NAME).to_string(),
            transform: Transform::new(),
            slots: Vec::new(),
            just_added: Vec::new(),
            next_component_id: 0,
            destroyed: false,
        }
    }

    /// Handle of this entity
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Name of this entity
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the entity
    ///
    /// The world's name index keeps the name the entity was added under.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// The entity's transform
    pub const fn transform(&self) -> &Transform {
        &self.transform
    }

    /// The entity's transform, mutably
    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    /// Attach a component; its `awake` and `start` run on the next world update
    pub fn add_component<T: Component>(&mut self, component: T) -> ComponentId {
        let id = ComponentId(self.next_component_id);
        self.next_component_id += 1;
        self.slots.push(ComponentSlot {
            id,
            component: Some(Box::new(component)),
            stage: LifecycleStage::Added,
            destroyed: false,
        });
        self.just_added.push(id);
        log::trace!("Added {} to '{}'", std::any::type_name::<T>(), self.name);
        id
    }

    /// First component of type `T`, the transform included
    pub fn get_component<T: Component>(&self) -> Option<&T> {
        if TypeId::of::<T>() == TypeId::of::<Transform>() {
            return (&self.transform as &dyn Any).downcast_ref::<T>();
        }
        self.slots
            .iter()
            .filter(|slot| !slot.destroyed)
            .find_map(|slot| slot.component.as_deref()?.as_any().downcast_ref::<T>())
    }

    /// First component of type `T`, mutably
    pub fn get_component_mut<T: Component>(&mut self) -> Option<&mut T> {
        if TypeId::of::<T>() == TypeId::of::<Transform>() {
            return (&mut self.transform as &mut dyn Any).downcast_mut::<T>();
        }
        self.slots
            .iter_mut()
            .filter(|slot| !slot.destroyed)
            .find_map(|slot| slot.component.as_deref_mut()?.as_any_mut().downcast_mut::<T>())
    }

    /// Component with the given id
    pub fn get_component_by_id(&self, id: ComponentId) -> Option<&dyn Component> {
        self.slot(id).and_then(|slot| slot.component.as_deref())
    }

    /// Whether a live component of type `T` is attached
    pub fn has_component<T: Component>(&self) -> bool {
        self.get_component::<T>().is_some()
    }

    /// Flag a component for removal on the next update; the transform cannot be removed
    pub fn destroy_component(&mut self, id: ComponentId) -> bool {
        match self.slots.iter_mut().find(|slot| slot.id == id) {
            Some(slot) => {
                slot.destroyed = true;
                true
            }
            None => false,
        }
    }

    /// Flag the first component of type `T` for removal
    pub fn destroy_component_of<T: Component>(&mut self) -> bool {
        let id = self
            .slots
            .iter()
            .filter(|slot| !slot.destroyed)
            .find(|slot| {
                slot.component
                    .as_deref()
                    .is_some_and(|component| component.as_any().is::<T>())
            })
            .map(|slot| slot.id);
        id.is_some_and(|id| self.destroy_component(id))
    }

    /// Number of attached components that are not flagged for removal
    pub fn component_count(&self) -> usize {
        self.slots.iter().filter(|slot| !slot.destroyed).count()
    }

    /// Whether components are waiting for their `awake`/`start`
    pub fn has_pending_components(&self) -> bool {
        !self.just_added.is_empty()
    }

    /// Flag the entity for removal on the next update
    pub fn destroy(&mut self) {
        self.destroyed = true;
    }

    /// Whether the entity is flagged for removal
    pub const fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub(crate) fn slot(&self, id: ComponentId) -> Option<&ComponentSlot> {
        self.slots.iter().find(|slot| slot.id == id)
    }

    pub(crate) fn slot_mut(&mut self, id: ComponentId) -> Option<&mut ComponentSlot> {
        self.slots.iter_mut().find(|slot| slot.id == id)
    }

    /// Detach a component so its hook can run against the world
    pub(crate) fn take_component(&mut self, id: ComponentId) -> Option<Box<dyn Component>> {
        self.slot_mut(id)?.component.take()
    }

    /// Reattach a component taken by [`GameObject::take_component`]
    pub(crate) fn restore_component(&mut self, id: ComponentId, component: Box<dyn Component>) {
        if let Some(slot) = self.slot_mut(id) {
            slot.component = Some(component);
        }
    }
}

impl std::fmt::Debug for GameObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameObject")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("components", &self.slots.len())
            .field("destroyed", &self.destroyed)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::KeyData;

    struct Marker(u32);
    impl Component for Marker {}

    struct Other;
    impl Component for Other {}

    fn object(name: Option<&str>) -> GameObject {
        GameObject::new(EntityId::from(KeyData::from_ffi(1)), name)
    }

    #[test]
    fn test_default_name() {
        assert_eq!(object(None).name(), DEFAULT_ENTITY_NAME);
        assert_eq!(object(Some("Player")).name(), "Player");
    }

    #[test]
    fn test_transform_found_by_type() {
        let mut go = object(None);
        go.transform_mut().set_rotation(45.0);
        let transform = go.get_component::<Transform>().unwrap();
        assert!((transform.rotation() - 45.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_missing_component_is_none() {
        let mut go = object(None);
        go.add_component(Marker(3));
        assert!(go.get_component::<Other>().is_none());
        assert_eq!(go.get_component::<Marker>().map(|m| m.0), Some(3));
    }

    #[test]
    fn test_destroyed_component_hidden_from_lookup() {
        let mut go = object(None);
        go.add_component(Marker(1));
        assert!(go.destroy_component_of::<Marker>());
        assert!(!go.has_component::<Marker>());
        assert_eq!(go.component_count(), 0);
        assert!(!go.destroy_component_of::<Marker>());
    }

    #[test]
    fn test_added_components_queue_for_startup() {
        let mut go = object(None);
        let a = go.add_component(Marker(1));
        let b = go.add_component(Other);
        assert_ne!(a, b);
        assert_eq!(go.just_added, vec![a, b]);
        assert!(go.has_pending_components());
    }
}
