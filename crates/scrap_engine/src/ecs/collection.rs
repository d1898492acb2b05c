//! Registry of the entities taking part in the frame loop
//!
//! The collection only tracks handles; entity storage belongs to the
//! [`World`](super::World). New entities wait in a pending list until the next
//! update flushes them into the live list, but they are findable by name from
//! the moment they are added. They join the live list only at that flush, so
//! an entity is never live twice and never updated before its `start` ran.
//! An entity is indexed under the name it had when it was added; later
//! renames are not re-indexed.

use std::collections::{HashMap, HashSet};

use crate::ecs::EntityId;

/// Live list, pending list and name index of a world's entities
#[derive(Debug, Default)]
pub struct EntityCollection {
    live: Vec<EntityId>,
    pending: Vec<EntityId>,
    pending_set: HashSet<EntityId>,
    index: HashMap<String, EntityId>,
    indexed_names: HashMap<EntityId, String>,
}

impl EntityCollection {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an entity for the next flush and index it under `name`
    ///
    /// Re-adding a tracked entity, or adding one whose name is already taken,
    /// is a no-op. Returns whether the entity was queued.
    pub fn add(&mut self, entity: EntityId, name: &str) -> bool {
        if self.contains(entity) {
            log::trace!("Entity '{}' is already tracked", name);
            return false;
        }
        if let Some(existing) = self.index.get(name) {
            log::warn!(
                "Entity name '{}' already belongs to {:?}; {:?} not added",
                name,
                existing,
                entity
            );
            return false;
        }

        self.pending.push(entity);
        self.pending_set.insert(entity);
        self.index.insert(name.to_string(), entity);
        self.indexed_names.insert(entity, name.to_string());
        true
    }

    /// Drop an entity from the live list, the pending list and the index
    pub fn remove(&mut self, entity: EntityId) -> bool {
        let was_live = self.live.len();
        self.live.retain(|&e| e != entity);
        let removed_live = self.live.len() != was_live;

        let removed_pending = self.pending_set.remove(&entity);
        if removed_pending {
            self.pending.retain(|&e| e != entity);
        }

        if let Some(name) = self.indexed_names.remove(&entity) {
            if self.index.get(&name) == Some(&entity) {
                self.index.remove(&name);
            }
        }
        removed_live || removed_pending
    }

    /// Take the pending entities in insertion order
    pub fn take_pending(&mut self) -> Vec<EntityId> {
        self.pending_set.clear();
        std::mem::take(&mut self.pending)
    }

    /// Append flushed entities to the live list
    pub fn promote(&mut self, entities: impl IntoIterator<Item = EntityId>) {
        for entity in entities {
            if self.indexed_names.contains_key(&entity) && !self.live.contains(&entity) {
                self.live.push(entity);
            }
        }
    }

    /// Entity indexed under `name`
    pub fn find(&self, name: &str) -> Option<EntityId> {
        self.index.get(name).copied()
    }

    /// Live entities in update order
    pub fn live(&self) -> &[EntityId] {
        &self.live
    }

    /// Entities waiting for the next flush
    pub fn pending(&self) -> &[EntityId] {
        &self.pending
    }

    /// Whether the entity is live or pending
    pub fn contains(&self, entity: EntityId) -> bool {
        self.pending_set.contains(&entity) || self.indexed_names.contains_key(&entity)
    }

    /// Whether the entity is in the live list
    pub fn is_live(&self, entity: EntityId) -> bool {
        self.live.contains(&entity)
    }

    /// Number of live entities
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// Whether there are no live entities
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Clear every list and the index; entity storage is untouched
    pub fn dispose(&mut self) {
        log::debug!(
            "Disposing entity collection ({} live, {} pending)",
            self.live.len(),
            self.pending.len()
        );
        self.live.clear();
        self.pending.clear();
        self.pending_set.clear();
        self.index.clear();
        self.indexed_names.clear();
    }
}
