//! Hierarchical 2D transform
//!
//! A [`Transform`] stores local position, rotation (degrees) and scale plus
//! handles to its parent and children. World-space values are never stored;
//! [`World`](super::World) derives them by walking the parent chain:
//!
//! - rotation adds,
//! - position is the parent's world position plus the local position rotated
//!   by the parent's world rotation,
//! - scale multiplies per axis.
//!
//! Parent links change only through [`World::set_parent`](super::World::set_parent),
//! which keeps both sides of the relation consistent.

use crate::ecs::{Component, EntityId};
use crate::foundation::math::Vec2;

/// Local spatial state of an entity
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    position: Vec2,
    rotation: f32,
    scale: Vec2,
    parent: Option<EntityId>,
    children: Vec<EntityId>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec2::zeros(),
            rotation: 0.0,
            scale: Vec2::new(1.0, 1.0),
            parent: None,
            children: Vec::new(),
        }
    }
}

impl Component for Transform {}

impl Transform {
    /// Identity transform with no parent
    pub fn new() -> Self {
        Self::default()
    }

    /// Local position
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Set the local position
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    /// Offset the local position
    pub fn translate(&mut self, offset: Vec2) {
        self.position += offset;
    }

    /// Local rotation in degrees
    pub const fn rotation(&self) -> f32 {
        self.rotation
    }

    /// Set the local rotation in degrees
    pub fn set_rotation(&mut self, degrees: f32) {
        self.rotation = degrees;
    }

    /// Add to the local rotation
    pub fn rotate(&mut self, degrees: f32) {
        self.rotation += degrees;
    }

    /// Local scale
    pub const fn scale(&self) -> Vec2 {
        self.scale
    }

    /// Set the local scale
    pub fn set_scale(&mut self, scale: Vec2) {
        self.scale = scale;
    }

    /// Parent entity, if any
    pub const fn parent(&self) -> Option<EntityId> {
        self.parent
    }

    /// Child entities in attachment order
    pub fn children(&self) -> &[EntityId] {
        &self.children
    }

    pub(crate) fn set_parent_link(&mut self, parent: Option<EntityId>) {
        self.parent = parent;
    }

    pub(crate) fn add_child_link(&mut self, child: EntityId) {
        if !self.children.contains(&child) {
            self.children.push(child);
        }
    }

    pub(crate) fn remove_child_link(&mut self, child: EntityId) {
        self.children.retain(|&c| c != child);
    }

    pub(crate) fn take_children(&mut self) -> Vec<EntityId> {
        std::mem::take(&mut self.children)
    }
}
