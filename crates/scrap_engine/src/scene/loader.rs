//! Deferred scene transition requests

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// A queued scene load
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneRequest {
    /// Load the scene registered under this name
    Name(String),
    /// Load the scene at this registration index
    Index(usize),
}

/// Clonable handle to a [`SceneStateMachine`](super::SceneStateMachine)'s request queue
///
/// Every clone pushes into the same queue. Requests made while the state
/// machine is updating take effect at the end of that update.
#[derive(Debug, Clone, Default)]
pub struct SceneLoader {
    queue: Rc<RefCell<VecDeque<SceneRequest>>>,
}

impl SceneLoader {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a load of the scene named `name`
    pub fn load(&self, name: impl Into<String>) {
        self.queue
            .borrow_mut()
            .push_back(SceneRequest::Name(name.into()));
    }

    /// Request a load of the scene at `index`
    pub fn load_index(&self, index: usize) {
        self.queue.borrow_mut().push_back(SceneRequest::Index(index));
    }

    /// Oldest pending request
    pub fn pop(&self) -> Option<SceneRequest> {
        self.queue.borrow_mut().pop_front()
    }

    /// Number of pending requests
    pub fn len(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Whether no request is pending
    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }

    /// Drop every pending request
    pub fn clear(&self) {
        self.queue.borrow_mut().clear();
    }
}
