//! Window backend abstraction
//!
//! The engine only needs a surface that pumps close/resize events, reports
//! polled key and mouse state and presents finished frames. Native windowing
//! lives behind [`WindowBackend`]; [`HeadlessWindow`] is a scriptable stand-in
//! used by tests and the headless demo.

use std::any::Any;
use std::collections::{HashSet, VecDeque};

use crate::core::config::WindowConfig;
use crate::foundation::math::Vec2;
use crate::input::{KeyCode, MouseButton};

/// Events delivered by [`WindowBackend::poll_events`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEvent {
    /// The user asked to close the window
    CloseRequested,
    /// The drawable surface changed size
    Resized {
        /// New width in pixels
        width: u32,
        /// New height in pixels
        height: u32,
    },
}

/// Platform window and event pump
pub trait WindowBackend {
    /// Current surface size in pixels
    fn size(&self) -> (u32, u32);

    /// Pump the platform event queue
    fn poll_events(&mut self) -> Vec<WindowEvent>;

    /// Polled state of a key
    fn is_key_down(&self, key: KeyCode) -> bool;

    /// Polled state of a mouse button
    fn is_mouse_button_down(&self, button: MouseButton) -> bool;

    /// Cursor position in surface-local pixels, origin top-left
    fn cursor_position(&self) -> Vec2;

    /// Show the frame that was just rendered
    fn present(&mut self);

    /// Downcast to the concrete backend type
    fn as_any(&self) -> &dyn Any;

    /// Downcast to the concrete backend type mutably
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Window that never touches the OS
///
/// Input and events are injected by the owner. With
/// [`HeadlessWindow::with_frame_limit`] it requests closing after a fixed
/// number of presented frames.
#[derive(Debug)]
pub struct HeadlessWindow {
    title: String,
    width: u32,
    height: u32,
    events: VecDeque<WindowEvent>,
    keys: HashSet<KeyCode>,
    buttons: HashSet<MouseButton>,
    cursor: Vec2,
    presented_frames: u64,
    frame_limit: Option<u64>,
}

impl HeadlessWindow {
    /// Create a headless surface matching the window config
    pub fn new(config: &WindowConfig) -> Self {
        log::debug!("Creating headless window '{}' ({}x{})", config.title, config.width, config.height);
        Self {
            title: config.title.clone(),
            width: config.width,
            height: config.height,
            events: VecDeque::new(),
            keys: HashSet::new(),
            buttons: HashSet::new(),
            cursor: Vec2::zeros(),
            presented_frames: 0,
            frame_limit: None,
        }
    }

    /// Request closing once `frames` frames have been presented
    #[must_use]
    pub const fn with_frame_limit(mut self, frames: u64) -> Self {
        self.frame_limit = Some(frames);
        self
    }

    /// Window title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Number of frames presented so far
    pub const fn presented_frames(&self) -> u64 {
        self.presented_frames
    }

    /// Queue a close request
    pub fn request_close(&mut self) {
        self.events.push_back(WindowEvent::CloseRequested);
    }

    /// Resize the surface and queue the matching event
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.events.push_back(WindowEvent::Resized { width, height });
    }

    /// Set the polled state of a key
    pub fn set_key(&mut self, key: KeyCode, pressed: bool) {
        if pressed {
            self.keys.insert(key);
        } else {
            self.keys.remove(&key);
        }
    }

    /// Set the polled state of a mouse button
    pub fn set_mouse_button(&mut self, button: MouseButton, pressed: bool) {
        if pressed {
            self.buttons.insert(button);
        } else {
            self.buttons.remove(&button);
        }
    }

    /// Move the cursor (surface pixels)
    pub fn set_cursor_position(&mut self, position: Vec2) {
        self.cursor = position;
    }
}

impl WindowBackend for HeadlessWindow {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn poll_events(&mut self) -> Vec<WindowEvent> {
        if self.frame_limit.is_some_and(|limit| self.presented_frames >= limit) {
            self.events.push_back(WindowEvent::CloseRequested);
        }
        self.events.drain(..).collect()
    }

    fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys.contains(&key)
    }

    fn is_mouse_button_down(&self, button: MouseButton) -> bool {
        self.buttons.contains(&button)
    }

    fn cursor_position(&self) -> Vec2 {
        self.cursor
    }

    fn present(&mut self) {
        self.presented_frames += 1;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
