//! Input management system
//!
//! [`InputState`] keeps the key and mouse state of the current and the previous
//! frame so callers can ask for held keys as well as press/release edges.

use std::collections::HashSet;

use crate::foundation::math::Vec2;
use crate::platform::WindowBackend;

/// Per-frame keyboard and mouse state
#[derive(Debug, Default)]
pub struct InputState {
    current_keys: HashSet<KeyCode>,
    previous_keys: HashSet<KeyCode>,
    current_buttons: HashSet<MouseButton>,
    previous_buttons: HashSet<MouseButton>,
    cursor: Vec2,
}

impl InputState {
    /// Create an input state with nothing pressed
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a new snapshot from the window backend
    pub fn update(&mut self, window: &dyn WindowBackend) {
        self.begin_frame();
        for &key in KeyCode::ALL {
            if window.is_key_down(key) {
                self.current_keys.insert(key);
            }
        }
        for &button in MouseButton::ALL {
            if window.is_mouse_button_down(button) {
                self.current_buttons.insert(button);
            }
        }
        self.cursor = window.cursor_position();
    }

    /// Move the current state into the previous-frame slot and clear it
    pub fn begin_frame(&mut self) {
        self.previous_keys.clone_from(&self.current_keys);
        self.previous_buttons.clone_from(&self.current_buttons);
        self.current_keys.clear();
        self.current_buttons.clear();
    }

    /// Record a key state change for this frame
    pub fn set_key(&mut self, key: KeyCode, pressed: bool) {
        if pressed {
            self.current_keys.insert(key);
        } else {
            self.current_keys.remove(&key);
        }
    }

    /// Record a mouse button state change for this frame
    pub fn set_mouse_button(&mut self, button: MouseButton, pressed: bool) {
        if pressed {
            self.current_buttons.insert(button);
        } else {
            self.current_buttons.remove(&button);
        }
    }

    /// Record the cursor position in surface pixels
    pub fn set_cursor_position(&mut self, position: Vec2) {
        self.cursor = position;
    }

    /// Whether `key` is held this frame
    pub fn key(&self, key: KeyCode) -> bool {
        self.current_keys.contains(&key)
    }

    /// Whether `key` went down this frame
    pub fn key_down(&self, key: KeyCode) -> bool {
        self.current_keys.contains(&key) && !self.previous_keys.contains(&key)
    }

    /// Whether `key` was released this frame
    pub fn key_up(&self, key: KeyCode) -> bool {
        !self.current_keys.contains(&key) && self.previous_keys.contains(&key)
    }

    /// Whether `button` is held this frame
    pub fn mouse_button(&self, button: MouseButton) -> bool {
        self.current_buttons.contains(&button)
    }

    /// Whether `button` went down this frame
    pub fn mouse_button_down(&self, button: MouseButton) -> bool {
        self.current_buttons.contains(&button) && !self.previous_buttons.contains(&button)
    }

    /// Whether `button` was released this frame
    pub fn mouse_button_up(&self, button: MouseButton) -> bool {
        !self.current_buttons.contains(&button) && self.previous_buttons.contains(&button)
    }

    /// Cursor position in surface-local pixels, origin top-left
    pub const fn cursor_position(&self) -> Vec2 {
        self.cursor
    }
}

/// Key codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum KeyCode {
    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,
    Num0, Num1, Num2, Num3, Num4, Num5, Num6, Num7, Num8, Num9,
    Space,
    Enter,
    Escape,
    Tab,
    Backspace,
    LeftShift,
    LeftControl,
    Up,
    Down,
    Left,
    Right,
}

impl KeyCode {
    /// Every key the engine polls each frame
    pub const ALL: &'static [Self] = &[
        Self::A, Self::B, Self::C, Self::D, Self::E, Self::F, Self::G, Self::H, Self::I,
        Self::J, Self::K, Self::L, Self::M, Self::N, Self::O, Self::P, Self::Q, Self::R,
        Self::S, Self::T, Self::U, Self::V, Self::W, Self::X, Self::Y, Self::Z,
        Self::Num0, Self::Num1, Self::Num2, Self::Num3, Self::Num4,
        Self::Num5, Self::Num6, Self::Num7, Self::Num8, Self::Num9,
        Self::Space, Self::Enter, Self::Escape, Self::Tab, Self::Backspace,
        Self::LeftShift, Self::LeftControl,
        Self::Up, Self::Down, Self::Left, Self::Right,
    ];
}

/// Mouse buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left mouse button
    Left,
    /// Right mouse button
    Right,
    /// Middle mouse button
    Middle,
}

impl MouseButton {
    /// Every button the engine polls each frame
    pub const ALL: &'static [Self] = &[Self::Left, Self::Right, Self::Middle];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_edges_across_frames() {
        let mut input = InputState::new();

        input.begin_frame();
        input.set_key(KeyCode::Space, true);
        assert!(input.key(KeyCode::Space));
        assert!(input.key_down(KeyCode::Space));

        input.begin_frame();
        input.set_key(KeyCode::Space, true);
        assert!(input.key(KeyCode::Space));
        assert!(!input.key_down(KeyCode::Space));

        input.begin_frame();
        assert!(!input.key(KeyCode::Space));
        assert!(input.key_up(KeyCode::Space));
    }

    #[test]
    fn test_mouse_edges() {
        let mut input = InputState::new();
        input.begin_frame();
        input.set_mouse_button(MouseButton::Left, true);
        assert!(input.mouse_button_down(MouseButton::Left));

        input.begin_frame();
        assert!(input.mouse_button_up(MouseButton::Left));
        assert!(!input.mouse_button(MouseButton::Left));
    }
}
