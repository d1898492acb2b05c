//! Built-in components
//!
//! Rendering ([`SpriteRenderer`], [`Text`]), UI input ([`Button`]), animation
//! ([`Tween`]) and sound ([`AudioSource`]). Each is an ordinary [`Component`]
//! and reaches engine services only through its hook context.
//!
//! [`Component`]: crate::ecs::Component

mod audio_source;
mod button;
mod sprite_renderer;
mod text;
mod tween;

pub use audio_source::AudioSource;
pub use button::{Button, HoverSensor};
pub use sprite_renderer::SpriteRenderer;
pub use text::Text;
pub use tween::{Easing, Tween, TweenTarget};
