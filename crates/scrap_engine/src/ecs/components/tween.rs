//! Time-based property animation
//!
//! A [`Tween`] drives one property of its entity from the value it has when
//! the tween first updates to a target value. Position, scale and rotation act
//! on the transform; fade and color act on a sibling [`SpriteRenderer`], or on
//! a [`Button`] when there is no sprite.

use std::f32::consts::TAU;
use std::fmt;

use crate::ecs::components::{Button, SpriteRenderer};
use crate::ecs::{Component, ComponentContext};
use crate::foundation::math::{lerp, Color, Vec2};

/// Property and end value of a tween
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TweenTarget {
    /// Local position
    Position(Vec2),
    /// Local scale
    Scale(Vec2),
    /// Local rotation in degrees
    Rotation(f32),
    /// Opacity of the sibling sprite or button
    Fade(f32),
    /// Color of the sibling sprite or button
    Color(Color),
}

/// Easing curves mapping linear progress to eased progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    /// Progress passes through unchanged
    None,
    /// Constant speed
    #[default]
    Linear,
    /// Quadratic acceleration
    EaseIn,
    /// Quadratic deceleration
    EaseOut,
    /// Accelerate, then decelerate
    EaseInOut,
    /// Accelerate with a smooth start
    EaseInBack,
    /// Decelerate with a smooth end
    EaseOutBack,
    /// Spring-like wind-up at the start
    EaseInElastic,
    /// Spring-like overshoot at the end
    EaseOutElastic,
    /// Quick out of both ends, slow through the middle
    EaseInOutBounce,
}

impl Easing {
    const ELASTIC_PERIOD: f32 = 0.3;

    /// Eased progress for linear progress `t` in `0.0..=1.0`
    pub fn apply(self, t: f32) -> f32 {
        let period = Self::ELASTIC_PERIOD;
        let shift = period / 4.0;
        match self {
            Self::None | Self::Linear => t,
            Self::EaseIn => t * t,
            Self::EaseOut => t * (2.0 - t),
            Self::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    (4.0 - 2.0 * t).mul_add(t, -1.0)
                }
            }
            Self::EaseInBack => t * t * 2.0f32.mul_add(-t, 3.0),
            Self::EaseOutBack => 1.0 - Self::EaseInBack.apply(1.0 - t),
            Self::EaseInElastic => {
                let u = t - 1.0;
                -(2.0f32.powf(10.0 * u)) * ((u - shift) * TAU / period).sin()
            }
            Self::EaseOutElastic => 2.0f32
                .powf(-10.0 * t)
                .mul_add(((t - shift) * TAU / period).sin(), 1.0),
            Self::EaseInOutBounce => {
                if t < 0.5 {
                    (1.0 - (1.0 - 2.0 * t).powi(2)) * 0.5
                } else {
                    2.0f32.mul_add(t, -1.0).powi(2).mul_add(0.5, 0.5)
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Playback {
    Idle,
    Playing,
    Paused,
}

/// Animates one property of the owning entity
pub struct Tween {
    target: Option<TweenTarget>,
    from: Option<TweenTarget>,
    duration: f32,
    elapsed: f32,
    easing: Easing,
    playback: Playback,
    on_complete: Option<Box<dyn FnOnce()>>,
}

impl Default for Tween {
    fn default() -> Self {
        Self {
            target: None,
            from: None,
            duration: 0.0,
            elapsed: 0.0,
            easing: Easing::Linear,
            playback: Playback::Idle,
            on_complete: None,
        }
    }
}

impl Tween {
    /// Idle tween
    pub fn new() -> Self {
        Self::default()
    }

    /// Tween that starts playing on its first update
    pub fn to(target: TweenTarget, duration: f32, easing: Easing) -> Self {
        let mut tween = Self::new();
        tween.start(target, duration, easing);
        tween
    }

    /// Run `callback` once when the current tween reaches its target
    #[must_use]
    pub fn with_on_complete(mut self, callback: impl FnOnce() + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    /// Start animating towards `target`, replacing any running tween
    ///
    /// The start value is read from the entity on the next update.
    pub fn start(&mut self, target: TweenTarget, duration: f32, easing: Easing) {
        self.target = Some(target);
        self.from = None;
        self.duration = duration.max(0.0);
        self.elapsed = 0.0;
        self.easing = easing;
        self.playback = Playback::Playing;
        self.on_complete = None;
    }

    /// Set the completion callback of the current tween
    pub fn set_on_complete(&mut self, callback: impl FnOnce() + 'static) {
        self.on_complete = Some(Box::new(callback));
    }

    /// Freeze a playing tween
    pub fn pause(&mut self) {
        if self.playback == Playback::Playing {
            self.playback = Playback::Paused;
        }
    }

    /// Continue a paused tween
    pub fn resume(&mut self) {
        if self.playback == Playback::Paused {
            self.playback = Playback::Playing;
        }
    }

    /// Abandon the tween where it is; the completion callback is dropped
    pub fn stop(&mut self) {
        self.playback = Playback::Idle;
        self.on_complete = None;
    }

    /// Whether a tween is running or paused
    pub fn is_playing(&self) -> bool {
        self.playback != Playback::Idle
    }

    /// Whether the tween is paused
    pub fn is_paused(&self) -> bool {
        self.playback == Playback::Paused
    }

    /// Linear progress in `0.0..=1.0`
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return if self.is_playing() { 0.0 } else { 1.0 };
        }
        (self.elapsed / self.duration).min(1.0)
    }

    fn capture(target: TweenTarget, ctx: &ComponentContext<'_>) -> TweenTarget {
        let transform = ctx.transform();
        match target {
            TweenTarget::Position(_) => TweenTarget::Position(transform.map_or_else(Vec2::zeros, |t| t.position())),
            TweenTarget::Scale(_) => TweenTarget::Scale(transform.map_or_else(|| Vec2::new(1.0, 1.0), |t| t.scale())),
            TweenTarget::Rotation(_) => TweenTarget::Rotation(transform.map_or(0.0, |t| t.rotation())),
            TweenTarget::Fade(_) => {
                let opacity = ctx
                    .get_component::<SpriteRenderer>()
                    .map(SpriteRenderer::opacity)
                    .or_else(|| ctx.get_component::<Button>().map(Button::opacity))
                    .unwrap_or(1.0);
                TweenTarget::Fade(opacity)
            }
            TweenTarget::Color(_) => {
                let color = ctx
                    .get_component::<SpriteRenderer>()
                    .map(SpriteRenderer::color)
                    .or_else(|| ctx.get_component::<Button>().map(Button::color))
                    .unwrap_or(Color::WHITE);
                TweenTarget::Color(color)
            }
        }
    }

    fn apply(from: TweenTarget, to: TweenTarget, t: f32, ctx: &mut ComponentContext<'_>) {
        match (from, to) {
            (TweenTarget::Position(a), TweenTarget::Position(b)) => {
                if let Some(transform) = ctx.transform_mut() {
                    transform.set_position(a.lerp(&b, t));
                }
            }
            (TweenTarget::Scale(a), TweenTarget::Scale(b)) => {
                if let Some(transform) = ctx.transform_mut() {
                    transform.set_scale(a.lerp(&b, t));
                }
            }
            (TweenTarget::Rotation(a), TweenTarget::Rotation(b)) => {
                if let Some(transform) = ctx.transform_mut() {
                    transform.set_rotation(lerp(a, b, t));
                }
            }
            (TweenTarget::Fade(a), TweenTarget::Fade(b)) => {
                let opacity = lerp(a, b, t);
                if let Some(sprite) = ctx.get_component_mut::<SpriteRenderer>() {
                    sprite.set_opacity(opacity);
                } else if let Some(button) = ctx.get_component_mut::<Button>() {
                    button.set_opacity(opacity);
                }
            }
            (TweenTarget::Color(a), TweenTarget::Color(b)) => {
                let color = a.lerp(b, t);
                if let Some(sprite) = ctx.get_component_mut::<SpriteRenderer>() {
                    sprite.set_color(color);
                } else if let Some(button) = ctx.get_component_mut::<Button>() {
                    button.set_color(color);
                }
            }
            _ => log::error!("Tween start value {:?} does not match target {:?}", from, to),
        }
    }
}

impl Component for Tween {
    fn update(&mut self, ctx: &mut ComponentContext<'_>, delta_time: f32) {
        if self.playback != Playback::Playing {
            return;
        }
        let Some(target) = self.target else {
            self.playback = Playback::Idle;
            return;
        };
        let from = *self.from.get_or_insert_with(|| Self::capture(target, ctx));

        self.elapsed += delta_time;
        if self.elapsed >= self.duration {
            Self::apply(from, target, 1.0, ctx);
            self.playback = Playback::Idle;
            if let Some(callback) = self.on_complete.take() {
                callback();
            }
        } else {
            let t = self.easing.apply(self.elapsed / self.duration);
            Self::apply(from, target, t, ctx);
        }
    }
}

impl fmt::Debug for Tween {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tween")
            .field("target", &self.target)
            .field("duration", &self.duration)
            .field("elapsed", &self.elapsed)
            .field("easing", &self.easing)
            .field("playback", &self.playback)
            .finish_non_exhaustive()
    }
}
