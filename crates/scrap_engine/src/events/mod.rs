//! Event primitives
//!
//! UI-style components expose [`Signal`]s (hover, click, release) that game
//! code subscribes to. Connecting returns a [`Subscription`] token; dropping
//! the token disconnects the callback.

mod signal;

pub use signal::{Signal, Subscription, SubscriptionId};
