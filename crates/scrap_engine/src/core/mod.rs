//! # Core Engine Module
//!
//! Configuration shared by every subsystem and the [`EngineContext`] that
//! carries the engine services components and scenes work against.

pub mod config;
pub mod context;

pub use config::{CameraConfig, Config, ConfigError, EngineConfig, RendererConfig, TimingConfig, WindowConfig};
pub use context::EngineContext;
