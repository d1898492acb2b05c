//! # Engine Configuration
//!
//! Serializable configuration for every engine subsystem. All sections carry
//! defaults, so a config file only needs the values it changes:
//!
//! ```toml
//! [window]
//! title = "Scrap"
//! width = 1024
//!
//! [timing]
//! target_frame_rate = 60
//! pacing = "Sleep"
//! ```

use serde::{Deserialize, Serialize};

use crate::foundation::{math::Color, time::PacingMode};

pub use crate::config::{Config, ConfigError};

/// Top-level engine configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Window configuration
    pub window: WindowConfig,

    /// Renderer configuration
    pub renderer: RendererConfig,

    /// Camera configuration
    pub camera: CameraConfig,

    /// Frame timing configuration
    pub timing: TimingConfig,
}

impl Config for EngineConfig {}

impl EngineConfig {
    /// Reject values the engine cannot start with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size must be non-zero, got {}x{}",
                self.window.width, self.window.height
            )));
        }
        if self.camera.ortho_size <= 0.0 || !self.camera.ortho_size.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "camera ortho_size must be positive, got {}",
                self.camera.ortho_size
            )));
        }
        Ok(())
    }

    /// Builder-style window title override
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.window.title = title.into();
        self
    }

    /// Builder-style window size override
    #[must_use]
    pub const fn with_size(mut self, width: u32, height: u32) -> Self {
        self.window.width = width;
        self.window.height = height;
        self
    }

    /// Builder-style frame rate cap override (0 means uncapped)
    #[must_use]
    pub const fn with_target_frame_rate(mut self, frames_per_second: u32) -> Self {
        self.timing.target_frame_rate = frames_per_second;
        self
    }
}

/// Window configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window title
    pub title: String,

    /// Window width in pixels
    pub width: u32,

    /// Window height in pixels
    pub height: u32,

    /// Whether window is resizable
    pub resizable: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Scrap Engine".to_string(),
            width: 800,
            height: 600,
            resizable: true,
        }
    }
}

/// Renderer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Color the framebuffer is cleared to at the start of each frame
    pub clear_color: Color,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            clear_color: Color::rgb(0.1, 0.1, 0.12),
        }
    }
}

/// Orthographic camera configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Half of the visible world height
    pub ortho_size: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self { ortho_size: 5.0 }
    }
}

/// Frame timing configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Frame rate cap, 0 for uncapped
    pub target_frame_rate: u32,

    /// How the loop waits out the rest of a frame
    pub pacing: PacingMode,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            target_frame_rate: 60,
            pacing: PacingMode::Spin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("scrap_engine_{}_{name}", std::process::id()))
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_sized_window_rejected() {
        let config = EngineConfig::default().with_size(0, 600);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let path = temp_path("partial.toml");
        std::fs::write(&path, "[window]\ntitle = \"Partial\"\n\n[timing]\ntarget_frame_rate = 30\n").unwrap();

        let config = EngineConfig::load_from_file(&path).unwrap();
        assert_eq!(config.window.title, "Partial");
        assert_eq!(config.window.width, 800);
        assert_eq!(config.timing.target_frame_rate, 30);
        assert_eq!(config.timing.pacing, PacingMode::Spin);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_ron_save_and_load() {
        let path = temp_path("engine.ron");
        let config = EngineConfig::default().with_title("Ron").with_target_frame_rate(0);
        config.save_to_file(&path).unwrap();

        let loaded = EngineConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_unknown_extension_rejected() {
        let result = EngineConfig::load_from_file(temp_path("engine.ini"));
        // Missing file is reported before the format check
        assert!(result.is_err());
        assert!(matches!(
            EngineConfig::default().save_to_file(temp_path("engine.ini")),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }
}
