//! Texture sampling configuration and GPU texture handles

use serde::{Deserialize, Serialize};

use crate::foundation::math::Color;
use crate::render::backend::TextureHandle;

/// Texture wrapping modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WrapMode {
    /// Repeat the texture
    #[default]
    Repeat,
    /// Mirror the texture on every repeat
    MirroredRepeat,
    /// Clamp to edge
    ClampToEdge,
    /// Clamp to the configured border color
    ClampToBorder,
}

/// Texture filtering modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FilterMode {
    /// Nearest neighbor filtering
    Nearest,
    /// Linear filtering
    #[default]
    Linear,
    /// Nearest texel from the nearest mip level
    NearestMipmapNearest,
    /// Linear filtering within the nearest mip level
    LinearMipmapNearest,
    /// Nearest texel blended between mip levels
    NearestMipmapLinear,
    /// Trilinear filtering
    LinearMipmapLinear,
}

impl FilterMode {
    /// Whether sampling reads from mip levels
    pub const fn uses_mipmaps(self) -> bool {
        !matches!(self, Self::Nearest | Self::Linear)
    }
}

/// Texture creation parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextureConfig {
    /// Horizontal wrapping
    pub wrap_x: WrapMode,
    /// Vertical wrapping
    pub wrap_y: WrapMode,
    /// Minification filter
    pub min_filter: FilterMode,
    /// Magnification filter
    pub mag_filter: FilterMode,
    /// Color sampled outside the texture with [`WrapMode::ClampToBorder`]
    pub border_color: Color,
    /// Generate mipmaps
    pub generate_mipmaps: bool,
}

impl Default for TextureConfig {
    fn default() -> Self {
        Self {
            wrap_x: WrapMode::Repeat,
            wrap_y: WrapMode::Repeat,
            min_filter: FilterMode::Linear,
            mag_filter: FilterMode::Linear,
            border_color: Color::TRANSPARENT,
            generate_mipmaps: false,
        }
    }
}

impl TextureConfig {
    /// Nearest filtering with clamped edges, suited to pixel art and glyph atlases
    pub fn pixel_art() -> Self {
        Self {
            wrap_x: WrapMode::ClampToEdge,
            wrap_y: WrapMode::ClampToEdge,
            min_filter: FilterMode::Nearest,
            mag_filter: FilterMode::Nearest,
            ..Self::default()
        }
    }
}

/// Texture uploaded to the graphics backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Texture2D {
    handle: TextureHandle,
    width: u32,
    height: u32,
    key: String,
}

impl Texture2D {
    /// Wrap an uploaded texture; `key` is the cache key it was loaded under
    pub fn new(handle: TextureHandle, width: u32, height: u32, key: impl Into<String>) -> Self {
        Self {
            handle,
            width,
            height,
            key: key.into(),
        }
    }

    /// Backend texture handle
    pub const fn handle(&self) -> TextureHandle {
        self.handle
    }

    /// Width in pixels
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Cache key (file path for textures loaded from disk)
    pub fn key(&self) -> &str {
        &self.key
    }
}
