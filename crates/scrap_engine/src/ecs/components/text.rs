//! Single-string text rendering

use std::path::PathBuf;
use std::sync::Arc;

use crate::ecs::{Component, ComponentContext};
use crate::foundation::math::Color;
use crate::render::{DrawCommand, FontBitmap, FontError, Mesh, Texture2D, TextureConfig};

/// First character of the rasterized range
const FIRST_CHAR: char = ' ';
/// Number of rasterized characters: printable ASCII
const CHAR_COUNT: u32 = 95;

/// Draws a string at the owning entity's world transform
///
/// The font is rasterized once through the engine's
/// [`FontBackend`](crate::render::FontBackend); its glyph metrics and atlas
/// texture are shared through the engine caches under a key naming the font
/// file and pixel size. The string becomes one mesh that is rebuilt only when
/// the text changes.
#[derive(Debug)]
pub struct Text {
    text: String,
    font_path: Option<PathBuf>,
    pixel_size: f32,
    scale: f32,
    color: Color,
    font_key: Option<String>,
    bitmap: Option<Arc<FontBitmap>>,
    atlas: Option<Arc<Texture2D>>,
    mesh: Option<Arc<Mesh>>,
    font_dirty: bool,
    mesh_dirty: bool,
}

impl Default for Text {
    fn default() -> Self {
        Self {
            text: String::new(),
            font_path: None,
            pixel_size: 48.0,
            scale: 1.0 / 48.0,
            color: Color::WHITE,
            font_key: None,
            bitmap: None,
            atlas: None,
            mesh: None,
            font_dirty: false,
            mesh_dirty: true,
        }
    }
}

impl Text {
    /// Text drawn with the font at `font_path`
    pub fn new(text: impl Into<String>, font_path: impl Into<PathBuf>) -> Self {
        let mut component = Self::default();
        component.set_text(text);
        component.set_font(font_path, 48.0);
        component
    }

    /// Cache key of the atlas for `path` rasterized at `pixel_size`
    pub fn atlas_key(path: &std::path::Path, pixel_size: f32) -> String {
        format!("font:{}@{}", path.display(), pixel_size)
    }

    /// Displayed string
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the displayed string
    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text != self.text {
            self.text = text;
            self.mesh_dirty = true;
        }
    }

    /// Use the font at `path`, rasterized at `pixel_size`
    pub fn set_font(&mut self, path: impl Into<PathBuf>, pixel_size: f32) {
        self.font_path = Some(path.into());
        self.pixel_size = pixel_size.max(1.0);
        self.font_dirty = true;
        self.mesh_dirty = true;
    }

    /// World units per font pixel
    pub const fn scale(&self) -> f32 {
        self.scale
    }

    /// Set the world units per font pixel
    pub fn set_scale(&mut self, scale: f32) {
        if (scale - self.scale).abs() > f32::EPSILON {
            self.scale = scale;
            self.mesh_dirty = true;
        }
    }

    /// Text color
    pub const fn color(&self) -> Color {
        self.color
    }

    /// Set the text color
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    /// Give the glyph metrics and atlas back to the engine caches
    fn release_font(&mut self, ctx: &mut ComponentContext<'_>) {
        if let Some(atlas) = self.atlas.take() {
            ctx.engine.textures.return_texture(&atlas);
        }
        if let Some(key) = self.font_key.take() {
            ctx.engine.font_bitmaps.release(&key);
        }
        self.bitmap = None;
    }

    fn load_font(&mut self, ctx: &mut ComponentContext<'_>) {
        self.font_dirty = false;
        self.release_font(ctx);

        let Some(path) = &self.font_path else {
            return;
        };
        let key = Self::atlas_key(path, self.pixel_size);
        let pixel_size = self.pixel_size;
        let engine = &mut *ctx.engine;

        // Only a miss in the glyph cache reaches the rasterizer
        let bitmap = engine
            .font_bitmaps
            .acquire(key.clone(), || match engine.fonts.as_deref_mut() {
                Some(fonts) => fonts.rasterize(path, pixel_size, FIRST_CHAR, CHAR_COUNT),
                None => Err(FontError::NoBackend),
            });
        let bitmap = match bitmap {
            Ok(bitmap) => bitmap,
            Err(e) => {
                log::error!("Failed to load font {}: {}", path.display(), e);
                return;
            }
        };

        self.atlas = engine.textures.get_texture_from_image(
            &key,
            &bitmap.to_image(),
            &TextureConfig::default(),
            engine.renderer.backend_mut(),
        );
        self.font_key = Some(key);
        self.bitmap = Some(bitmap);
    }

    fn rebuild_mesh(&mut self, ctx: &mut ComponentContext<'_>) {
        self.mesh_dirty = false;
        if let Some(old) = self.mesh.take() {
            ctx.engine.meshes.return_mesh(&old);
        }
        let Some(bitmap) = &self.bitmap else {
            return;
        };
        let vertices = bitmap.layout(&self.text, self.scale);
        if !vertices.is_empty() {
            self.mesh = ctx.engine.load_mesh(&vertices);
        }
    }
}

impl Component for Text {
    fn render(&mut self, ctx: &mut ComponentContext<'_>) {
        if self.font_dirty {
            self.load_font(ctx);
        }
        if self.mesh_dirty {
            self.rebuild_mesh(ctx);
        }
        let (Some(mesh), Some(atlas)) = (&self.mesh, &self.atlas) else {
            return;
        };

        let command = DrawCommand::new(mesh)
            .with_texture(atlas)
            .with_tint(self.color)
            .with_position(ctx.world_position())
            .with_rotation(ctx.world_rotation())
            .with_scale(ctx.world_scale());
        ctx.engine.renderer.submit(command);
    }

    fn on_destroy(&mut self, ctx: &mut ComponentContext<'_>) {
        if let Some(mesh) = self.mesh.take() {
            ctx.engine.meshes.return_mesh(&mesh);
        }
        self.release_font(ctx);
    }
}
