//! Textured or flat-colored quad

use std::sync::Arc;

use crate::ecs::{Component, ComponentContext};
use crate::foundation::math::{Color, Vec2};
use crate::render::mesh::quad_vertices;
use crate::render::{DrawCommand, Mesh, Texture2D, TextureConfig};

/// Draws a quad at the owning entity's world transform
///
/// The quad is `size` world units large before the entity's scale applies,
/// and `pivot` picks the point of the quad that sits on the entity's
/// position. Quads with the same pivot share one mesh.
#[derive(Debug)]
pub struct SpriteRenderer {
    color: Color,
    opacity: f32,
    size: Vec2,
    pivot: Vec2,
    texture_path: Option<String>,
    texture_config: TextureConfig,
    texture: Option<Arc<Texture2D>>,
    mesh: Option<Arc<Mesh>>,
    texture_dirty: bool,
    mesh_dirty: bool,
}

impl Default for SpriteRenderer {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            opacity: 1.0,
            size: Vec2::new(1.0, 1.0),
            pivot: Vec2::new(0.5, 0.5),
            texture_path: None,
            texture_config: TextureConfig::default(),
            texture: None,
            mesh: None,
            texture_dirty: false,
            mesh_dirty: true,
        }
    }
}

impl SpriteRenderer {
    /// White, opaque, 1x1, centered, untextured
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the color at construction
    #[must_use]
    pub const fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Set the size at construction
    #[must_use]
    pub const fn with_size(mut self, size: Vec2) -> Self {
        self.size = size;
        self
    }

    /// Load a texture from `path` when the component wakes up
    #[must_use]
    pub fn with_texture(mut self, path: impl Into<String>, config: TextureConfig) -> Self {
        self.set_texture(path, config);
        self
    }

    /// Color multiplied into the quad; alpha is ignored, see [`SpriteRenderer::set_opacity`]
    pub const fn color(&self) -> Color {
        self.color
    }

    /// Set the quad color
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    /// Opacity in `0.0..=1.0`
    pub const fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Set the opacity, clamped to `0.0..=1.0`
    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }

    /// Quad size in world units
    pub const fn size(&self) -> Vec2 {
        self.size
    }

    /// Set the quad size
    pub fn set_size(&mut self, size: Vec2) {
        self.size = size;
    }

    /// Pivot in quad-relative units
    pub const fn pivot(&self) -> Vec2 {
        self.pivot
    }

    /// Set the pivot; the mesh is rebuilt on the next render
    pub fn set_pivot(&mut self, pivot: Vec2) {
        if pivot != self.pivot {
            self.pivot = pivot;
            self.mesh_dirty = true;
        }
    }

    /// Texture file drawn on the quad
    pub fn texture_path(&self) -> Option<&str> {
        self.texture_path.as_deref()
    }

    /// Texture currently bound, once loaded
    pub fn texture(&self) -> Option<&Arc<Texture2D>> {
        self.texture.as_ref()
    }

    /// Draw the texture at `path`; it is loaded on the next render
    pub fn set_texture(&mut self, path: impl Into<String>, config: TextureConfig) {
        self.texture_path = Some(path.into());
        self.texture_config = config;
        self.texture_dirty = true;
    }

    /// Draw untextured
    pub fn clear_texture(&mut self) {
        self.texture_path = None;
        self.texture_dirty = true;
    }

    fn refresh_resources(&mut self, ctx: &mut ComponentContext<'_>) {
        if self.mesh_dirty {
            if let Some(old) = self.mesh.take() {
                ctx.engine.meshes.return_mesh(&old);
            }
            self.mesh = ctx.engine.load_mesh(&quad_vertices(self.pivot));
            self.mesh_dirty = false;
        }

        if self.texture_dirty {
            if let Some(old) = self.texture.take() {
                ctx.engine.textures.return_texture(&old);
            }
            if let Some(path) = &self.texture_path {
                self.texture = ctx.engine.load_texture(path, &self.texture_config);
            }
            self.texture_dirty = false;
        }
    }
}

impl Component for SpriteRenderer {
    fn awake(&mut self, ctx: &mut ComponentContext<'_>) {
        self.refresh_resources(ctx);
    }

    fn render(&mut self, ctx: &mut ComponentContext<'_>) {
        self.refresh_resources(ctx);
        let Some(mesh) = &self.mesh else {
            return;
        };

        let mut command = DrawCommand::new(mesh)
            .with_tint(self.color.with_alpha(self.opacity))
            .with_position(ctx.world_position())
            .with_rotation(ctx.world_rotation())
            .with_scale(ctx.world_scale().component_mul(&self.size));
        if let Some(texture) = &self.texture {
            command = command.with_texture(texture);
        }
        ctx.engine.renderer.submit(command);
    }

    fn on_destroy(&mut self, ctx: &mut ComponentContext<'_>) {
        if let Some(mesh) = self.mesh.take() {
            ctx.engine.meshes.return_mesh(&mesh);
        }
        if let Some(texture) = self.texture.take() {
            ctx.engine.textures.return_texture(&texture);
        }
    }
}
