//! Draw command definitions
//!
//! A [`DrawCommand`] is a fully parameterised request to draw one mesh. It is
//! built during the render pass, composed by [`Renderer::submit`] and consumed
//! by [`Renderer::end_frame`] in the same frame.
//!
//! [`Renderer::submit`]: super::Renderer::submit
//! [`Renderer::end_frame`]: super::Renderer::end_frame

use crate::foundation::math::{model_matrix, Color, Mat4, Vec2, Vec3};
use crate::render::backend::{TextureHandle, VertexBufferHandle};
use crate::render::mesh::Mesh;
use crate::render::texture::Texture2D;

/// One buffered draw request
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCommand {
    /// Vertex buffer to draw
    pub mesh: VertexBufferHandle,
    /// Size of one vertex in bytes
    pub vertex_stride: u32,
    /// Number of vertices to draw
    pub vertex_count: u32,
    /// Texture to sample, `None` for untextured draws
    pub texture: Option<TextureHandle>,
    /// Color multiplied into the output
    pub tint: Color,
    /// World-space translation
    pub translation: Vec3,
    /// Rotation about Z in degrees
    pub rotation_z: f32,
    /// Per-axis scale
    pub scale: Vec3,
    model_matrix: Mat4,
}

impl DrawCommand {
    /// Draw the whole of `mesh` untextured with an identity transform
    pub fn new(mesh: &Mesh) -> Self {
        Self::from_raw(mesh.handle(), mesh.stride(), mesh.vertex_count())
    }

    /// Draw `vertex_count` vertices of a raw buffer handle
    pub fn from_raw(mesh: VertexBufferHandle, vertex_stride: u32, vertex_count: u32) -> Self {
        Self {
            mesh,
            vertex_stride,
            vertex_count,
            texture: None,
            tint: Color::WHITE,
            translation: Vec3::zeros(),
            rotation_z: 0.0,
            scale: Vec3::new(1.0, 1.0, 1.0),
            model_matrix: Mat4::identity(),
        }
    }

    /// Sample `texture`
    #[must_use]
    pub fn with_texture(mut self, texture: &Texture2D) -> Self {
        self.texture = Some(texture.handle());
        self
    }

    /// Multiply output by `tint`
    #[must_use]
    pub const fn with_tint(mut self, tint: Color) -> Self {
        self.tint = tint;
        self
    }

    /// Place the mesh at a 2D position on the z = 0 plane
    #[must_use]
    pub fn with_position(mut self, position: Vec2) -> Self {
        self.translation = Vec3::new(position.x, position.y, 0.0);
        self
    }

    /// Rotate about Z by `degrees`
    #[must_use]
    pub const fn with_rotation(mut self, degrees: f32) -> Self {
        self.rotation_z = degrees;
        self
    }

    /// Scale X and Y
    #[must_use]
    pub fn with_scale(mut self, scale: Vec2) -> Self {
        self.scale = Vec3::new(scale.x, scale.y, 1.0);
        self
    }

    /// Model matrix computed at submission; identity before that
    pub const fn model_matrix(&self) -> &Mat4 {
        &self.model_matrix
    }

    /// Build the model matrix from the transform fields
    pub(crate) fn compose(&mut self) {
        self.model_matrix = model_matrix(&self.translation, self.rotation_z, &self.scale);
    }
}
