//! Backend abstraction trait for the rendering system
//!
//! A backend owns GPU-side resources and executes the immediate-mode calls the
//! [`Renderer`](super::Renderer) issues when it flushes a frame.

use std::any::Any;

use crate::assets::ImageData;
use crate::foundation::math::{Color, Mat4};
use crate::render::{RenderError, TextureConfig};

/// Result type for backend operations
pub type BackendResult<T> = Result<T, RenderError>;

/// Handle to a vertex buffer stored in the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexBufferHandle(pub u64);

/// Handle to a texture stored in the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureHandle(pub u64);

/// Graphics backend trait
pub trait GraphicsBackend {
    /// Upload interleaved vertex data
    fn upload_vertex_buffer(&mut self, data: &[u8], stride: u32) -> BackendResult<VertexBufferHandle>;

    /// Free a vertex buffer
    fn delete_vertex_buffer(&mut self, handle: VertexBufferHandle);

    /// Upload an RGBA8 image
    fn upload_image(&mut self, image: &ImageData, config: &TextureConfig) -> BackendResult<TextureHandle>;

    /// Free a texture
    fn delete_texture(&mut self, handle: TextureHandle);

    /// Set the drawable region in pixels
    fn set_viewport(&mut self, x: i32, y: i32, width: u32, height: u32);

    /// Set the color used by [`GraphicsBackend::clear`]
    fn set_clear_color(&mut self, color: Color);

    /// Clear the framebuffer
    fn clear(&mut self);

    /// Set the view-projection used by subsequent draws
    fn set_view_projection(&mut self, view_projection: &Mat4);

    /// Bind a vertex buffer for subsequent draws
    fn bind_vertex_buffer(&mut self, handle: VertexBufferHandle, stride: u32);

    /// Bind a texture for subsequent draws
    fn bind_texture(&mut self, handle: TextureHandle);

    /// Unbind the current texture
    fn unbind_texture(&mut self);

    /// Set the tint multiplied into subsequent draws
    fn set_tint(&mut self, tint: Color);

    /// Set the model matrix of subsequent draws
    fn set_model_matrix(&mut self, model: &Mat4);

    /// Draw `count` vertices of the bound buffer starting at `first`
    fn draw_arrays(&mut self, first: u32, count: u32);

    /// Downcast to concrete backend type
    fn as_any(&self) -> &dyn Any;

    /// Downcast to mutable concrete backend type
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
