//! Recording graphics backend
//!
//! Allocates handles and records every call instead of talking to a GPU.
//! Tests inspect the call log to check draw order and resource lifetimes.

use std::any::Any;
use std::collections::HashMap;

use crate::assets::ImageData;
use crate::foundation::math::{Color, Mat4};
use crate::render::backend::{BackendResult, GraphicsBackend, TextureHandle, VertexBufferHandle};
use crate::render::{RenderError, TextureConfig};

/// One recorded backend call
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum BackendCall {
    UploadVertexBuffer { handle: VertexBufferHandle, bytes: usize, stride: u32 },
    DeleteVertexBuffer(VertexBufferHandle),
    UploadImage { handle: TextureHandle, width: u32, height: u32 },
    DeleteTexture(TextureHandle),
    SetViewport { x: i32, y: i32, width: u32, height: u32 },
    SetClearColor(Color),
    Clear,
    SetViewProjection(Mat4),
    BindVertexBuffer(VertexBufferHandle),
    BindTexture(TextureHandle),
    UnbindTexture,
    SetTint(Color),
    SetModelMatrix(Mat4),
    DrawArrays { first: u32, count: u32 },
}

/// Graphics backend that records calls in memory
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    next_handle: u64,
    calls: Vec<BackendCall>,
    vertex_buffers: HashMap<VertexBufferHandle, usize>,
    textures: HashMap<TextureHandle, (u32, u32)>,
    bound_vertex_buffer: Option<VertexBufferHandle>,
}

impl HeadlessBackend {
    /// Create an empty backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call recorded so far
    pub fn calls(&self) -> &[BackendCall] {
        &self.calls
    }

    /// Forget the recorded calls, keeping live resources
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Vertex buffers bound right before each draw, in issue order
    pub fn drawn_buffers(&self) -> Vec<VertexBufferHandle> {
        let mut bound = None;
        let mut drawn = Vec::new();
        for call in &self.calls {
            match call {
                BackendCall::BindVertexBuffer(handle) => bound = Some(*handle),
                BackendCall::DrawArrays { .. } => drawn.extend(bound),
                _ => {}
            }
        }
        drawn
    }

    /// Number of draw calls recorded
    pub fn draw_call_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, BackendCall::DrawArrays { .. }))
            .count()
    }

    /// Whether a texture handle is currently allocated
    pub fn has_texture(&self, handle: TextureHandle) -> bool {
        self.textures.contains_key(&handle)
    }

    /// Number of allocated textures
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Number of allocated vertex buffers
    pub fn vertex_buffer_count(&self) -> usize {
        self.vertex_buffers.len()
    }

    fn allocate(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }
}

impl GraphicsBackend for HeadlessBackend {
    fn upload_vertex_buffer(&mut self, data: &[u8], stride: u32) -> BackendResult<VertexBufferHandle> {
        if stride == 0 || data.len() % stride as usize != 0 {
            return Err(RenderError::UploadFailed(format!(
                "{} bytes is not a whole number of {stride}-byte vertices",
                data.len()
            )));
        }
        let handle = VertexBufferHandle(self.allocate());
        self.vertex_buffers.insert(handle, data.len());
        self.calls.push(BackendCall::UploadVertexBuffer { handle, bytes: data.len(), stride });
        Ok(handle)
    }

    fn delete_vertex_buffer(&mut self, handle: VertexBufferHandle) {
        if self.vertex_buffers.remove(&handle).is_none() {
            log::warn!("Deleting unknown vertex buffer {:?}", handle);
        }
        self.calls.push(BackendCall::DeleteVertexBuffer(handle));
    }

    fn upload_image(&mut self, image: &ImageData, _config: &TextureConfig) -> BackendResult<TextureHandle> {
        if image.width == 0 || image.height == 0 {
            return Err(RenderError::UploadFailed("image has no pixels".to_string()));
        }
        let handle = TextureHandle(self.allocate());
        self.textures.insert(handle, (image.width, image.height));
        self.calls.push(BackendCall::UploadImage {
            handle,
            width: image.width,
            height: image.height,
        });
        Ok(handle)
    }

    fn delete_texture(&mut self, handle: TextureHandle) {
        if self.textures.remove(&handle).is_none() {
            log::warn!("Deleting unknown texture {:?}", handle);
        }
        self.calls.push(BackendCall::DeleteTexture(handle));
    }

    fn set_viewport(&mut self, x: i32, y: i32, width: u32, height: u32) {
        self.calls.push(BackendCall::SetViewport { x, y, width, height });
    }

    fn set_clear_color(&mut self, color: Color) {
        self.calls.push(BackendCall::SetClearColor(color));
    }

    fn clear(&mut self) {
        self.calls.push(BackendCall::Clear);
    }

    fn set_view_projection(&mut self, view_projection: &Mat4) {
        self.calls.push(BackendCall::SetViewProjection(*view_projection));
    }

    fn bind_vertex_buffer(&mut self, handle: VertexBufferHandle, _stride: u32) {
        self.bound_vertex_buffer = Some(handle);
        self.calls.push(BackendCall::BindVertexBuffer(handle));
    }

    fn bind_texture(&mut self, handle: TextureHandle) {
        self.calls.push(BackendCall::BindTexture(handle));
    }

    fn unbind_texture(&mut self) {
        self.calls.push(BackendCall::UnbindTexture);
    }

    fn set_tint(&mut self, tint: Color) {
        self.calls.push(BackendCall::SetTint(tint));
    }

    fn set_model_matrix(&mut self, model: &Mat4) {
        self.calls.push(BackendCall::SetModelMatrix(*model));
    }

    fn draw_arrays(&mut self, first: u32, count: u32) {
        if self.bound_vertex_buffer.is_none() {
            log::warn!("draw_arrays with no vertex buffer bound");
        }
        self.calls.push(BackendCall::DrawArrays { first, count });
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
