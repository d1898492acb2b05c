//! Rendering system
//!
//! Components submit [`DrawCommand`]s to the [`Renderer`] during the render
//! pass. Nothing reaches the [`GraphicsBackend`] until [`Renderer::end_frame`],
//! which replays the buffered commands in submission order.

pub mod backend;
pub mod camera;
pub mod commands;
pub mod headless;
pub mod mesh;
pub mod renderer;
pub mod text;
pub mod texture;

pub use backend::{BackendResult, GraphicsBackend, TextureHandle, VertexBufferHandle};
pub use camera::Camera;
pub use commands::DrawCommand;
pub use headless::{BackendCall, HeadlessBackend};
pub use mesh::{Mesh, Vertex};
pub use renderer::{FrameStats, Renderer, RendererState};
pub use text::{FontBackend, FontBitmap, FontError, GlyphMetrics};
pub use texture::{FilterMode, Texture2D, TextureConfig, WrapMode};

use thiserror::Error;

/// Rendering errors
#[derive(Error, Debug)]
pub enum RenderError {
    /// The backend could not create a resource
    #[error("Resource upload failed: {0}")]
    UploadFailed(String),

    /// A handle does not refer to a live backend resource
    #[error("Invalid handle: {0}")]
    InvalidHandle(u64),

    /// The graphics backend could not be created
    #[error("Graphics backend unavailable: {0}")]
    BackendUnavailable(String),
}
