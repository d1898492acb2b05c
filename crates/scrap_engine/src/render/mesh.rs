//! Vertex layout and GPU mesh handles

use bytemuck::{Pod, Zeroable};

use crate::foundation::math::Vec2;
use crate::render::backend::VertexBufferHandle;

/// Interleaved position + texture coordinate vertex
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Vertex {
    /// Position in model space
    pub position: [f32; 3],
    /// Texture coordinate
    pub uv: [f32; 2],
}

impl Vertex {
    /// Size of one vertex in bytes
    #[allow(clippy::cast_possible_truncation)]
    pub const STRIDE: u32 = std::mem::size_of::<Self>() as u32;

    /// Create a vertex from its components
    pub const fn new(x: f32, y: f32, z: f32, u: f32, v: f32) -> Self {
        Self {
            position: [x, y, z],
            uv: [u, v],
        }
    }
}

/// Two-triangle quad with unit size
///
/// `pivot` is the point of the quad that sits on the origin, in quad-relative
/// units: (0.5, 0.5) centers it, (0, 0) puts the bottom-left corner on the
/// origin.
pub fn quad_vertices(pivot: Vec2) -> [Vertex; 6] {
    let left = -pivot.x;
    let right = 1.0 - pivot.x;
    let bottom = -pivot.y;
    let top = 1.0 - pivot.y;
    [
        Vertex::new(left, bottom, 0.0, 0.0, 1.0),
        Vertex::new(right, bottom, 0.0, 1.0, 1.0),
        Vertex::new(right, top, 0.0, 1.0, 0.0),
        Vertex::new(left, bottom, 0.0, 0.0, 1.0),
        Vertex::new(right, top, 0.0, 1.0, 0.0),
        Vertex::new(left, top, 0.0, 0.0, 0.0),
    ]
}

/// Vertex buffer uploaded to the graphics backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mesh {
    handle: VertexBufferHandle,
    vertex_count: u32,
    stride: u32,
    content_hash: u64,
}

impl Mesh {
    /// Wrap an uploaded vertex buffer
    pub const fn new(handle: VertexBufferHandle, vertex_count: u32, stride: u32, content_hash: u64) -> Self {
        Self {
            handle,
            vertex_count,
            stride,
            content_hash,
        }
    }

    /// Backend buffer handle
    pub const fn handle(&self) -> VertexBufferHandle {
        self.handle
    }

    /// Number of vertices to draw
    pub const fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    /// Vertex stride in bytes
    pub const fn stride(&self) -> u32 {
        self.stride
    }

    /// Hash of the vertex data this mesh was built from
    pub const fn content_hash(&self) -> u64 {
        self.content_hash
    }
}
