//! Content-hashed mesh cache
//!
//! Meshes are keyed by a hash of their raw vertex bytes. Two different vertex
//! lists that collide share one buffer; there is no secondary equality check.

use std::collections::hash_map::DefaultHasher;
use std::hash::Hasher;
use std::sync::Arc;

use crate::assets::{AssetError, ResourceCache};
use crate::render::{GraphicsBackend, Mesh, Vertex};

/// Hash of the raw bytes of `vertices`
pub fn hash_vertices(vertices: &[Vertex]) -> u64 {
    let mut hasher = DefaultHasher::new();
    hasher.write(bytemuck::cast_slice(vertices));
    hasher.finish()
}

/// Uploads each distinct vertex list once
#[derive(Default)]
pub struct MeshAllocator {
    cache: ResourceCache<u64, Mesh>,
}

impl MeshAllocator {
    /// Create an empty allocator
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the mesh for `vertices`, uploading it on first use
    pub fn get_mesh(&self, vertices: &[Vertex], backend: &mut dyn GraphicsBackend) -> Option<Arc<Mesh>> {
        let hash = hash_vertices(vertices);
        self.cache
            .acquire(hash, || {
                let handle = backend.upload_vertex_buffer(bytemuck::cast_slice(vertices), Vertex::STRIDE)?;
                log::debug!("Mesh {:016x} uploaded as {:?} ({} vertices)", hash, handle, vertices.len());
                #[allow(clippy::cast_possible_truncation)]
                let count = vertices.len() as u32;
                Ok::<_, AssetError>(Mesh::new(handle, count, Vertex::STRIDE, hash))
            })
            .map_err(|e| log::error!("Failed to upload mesh {:016x}: {}", hash, e))
            .ok()
    }

    /// Give back one reference to `mesh`
    pub fn return_mesh(&self, mesh: &Mesh) {
        if self.cache.release(&mesh.content_hash()).is_none() {
            log::warn!("Returned mesh {:016x} is not cached", mesh.content_hash());
        }
    }

    /// Reference count of the mesh built from `vertices`
    pub fn ref_count(&self, vertices: &[Vertex]) -> Option<usize> {
        self.cache.ref_count(&hash_vertices(vertices))
    }

    /// Number of cached meshes
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Whether nothing is cached
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Free every mesh nobody holds a reference to; returns how many were freed
    pub fn release_unused(&self, backend: &mut dyn GraphicsBackend) -> usize {
        let unused = self.cache.release_unused();
        if !unused.is_empty() {
            log::info!("Releasing {} unused meshes", unused.len());
        }
        for (_, mesh) in &unused {
            backend.delete_vertex_buffer(mesh.handle());
        }
        unused.len()
    }

    /// Free every cached mesh
    pub fn release_all(&self, backend: &mut dyn GraphicsBackend) {
        for (_, mesh) in self.cache.drain() {
            backend.delete_vertex_buffer(mesh.handle());
        }
    }
}
