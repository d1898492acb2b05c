//! Asset loading and GPU resource caches
//!
//! Textures and meshes are shared through reference-counted caches. Getting a
//! resource either bumps the count of a cached entry or creates and uploads a
//! new one; returning it only lowers the count. Zero-count entries stay alive
//! until `release_unused` sweeps them and frees their backend resources.

mod cache;
mod image;
mod mesh_allocator;
mod texture_allocator;

pub use self::cache::ResourceCache;
pub use self::image::ImageData;
pub use self::mesh_allocator::{hash_vertices, MeshAllocator};
pub use self::texture_allocator::{TextureAllocator, BLANK_TEXTURE_KEY};

use thiserror::Error;

use crate::render::RenderError;

/// Asset loading errors
#[derive(Error, Debug)]
pub enum AssetError {
    /// The file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The file could not be decoded as an image
    #[error("Image decode error: {0}")]
    Image(#[from] ::image::ImageError),

    /// The decoded data could not be uploaded
    #[error("Upload failed: {0}")]
    Upload(#[from] RenderError),
}
