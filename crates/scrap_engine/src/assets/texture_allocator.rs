//! Path-keyed texture cache

use std::sync::Arc;

use crate::assets::{AssetError, ImageData, ResourceCache};
use crate::render::{GraphicsBackend, Texture2D, TextureConfig};

/// Cache key of the 1x1 white texture
pub const BLANK_TEXTURE_KEY: &str = "::blank";

/// Loads textures from disk once and shares them by path
#[derive(Default)]
pub struct TextureAllocator {
    cache: ResourceCache<String, Texture2D>,
}

impl TextureAllocator {
    /// Create an empty allocator
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the texture stored at `path`, loading and uploading it on first use
    ///
    /// Load and upload failures are logged and yield `None`.
    pub fn get_texture(
        &self,
        path: &str,
        config: &TextureConfig,
        backend: &mut dyn GraphicsBackend,
    ) -> Option<Arc<Texture2D>> {
        let result = self.cache.acquire(path.to_string(), || {
            let image = ImageData::from_file(path)?;
            let handle = backend.upload_image(&image, config)?;
            log::info!("Texture '{}' uploaded as {:?}", path, handle);
            Ok::<_, AssetError>(Texture2D::new(handle, image.width, image.height, path))
        });

        result
            .map_err(|e| log::error!("Failed to load texture '{}': {}", path, e))
            .ok()
    }

    /// Get the texture cached under `key`, uploading `image` on first use
    pub fn get_texture_from_image(
        &self,
        key: &str,
        image: &ImageData,
        config: &TextureConfig,
        backend: &mut dyn GraphicsBackend,
    ) -> Option<Arc<Texture2D>> {
        self.cache
            .acquire(key.to_string(), || {
                let handle = backend.upload_image(image, config)?;
                Ok::<_, AssetError>(Texture2D::new(handle, image.width, image.height, key))
            })
            .map_err(|e| log::error!("Failed to upload texture '{}': {}", key, e))
            .ok()
    }

    /// Shared 1x1 white texture
    pub fn blank_texture(&self, backend: &mut dyn GraphicsBackend) -> Option<Arc<Texture2D>> {
        let image = ImageData::solid_color(1, 1, [255, 255, 255, 255]);
        self.get_texture_from_image(BLANK_TEXTURE_KEY, &image, &TextureConfig::pixel_art(), backend)
    }

    /// Give back one reference to `texture`
    pub fn return_texture(&self, texture: &Texture2D) {
        if self.cache.release(&texture.key().to_string()).is_none() {
            log::warn!("Returned texture '{}' is not cached", texture.key());
        }
    }

    /// Reference count of the texture cached under `key`
    pub fn ref_count(&self, key: &str) -> Option<usize> {
        self.cache.ref_count(&key.to_string())
    }

    /// Number of cached textures
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Whether nothing is cached
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Free every texture nobody holds a reference to; returns how many were freed
    pub fn release_unused(&self, backend: &mut dyn GraphicsBackend) -> usize {
        let unused = self.cache.release_unused();
        for (key, texture) in &unused {
            log::info!("Releasing unused texture: {}", key);
            backend.delete_texture(texture.handle());
        }
        unused.len()
    }

    /// Free every cached texture
    pub fn release_all(&self, backend: &mut dyn GraphicsBackend) {
        for (key, texture) in self.cache.drain() {
            log::debug!("Releasing texture: {}", key);
            backend.delete_texture(texture.handle());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::HeadlessBackend;
    use std::path::PathBuf;

    fn write_png(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("scrap_engine_{}_{name}.png", std::process::id()));
        image::RgbaImage::from_pixel(2, 2, image::Rgba([255, 0, 0, 255]))
            .save(&path)
            .unwrap();
        path
    }

    #[test]
    fn test_texture_refcount_and_sweep() {
        let path = write_png("refcount");
        let key = path.to_str().unwrap();
        let allocator = TextureAllocator::new();
        let mut backend = HeadlessBackend::new();
        let config = TextureConfig::default();

        let first = allocator.get_texture(key, &config, &mut backend).unwrap();
        let second = allocator.get_texture(key, &config, &mut backend).unwrap();
        assert_eq!(first.handle(), second.handle());
        assert_eq!(allocator.ref_count(key), Some(2));
        assert_eq!(backend.texture_count(), 1);

        allocator.return_texture(&first);
        allocator.return_texture(&second);
        assert_eq!(allocator.ref_count(key), Some(0));
        assert!(backend.has_texture(first.handle()));

        assert_eq!(allocator.release_unused(&mut backend), 1);
        assert!(!backend.has_texture(first.handle()));
        assert_eq!(allocator.ref_count(key), None);

        let third = allocator.get_texture(key, &config, &mut backend).unwrap();
        assert_ne!(third.handle(), first.handle());
        assert_eq!((third.width(), third.height()), (2, 2));

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_missing_texture_returns_none() {
        let allocator = TextureAllocator::new();
        let mut backend = HeadlessBackend::new();
        let texture = allocator.get_texture("missing/texture.png", &TextureConfig::default(), &mut backend);

        assert!(texture.is_none());
        assert!(allocator.is_empty());
        assert_eq!(backend.texture_count(), 0);
    }

    #[test]
    fn test_blank_texture_is_shared() {
        let allocator = TextureAllocator::new();
        let mut backend = HeadlessBackend::new();
        let a = allocator.blank_texture(&mut backend).unwrap();
        let b = allocator.blank_texture(&mut backend).unwrap();

        assert_eq!(a.handle(), b.handle());
        assert_eq!(allocator.ref_count(BLANK_TEXTURE_KEY), Some(2));

        allocator.release_all(&mut backend);
        assert_eq!(backend.texture_count(), 0);
    }
}
