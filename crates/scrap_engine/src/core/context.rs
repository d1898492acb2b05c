//! Engine services shared by scenes and components
//!
//! One [`EngineContext`] is owned by the [`Engine`](crate::Engine) and lent to
//! every scene hook and component hook, so rendering, input, resource caches
//! and the scheduler are reached through an explicit reference instead of
//! global state.

use std::sync::Arc;

use crate::assets::{MeshAllocator, ResourceCache, TextureAllocator};
use crate::audio::AudioBackend;
use crate::core::config::EngineConfig;
use crate::ecs::Scheduler;
use crate::foundation::time::Timer;
use crate::input::InputState;
use crate::render::{Camera, FontBackend, FontBitmap, GraphicsBackend, HeadlessBackend, Mesh, Renderer, Texture2D, TextureConfig, Vertex};

/// Renderer, camera, input, resource caches and scheduler of a running engine
pub struct EngineContext {
    /// Deferred draw-command renderer
    pub renderer: Renderer,
    /// Camera used for the next frame
    pub camera: Camera,
    /// Key and mouse snapshot of the current frame
    pub input: InputState,
    /// Texture cache
    pub textures: TextureAllocator,
    /// Mesh cache
    pub meshes: MeshAllocator,
    /// Rasterized glyph ranges, keyed like their atlas textures
    pub font_bitmaps: ResourceCache<String, FontBitmap>,
    /// Delayed and repeating tasks
    pub scheduler: Scheduler,
    /// Frame timer
    pub timer: Timer,
    /// Audio device, when one is attached
    pub audio: Option<Box<dyn AudioBackend>>,
    /// Font rasterizer, when one is attached
    pub fonts: Option<Box<dyn FontBackend>>,
}

impl EngineContext {
    /// Create a context rendering through `backend`
    pub fn new(backend: Box<dyn GraphicsBackend>, camera: Camera) -> Self {
        Self {
            renderer: Renderer::new(backend),
            camera,
            input: InputState::new(),
            textures: TextureAllocator::new(),
            meshes: MeshAllocator::new(),
            font_bitmaps: ResourceCache::new(),
            scheduler: Scheduler::new(),
            timer: Timer::new(),
            audio: None,
            fonts: None,
        }
    }

    /// Create a context from an engine configuration
    pub fn from_config(config: &EngineConfig, backend: Box<dyn GraphicsBackend>) -> Self {
        let camera = Camera::new(config.camera.ortho_size, config.window.width, config.window.height);
        let mut context = Self::new(backend, camera);
        context.renderer.set_clear_color(config.renderer.clear_color);
        context
            .renderer
            .set_viewport(config.window.width, config.window.height);
        context
    }

    /// Context backed by a [`HeadlessBackend`] for a viewport of the given size
    pub fn headless(width: u32, height: u32) -> Self {
        Self::new(Box::new(HeadlessBackend::new()), Camera::new(5.0, width, height))
    }

    /// Attach an audio device
    #[must_use]
    pub fn with_audio(mut self, audio: Box<dyn AudioBackend>) -> Self {
        self.audio = Some(audio);
        self
    }

    /// Attach a font rasterizer
    #[must_use]
    pub fn with_fonts(mut self, fonts: Box<dyn FontBackend>) -> Self {
        self.fonts = Some(fonts);
        self
    }

    /// Get a texture from the cache, loading it from `path` on first use
    pub fn load_texture(&mut self, path: &str, config: &TextureConfig) -> Option<Arc<Texture2D>> {
        self.textures
            .get_texture(path, config, self.renderer.backend_mut())
    }

    /// Shared 1x1 white texture
    pub fn blank_texture(&mut self) -> Option<Arc<Texture2D>> {
        self.textures.blank_texture(self.renderer.backend_mut())
    }

    /// Get a mesh for `vertices` from the cache, uploading it on first use
    pub fn load_mesh(&mut self, vertices: &[Vertex]) -> Option<Arc<Mesh>> {
        self.meshes.get_mesh(vertices, self.renderer.backend_mut())
    }

    /// Free every texture and mesh nobody holds anymore
    ///
    /// Unused glyph ranges are dropped along with them. Returns the number of
    /// textures and meshes freed.
    pub fn release_unused(&mut self) -> (usize, usize) {
        self.font_bitmaps.release_unused();
        let backend = self.renderer.backend_mut();
        let textures = self.textures.release_unused(backend);
        let meshes = self.meshes.release_unused(backend);
        (textures, meshes)
    }

    /// The headless backend, when the renderer drives one
    pub fn headless_backend(&self) -> Option<&HeadlessBackend> {
        self.renderer
            .backend()
            .as_any()
            .downcast_ref::<HeadlessBackend>()
    }
}

impl std::fmt::Debug for EngineContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineContext")
            .field("renderer", &self.renderer)
            .field("camera", &self.camera)
            .field("scheduler", &self.scheduler)
            .field("audio", &self.audio.is_some())
            .field("fonts", &self.fonts.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::mesh::quad_vertices;
    use crate::foundation::math::Vec2;

    #[test]
    fn test_from_config_sizes_camera() {
        let config = EngineConfig::default().with_size(1024, 512);
        let context = EngineContext::from_config(&config, Box::new(HeadlessBackend::new()));
        assert_eq!(context.camera.viewport_size(), (1024, 512));
        assert!(context.headless_backend().is_some());
    }

    #[test]
    fn test_release_unused_frees_returned_mesh() {
        let mut context = EngineContext::headless(800, 600);
        let vertices = quad_vertices(Vec2::new(0.5, 0.5));
        let mesh = context.load_mesh(&vertices).unwrap();
        assert_eq!(context.release_unused(), (0, 0));

        context.meshes.return_mesh(&mesh);
        assert_eq!(context.release_unused(), (0, 1));
        assert_eq!(context.headless_backend().unwrap().vertex_buffer_count(), 0);
    }
}
