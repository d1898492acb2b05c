//! Deferred draw-command renderer
//!
//! ```text
//! Idle --begin_frame--> Recording --end_frame--> Idle
//! ```
//!
//! `begin_frame` clears the framebuffer and captures the camera's
//! view-projection for the whole frame. `submit` composes the model matrix of
//! a command and buffers it. `end_frame` replays the buffer in submission
//! order: no sorting, no batching, later commands draw over earlier ones.

use crate::foundation::math::{Color, Mat4};
use crate::render::backend::GraphicsBackend;
use crate::render::camera::Camera;
use crate::render::commands::DrawCommand;

/// Renderer frame state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RendererState {
    /// Between frames; submissions are rejected
    Idle,
    /// Between `begin_frame` and `end_frame`
    Recording,
}

/// Counters for the most recent frames
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Frames completed
    pub frames: u64,
    /// Draw calls issued by the last `end_frame`
    pub draw_calls: usize,
    /// Commands rejected because no frame was being recorded
    pub dropped_commands: u64,
}

/// Buffers draw commands and flushes them to a [`GraphicsBackend`]
pub struct Renderer {
    backend: Box<dyn GraphicsBackend>,
    state: RendererState,
    commands: Vec<DrawCommand>,
    view_projection: Mat4,
    stats: FrameStats,
}

impl Renderer {
    /// Create a renderer driving `backend`
    pub fn new(backend: Box<dyn GraphicsBackend>) -> Self {
        Self {
            backend,
            state: RendererState::Idle,
            commands: Vec::new(),
            view_projection: Mat4::identity(),
            stats: FrameStats::default(),
        }
    }

    /// Current frame state
    pub const fn state(&self) -> RendererState {
        self.state
    }

    /// Whether a frame is being recorded
    pub fn is_recording(&self) -> bool {
        self.state == RendererState::Recording
    }

    /// Commands buffered in the current frame
    pub fn pending_commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Frame counters
    pub const fn stats(&self) -> FrameStats {
        self.stats
    }

    /// View-projection captured by the last `begin_frame`
    pub const fn view_projection(&self) -> &Mat4 {
        &self.view_projection
    }

    /// Start recording a frame
    pub fn begin_frame(&mut self, camera: &Camera) {
        if self.is_recording() {
            log::warn!(
                "begin_frame called while recording; discarding {} buffered commands",
                self.commands.len()
            );
            self.commands.clear();
        }

        self.backend.clear();
        self.view_projection = *camera.view_projection();
        self.state = RendererState::Recording;
    }

    /// Buffer a draw command for this frame
    ///
    /// Outside a frame the command is logged and dropped.
    pub fn submit(&mut self, mut command: DrawCommand) {
        if !self.is_recording() {
            log::error!("Draw command submitted outside begin_frame/end_frame; dropped");
            self.stats.dropped_commands += 1;
            return;
        }

        command.compose();
        self.commands.push(command);
    }

    /// Issue every buffered command to the backend and return to idle
    pub fn end_frame(&mut self) {
        if !self.is_recording() {
            log::warn!("end_frame called without begin_frame");
            return;
        }

        self.backend.set_view_projection(&self.view_projection);
        for command in &self.commands {
            self.backend.bind_vertex_buffer(command.mesh, command.vertex_stride);
            if let Some(texture) = command.texture {
                self.backend.bind_texture(texture);
            }
            self.backend.set_tint(command.tint);
            self.backend.set_model_matrix(command.model_matrix());
            self.backend.draw_arrays(0, command.vertex_count);
            self.backend.unbind_texture();
        }

        self.stats.draw_calls = self.commands.len();
        self.stats.frames += 1;
        self.commands.clear();
        self.state = RendererState::Idle;
    }

    /// Set the drawable region
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.backend.set_viewport(0, 0, width, height);
    }

    /// Set the clear color
    pub fn set_clear_color(&mut self, color: Color) {
        self.backend.set_clear_color(color);
    }

    /// Clear the framebuffer immediately
    pub fn clear(&mut self) {
        self.backend.clear();
    }

    /// Graphics backend
    pub fn backend(&self) -> &dyn GraphicsBackend {
        self.backend.as_ref()
    }

    /// Mutable graphics backend, for resource uploads
    pub fn backend_mut(&mut self) -> &mut dyn GraphicsBackend {
        self.backend.as_mut()
    }
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("state", &self.state)
            .field("pending_commands", &self.commands.len())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Point3, Vec2};
    use crate::render::backend::{TextureHandle, VertexBufferHandle};
    use crate::render::headless::{BackendCall, HeadlessBackend};
    use approx::assert_relative_eq;

    fn headless_renderer() -> Renderer {
        Renderer::new(Box::new(HeadlessBackend::new()))
    }

    fn headless(renderer: &Renderer) -> &HeadlessBackend {
        renderer
            .backend()
            .as_any()
            .downcast_ref::<HeadlessBackend>()
            .expect("headless backend")
    }

    #[test]
    fn test_draws_issue_in_submission_order() {
        let mut renderer = headless_renderer();
        let camera = Camera::default();

        renderer.begin_frame(&camera);
        for id in [3, 1, 2] {
            renderer.submit(DrawCommand::from_raw(VertexBufferHandle(id), 20, 6));
        }
        assert!(headless(&renderer).drawn_buffers().is_empty());
        renderer.end_frame();

        assert_eq!(
            headless(&renderer).drawn_buffers(),
            vec![VertexBufferHandle(3), VertexBufferHandle(1), VertexBufferHandle(2)]
        );
        assert_eq!(renderer.stats().draw_calls, 3);
        assert_eq!(renderer.state(), RendererState::Idle);
        assert!(renderer.pending_commands().is_empty());
    }

    #[test]
    fn test_submit_outside_frame_is_dropped() {
        let mut renderer = headless_renderer();
        renderer.submit(DrawCommand::from_raw(VertexBufferHandle(1), 20, 6));

        assert!(renderer.pending_commands().is_empty());
        assert_eq!(renderer.stats().dropped_commands, 1);

        renderer.begin_frame(&Camera::default());
        renderer.end_frame();
        assert_eq!(headless(&renderer).draw_call_count(), 0);
    }

    #[test]
    fn test_model_matrix_composed_at_submission() {
        let mut renderer = headless_renderer();
        renderer.begin_frame(&Camera::default());

        let command = DrawCommand::from_raw(VertexBufferHandle(1), 20, 6)
            .with_position(Vec2::new(2.0, 0.0))
            .with_rotation(90.0)
            .with_scale(Vec2::new(3.0, 3.0));
        assert_eq!(*command.model_matrix(), Mat4::identity());
        renderer.submit(command);

        let p = renderer.pending_commands()[0]
            .model_matrix()
            .transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p.x, 2.0, epsilon = 1e-5);
        assert_relative_eq!(p.y, 3.0, epsilon = 1e-5);
    }

    #[test]
    fn test_view_projection_captured_once_per_frame() {
        let mut renderer = headless_renderer();
        let mut camera = Camera::default();

        renderer.begin_frame(&camera);
        let captured = *camera.view_projection();
        camera.set_position(Vec2::new(10.0, 10.0));
        renderer.submit(DrawCommand::from_raw(VertexBufferHandle(1), 20, 6));
        renderer.end_frame();

        assert!(headless(&renderer)
            .calls()
            .contains(&BackendCall::SetViewProjection(captured)));
    }

    #[test]
    fn test_textured_command_binds_and_unbinds() {
        let mut renderer = headless_renderer();
        renderer.begin_frame(&Camera::default());
        let mut command = DrawCommand::from_raw(VertexBufferHandle(1), 20, 6);
        command.texture = Some(TextureHandle(9));
        renderer.submit(command);
        renderer.end_frame();

        let calls = headless(&renderer).calls();
        let bind = calls.iter().position(|c| *c == BackendCall::BindTexture(TextureHandle(9)));
        let draw = calls.iter().position(|c| matches!(c, BackendCall::DrawArrays { .. }));
        let unbind = calls.iter().rposition(|c| *c == BackendCall::UnbindTexture);
        assert!(bind < draw && draw < unbind);
    }
}
