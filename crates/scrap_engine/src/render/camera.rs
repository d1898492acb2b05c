//! # 2D Orthographic Camera
//!
//! The camera looks down -Z at the XY plane. `ortho_size` is half of the
//! visible world height; the visible width follows from the aspect ratio.
//! The view-projection and its inverse are cached and rebuilt whenever a
//! camera parameter changes.

use crate::foundation::math::{Mat4, Point3, Vec2, Vec3};

/// Orthographic 2D camera
#[derive(Debug, Clone)]
pub struct Camera {
    position: Vec2,
    ortho_size: f32,
    viewport: (u32, u32),
    near: f32,
    far: f32,
    view_projection: Mat4,
    inverse_view_projection: Mat4,
}

impl Camera {
    /// Create a camera for a viewport of the given pixel size
    pub fn new(ortho_size: f32, viewport_width: u32, viewport_height: u32) -> Self {
        let mut camera = Self {
            position: Vec2::zeros(),
            ortho_size,
            viewport: (viewport_width.max(1), viewport_height.max(1)),
            near: -1.0,
            far: 1.0,
            view_projection: Mat4::identity(),
            inverse_view_projection: Mat4::identity(),
        };
        camera.recalculate();
        camera
    }

    /// Camera position in world space
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Move the camera to `position`
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
        self.recalculate();
        log::trace!("Camera position updated to: {:?}", position);
    }

    /// Move the camera by `offset`
    pub fn translate(&mut self, offset: Vec2) {
        self.set_position(self.position + offset);
    }

    /// Half of the visible world height
    pub const fn ortho_size(&self) -> f32 {
        self.ortho_size
    }

    /// Change the visible world height
    pub fn set_ortho_size(&mut self, ortho_size: f32) {
        self.ortho_size = ortho_size;
        self.recalculate();
    }

    /// Viewport size in pixels
    pub const fn viewport_size(&self) -> (u32, u32) {
        self.viewport
    }

    /// Update the viewport after a resize
    pub fn set_viewport_size(&mut self, width: u32, height: u32) {
        self.viewport = (width.max(1), height.max(1));
        self.recalculate();
        log::debug!("Camera viewport resized to {}x{}", self.viewport.0, self.viewport.1);
    }

    /// Width over height of the viewport
    #[allow(clippy::cast_precision_loss)]
    pub fn aspect_ratio(&self) -> f32 {
        self.viewport.0 as f32 / self.viewport.1 as f32
    }

    /// Cached view-projection matrix
    pub const fn view_projection(&self) -> &Mat4 {
        &self.view_projection
    }

    /// Convert a surface pixel position (origin top-left) to world space
    #[allow(clippy::cast_precision_loss)]
    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        let (width, height) = self.viewport;
        let ndc_x = 2.0 * screen.x / width as f32 - 1.0;
        let ndc_y = 1.0 - 2.0 * screen.y / height as f32;
        let world = self
            .inverse_view_projection
            .transform_point(&Point3::new(ndc_x, ndc_y, 0.0));
        Vec2::new(world.x, world.y)
    }

    fn recalculate(&mut self) {
        let half_height = self.ortho_size;
        let half_width = self.ortho_size * self.aspect_ratio();
        let projection = Mat4::new_orthographic(
            -half_width,
            half_width,
            -half_height,
            half_height,
            self.near,
            self.far,
        );
        let view = Mat4::new_translation(&Vec3::new(-self.position.x, -self.position.y, 0.0));

        self.view_projection = projection * view;
        self.inverse_view_projection = self
            .view_projection
            .try_inverse()
            .unwrap_or_else(Mat4::identity);
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(5.0, 800, 600)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-4;

    #[test]
    fn test_screen_center_maps_to_camera_position() {
        let mut camera = Camera::new(5.0, 800, 600);
        camera.set_position(Vec2::new(3.0, -2.0));

        let world = camera.screen_to_world(Vec2::new(400.0, 300.0));
        assert_relative_eq!(world.x, 3.0, epsilon = EPSILON);
        assert_relative_eq!(world.y, -2.0, epsilon = EPSILON);
    }

    #[test]
    fn test_top_left_corner_uses_aspect_ratio() {
        let camera = Camera::new(5.0, 800, 600);
        let world = camera.screen_to_world(Vec2::new(0.0, 0.0));

        assert_relative_eq!(world.x, -5.0 * 800.0 / 600.0, epsilon = EPSILON);
        assert_relative_eq!(world.y, 5.0, epsilon = EPSILON);
    }

    #[test]
    fn test_resize_changes_visible_width() {
        let mut camera = Camera::new(5.0, 800, 600);
        camera.set_viewport_size(600, 600);
        let world = camera.screen_to_world(Vec2::new(600.0, 600.0));

        assert_relative_eq!(world.x, 5.0, epsilon = EPSILON);
        assert_relative_eq!(world.y, -5.0, epsilon = EPSILON);
    }
}
