//! Clickable rectangle

use std::sync::Arc;

use crate::ecs::{Component, ComponentContext};
use crate::events::Signal;
use crate::foundation::math::{Color, Vec2};
use crate::input::MouseButton;
use crate::render::mesh::quad_vertices;
use crate::render::{DrawCommand, Mesh};

/// Smallest extent a sensor accepts on either axis
const MIN_SENSOR_EXTENT: f32 = 0.1;

/// Axis-aligned hover area centered on a point
///
/// Emits [`HoverSensor::on_hover`] when the cursor enters the area. Edges are
/// half-open: the left and bottom edges are outside, the right and top edges
/// inside.
#[derive(Debug)]
pub struct HoverSensor {
    half_extents: Vec2,
    hovered: bool,
    /// Fired once each time the cursor enters the area
    pub on_hover: Signal,
}

impl HoverSensor {
    /// Sensor covering `size` world units
    pub fn new(size: Vec2) -> Self {
        let mut sensor = Self {
            half_extents: Vec2::zeros(),
            hovered: false,
            on_hover: Signal::new(),
        };
        sensor.set_size(size);
        sensor
    }

    /// Change the covered area
    pub fn set_size(&mut self, size: Vec2) {
        self.half_extents = Vec2::new(size.x.max(MIN_SENSOR_EXTENT), size.y.max(MIN_SENSOR_EXTENT)) * 0.5;
    }

    /// Whether `point` lies inside the area centered on `center`
    pub fn contains(&self, center: Vec2, point: Vec2) -> bool {
        let min = center - self.half_extents;
        let max = center + self.half_extents;
        point.x > min.x && point.x <= max.x && point.y > min.y && point.y <= max.y
    }

    /// Test the cursor against the area; returns whether it just entered
    pub fn update(&mut self, center: Vec2, cursor: Vec2) -> bool {
        let was_hovered = self.hovered;
        self.hovered = self.contains(center, cursor);
        let entered = self.hovered && !was_hovered;
        if entered {
            self.on_hover.emit(&());
        }
        entered
    }

    /// Whether the cursor was inside at the last update
    pub const fn is_hovered(&self) -> bool {
        self.hovered
    }
}

/// Rectangle that reports hover, click and release of the left mouse button
///
/// The cursor is converted to world space through the engine camera and
/// tested against a `size` rectangle centered on the entity's world position.
/// While hovered the rectangle is drawn in the hover color.
#[derive(Debug)]
pub struct Button {
    size: Vec2,
    color: Color,
    hover_color: Color,
    opacity: f32,
    sensor: HoverSensor,
    pressed: bool,
    mesh: Option<Arc<Mesh>>,
    /// Fired when the cursor enters the button
    pub on_hover: Signal,
    /// Fired when the left button goes down over the button
    pub on_click: Signal,
    /// Fired when the left button is released over the button
    pub on_release: Signal,
}

impl Button {
    /// Button of `size` world units
    pub fn new(size: Vec2) -> Self {
        Self {
            size,
            color: Color::WHITE,
            hover_color: Color::rgb(0.5, 0.5, 0.5),
            opacity: 1.0,
            sensor: HoverSensor::new(size),
            pressed: false,
            mesh: None,
            on_hover: Signal::new(),
            on_click: Signal::new(),
            on_release: Signal::new(),
        }
    }

    /// Set both colors at construction
    #[must_use]
    pub const fn with_colors(mut self, color: Color, hover_color: Color) -> Self {
        self.color = color;
        self.hover_color = hover_color;
        self
    }

    /// Button size in world units
    pub const fn size(&self) -> Vec2 {
        self.size
    }

    /// Resize the button and its hover area
    pub fn set_size(&mut self, size: Vec2) {
        self.size = size;
        self.sensor.set_size(size);
    }

    /// Color while not hovered
    pub const fn color(&self) -> Color {
        self.color
    }

    /// Set the color used while not hovered
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    /// Set the color used while hovered
    pub fn set_hover_color(&mut self, color: Color) {
        self.hover_color = color;
    }

    /// Background opacity in `0.0..=1.0`
    pub const fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Set the background opacity, clamped to `0.0..=1.0`
    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }

    /// Whether the cursor is over the button
    pub const fn is_hovered(&self) -> bool {
        self.sensor.is_hovered()
    }

    /// Whether a click started over the button has not been released yet
    pub const fn is_pressed(&self) -> bool {
        self.pressed
    }
}

impl Component for Button {
    fn awake(&mut self, ctx: &mut ComponentContext<'_>) {
        self.mesh = ctx.engine.load_mesh(&quad_vertices(Vec2::new(0.5, 0.5)));
    }

    fn update(&mut self, ctx: &mut ComponentContext<'_>, _delta_time: f32) {
        let cursor = ctx
            .engine
            .camera
            .screen_to_world(ctx.engine.input.cursor_position());
        if self.sensor.update(ctx.world_position(), cursor) {
            self.on_hover.emit(&());
        }

        let input = &ctx.engine.input;
        if self.sensor.is_hovered() {
            if input.mouse_button_down(MouseButton::Left) {
                self.pressed = true;
                self.on_click.emit(&());
            } else if input.mouse_button_up(MouseButton::Left) {
                self.pressed = false;
                self.on_release.emit(&());
            }
        } else if !input.mouse_button(MouseButton::Left) {
            self.pressed = false;
        }
    }

    fn render(&mut self, ctx: &mut ComponentContext<'_>) {
        let Some(mesh) = &self.mesh else {
            return;
        };
        let color = if self.sensor.is_hovered() {
            self.hover_color
        } else {
            self.color
        };
        let command = DrawCommand::new(mesh)
            .with_tint(color.with_alpha(self.opacity))
            .with_position(ctx.world_position())
            .with_rotation(ctx.world_rotation())
            .with_scale(ctx.world_scale().component_mul(&self.size));
        ctx.engine.renderer.submit(command);
    }

    fn on_destroy(&mut self, ctx: &mut ComponentContext<'_>) {
        if let Some(mesh) = self.mesh.take() {
            ctx.engine.meshes.return_mesh(&mesh);
        }
    }
}
