//! Font rasterization interface and glyph layout
//!
//! A [`FontBackend`] turns a contiguous range of characters into a single
//! coverage atlas plus per-glyph metrics. Layout walks a string through those
//! metrics and emits one textured quad per glyph.

use std::path::Path;

use thiserror::Error;

use crate::assets::ImageData;
use crate::render::mesh::Vertex;

/// Font errors
#[derive(Error, Debug)]
pub enum FontError {
    /// The font file could not be read
    #[error("Font not found: {0}")]
    NotFound(String),

    /// The font could not be rasterized
    #[error("Rasterization failed: {0}")]
    Rasterize(String),

    /// No rasterizer is attached to the engine
    #[error("No font backend attached")]
    NoBackend,
}

/// Placement of one glyph inside the atlas, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GlyphMetrics {
    /// Horizontal pen advance
    pub advance: f32,
    /// Offset from the pen position to the glyph's left edge
    pub bearing_x: f32,
    /// Offset from the baseline up to the glyph's top edge
    pub bearing_y: f32,
    /// Glyph bitmap width
    pub width: f32,
    /// Glyph bitmap height
    pub height: f32,
    /// Top-left texture coordinate in the atlas
    pub uv_min: [f32; 2],
    /// Bottom-right texture coordinate in the atlas
    pub uv_max: [f32; 2],
}

/// Rasterized glyph range
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FontBitmap {
    /// Atlas width in pixels
    pub width: u32,
    /// Atlas height in pixels
    pub height: u32,
    /// One coverage byte per atlas pixel, row-major
    pub coverage: Vec<u8>,
    /// First character in the range
    pub first_char: char,
    /// Metrics per character, starting at `first_char`
    pub glyphs: Vec<GlyphMetrics>,
    /// Distance between baselines
    pub line_height: f32,
}

impl FontBitmap {
    /// Metrics for `c`, if it is inside the rasterized range
    pub fn glyph(&self, c: char) -> Option<&GlyphMetrics> {
        let index = (c as u32).checked_sub(self.first_char as u32)?;
        self.glyphs.get(index as usize)
    }

    /// Expand coverage into a white RGBA image with coverage as alpha
    pub fn to_image(&self) -> ImageData {
        let data = self
            .coverage
            .iter()
            .flat_map(|&alpha| [255, 255, 255, alpha])
            .collect();
        ImageData {
            data,
            width: self.width,
            height: self.height,
            channels: 4,
        }
    }

    /// Lay out a string, one quad per glyph, `scale` world units per pixel
    ///
    /// Characters outside the range advance by nothing and emit no quad;
    /// `'\n'` starts a new line.
    pub fn layout(&self, text: &str, scale: f32) -> Vec<Vertex> {
        let mut vertices = Vec::with_capacity(text.len() * 6);
        let mut pen_x = 0.0;
        let mut baseline = 0.0;

        for c in text.chars() {
            if c == '\n' {
                pen_x = 0.0;
                baseline -= self.line_height * scale;
                continue;
            }
            let Some(glyph) = self.glyph(c) else {
                log::trace!("No glyph for {:?}", c);
                continue;
            };

            let left = glyph.bearing_x.mul_add(scale, pen_x);
            let right = glyph.width.mul_add(scale, left);
            let top = glyph.bearing_y.mul_add(scale, baseline);
            let bottom = (-glyph.height).mul_add(scale, top);
            let [u0, v0] = glyph.uv_min;
            let [u1, v1] = glyph.uv_max;

            vertices.extend_from_slice(&[
                Vertex::new(left, bottom, 0.0, u0, v1),
                Vertex::new(right, bottom, 0.0, u1, v1),
                Vertex::new(right, top, 0.0, u1, v0),
                Vertex::new(left, bottom, 0.0, u0, v1),
                Vertex::new(right, top, 0.0, u1, v0),
                Vertex::new(left, top, 0.0, u0, v0),
            ]);
            pen_x = glyph.advance.mul_add(scale, pen_x);
        }
        vertices
    }
}

/// Font rasterizer
pub trait FontBackend {
    /// Rasterize `count` characters starting at `first_char` at `pixel_size`
    fn rasterize(
        &mut self,
        path: &Path,
        pixel_size: f32,
        first_char: char,
        count: u32,
    ) -> Result<FontBitmap, FontError>;
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Rasterizer producing fixed-size box glyphs
    pub(crate) struct BoxFont;

    impl FontBackend for BoxFont {
        fn rasterize(&mut self, _path: &Path, pixel_size: f32, first_char: char, count: u32) -> Result<FontBitmap, FontError> {
            #[allow(clippy::cast_precision_loss)]
            let glyphs = (0..count)
                .map(|i| GlyphMetrics {
                    advance: pixel_size,
                    bearing_x: 0.0,
                    bearing_y: pixel_size,
                    width: pixel_size,
                    height: pixel_size,
                    uv_min: [i as f32 / count as f32, 0.0],
                    uv_max: [(i + 1) as f32 / count as f32, 1.0],
                })
                .collect();
            Ok(FontBitmap {
                width: count * 8,
                height: 8,
                coverage: vec![255; (count * 64) as usize],
                first_char,
                glyphs,
                line_height: pixel_size * 1.5,
            })
        }
    }

    #[test]
    fn test_layout_emits_quad_per_known_glyph() {
        let bitmap = BoxFont.rasterize(Path::new("box.ttf"), 10.0, ' ', 95).unwrap();
        let vertices = bitmap.layout("ab\u{e9}", 0.1);

        // 'é' is outside the printable ASCII range
        assert_eq!(vertices.len(), 12);
        assert!((vertices[6].position[0] - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_newline_moves_baseline_down() {
        let bitmap = BoxFont.rasterize(Path::new("box.ttf"), 10.0, ' ', 95).unwrap();
        let vertices = bitmap.layout("a\na", 1.0);
        assert!(vertices[6].position[1] < vertices[0].position[1]);
        assert!((vertices[6].position[0] - vertices[0].position[0]).abs() < 1e-5);
    }

    #[test]
    fn test_atlas_image_uses_coverage_as_alpha() {
        let bitmap = BoxFont.rasterize(Path::new("box.ttf"), 8.0, 'a', 2).unwrap();
        let image = bitmap.to_image();
        assert_eq!(image.data.len(), (16 * 8 * 4) as usize);
        assert_eq!(&image.data[0..4], &[255, 255, 255, 255]);
    }
}
