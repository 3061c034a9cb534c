//! Text rasterization.
//!
//! The encoder only needs an RGBA buffer with white background and black
//! ink. [`Rasterizer`] is the seam between the two; [`FontRasterizer`]
//! renders with installed system fonts.

mod font;

pub use font::{render_text, FontRasterizer};

use crate::error::Result;
use crate::types::{FontSpec, PixelBuffer};

/// Screen resolution used to turn points into pixels.
pub const DPI: f32 = 96.0;

/// Produces a pixel buffer from text.
pub trait Rasterizer {
    /// Render `text` in black on a white canvas sized to fit it.
    fn rasterize(&self, font: &FontSpec, text: &str) -> Result<PixelBuffer>;
}

/// Extra canvas width added to the measured text width.
///
/// Layout engines under-measure glyphs with overhang (italics, some
/// terminal letters), which would otherwise be clipped on the right.
pub fn width_compensation(font_size_pt: u32) -> u32 {
    (font_size_pt as f64 / 3.5) as u32
}

/// Convert a point size to pixels.
pub fn points_to_pixels(font_size_pt: u32) -> f32 {
    font_size_pt as f32 * DPI / 72.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_compensation() {
        assert_eq!(width_compensation(70), 20);
        assert_eq!(width_compensation(10), 2);
        assert_eq!(width_compensation(3), 0);
    }

    #[test]
    fn test_points_to_pixels() {
        assert_eq!(points_to_pixels(72), 96.0);
        assert_eq!(points_to_pixels(0), 0.0);
    }
}
