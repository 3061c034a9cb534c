//! Shared types used throughout the library.

mod font;

pub use font::{FontSpec, FontStyle};

use crate::error::{Result, SurfaceError};
use image::RgbaImage;
use std::path::Path;

/// Number of bytes per RGBA pixel.
pub const CHANNELS: usize = 4;

/// Check that `len` bytes hold exactly `width * height` RGBA pixels.
///
/// Zero-sized images are rejected: a row of no pixels cannot be aligned.
pub fn validate_dimensions(len: usize, width: u32, height: u32) -> Result<()> {
    let row_len = width as usize * CHANNELS;
    let malformed = || SurfaceError::MalformedPixelBuffer { len, width, height };

    if row_len == 0 || height == 0 || len % row_len != 0 {
        return Err(malformed());
    }
    if len / row_len != height as usize {
        return Err(malformed());
    }
    Ok(())
}

/// A rasterized RGBA image, row-major with the origin at the top-left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// RGBA8 pixel data (4 bytes per pixel).
    pub pixels: Vec<u8>,
}

impl PixelBuffer {
    /// Create a buffer from raw RGBA bytes, validating the length.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        validate_dimensions(pixels.len(), width, height)?;
        Ok(Self { width, height, pixels })
    }

    /// Create a buffer filled with a single color.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let count = width as usize * height as usize;
        let pixels = rgba.iter().copied().cycle().take(count * CHANNELS).collect();
        Self { width, height, pixels }
    }

    /// Take ownership of an `image` canvas.
    pub fn from_image(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            pixels: image.into_raw(),
        }
    }

    /// Get a pixel at (x, y).
    pub fn get_pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = (y as usize * self.width as usize + x as usize) * CHANNELS;
        [
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ]
    }

    /// Set a pixel at (x, y).
    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        let idx = (y as usize * self.width as usize + x as usize) * CHANNELS;
        self.pixels[idx..idx + CHANNELS].copy_from_slice(&rgba);
    }

    /// Iterate over rows of raw bytes, top to bottom.
    pub fn rows(&self) -> impl DoubleEndedIterator<Item = &[u8]> {
        self.pixels.chunks_exact(self.width as usize * CHANNELS)
    }

    /// Encode the buffer as PNG bytes.
    pub fn to_png(&self) -> Result<Vec<u8>> {
        use image::ImageEncoder;

        let mut bytes = Vec::new();
        let cursor = std::io::Cursor::new(&mut bytes);
        let encoder = image::codecs::png::PngEncoder::new(cursor);

        encoder.write_image(
            &self.pixels,
            self.width,
            self.height,
            image::ExtendedColorType::Rgba8,
        )?;

        Ok(bytes)
    }

    /// Save the buffer as a PNG file.
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_png()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_dimensions() {
        assert!(validate_dimensions(2 * 3 * 4, 2, 3).is_ok());
        // Not a multiple of the row length
        assert!(validate_dimensions(2 * 3 * 4 + 1, 2, 3).is_err());
        // Whole rows, wrong row count
        assert!(validate_dimensions(2 * 2 * 4, 2, 3).is_err());
        assert!(validate_dimensions(0, 0, 0).is_err());
    }

    #[test]
    fn test_new_rejects_misaligned_buffer() {
        let err = PixelBuffer::new(3, 1, vec![0; 10]).unwrap_err();
        assert!(matches!(
            err,
            SurfaceError::MalformedPixelBuffer { len: 10, width: 3, height: 1 }
        ));
    }

    #[test]
    fn test_get_and_set_pixel() {
        let mut buffer = PixelBuffer::filled(2, 2, [255, 255, 255, 255]);
        buffer.set_pixel(1, 0, [0, 0, 0, 255]);

        assert_eq!(buffer.get_pixel(0, 0), [255, 255, 255, 255]);
        assert_eq!(buffer.get_pixel(1, 0), [0, 0, 0, 255]);
        assert_eq!(buffer.rows().count(), 2);
    }

    #[test]
    fn test_png_roundtrip_dimensions() {
        let buffer = PixelBuffer::filled(3, 2, [0, 0, 0, 255]);
        let png = buffer.to_png().unwrap();
        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (3, 2));
    }
}
