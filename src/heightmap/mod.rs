//! Pixel-to-height conversion.
//!
//! Each RGBA pixel is reduced to a darkness ratio in `[0.0, 1.0]`: white
//! background is `0.0`, black ink is `1.0`. The ratios are then either
//! written as an OpenSCAD surface file or rounded into an on/off grid for
//! square-by-square extrusion.

mod surface;

pub use surface::{format_height, format_surface, write_surface};

use crate::error::Result;
use crate::types::{validate_dimensions, PixelBuffer, CHANNELS};
use std::path::{Path, PathBuf};

/// Sum of the channels of a pure white pixel.
pub const WHITE: u32 = 255 * CHANNELS as u32;

/// How a pixel's bytes are summed into a brightness value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PixelSum {
    /// Sum the four channel bytes of the pixel.
    #[default]
    Channels,
    /// Sum the first byte of the pixel four times.
    ///
    /// Matches the heightmaps of legacy text2surface releases, which read
    /// the same byte on every iteration.
    FirstChannelRepeated,
}

impl PixelSum {
    /// Brightness of one RGBA pixel, in `[0, WHITE]`.
    pub fn sum(self, pixel: &[u8]) -> u32 {
        match self {
            PixelSum::Channels => pixel.iter().map(|&b| b as u32).sum(),
            PixelSum::FirstChannelRepeated => pixel[0] as u32 * CHANNELS as u32,
        }
    }

    /// Darkness ratio of one pixel: `1 - sum / WHITE`.
    pub fn ratio(self, pixel: &[u8]) -> f64 {
        1.0 - self.sum(pixel) as f64 / WHITE as f64
    }
}

/// Normalized heights in image order (row 0 is the top row).
#[derive(Debug, Clone, PartialEq)]
pub struct HeightGrid {
    width: u32,
    height: u32,
    ratios: Vec<f64>,
}

impl HeightGrid {
    /// Convert raw RGBA bytes to height ratios.
    pub fn from_pixels(pixels: &[u8], width: u32, height: u32, mode: PixelSum) -> Result<Self> {
        validate_dimensions(pixels.len(), width, height)?;

        let ratios = pixels
            .chunks_exact(CHANNELS)
            .map(|pixel| mode.ratio(pixel))
            .collect();

        Ok(Self { width, height, ratios })
    }

    pub fn from_buffer(buffer: &PixelBuffer, mode: PixelSum) -> Result<Self> {
        Self::from_pixels(&buffer.pixels, buffer.width, buffer.height, mode)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Ratio at column `x`, row `y`.
    pub fn get(&self, x: u32, y: u32) -> f64 {
        self.ratios[y as usize * self.width as usize + x as usize]
    }

    /// Rows top to bottom, columns left to right.
    pub fn rows(&self) -> impl DoubleEndedIterator<Item = &[f64]> {
        self.ratios.chunks_exact(self.width as usize)
    }

    /// Round every ratio to on/off.
    ///
    /// Each row's pixel order is reversed, matching the layout the scene
    /// emitter places squares from.
    pub fn to_boolean_grid(&self) -> BooleanGrid {
        let cells = self
            .rows()
            .flat_map(|row| row.iter().rev().map(|ratio| ratio.round() >= 1.0))
            .collect();

        BooleanGrid {
            width: self.width,
            height: self.height,
            cells,
        }
    }
}

/// On/off cells produced when anti-aliasing is disabled.
///
/// Rows run top to bottom of the image; within a row, columns run right to left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BooleanGrid {
    width: u32,
    height: u32,
    cells: Vec<bool>,
}

impl BooleanGrid {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Cell at column `x`, row `y`.
    pub fn get(&self, x: u32, y: u32) -> bool {
        self.cells[y as usize * self.width as usize + x as usize]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[bool]> {
        self.cells.chunks_exact(self.width as usize)
    }

    /// Coordinates `(x, y)` of every filled cell, row by row.
    pub fn filled_cells(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        let width = self.width as usize;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, filled)| **filled)
            .map(move |(i, _)| ((i % width) as u32, (i / width) as u32))
    }

    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|&&filled| filled).count()
    }
}

/// Result of encoding: a surface file on disk or an in-memory grid, never both.
#[derive(Debug, Clone, PartialEq)]
pub enum HeightmapArtifact {
    /// Heightmap file written for OpenSCAD's `surface()`.
    Surface { path: PathBuf },
    /// Rounded grid for per-cell extrusion.
    Grid(BooleanGrid),
}

impl HeightmapArtifact {
    pub fn surface_path(&self) -> Option<&Path> {
        match self {
            HeightmapArtifact::Surface { path } => Some(path),
            HeightmapArtifact::Grid(_) => None,
        }
    }

    pub fn grid(&self) -> Option<&BooleanGrid> {
        match self {
            HeightmapArtifact::Surface { .. } => None,
            HeightmapArtifact::Grid(grid) => Some(grid),
        }
    }
}

/// Encoder settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncoderConfig {
    /// Height in mm of a fully black pixel.
    pub z_height: f64,
    /// Produce a boolean grid instead of a surface file.
    pub disable_antialiasing: bool,
    pub pixel_sum: PixelSum,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            z_height: 5.0,
            disable_antialiasing: false,
            pixel_sum: PixelSum::Channels,
        }
    }
}

/// Turns rasterized text into a heightmap artifact.
#[derive(Debug, Clone, Default)]
pub struct HeightmapEncoder {
    config: EncoderConfig,
}

impl HeightmapEncoder {
    pub fn new(config: EncoderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Encode raw RGBA bytes.
    ///
    /// With anti-aliasing the surface is written to `surface_path`; without it
    /// nothing touches the filesystem.
    pub fn encode(
        &self,
        pixels: &[u8],
        width: u32,
        height: u32,
        surface_path: &Path,
    ) -> Result<HeightmapArtifact> {
        let grid = HeightGrid::from_pixels(pixels, width, height, self.config.pixel_sum)?;

        if self.config.disable_antialiasing {
            let grid = grid.to_boolean_grid();
            log::debug!(
                "Boolean grid {}x{} with {} filled cells",
                grid.width(),
                grid.height(),
                grid.filled_count()
            );
            return Ok(HeightmapArtifact::Grid(grid));
        }

        write_surface(&grid, self.config.z_height, surface_path)?;
        log::info!("Wrote {}x{} surface to {:?}", width, height, surface_path);

        Ok(HeightmapArtifact::Surface {
            path: surface_path.to_path_buf(),
        })
    }

    pub fn encode_buffer(&self, buffer: &PixelBuffer, surface_path: &Path) -> Result<HeightmapArtifact> {
        self.encode(&buffer.pixels, buffer.width, buffer.height, surface_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SurfaceError;

    const BLACK: [u8; 4] = [0, 0, 0, 255];
    const WHITE_PIXEL: [u8; 4] = [255, 255, 255, 255];

    /// A 4x3 image with an "L" drawn in the left two columns.
    fn l_shape() -> PixelBuffer {
        let mut buffer = PixelBuffer::filled(4, 3, WHITE_PIXEL);
        buffer.set_pixel(0, 0, BLACK);
        buffer.set_pixel(0, 1, BLACK);
        buffer.set_pixel(0, 2, BLACK);
        buffer.set_pixel(1, 2, BLACK);
        buffer
    }

    fn mirrored(buffer: &PixelBuffer) -> PixelBuffer {
        let mut out = buffer.clone();
        for y in 0..buffer.height {
            for x in 0..buffer.width {
                out.set_pixel(buffer.width - 1 - x, y, buffer.get_pixel(x, y));
            }
        }
        out
    }

    #[test]
    fn test_pixel_sum_modes() {
        let pixel = [10, 20, 30, 40];
        assert_eq!(PixelSum::Channels.sum(&pixel), 100);
        assert_eq!(PixelSum::FirstChannelRepeated.sum(&pixel), 40);
        assert_eq!(PixelSum::Channels.sum(&WHITE_PIXEL), WHITE);
    }

    #[test]
    fn test_white_is_flat() {
        let buffer = PixelBuffer::filled(5, 2, WHITE_PIXEL);
        let grid = HeightGrid::from_buffer(&buffer, PixelSum::Channels).unwrap();

        assert!(grid.rows().flatten().all(|&ratio| ratio == 0.0));
        assert_eq!(grid.to_boolean_grid().filled_count(), 0);
    }

    #[test]
    fn test_black_is_full_height() {
        // Opaque black still carries alpha=255, so only a fully zeroed pixel reaches 1.0
        let buffer = PixelBuffer::filled(3, 3, [0, 0, 0, 0]);
        let grid = HeightGrid::from_buffer(&buffer, PixelSum::Channels).unwrap();

        assert!(grid.rows().flatten().all(|&ratio| ratio == 1.0));
        assert_eq!(grid.to_boolean_grid().filled_count(), 9);
    }

    #[test]
    fn test_opaque_black_rounds_on() {
        let buffer = PixelBuffer::filled(2, 1, BLACK);
        let grid = HeightGrid::from_buffer(&buffer, PixelSum::Channels).unwrap();

        assert!((grid.get(0, 0) - 0.75).abs() < 1e-12);
        assert!(grid.to_boolean_grid().get(0, 0));
    }

    #[test]
    fn test_legacy_sum_ignores_alpha() {
        let buffer = PixelBuffer::filled(2, 1, BLACK);
        let grid = HeightGrid::from_buffer(&buffer, PixelSum::FirstChannelRepeated).unwrap();
        assert_eq!(grid.get(1, 0), 1.0);
    }

    #[test]
    fn test_grid_dimensions_match_buffer() {
        let buffer = l_shape();
        let grid = HeightGrid::from_buffer(&buffer, PixelSum::Channels).unwrap();

        assert_eq!(grid.rows().count(), 3);
        assert!(grid.rows().all(|row| row.len() == 4));

        let booleans = grid.to_boolean_grid();
        assert_eq!(booleans.rows().count(), 3);
        assert!(booleans.rows().all(|row| row.len() == 4));
    }

    #[test]
    fn test_boolean_rows_are_reversed() {
        let grid = HeightGrid::from_buffer(&l_shape(), PixelSum::Channels)
            .unwrap()
            .to_boolean_grid();

        let rows: Vec<Vec<bool>> = grid.rows().map(|row| row.to_vec()).collect();
        assert_eq!(rows[0], vec![false, false, false, true]);
        assert_eq!(rows[2], vec![false, false, true, true]);
        assert_eq!(
            grid.filled_cells().collect::<Vec<_>>(),
            vec![(3, 0), (3, 1), (2, 2), (3, 2)]
        );
    }

    #[test]
    fn test_mirrored_image_reverses_rows() {
        let original = HeightGrid::from_buffer(&l_shape(), PixelSum::Channels)
            .unwrap()
            .to_boolean_grid();
        let mirror = HeightGrid::from_buffer(&mirrored(&l_shape()), PixelSum::Channels)
            .unwrap()
            .to_boolean_grid();

        for (a, b) in original.rows().zip(mirror.rows()) {
            let reversed: Vec<bool> = b.iter().rev().copied().collect();
            assert_eq!(a, reversed.as_slice());
        }
    }

    #[test]
    fn test_boolean_mode_is_deterministic() {
        let mut buffer = l_shape();
        buffer.set_pixel(3, 1, [128, 128, 128, 255]);
        let encoder = HeightmapEncoder::new(EncoderConfig {
            disable_antialiasing: true,
            ..EncoderConfig::default()
        });

        let path = Path::new("unused.dat");
        let first = encoder.encode_buffer(&buffer, path).unwrap();
        let second = encoder.encode_buffer(&buffer, path).unwrap();

        assert_eq!(first, second);
        assert!(!path.exists());
    }

    #[test]
    fn test_encode_rejects_misaligned_buffer() {
        let encoder = HeightmapEncoder::default();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.dat");

        let err = encoder.encode(&[0u8; 30], 4, 2, &path).unwrap_err();
        assert!(matches!(err, SurfaceError::MalformedPixelBuffer { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn test_encode_writes_surface() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.dat");
        let encoder = HeightmapEncoder::default();

        let artifact = encoder.encode_buffer(&l_shape(), &path).unwrap();

        assert_eq!(artifact.surface_path(), Some(path.as_path()));
        assert!(artifact.grid().is_none());
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 3);
    }
}
