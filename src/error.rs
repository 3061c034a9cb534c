//! Error types for text-to-surface conversion.

use std::process::ExitStatus;
use thiserror::Error;

/// Result type alias using SurfaceError.
pub type Result<T> = std::result::Result<T, SurfaceError>;

/// Main error type for surface generation.
#[derive(Error, Debug)]
pub enum SurfaceError {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to encode or save an image.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Failed to serialize JSON output.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Font data could not be parsed.
    #[error("Font error: {0}")]
    Font(String),

    /// No installed font matches the requested family and style.
    #[error("Font family not found: {0}")]
    FontNotFound(String),

    /// The text rendered to a canvas with no pixels.
    #[error("Text rendered to an empty image")]
    EmptyRaster,

    /// Pixel data length does not match the declared dimensions.
    #[error("Malformed pixel buffer: {len} bytes cannot hold {width}x{height} RGBA pixels")]
    MalformedPixelBuffer {
        len: usize,
        width: u32,
        height: u32,
    },

    /// The OpenSCAD executable could not be located.
    #[error("OpenSCAD executable not found (searched PATH and the default install locations)")]
    OpenScadNotFound,

    /// OpenSCAD ran but did not exit successfully.
    #[error("OpenSCAD export failed: {status}")]
    ExportFailed { status: ExitStatus },

    /// A configuration value is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
