//! # text2surface
//!
//! Turn a line of text into an OpenSCAD heightmap, and optionally a scene
//! file and STL mesh.
//!
//! ## Overview
//!
//! The text is rendered black-on-white with a system font, each pixel's
//! darkness becomes a height, and the heights are written in the format
//! OpenSCAD's `surface()` reads. With anti-aliasing disabled the heights are
//! rounded to on/off cells and extruded as squares instead.
//!
//! ## Quick Start
//!
//! ```ignore
//! use text2surface::{FontRasterizer, SurfaceConfig, Text2Surface};
//!
//! let config = SurfaceConfig::default()
//!     .with_text("Hello")
//!     .with_output("hello.scad");
//!
//! let output = Text2Surface::with_config(FontRasterizer::new(), config).run()?;
//! println!("{}x{} pixels", output.width, output.height);
//! ```
//!
//! ## Custom Pixel Sources
//!
//! Anything that produces an RGBA buffer can drive the pipeline by
//! implementing [`Rasterizer`], or the encoder can be used directly:
//!
//! ```ignore
//! use text2surface::{HeightmapEncoder, PixelBuffer};
//!
//! let buffer = PixelBuffer::new(width, height, rgba_bytes)?;
//! let artifact = HeightmapEncoder::default().encode_buffer(&buffer, "text.dat".as_ref())?;
//! ```

pub mod error;
pub mod types;
pub mod raster;
pub mod heightmap;
pub mod export;
pub mod output;
pub mod pipeline;

// Re-export main types for convenience
pub use error::{Result, SurfaceError};
pub use types::{FontSpec, FontStyle, PixelBuffer};
pub use raster::{FontRasterizer, Rasterizer};
pub use heightmap::{BooleanGrid, EncoderConfig, HeightGrid, HeightmapArtifact, HeightmapEncoder, PixelSum};
pub use export::{ExecutableResolution, ExecutableSearch, SceneOptions, SceneScale};
pub use output::OutputKind;
pub use pipeline::{Stage, SurfaceConfig, SurfaceOutput, Text2Surface};

/// Convert text using the system fonts.
pub fn text_to_surface(config: SurfaceConfig) -> Result<SurfaceOutput> {
    Text2Surface::with_config(FontRasterizer::new(), config).run()
}

/// Installed font family names, sorted.
pub fn list_font_families() -> Vec<String> {
    FontRasterizer::new().families()
}
