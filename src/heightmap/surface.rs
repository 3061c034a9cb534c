//! OpenSCAD surface (`.dat`) serialization.
//!
//! `surface()` reads the first line of the file as `y = 0`, so image rows
//! are written bottom to top to keep the text upright. Columns stay in image
//! order. Every line starts with a space before each value and ends with a
//! newline, which keeps the output byte-compatible with the legacy tool.

use super::HeightGrid;
use crate::error::Result;
use crate::output::write_atomic;
use std::path::Path;

/// Format one height as the shortest round-trip decimal with a fractional part.
///
/// Values below `1e-4` use exponent notation without zero padding
/// (`9.8e-6`, where the legacy tool wrote `9.8e-06`).
pub fn format_height(value: f64) -> String {
    format!("{:?}", value)
}

/// Render the whole heightmap file.
pub fn format_surface(grid: &HeightGrid, z_height: f64) -> String {
    // "0.0" is the common case; longer values just grow the buffer
    let capacity = grid.width() as usize * grid.height() as usize * 5 + grid.height() as usize;
    let mut out = String::with_capacity(capacity);

    for row in grid.rows().rev() {
        for &ratio in row {
            out.push(' ');
            out.push_str(&format_height(ratio * z_height));
        }
        out.push('\n');
    }

    out
}

/// Format and write the heightmap file.
pub fn write_surface(grid: &HeightGrid, z_height: f64, path: &Path) -> Result<()> {
    let contents = format_surface(grid, z_height);
    write_atomic(path, contents.as_bytes())
}
