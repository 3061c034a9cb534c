//! OpenSCAD scene export.
//!
//! Anti-aliased heightmaps are imported with `surface()`; boolean grids are
//! emitted as one unit square per filled cell inside a `linear_extrude`.

use crate::error::Result;
use crate::heightmap::{BooleanGrid, HeightmapArtifact};
use crate::output::{relative_reference, write_atomic};
use glam::DVec2;
use std::fmt::Write;
use std::path::Path;

/// Uniform XY scale that fits the image into the requested bounding size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneScale {
    /// Per-axis scale factor (mm per pixel).
    pub factor: DVec2,
}

impl SceneScale {
    /// Scale so the longer side of a `width` x `height` image spans `max_dimension` mm.
    pub fn fit(width: u32, height: u32, max_dimension: f64) -> Self {
        let longest = width.max(height).max(1) as f64;
        Self {
            factor: DVec2::splat(max_dimension / longest),
        }
    }

    /// Size of the scaled image in mm.
    pub fn extents(&self, width: u32, height: u32) -> DVec2 {
        self.factor * DVec2::new(width as f64, height as f64)
    }
}

/// Scene settings shared by both heightmap modes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneOptions {
    /// Longest side of the model in mm.
    pub max_dimension: f64,
    /// Cut away the base slab that `surface()` adds under the text.
    pub remove_base: bool,
    /// Extrusion height in mm for boolean grids.
    pub z_height: f64,
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self {
            max_dimension: 150.0,
            remove_base: false,
            z_height: 5.0,
        }
    }
}

/// Render the scene script for `artifact`, to be saved at `scene_path`.
pub fn render_scene(
    artifact: &HeightmapArtifact,
    width: u32,
    height: u32,
    options: &SceneOptions,
    scene_path: &Path,
) -> String {
    let scale = SceneScale::fit(width, height, options.max_dimension);

    match artifact {
        HeightmapArtifact::Surface { path } => {
            let reference = relative_reference(path, scene_path);
            surface_scene(&reference, width, height, scale, options.remove_base)
        }
        HeightmapArtifact::Grid(grid) => grid_scene(grid, scale, options.z_height),
    }
}

/// Render and write the scene file.
pub fn write_scene(
    artifact: &HeightmapArtifact,
    width: u32,
    height: u32,
    options: &SceneOptions,
    scene_path: &Path,
) -> Result<()> {
    let scene = render_scene(artifact, width, height, options, scene_path);
    write_atomic(scene_path, scene.as_bytes())?;
    log::info!("Wrote scene to {:?}", scene_path);
    Ok(())
}

fn surface_scene(reference: &str, width: u32, height: u32, scale: SceneScale, remove_base: bool) -> String {
    let mut out = String::new();
    let factor = scale.factor;

    if remove_base {
        out.push_str("translate([0, 0, -1]) difference() {\n\t");
    }
    // surface() puts a 1mm base under the heights; lift it back to z=0
    write!(
        out,
        "scale([{:?}, {:?}, 1]) translate([0, 0, 1]) surface(\"{}\", center=true, convexity=5);",
        factor.x,
        factor.y,
        escape_string(reference)
    )
    .unwrap();
    if remove_base {
        write!(
            out,
            "\n\ttranslate([-0.01, 0, 0]) cube([{:?}, {:?}, 2.01], center=true);\n}}",
            factor.x * width as f64 + 0.02,
            factor.y * height as f64
        )
        .unwrap();
    }

    out
}

fn grid_scene(grid: &BooleanGrid, scale: SceneScale, z_height: f64) -> String {
    let mut out = String::with_capacity(64 + grid.filled_count() * 32);

    writeln!(
        out,
        "linear_extrude(height={}) scale([{:?}, {:?}]) {{",
        z_height, scale.factor.x, scale.factor.y
    )
    .unwrap();
    for (x, y) in grid.filled_cells() {
        writeln!(out, "\ttranslate([{}, {}]) square(1);", x, y).unwrap();
    }
    out.push('}');

    out
}

/// Escape a path for use inside an OpenSCAD string literal.
fn escape_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
