//! End-to-end conversion: rasterize, encode, then optionally emit a scene and mesh.

use crate::error::{Result, SurfaceError};
use crate::export::scad::{write_scene, SceneOptions};
use crate::export::stl::{export_stl, ExecutableResolution, ExecutableSearch};
use crate::heightmap::{EncoderConfig, HeightmapArtifact, HeightmapEncoder, PixelSum};
use crate::output::{scene_path, surface_path, OutputKind};
use crate::raster::Rasterizer;
use crate::types::FontSpec;
use std::fmt;
use std::path::PathBuf;

/// Conversion settings.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceConfig {
    /// Text to render.
    pub text: String,
    pub font: FontSpec,
    /// Longest side of the model in mm.
    pub max_dimension: f64,
    /// Height in mm of fully black pixels.
    pub z_height: f64,
    /// Extrude on/off squares instead of importing a surface.
    pub disable_antialiasing: bool,
    /// Cut away the base slab under the surface.
    pub remove_base: bool,
    pub pixel_sum: PixelSum,
    /// Requested output; its suffix selects the stages that run.
    pub output: PathBuf,
    /// OpenSCAD executable, bypassing the search.
    pub openscad: Option<PathBuf>,
    /// Also save the rasterized text as PNG.
    pub preview: Option<PathBuf>,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            text: "RepRap".to_string(),
            font: FontSpec::default(),
            max_dimension: 150.0,
            z_height: 5.0,
            disable_antialiasing: false,
            remove_base: false,
            pixel_sum: PixelSum::Channels,
            output: PathBuf::from("text2surface.dat"),
            openscad: None,
            preview: None,
        }
    }
}

impl SurfaceConfig {
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_font(mut self, font: FontSpec) -> Self {
        self.font = font;
        self
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    /// Check value ranges before doing any work.
    pub fn validate(&self) -> Result<()> {
        if !(self.max_dimension.is_finite() && self.max_dimension > 0.0) {
            return Err(SurfaceError::InvalidConfig(format!(
                "max dimension must be positive, got {}",
                self.max_dimension
            )));
        }
        if !(self.z_height.is_finite() && self.z_height > 0.0) {
            return Err(SurfaceError::InvalidConfig(format!(
                "z height must be positive, got {}",
                self.z_height
            )));
        }
        if self.font.size_pt == 0 {
            return Err(SurfaceError::InvalidConfig("font size must be positive".to_string()));
        }
        Ok(())
    }

    pub fn output_kind(&self) -> OutputKind {
        OutputKind::from_path(&self.output)
    }

    fn encoder_config(&self) -> EncoderConfig {
        EncoderConfig {
            z_height: self.z_height,
            disable_antialiasing: self.disable_antialiasing,
            pixel_sum: self.pixel_sum,
        }
    }

    fn scene_options(&self) -> SceneOptions {
        SceneOptions {
            max_dimension: self.max_dimension,
            remove_base: self.remove_base,
            z_height: self.z_height,
        }
    }

    fn openscad_search(&self) -> ExecutableResolution {
        match &self.openscad {
            Some(path) if path.is_file() => ExecutableResolution::FoundAt(path.clone()),
            Some(path) => {
                log::warn!("OpenSCAD override {:?} does not exist", path);
                ExecutableResolution::NotFound
            }
            None => ExecutableSearch::openscad().resolve(),
        }
    }
}

/// Files produced by a conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceOutput {
    /// Rasterized image width in pixels.
    pub width: u32,
    /// Rasterized image height in pixels.
    pub height: u32,
    pub heightmap: HeightmapArtifact,
    pub scene: Option<PathBuf>,
    pub mesh: Option<PathBuf>,
    pub preview: Option<PathBuf>,
}

/// A finished stage, reported as soon as its files are on disk.
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    Preview(PathBuf),
    /// Heightmap file written for `text`.
    Surface { text: String, path: PathBuf },
    /// Boolean grid built for `text`; nothing written yet.
    Grid { text: String, filled: usize },
    Scene(PathBuf),
    /// OpenSCAD is about to run.
    ExportingMesh,
    Mesh(PathBuf),
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Preview(path) => write!(f, "Preview image is {}", path.display()),
            Stage::Surface { text, path } => {
                write!(f, "Text surface for \"{}\" is in {}", text, path.display())
            }
            Stage::Grid { text, filled } => {
                write!(f, "Text grid for \"{}\" has {} filled cells", text, filled)
            }
            Stage::Scene(path) => write!(f, "SCAD file is {}", path.display()),
            Stage::ExportingMesh => write!(f, "Exporting to STL"),
            Stage::Mesh(path) => write!(f, "STL file is {}", path.display()),
        }
    }
}

/// The conversion driver.
pub struct Text2Surface<R: Rasterizer> {
    rasterizer: R,
    config: SurfaceConfig,
}

impl<R: Rasterizer> Text2Surface<R> {
    /// Create a converter with default configuration.
    pub fn new(rasterizer: R) -> Self {
        Self {
            rasterizer,
            config: SurfaceConfig::default(),
        }
    }

    /// Create a converter with custom configuration.
    pub fn with_config(rasterizer: R, config: SurfaceConfig) -> Self {
        Self { rasterizer, config }
    }

    pub fn config(&self) -> &SurfaceConfig {
        &self.config
    }

    pub fn rasterizer(&self) -> &R {
        &self.rasterizer
    }

    /// Run every stage the output suffix asks for.
    pub fn run(&self) -> Result<SurfaceOutput> {
        self.run_with_progress(|_| {})
    }

    /// Like [`run`](Self::run), calling `report` after each stage completes.
    ///
    /// Stages that finished before a failure have already been reported
    /// when the error is returned.
    pub fn run_with_progress<F: FnMut(&Stage)>(&self, mut report: F) -> Result<SurfaceOutput> {
        let config = &self.config;
        config.validate()?;

        let kind = config.output_kind();
        // Fail before writing anything if the mesh stage cannot run
        let openscad = if kind.needs_mesh() {
            Some(config.openscad_search().into_path()?)
        } else {
            None
        };

        let buffer = self.rasterizer.rasterize(&config.font, &config.text)?;
        log::info!(
            "Rasterized {:?} to {}x{} pixels",
            config.text,
            buffer.width,
            buffer.height
        );

        if let Some(preview) = &config.preview {
            buffer.save_png(preview)?;
            log::info!("Saved preview to {:?}", preview);
            report(&Stage::Preview(preview.clone()));
        }

        let encoder = HeightmapEncoder::new(config.encoder_config());
        let heightmap = encoder.encode_buffer(&buffer, &surface_path(&config.output))?;
        report(&match &heightmap {
            HeightmapArtifact::Surface { path } => Stage::Surface {
                text: config.text.clone(),
                path: path.clone(),
            },
            HeightmapArtifact::Grid(grid) => Stage::Grid {
                text: config.text.clone(),
                filled: grid.filled_count(),
            },
        });

        let mut output = SurfaceOutput {
            width: buffer.width,
            height: buffer.height,
            heightmap,
            scene: None,
            mesh: None,
            preview: config.preview.clone(),
        };

        if !kind.needs_scene() {
            return Ok(output);
        }

        let scene = scene_path(&config.output);
        write_scene(
            &output.heightmap,
            buffer.width,
            buffer.height,
            &config.scene_options(),
            &scene,
        )?;
        report(&Stage::Scene(scene.clone()));
        output.scene = Some(scene.clone());

        if let Some(executable) = openscad {
            report(&Stage::ExportingMesh);
            export_stl(&executable, &scene, &config.output)?;
            report(&Stage::Mesh(config.output.clone()));
            output.mesh = Some(config.output.clone());
        }

        Ok(output)
    }
}
