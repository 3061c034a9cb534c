//! text2surface CLI
//!
//! Convert text to a surface for OpenSCAD and an STL if desired.

use clap::Parser;
use std::path::PathBuf;
use text2surface::{
    list_font_families, FontRasterizer, FontSpec, FontStyle, PixelSum, SurfaceConfig,
    Text2Surface,
};

#[derive(Parser)]
#[command(name = "text2surface")]
#[command(author, version, about = "Convert text to a surface for OpenSCAD and an STL if desired", long_about = None)]
struct Cli {
    /// List available font families and exit
    #[arg(short = 'l', long)]
    list_fonts: bool,

    /// Disable anti-aliasing; extrude squares instead of importing a .dat
    #[arg(short = 'n', long)]
    disable_antialiasing: bool,

    /// Remove the base layer from the surface (.scad and .stl output only)
    #[arg(short = 'r', long)]
    remove_base: bool,

    /// The text to convert
    #[arg(short = 't', long, default_value = "RepRap")]
    text: String,

    /// Font family to use; see --list-fonts
    #[arg(short = 'f', long, default_value = "Sans")]
    font_family: String,

    /// Font style: "italic" or "bold"
    #[arg(short = 's', long, default_value = "")]
    font_style: FontStyle,

    /// Font size in points
    #[arg(short = 'i', long, default_value = "70")]
    font_size: u32,

    /// Maximum size in mm of the x or y dimension (.scad and .stl output only)
    #[arg(short = 'd', long, default_value = "150")]
    max_dimension: f64,

    /// Z-height in mm of a fully dark pixel; opaque black ink reaches 0.75 of it
    /// unless --legacy-pixel-sum is given
    #[arg(short = 'z', long, default_value = "5")]
    z_height: f64,

    /// Output file; a .scad name also writes a scene, a .stl name also exports a mesh
    #[arg(short = 'o', long, default_value = "text2surface.dat")]
    output_filename: PathBuf,

    /// Load this font file instead of looking up the family
    #[arg(long)]
    font_file: Option<PathBuf>,

    /// Path to the OpenSCAD executable
    #[arg(long)]
    openscad: Option<PathBuf>,

    /// Sum the first byte of each pixel four times, matching legacy text2surface output
    #[arg(long)]
    legacy_pixel_sum: bool,

    /// Also save the rasterized text as a PNG
    #[arg(long)]
    preview: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn into_config(self) -> SurfaceConfig {
        let mut font = FontSpec::new(self.font_family, self.font_style, self.font_size);
        font.file = self.font_file;

        SurfaceConfig {
            text: self.text,
            font,
            max_dimension: self.max_dimension,
            z_height: self.z_height,
            disable_antialiasing: self.disable_antialiasing,
            remove_base: self.remove_base,
            pixel_sum: if self.legacy_pixel_sum {
                PixelSum::FirstChannelRepeated
            } else {
                PixelSum::Channels
            },
            output: self.output_filename,
            openscad: self.openscad,
            preview: self.preview,
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.list_fonts {
        println!("{}", serde_json::to_string(&list_font_families())?);
        return Ok(());
    }

    let config = cli.into_config();
    Text2Surface::with_config(FontRasterizer::new(), config)
        .run_with_progress(|stage| println!("{}", stage))?;

    Ok(())
}
