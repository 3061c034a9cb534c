//! System font lookup and glyph rendering.

use super::{points_to_pixels, width_compensation, Rasterizer};
use crate::error::{Result, SurfaceError};
use crate::types::{FontSpec, FontStyle, PixelBuffer};
use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use fontdue::layout::{CoordinateSystem, Layout, TextStyle};
use fontdue::{Font, FontSettings};
use image::{Rgba, RgbaImage};

/// Fallback families tried after a generic family, most common first.
const SANS_FALLBACKS: &[&str] = &["DejaVu Sans", "Liberation Sans", "Noto Sans", "FreeSans", "Arial"];
const SERIF_FALLBACKS: &[&str] = &["DejaVu Serif", "Liberation Serif", "Noto Serif", "FreeSerif", "Times New Roman"];
const MONO_FALLBACKS: &[&str] = &["DejaVu Sans Mono", "Liberation Mono", "Noto Sans Mono", "FreeMono", "Courier New"];

/// Rasterizer backed by the system font database.
pub struct FontRasterizer {
    database: Database,
}

impl Default for FontRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl FontRasterizer {
    /// Load every font installed on the system.
    pub fn new() -> Self {
        let mut database = Database::new();
        database.load_system_fonts();
        log::debug!("Loaded {} font faces", database.len());
        Self { database }
    }

    /// Use a prepared font database.
    pub fn with_database(database: Database) -> Self {
        Self { database }
    }

    /// Sorted, deduplicated family names.
    pub fn families(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .database
            .faces()
            .flat_map(|face| face.families.iter().map(|(name, _)| name.clone()))
            .collect();
        names.sort();
        names.dedup();
        names
    }

    /// Resolve and parse the font described by `spec`.
    pub fn load_font(&self, spec: &FontSpec) -> Result<Font> {
        if let Some(path) = &spec.file {
            log::debug!("Loading font file {:?}", path);
            let data = std::fs::read(path)?;
            return Font::from_bytes(data, FontSettings::default())
                .map_err(|e| SurfaceError::Font(format!("{:?}: {}", path, e)));
        }

        let families = query_families(&spec.family);
        let query = Query {
            families: &families,
            weight: match spec.style {
                FontStyle::Bold => Weight::BOLD,
                _ => Weight::NORMAL,
            },
            stretch: Stretch::Normal,
            style: match spec.style {
                FontStyle::Italic => Style::Italic,
                _ => Style::Normal,
            },
        };

        let id = self
            .database
            .query(&query)
            .ok_or_else(|| SurfaceError::FontNotFound(spec.family.clone()))?;

        if let Some(face) = self.database.face(id) {
            log::info!("Using font face {:?} for family '{}'", face.post_script_name, spec.family);
        }

        self.database
            .with_face_data(id, |data, index| {
                let settings = FontSettings {
                    collection_index: index,
                    ..FontSettings::default()
                };
                Font::from_bytes(data, settings)
            })
            .ok_or_else(|| SurfaceError::FontNotFound(spec.family.clone()))?
            .map_err(|e| SurfaceError::Font(format!("{}: {}", spec.family, e)))
    }
}

impl Rasterizer for FontRasterizer {
    fn rasterize(&self, font: &FontSpec, text: &str) -> Result<PixelBuffer> {
        let loaded = self.load_font(font)?;
        render_text(&loaded, font.size_pt, text)
    }
}

/// Map a family name onto fontdb families, expanding generic names.
fn query_families(name: &str) -> Vec<Family<'_>> {
    let (generic, fallbacks) = match name.to_ascii_lowercase().as_str() {
        "sans" | "sans-serif" | "sans serif" => (Family::SansSerif, SANS_FALLBACKS),
        "serif" => (Family::Serif, SERIF_FALLBACKS),
        "mono" | "monospace" => (Family::Monospace, MONO_FALLBACKS),
        _ => return vec![Family::Name(name)],
    };

    let mut families = vec![generic];
    families.extend(fallbacks.iter().map(|&fallback| Family::Name(fallback)));
    families
}

/// Render `text` in black on a white canvas.
///
/// The canvas is as tall as the laid-out lines and as wide as the inked
/// glyphs plus [`width_compensation`].
pub fn render_text(font: &Font, font_size_pt: u32, text: &str) -> Result<PixelBuffer> {
    let px = points_to_pixels(font_size_pt);
    let mut layout: Layout = Layout::new(CoordinateSystem::PositiveYDown);
    layout.append(&[font], &TextStyle::new(text, px, 0));

    let glyphs = layout.glyphs();
    let measured = glyphs
        .iter()
        .map(|glyph| glyph.x + glyph.width as f32)
        .fold(0.0f32, f32::max)
        .ceil() as u32;
    let height = layout.height().ceil() as u32;

    if measured == 0 || height == 0 {
        return Err(SurfaceError::EmptyRaster);
    }

    let width = measured + width_compensation(font_size_pt);
    log::debug!("Rasterizing {:?} at {}px into {}x{}", text, px, width, height);

    let mut canvas = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]));

    for glyph in glyphs {
        if glyph.width == 0 || glyph.height == 0 {
            continue;
        }

        let (metrics, coverage) = font.rasterize_config(glyph.key);
        let origin_x = glyph.x.round() as i64;
        let origin_y = glyph.y.round() as i64;

        for row in 0..metrics.height {
            for col in 0..metrics.width {
                let alpha = coverage[row * metrics.width + col];
                if alpha == 0 {
                    continue;
                }

                let x = origin_x + col as i64;
                let y = origin_y + row as i64;
                if x < 0 || y < 0 || x >= width as i64 || y >= height as i64 {
                    continue;
                }

                // Overlapping glyphs keep the darker value
                let shade = 255 - alpha;
                let pixel = canvas.get_pixel_mut(x as u32, y as u32);
                for channel in &mut pixel.0[..3] {
                    *channel = (*channel).min(shade);
                }
            }
        }
    }

    Ok(PixelBuffer::from_image(canvas))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Load the default sans font, or `None` on machines without one.
    fn system_sans() -> Option<(FontRasterizer, Font)> {
        let rasterizer = FontRasterizer::new();
        let font = rasterizer.load_font(&FontSpec::default()).ok()?;
        Some((rasterizer, font))
    }

    #[test]
    fn test_query_families_expands_generics() {
        let families = query_families("Sans");
        assert_eq!(families[0], Family::SansSerif);
        assert!(families.len() > 1);

        assert_eq!(query_families("Ubuntu"), vec![Family::Name("Ubuntu")]);
    }

    #[test]
    fn test_unknown_family_is_not_found() {
        let rasterizer = FontRasterizer::with_database(Database::new());
        let err = rasterizer.load_font(&FontSpec::new("Sans", FontStyle::None, 10)).unwrap_err();
        assert!(matches!(err, SurfaceError::FontNotFound(name) if name == "Sans"));
    }

    #[test]
    fn test_missing_font_file_is_io_error() {
        let rasterizer = FontRasterizer::with_database(Database::new());
        let spec = FontSpec::default().with_file("/nonexistent/font.ttf");
        assert!(matches!(rasterizer.load_font(&spec), Err(SurfaceError::Io(_))));
    }

    #[test]
    fn test_empty_database_lists_no_families() {
        let rasterizer = FontRasterizer::with_database(Database::new());
        assert!(rasterizer.families().is_empty());
    }

    #[test]
    fn test_render_single_letter() {
        let Some((_, font)) = system_sans() else {
            eprintln!("no sans-serif font installed, skipping");
            return;
        };

        let buffer = render_text(&font, 10, "A").unwrap();

        assert!(buffer.width > width_compensation(10));
        assert!(buffer.height > 0);
        assert_eq!(buffer.pixels.len(), (buffer.width * buffer.height * 4) as usize);
        // Some ink, and the compensation strip on the right stays white
        assert!(buffer.pixels.chunks_exact(4).any(|p| p[0] < 128));
        assert_eq!(buffer.get_pixel(buffer.width - 1, 0), [255, 255, 255, 255]);
    }

    #[test]
    fn test_whitespace_is_empty_raster() {
        let Some((_, font)) = system_sans() else {
            return;
        };
        assert!(matches!(render_text(&font, 10, "   "), Err(SurfaceError::EmptyRaster)));
        assert!(matches!(render_text(&font, 10, ""), Err(SurfaceError::EmptyRaster)));
    }

    #[test]
    fn test_rasterizer_trait_renders() {
        let Some((rasterizer, _)) = system_sans() else {
            return;
        };
        let spec = FontSpec::new("Sans", FontStyle::Bold, 12);
        let buffer = rasterizer.rasterize(&spec, "Hi").unwrap();
        assert!(buffer.width > 0 && buffer.height > 0);
    }
}
