//! Font selection parameters.

use crate::error::SurfaceError;
use std::path::PathBuf;
use std::str::FromStr;

/// Font style applied on top of the family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FontStyle {
    #[default]
    None,
    Italic,
    Bold,
}

impl FromStr for FontStyle {
    type Err = SurfaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" | "normal" => Ok(FontStyle::None),
            "italic" => Ok(FontStyle::Italic),
            "bold" => Ok(FontStyle::Bold),
            other => Err(SurfaceError::InvalidConfig(format!(
                "unknown font style '{}' (expected italic or bold)",
                other
            ))),
        }
    }
}

/// Everything the rasterizer needs to pick and size a font.
#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    /// Family name, e.g. "Sans" or "DejaVu Serif".
    pub family: String,
    pub style: FontStyle,
    /// Size in points.
    pub size_pt: u32,
    /// Load this font file instead of looking the family up.
    pub file: Option<PathBuf>,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            family: "Sans".to_string(),
            style: FontStyle::None,
            size_pt: 70,
            file: None,
        }
    }
}

impl FontSpec {
    pub fn new(family: impl Into<String>, style: FontStyle, size_pt: u32) -> Self {
        Self {
            family: family.into(),
            style,
            size_pt,
            file: None,
        }
    }

    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }
}
