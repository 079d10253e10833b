//! Pipeline configuration value.
//!
//! # Responsibility
//! - Carry the data/output directories and render settings into every stage.
//! - Derive the fixed artifact file names from those directories.
//!
//! # Invariants
//! - No stage reads directories from ambient or global state.
//! - `validate()` runs before any file-system side effect.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const RECORDS_FILE_NAME: &str = "records.csv";
pub const FREQUENCIES_FILE_NAME: &str = "frequencies.json";
pub const RASTER_FILE_NAME: &str = "nube_palabras.png";
pub const VECTOR_FILE_NAME: &str = "nube_palabras.pdf";

/// Font files tried in order before falling back to the built-in face.
pub const DEFAULT_FONT_CANDIDATES: &[&str] = &[
    "DejaVuSans.ttf",
    "arial.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:/Windows/Fonts/arial.ttf",
];

/// Configuration rejected by [`PipelineConfig::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    EmptyPath(&'static str),
    ZeroCanvas { width: u32, height: u32 },
    ZeroMaxWords,
    InvertedFontBounds { min: u32, max: u32 },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyPath(name) => write!(f, "{name} must not be empty"),
            Self::ZeroCanvas { width, height } => {
                write!(f, "canvas must be non-empty, got {width}x{height}")
            }
            Self::ZeroMaxWords => write!(f, "max_words must be at least 1"),
            Self::InvertedFontBounds { min, max } => {
                write!(f, "min_font_size ({min}) must be <= max_font_size ({max})")
            }
        }
    }
}

impl Error for ConfigError {}

/// Layout and export parameters for the image synthesizer.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSettings {
    pub width: u32,
    pub height: u32,
    /// Fallback packing selects at most this many terms.
    pub max_words: usize,
    pub min_font_size: u32,
    pub max_font_size: u32,
    /// Font size used when every selected term has the same count.
    pub uniform_font_size: u32,
    pub padding: u32,
    pub font_candidates: Vec<PathBuf>,
    /// Whether the spiral strategy may be attempted at all.
    pub allow_primary: bool,
    /// Spiral layout selects at most this many terms.
    pub primary_max_words: usize,
    /// Resolution used when embedding the raster into the vector document.
    pub vector_dpi: f32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: 1400,
            height: 900,
            max_words: 120,
            min_font_size: 18,
            max_font_size: 120,
            uniform_font_size: 28,
            padding: 8,
            font_candidates: DEFAULT_FONT_CANDIDATES.iter().map(PathBuf::from).collect(),
            allow_primary: true,
            primary_max_words: 200,
            vector_dpi: 300.0,
        }
    }
}

impl RenderSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::ZeroCanvas {
                width: self.width,
                height: self.height,
            });
        }
        if self.max_words == 0 {
            return Err(ConfigError::ZeroMaxWords);
        }
        if self.min_font_size > self.max_font_size {
            return Err(ConfigError::InvertedFontBounds {
                min: self.min_font_size,
                max: self.max_font_size,
            });
        }
        Ok(())
    }
}

/// One pipeline invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Holds the record store, frequency cache and `.bib` sources.
    pub data_dir: PathBuf,
    /// Receives the raster and vector artifacts.
    pub output_dir: PathBuf,
    /// Use a non-empty cache instead of re-extracting.
    pub prefer_cache: bool,
    /// Render a blank canvas when no input data exists.
    pub render_when_empty: bool,
    pub render: RenderSettings,
}

impl PipelineConfig {
    pub fn new(data_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            output_dir: output_dir.into(),
            prefer_cache: true,
            render_when_empty: false,
            render: RenderSettings::default(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(ConfigError::EmptyPath("data_dir"));
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(ConfigError::EmptyPath("output_dir"));
        }
        self.render.validate()
    }

    pub fn records_path(&self) -> PathBuf {
        self.data_dir.join(RECORDS_FILE_NAME)
    }

    pub fn frequencies_path(&self) -> PathBuf {
        self.data_dir.join(FREQUENCIES_FILE_NAME)
    }

    pub fn raster_path(&self) -> PathBuf {
        self.output_dir.join(RASTER_FILE_NAME)
    }

    pub fn vector_path(&self) -> PathBuf {
        self.output_dir.join(VECTOR_FILE_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, PipelineConfig};

    #[test]
    fn artifact_paths_use_fixed_names() {
        let config = PipelineConfig::new("/srv/data", "/srv/out");
        assert!(config.records_path().ends_with("records.csv"));
        assert!(config.frequencies_path().ends_with("frequencies.json"));
        assert!(config.raster_path().ends_with("nube_palabras.png"));
        assert!(config.vector_path().ends_with("nube_palabras.pdf"));
    }

    #[test]
    fn validate_rejects_inverted_font_bounds() {
        let mut config = PipelineConfig::new("data", "out");
        config.render.min_font_size = 200;
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvertedFontBounds { min: 200, max: 120 })
        );
    }

    #[test]
    fn validate_rejects_empty_output_dir() {
        let config = PipelineConfig::new("data", "");
        assert_eq!(config.validate(), Err(ConfigError::EmptyPath("output_dir")));
    }
}
