//! Image synthesis for the term frequency mapping.
//!
//! # Responsibility
//! - Try the spiral strategy, then the row-packing strategy, once each.
//! - Write the raster artifact and a best-effort vector artifact.
//!
//! # Invariants
//! - The spiral strategy is available only with an outline font and at least
//!   one term; anything else falls through to row packing.
//! - Row packing always has a face (built-in at worst), so it fails only when
//!   the raster cannot be written.
//! - A failed vector export never fails the render.
//!
//! # See also
//! - `layout` for placement rules, `font` for face resolution.

pub mod builtin_font;
pub mod font;
pub mod layout;
pub mod vector;

use crate::config::RenderSettings;
use crate::model::frequency::TermFrequencies;
use font::FontFace;
use image::{Rgb, RgbImage};
use layout::{pack_rows, spiral_layout, LayoutItem};
use log::{info, warn};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const PACKING_INK: Rgb<u8> = Rgb([0, 0, 0]);
const SPIRAL_PALETTE: &[Rgb<u8>] = &[
    Rgb([68, 1, 84]),
    Rgb([59, 82, 139]),
    Rgb([33, 145, 140]),
    Rgb([94, 201, 98]),
    Rgb([49, 104, 142]),
    Rgb([72, 40, 120]),
];

/// Render-layer error.
#[derive(Debug)]
pub enum RenderError {
    Io { path: PathBuf, source: std::io::Error },
    Encode { path: PathBuf, source: image::ImageError },
    Vector(String),
}

impl Display for RenderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "cannot write `{}`: {source}", path.display()),
            Self::Encode { path, source } => {
                write!(f, "cannot encode raster `{}`: {source}", path.display())
            }
            Self::Vector(message) => write!(f, "vector export failed: {message}"),
        }
    }
}

impl Error for RenderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Encode { source, .. } => Some(source),
            Self::Vector(_) => None,
        }
    }
}

/// Which strategy produced the artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMethod {
    SpiralLayout,
    RowPacking,
    /// Row packing with nothing to place: blank canvas.
    RowPackingEmpty,
    None,
}

impl RenderMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SpiralLayout => "spiral_layout",
            Self::RowPacking => "row_packing",
            Self::RowPackingEmpty => "row_packing_empty",
            Self::None => "none",
        }
    }
}

/// Rendering strategies in the order they are attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStrategy {
    Primary,
    FallbackPacking,
}

impl RenderStrategy {
    pub const ORDER: [RenderStrategy; 2] = [Self::Primary, Self::FallbackPacking];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::FallbackPacking => "fallback_packing",
        }
    }
}

/// Why a strategy did not produce artifacts.
#[derive(Debug)]
pub enum StrategyError {
    /// A capability the strategy needs is absent.
    Unavailable(String),
    /// The strategy ran and failed.
    Failed(RenderError),
}

impl Display for StrategyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(reason) => write!(f, "unavailable: {reason}"),
            Self::Failed(err) => write!(f, "{err}"),
        }
    }
}

/// Artifact destinations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderTargets {
    pub raster: PathBuf,
    pub vector: PathBuf,
}

/// Outcome of one synthesis call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderReport {
    pub raster_path: Option<PathBuf>,
    pub vector_path: Option<PathBuf>,
    pub method: RenderMethod,
    pub items_drawn: usize,
    pub font: Option<String>,
    pub error: Option<String>,
}

impl RenderReport {
    pub fn is_success(&self) -> bool {
        self.raster_path.is_some()
    }

    fn failed(error: String) -> Self {
        Self {
            raster_path: None,
            vector_path: None,
            method: RenderMethod::None,
            items_drawn: 0,
            font: None,
            error: Some(error),
        }
    }
}

/// Renders `frequencies` with the first strategy that succeeds.
pub fn render_cloud(
    frequencies: &TermFrequencies,
    settings: &RenderSettings,
    targets: &RenderTargets,
) -> RenderReport {
    if let Err(err) = settings.validate() {
        warn!(
            "event=render module=render status=error error_code=invalid_settings error={}",
            err
        );
        return RenderReport::failed(err.to_string());
    }

    let started_at = Instant::now();
    let mut failures = Vec::new();

    for strategy in RenderStrategy::ORDER {
        match attempt(strategy, frequencies, settings, targets) {
            Ok(report) => {
                info!(
                    "event=render module=render status=ok strategy={} method={} items={} vector={} duration_ms={}",
                    strategy.as_str(),
                    report.method.as_str(),
                    report.items_drawn,
                    report.vector_path.is_some(),
                    started_at.elapsed().as_millis()
                );
                return report;
            }
            Err(err) => {
                warn!(
                    "event=render module=render status=skip strategy={} reason={}",
                    strategy.as_str(),
                    err
                );
                failures.push(format!("{}: {err}", strategy.as_str()));
            }
        }
    }

    let message = failures.join("; ");
    warn!(
        "event=render module=render status=error error_code=rendering_unavailable error={}",
        message
    );
    RenderReport::failed(message)
}

fn attempt(
    strategy: RenderStrategy,
    frequencies: &TermFrequencies,
    settings: &RenderSettings,
    targets: &RenderTargets,
) -> Result<RenderReport, StrategyError> {
    match strategy {
        RenderStrategy::Primary => render_spiral(frequencies, settings, targets),
        RenderStrategy::FallbackPacking => render_packing(frequencies, settings, targets),
    }
}

fn render_spiral(
    frequencies: &TermFrequencies,
    settings: &RenderSettings,
    targets: &RenderTargets,
) -> Result<RenderReport, StrategyError> {
    if !settings.allow_primary {
        return Err(StrategyError::Unavailable("disabled by settings".to_string()));
    }
    if frequencies.is_empty() {
        return Err(StrategyError::Unavailable("no terms to lay out".to_string()));
    }
    let face = FontFace::load_outline(&settings.font_candidates)
        .ok_or_else(|| StrategyError::Unavailable("no outline font resolved".to_string()))?;

    let selection = frequencies.most_common(settings.primary_max_words);
    let items = spiral_layout(&selection, &face, settings);
    if items.is_empty() {
        return Err(StrategyError::Unavailable(
            "no word fits the canvas".to_string(),
        ));
    }

    let mut canvas = blank_canvas(settings);
    for (rank, item) in items.iter().enumerate() {
        let color = SPIRAL_PALETTE[rank % SPIRAL_PALETTE.len()];
        draw_item(&mut canvas, &face, item, color);
    }

    finish(canvas, RenderMethod::SpiralLayout, items.len(), &face, settings, targets)
}

fn render_packing(
    frequencies: &TermFrequencies,
    settings: &RenderSettings,
    targets: &RenderTargets,
) -> Result<RenderReport, StrategyError> {
    let face = FontFace::resolve(&settings.font_candidates);
    let selection = frequencies.most_common(settings.max_words);
    let mut canvas = blank_canvas(settings);

    if selection.is_empty() {
        return finish(canvas, RenderMethod::RowPackingEmpty, 0, &face, settings, targets);
    }

    let items = pack_rows(&selection, &face, settings);
    for item in &items {
        draw_item(&mut canvas, &face, item, PACKING_INK);
    }
    finish(canvas, RenderMethod::RowPacking, items.len(), &face, settings, targets)
}

fn blank_canvas(settings: &RenderSettings) -> RgbImage {
    RgbImage::from_pixel(settings.width, settings.height, BACKGROUND)
}

fn draw_item(canvas: &mut RgbImage, face: &FontFace, item: &LayoutItem, color: Rgb<u8>) {
    face.draw(canvas, &item.word, item.font_size, item.position, color);
}

/// Writes the raster (required) and the vector document (best effort).
fn finish(
    canvas: RgbImage,
    method: RenderMethod,
    items_drawn: usize,
    face: &FontFace,
    settings: &RenderSettings,
    targets: &RenderTargets,
) -> Result<RenderReport, StrategyError> {
    write_raster(&canvas, &targets.raster).map_err(StrategyError::Failed)?;

    let vector_path = match vector::export_pdf(&canvas, &targets.vector, settings.vector_dpi) {
        Ok(()) => Some(targets.vector.clone()),
        Err(err) => {
            warn!(
                "event=vector_export module=render status=error path={} error={}",
                targets.vector.display(),
                err
            );
            None
        }
    };

    Ok(RenderReport {
        raster_path: Some(targets.raster.clone()),
        vector_path,
        method,
        items_drawn,
        font: Some(face.describe()),
        error: None,
    })
}

fn write_raster(canvas: &RgbImage, path: &Path) -> Result<(), RenderError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| RenderError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    canvas
        .save_with_format(path, image::ImageFormat::Png)
        .map_err(|source| RenderError::Encode {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::{RenderMethod, RenderStrategy};

    #[test]
    fn strategies_are_tried_primary_first() {
        assert_eq!(
            RenderStrategy::ORDER,
            [RenderStrategy::Primary, RenderStrategy::FallbackPacking]
        );
    }

    #[test]
    fn method_labels_are_distinct() {
        let labels = [
            RenderMethod::SpiralLayout,
            RenderMethod::RowPacking,
            RenderMethod::RowPackingEmpty,
            RenderMethod::None,
        ]
        .map(RenderMethod::as_str);
        for (i, left) in labels.iter().enumerate() {
            for right in &labels[i + 1..] {
                assert_ne!(left, right);
            }
        }
    }
}
