//! Font resolution, measurement and rasterization.
//!
//! # Invariants
//! - Resolution never fails: candidates are tried in order, then the built-in
//!   bitmap face is used.
//! - Drawing clips to the canvas; out-of-bounds text is silently cut.

use crate::render::builtin_font;
use ab_glyph::{point, Font, FontVec, PxScale, ScaleFont};
use image::{Rgb, RgbImage};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// Pixel size of rendered text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextExtent {
    pub width: u32,
    pub height: u32,
}

/// Face used to measure and draw words.
pub enum FontFace {
    /// TrueType/OpenType outline font loaded from disk.
    Outline { font: FontVec, source: PathBuf },
    /// Built-in bitmap face.
    Builtin,
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FontFace({})", self.describe())
    }
}

impl FontFace {
    /// Loads the first candidate that reads and parses as an outline font.
    pub fn load_outline(candidates: &[PathBuf]) -> Option<Self> {
        candidates.iter().find_map(|path| load_outline_file(path))
    }

    /// Outline font when one resolves, built-in face otherwise.
    pub fn resolve(candidates: &[PathBuf]) -> Self {
        Self::load_outline(candidates).unwrap_or(Self::Builtin)
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self, Self::Builtin)
    }

    /// Short label for reports and logs.
    pub fn describe(&self) -> String {
        match self {
            Self::Outline { source, .. } => source.display().to_string(),
            Self::Builtin => "builtin".to_string(),
        }
    }

    pub fn measure(&self, text: &str, size: u32) -> TextExtent {
        match self {
            Self::Outline { font, .. } => {
                let scaled = font.as_scaled(PxScale::from(size as f32));
                let mut width = 0.0f32;
                let mut previous = None;
                for c in text.chars() {
                    let id = scaled.glyph_id(c);
                    if let Some(prev) = previous {
                        width += scaled.kern(prev, id);
                    }
                    width += scaled.h_advance(id);
                    previous = Some(id);
                }
                TextExtent {
                    width: width.ceil().max(0.0) as u32,
                    height: (scaled.ascent() - scaled.descent()).ceil().max(0.0) as u32,
                }
            }
            Self::Builtin => {
                let (width, height) = builtin_font::measure(text, size);
                TextExtent { width, height }
            }
        }
    }

    /// Draws `text` with its top-left corner at `(x, y)`.
    pub fn draw(
        &self,
        canvas: &mut RgbImage,
        text: &str,
        size: u32,
        (x, y): (u32, u32),
        color: Rgb<u8>,
    ) {
        match self {
            Self::Outline { font, .. } => {
                let scale = PxScale::from(size as f32);
                let scaled = font.as_scaled(scale);
                let baseline = y as f32 + scaled.ascent();
                let mut caret = x as f32;
                let mut previous = None;
                for c in text.chars() {
                    let id = scaled.glyph_id(c);
                    if let Some(prev) = previous {
                        caret += scaled.kern(prev, id);
                    }
                    let glyph = id.with_scale_and_position(scale, point(caret, baseline));
                    caret += scaled.h_advance(id);
                    previous = Some(id);

                    if let Some(outlined) = font.outline_glyph(glyph) {
                        let bounds = outlined.px_bounds();
                        outlined.draw(|gx, gy, coverage| {
                            let px = bounds.min.x as i64 + i64::from(gx);
                            let py = bounds.min.y as i64 + i64::from(gy);
                            blend(canvas, px, py, color, coverage);
                        });
                    }
                }
            }
            Self::Builtin => {
                let scale = builtin_font::scale_for(size);
                builtin_font::for_each_cell(text, |cx, cy| {
                    for dy in 0..scale {
                        for dx in 0..scale {
                            let px = i64::from(x) + i64::from(cx * scale + dx);
                            let py = i64::from(y) + i64::from(cy * scale + dy);
                            blend(canvas, px, py, color, 1.0);
                        }
                    }
                });
            }
        }
    }
}

fn load_outline_file(path: &Path) -> Option<FontFace> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(_) => return None,
    };
    match FontVec::try_from_vec(bytes) {
        Ok(font) => {
            debug!(
                "event=font_resolve module=render status=ok path={}",
                path.display()
            );
            Some(FontFace::Outline {
                font,
                source: path.to_path_buf(),
            })
        }
        Err(err) => {
            debug!(
                "event=font_resolve module=render status=skip path={} error={}",
                path.display(),
                err
            );
            None
        }
    }
}

fn blend(canvas: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>, coverage: f32) {
    if x < 0 || y < 0 || x >= i64::from(canvas.width()) || y >= i64::from(canvas.height()) {
        return;
    }
    let alpha = coverage.clamp(0.0, 1.0);
    let pixel = canvas.get_pixel_mut(x as u32, y as u32);
    for channel in 0..3 {
        let background = f32::from(pixel.0[channel]);
        let foreground = f32::from(color.0[channel]);
        pixel.0[channel] = (background + (foreground - background) * alpha).round() as u8;
    }
}
