//! Word placement on a fixed canvas.
//!
//! # Responsibility
//! - Map counts to font sizes.
//! - Place words by greedy row packing (fallback) or spiral search (primary).
//!
//! # Invariants
//! - Both layouts are deterministic for a given selection and face.
//! - Row packing stops at the first word that would cross the bottom edge.
//! - Spiral placements never overlap and stay inside the canvas.

use crate::config::RenderSettings;
use crate::render::font::{FontFace, TextExtent};

/// Smallest size the spiral search shrinks a word to before dropping it.
const SPIRAL_MIN_FONT_SIZE: u32 = 10;
/// Size multiplier applied after a failed spiral search.
const SPIRAL_SHRINK_FACTOR: f32 = 0.85;
/// Radians advanced per spiral step.
const SPIRAL_ANGLE_STEP: f32 = 0.2;
/// Pixels of radius gained per radian.
const SPIRAL_GROWTH: f32 = 3.0;
/// Spiral layout stops once this many consecutive words could not be placed.
const SPIRAL_MAX_CONSECUTIVE_MISSES: usize = 25;

/// One placed word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutItem {
    pub word: String,
    pub weight: u64,
    pub font_size: u32,
    /// Top-left corner in canvas pixels.
    pub position: (u32, u32),
    pub extent: TextExtent,
}

/// Linear size normalization between the configured font bounds.
///
/// Returns the uniform size when every count is equal.
pub fn font_size_for(count: u64, min_count: u64, max_count: u64, settings: &RenderSettings) -> u32 {
    if max_count <= min_count {
        return settings.uniform_font_size;
    }
    let ratio = count.saturating_sub(min_count) as f64 / (max_count - min_count) as f64;
    let span = f64::from(settings.max_font_size.saturating_sub(settings.min_font_size));
    (f64::from(settings.min_font_size) + ratio.clamp(0.0, 1.0) * span) as u32
}

/// Greedy left-to-right, top-to-bottom packing.
///
/// `selection` is expected in ranking order. Words are sized with
/// [`font_size_for`] over the selection's own count range.
pub fn pack_rows(
    selection: &[(String, u64)],
    face: &FontFace,
    settings: &RenderSettings,
) -> Vec<LayoutItem> {
    let Some((min_count, max_count)) = count_range(selection) else {
        return Vec::new();
    };

    let padding = settings.padding;
    let mut items = Vec::with_capacity(selection.len());
    let mut x = padding;
    let mut y = padding;
    let mut row_height = 0;

    for (word, count) in selection {
        let font_size = font_size_for(*count, min_count, max_count, settings);
        let extent = face.measure(word, font_size);

        if x > padding && x + extent.width + padding > settings.width {
            x = padding;
            y += row_height + padding;
            row_height = 0;
        }
        if y + extent.height + padding > settings.height {
            break;
        }

        items.push(LayoutItem {
            word: word.clone(),
            weight: *count,
            font_size,
            position: (x, y),
            extent,
        });
        x += extent.width + padding;
        row_height = row_height.max(extent.height);
    }

    items
}

/// Places words along an Archimedean spiral from the canvas center.
///
/// Sizes scale with `0.5 + 0.5 * count / max_count` of the maximum font size
/// and never exceed the size of the previously placed word. A word that finds
/// no free spot shrinks until [`SPIRAL_MIN_FONT_SIZE`], then is dropped.
pub fn spiral_layout(
    selection: &[(String, u64)],
    face: &FontFace,
    settings: &RenderSettings,
) -> Vec<LayoutItem> {
    let Some((_, max_count)) = count_range(selection) else {
        return Vec::new();
    };

    let margin = settings.padding / 2;
    let mut placed: Vec<LayoutItem> = Vec::with_capacity(selection.len());
    let mut size_cap = settings.max_font_size;
    let mut misses = 0;

    for (word, count) in selection {
        if misses >= SPIRAL_MAX_CONSECUTIVE_MISSES {
            break;
        }
        let ratio = *count as f32 / max_count as f32;
        let mut font_size = ((settings.max_font_size as f32) * (0.5 + 0.5 * ratio)) as u32;
        font_size = font_size.min(size_cap);

        let mut slot = None;
        while font_size >= SPIRAL_MIN_FONT_SIZE {
            let extent = face.measure(word, font_size);
            if let Some(position) = find_spiral_slot(extent, &placed, margin, settings) {
                slot = Some((position, extent));
                break;
            }
            font_size = (font_size as f32 * SPIRAL_SHRINK_FACTOR) as u32;
        }

        match slot {
            Some((position, extent)) => {
                misses = 0;
                size_cap = font_size;
                placed.push(LayoutItem {
                    word: word.clone(),
                    weight: *count,
                    font_size,
                    position,
                    extent,
                });
            }
            None => misses += 1,
        }
    }

    placed
}

fn find_spiral_slot(
    extent: TextExtent,
    placed: &[LayoutItem],
    margin: u32,
    settings: &RenderSettings,
) -> Option<(u32, u32)> {
    if extent.width == 0
        || extent.width + 2 * margin > settings.width
        || extent.height + 2 * margin > settings.height
    {
        return None;
    }

    let center_x = settings.width as f32 / 2.0;
    let center_y = settings.height as f32 / 2.0;
    let aspect = settings.width as f32 / settings.height as f32;
    let max_radius = center_x.hypot(center_y);

    let mut theta = 0.0f32;
    loop {
        let radius = SPIRAL_GROWTH * theta;
        if radius > max_radius * aspect {
            return None;
        }
        let cx = center_x + radius * theta.cos() * aspect.sqrt();
        let cy = center_y + radius * theta.sin() / aspect.sqrt();
        theta += SPIRAL_ANGLE_STEP;

        let left = cx - extent.width as f32 / 2.0;
        let top = cy - extent.height as f32 / 2.0;
        if left < margin as f32 || top < margin as f32 {
            continue;
        }
        let (x, y) = (left as u32, top as u32);
        if x + extent.width + margin > settings.width || y + extent.height + margin > settings.height
        {
            continue;
        }
        if placed
            .iter()
            .all(|item| !overlaps((x, y), extent, item, margin))
        {
            return Some((x, y));
        }
    }
}

fn overlaps(position: (u32, u32), extent: TextExtent, item: &LayoutItem, margin: u32) -> bool {
    let (x, y) = position;
    let (ix, iy) = item.position;
    x < ix + item.extent.width + margin
        && ix < x + extent.width + margin
        && y < iy + item.extent.height + margin
        && iy < y + extent.height + margin
}

fn count_range(selection: &[(String, u64)]) -> Option<(u64, u64)> {
    let min = selection.iter().map(|(_, count)| *count).min()?;
    let max = selection.iter().map(|(_, count)| *count).max()?;
    Some((min, max))
}
