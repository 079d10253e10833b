//! Vector document export.
//!
//! Wraps a finished raster in a single-page PDF sized to the raster at the
//! configured resolution.

use crate::render::RenderError;
use image::{DynamicImage, RgbImage};
use printpdf::{Image, ImageTransform, Mm, PdfDocument};
use std::fs;
use std::io::BufWriter;
use std::path::Path;

const MM_PER_INCH: f32 = 25.4;

/// Renders `raster` into PDF bytes.
pub fn raster_to_pdf(raster: &RgbImage, dpi: f32) -> Result<Vec<u8>, RenderError> {
    if dpi <= 0.0 {
        return Err(RenderError::Vector(format!("invalid dpi {dpi}")));
    }
    let width = Mm(raster.width() as f32 * MM_PER_INCH / dpi);
    let height = Mm(raster.height() as f32 * MM_PER_INCH / dpi);

    let (doc, page, layer) = PdfDocument::new("word cloud", width, height, "cloud");
    let layer = doc.get_page(page).get_layer(layer);
    let image = Image::from_dynamic_image(&DynamicImage::ImageRgb8(raster.clone()));
    image.add_to_layer(
        layer,
        ImageTransform {
            dpi: Some(dpi),
            ..Default::default()
        },
    );

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| RenderError::Vector(format!("PDF save error: {e}")))?;
    buf.into_inner()
        .map_err(|e| RenderError::Vector(format!("PDF buffer error: {e}")))
}

/// Writes the PDF for `raster` to `path`.
pub fn export_pdf(raster: &RgbImage, path: &Path, dpi: f32) -> Result<(), RenderError> {
    let bytes = raster_to_pdf(raster, dpi)?;
    fs::write(path, bytes).map_err(|source| RenderError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::raster_to_pdf;
    use image::{Rgb, RgbImage};

    #[test]
    fn pdf_bytes_start_with_header() {
        let raster = RgbImage::from_pixel(30, 20, Rgb([255, 255, 255]));
        let bytes = raster_to_pdf(&raster, 300.0).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn zero_dpi_is_rejected() {
        let raster = RgbImage::from_pixel(1, 1, Rgb([0, 0, 0]));
        assert!(raster_to_pdf(&raster, 0.0).is_err());
    }
}
