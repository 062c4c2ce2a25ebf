//! Embeds a raster snapshot of an invoice into a single A3 page.
//!
//! The snapshot is scaled uniformly to fit the page, centered horizontally and pinned to the top
//! edge.  Page composition goes straight through `printpdf`, so no fonts are needed.

use std::io::BufWriter;
use std::path::Path;

use image::GenericImageView;
use log::debug;
use printpdf::{Image, Mm, PdfDocument};

use crate::elements::flatten_alpha;
use crate::error::{ExportError, Result};
use crate::layout::RenderedPdf;

/// A3 portrait width in millimetres.
pub const A3_WIDTH_MM: f64 = 297.0;
/// A3 portrait height in millimetres.
pub const A3_HEIGHT_MM: f64 = 420.0;

const EMBED_DPI: f64 = 300.0;
const MM_PER_INCH: f64 = 25.4;
const LAYER_NAME: &str = "Snapshot";

/// Where a raster of `image_px` pixels lands on a page, in millimetres from the top-left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RasterPlacement {
    /// Millimetres per pixel.
    pub ratio: f64,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl RasterPlacement {
    /// Fits an `image_px` raster onto a `page_mm` page without distortion.
    pub fn fit(page_mm: (f64, f64), image_px: (u32, u32)) -> Option<Self> {
        let (page_width, page_height) = page_mm;
        let (image_width, image_height) = (f64::from(image_px.0), f64::from(image_px.1));
        if image_width <= 0.0 || image_height <= 0.0 {
            return None;
        }

        let ratio = (page_width / image_width).min(page_height / image_height);
        let width = image_width * ratio;
        let height = image_height * ratio;
        Some(Self {
            ratio,
            x: (page_width - width) / 2.0,
            y: 0.0,
            width,
            height,
        })
    }

    /// Uniform scale factor turning the raster's size at `dpi` into the placed size.
    pub fn scale_at(&self, dpi: f64) -> f64 {
        self.ratio * dpi / MM_PER_INCH
    }
}

/// Embeds `image` into a new A3 document titled `title`.
pub fn embed_raster(image: image::DynamicImage, title: &str) -> Result<RenderedPdf> {
    let image = flatten_alpha(image);
    let placement = RasterPlacement::fit((A3_WIDTH_MM, A3_HEIGHT_MM), image.dimensions())
        .ok_or(ExportError::EmptyImage)?;
    debug!(
        "Placing {}x{} px raster at ({:.2}, {:.2}) mm, {:.2} x {:.2} mm",
        image.width(),
        image.height(),
        placement.x,
        placement.y,
        placement.width,
        placement.height
    );

    let (document, page, layer) =
        PdfDocument::new(title, Mm(A3_WIDTH_MM), Mm(A3_HEIGHT_MM), LAYER_NAME);
    let layer = document.get_page(page).get_layer(layer);

    // printpdf measures from the bottom-left corner.
    let bottom = A3_HEIGHT_MM - placement.y - placement.height;
    let scale = placement.scale_at(EMBED_DPI);
    Image::from_dynamic_image(&image).add_to_layer(
        layer,
        Some(Mm(placement.x)),
        Some(Mm(bottom)),
        None,
        Some(scale),
        Some(scale),
        Some(EMBED_DPI),
    );

    let mut writer = BufWriter::new(Vec::new());
    document
        .save(&mut writer)
        .map_err(|err| ExportError::RasterPdf(format!("{:?}", err)))?;
    let bytes = writer
        .into_inner()
        .map_err(|err| ExportError::RasterPdf(err.to_string()))?;
    Ok(RenderedPdf { bytes })
}

/// Decodes the image at `path` and embeds it with [`embed_raster`].
pub fn embed_raster_file(path: impl AsRef<Path>, title: &str) -> Result<RenderedPdf> {
    let path = path.as_ref();
    let io_error = |source| ExportError::Io {
        path: path.to_owned(),
        source,
    };
    let image = image::io::Reader::open(path)
        .map_err(io_error)?
        .with_guessed_format()
        .map_err(io_error)?
        .decode()
        .map_err(|source| ExportError::Image {
            path: path.to_owned(),
            source,
        })?;
    embed_raster(image, title)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_raster_is_limited_by_width() {
        let placement = RasterPlacement::fit((297.0, 420.0), (3600, 2400)).expect("placement");
        assert!((placement.ratio - 297.0 / 3600.0).abs() < 1e-12);
        assert!((placement.width - 297.0).abs() < 1e-9);
        assert!((placement.height - 198.0).abs() < 1e-9);
        assert!(placement.x.abs() < 1e-9);
        assert_eq!(placement.y, 0.0);
    }

    #[test]
    fn tall_raster_is_centered_horizontally() {
        let placement = RasterPlacement::fit((297.0, 420.0), (1000, 2000)).expect("placement");
        assert!((placement.height - 420.0).abs() < 1e-9);
        assert!((placement.width - 210.0).abs() < 1e-9);
        assert!((placement.x - 43.5).abs() < 1e-9);
    }

    #[test]
    fn empty_raster_has_no_placement() {
        assert_eq!(RasterPlacement::fit((297.0, 420.0), (0, 10)), None);
    }

    #[test]
    fn scale_maps_native_size_to_placement() {
        let placement = RasterPlacement::fit((297.0, 420.0), (1000, 2000)).expect("placement");
        let native_width_mm = 1000.0 / EMBED_DPI * MM_PER_INCH;
        let placed = native_width_mm * placement.scale_at(EMBED_DPI);
        assert!((placed - placement.width).abs() < 1e-9);
    }

    #[test]
    fn embeds_raster_into_pdf() {
        let image = image::DynamicImage::new_rgba8(60, 40);
        let pdf = embed_raster(image, "Snapshot").expect("embed raster");
        assert!(pdf.bytes.starts_with(b"%PDF"));
    }
}
