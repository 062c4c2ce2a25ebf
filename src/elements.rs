//! Custom `genpdf` elements and image helpers used by the invoice layout.

use std::path::Path;

use image::GenericImageView;

use genpdf::elements::Image;
use genpdf::error::{Context as _, Error};
use genpdf::style::{Color, Style, StyledString};
use genpdf::{render, Alignment, Element, Mm, Position, RenderResult, Scale, Size};

const DEFAULT_IMAGE_DPI: f64 = 300.0;
const MM_PER_INCH: f64 = 25.4;
const BAND_STROKES: usize = 4;
const BAND_STROKE_PITCH_MM: f64 = 0.3;
const BANNER_GAP_MM: f64 = 1.5;

pub(crate) fn mm_from_f64(value: f64) -> Mm {
    Mm::from(printpdf::Mm(value))
}

pub(crate) fn mm_to_f64(value: Mm) -> f64 {
    let mm: printpdf::Mm = value.into();
    mm.0
}

/// Loads an image from the given path with descriptive errors.
pub fn decode_image_from_path(path: impl AsRef<Path>) -> Result<image::DynamicImage, Error> {
    let path = path.as_ref();
    let reader = image::io::Reader::open(path)
        .with_context(|| format!("Failed to open image file {}", path.display()))?;
    reader
        .with_guessed_format()
        .context("Unable to determine image format")?
        .decode()
        .with_context(|| format!("Failed to decode image file {}", path.display()))
}

/// Drops any alpha channel; PDF image objects are embedded as plain RGB.
pub fn flatten_alpha(image: image::DynamicImage) -> image::DynamicImage {
    match image {
        image::DynamicImage::ImageRgb8(_) | image::DynamicImage::ImageLuma8(_) => image,
        other => image::DynamicImage::ImageRgb8(other.to_rgb8()),
    }
}

fn natural_width_mm(image: &image::DynamicImage) -> f64 {
    let (px_width, _) = image.dimensions();
    MM_PER_INCH * f64::from(px_width) / DEFAULT_IMAGE_DPI
}

/// Loads the image at `path` scaled to `width_mm` while keeping its aspect ratio.
pub fn logo_from_path(
    path: impl AsRef<Path>,
    width_mm: f64,
    alignment: Alignment,
) -> Result<Image, Error> {
    let dynamic = flatten_alpha(decode_image_from_path(path)?);
    let natural = natural_width_mm(&dynamic);
    let mut image = Image::from_dynamic_image(dynamic)?;
    image.set_alignment(alignment);
    if natural > f64::EPSILON {
        let scale = width_mm / natural;
        image.set_scale(Scale::new(scale, scale));
    }
    Ok(image)
}

/// A centered, uppercase heading framed above and below by solid colored bands.
///
/// Stands in for the colored section bars of the invoice: each band is a stack of thin strokes
/// close enough together to read as one bar.
pub struct Banner {
    text: String,
    text_style: Style,
    band_color: Color,
    filled: bool,
}

impl Banner {
    /// Creates a banner; the text is printed in upper case.
    pub fn new(text: impl AsRef<str>, band_color: Color) -> Self {
        Self {
            text: text.as_ref().to_uppercase(),
            text_style: Style::new().bold().with_color(band_color),
            band_color,
            filled: false,
        }
    }

    /// Paints the whole banner in the band color; pair with a contrasting text style.
    pub fn filled(mut self) -> Self {
        self.filled = true;
        self
    }

    /// Overrides the text style (bold and the band color by default).
    pub fn with_text_style(mut self, style: Style) -> Self {
        self.text_style = style;
        self
    }

    fn band_height() -> Mm {
        mm_from_f64(BAND_STROKE_PITCH_MM * BAND_STROKES as f64)
    }

    /// Vertical offsets in millimetres of the strokes painted for a banner `height_mm` tall.
    fn stroke_offsets(&self, height_mm: f64) -> Vec<f64> {
        let band_mm = BAND_STROKE_PITCH_MM * BAND_STROKES as f64;
        let band = |top: f64| {
            (0..BAND_STROKES).map(move |stroke| top + BAND_STROKE_PITCH_MM * stroke as f64)
        };
        if self.filled {
            let strokes = (height_mm / BAND_STROKE_PITCH_MM).ceil() as usize;
            (0..strokes)
                .map(|i| BAND_STROKE_PITCH_MM * i as f64)
                .collect()
        } else {
            band(0.0).chain(band(height_mm - band_mm)).collect()
        }
    }

    fn draw_strokes(&self, area: &render::Area<'_>, height: Mm, width: Mm) {
        let line_style = Style::new().with_color(self.band_color);
        for offset in self.stroke_offsets(mm_to_f64(height)) {
            let y = mm_from_f64(offset);
            area.draw_line(vec![Position::new(0, y), Position::new(width, y)], line_style);
        }
    }
}

impl Element for Banner {
    fn render(
        &mut self,
        context: &genpdf::Context,
        area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        let text_style = style.and(self.text_style);
        let string = StyledString::new(self.text.clone(), text_style);
        let text_width = string.width(&context.font_cache);
        let line_height = text_style.line_height(&context.font_cache);
        let gap = mm_from_f64(BANNER_GAP_MM);
        let band = Self::band_height();
        let total_height = band + gap + line_height + gap + band;

        let mut result = RenderResult::default();
        if total_height > area.size().height {
            result.has_more = true;
            return Ok(result);
        }

        let width = area.size().width;
        self.draw_strokes(&area, total_height, width);

        let x_offset = (width - text_width) / 2.0;
        match area.text_section(
            &context.font_cache,
            Position::new(x_offset, band + gap),
            text_style,
        ) {
            Some(mut section) => section.print_str(&string.s, string.style)?,
            None => {
                result.has_more = true;
                return Ok(result);
            }
        }


        result.size = Size::new(width, total_height);
        Ok(result)
    }
}

/// A full-width horizontal rule.
pub struct Rule {
    color: Color,
}

impl Rule {
    pub fn new(color: Color) -> Self {
        Self { color }
    }
}

impl Element for Rule {
    fn render(
        &mut self,
        _context: &genpdf::Context,
        area: render::Area<'_>,
        _style: Style,
    ) -> Result<RenderResult, Error> {
        let width = area.size().width;
        area.draw_line(
            vec![Position::new(0, 0), Position::new(width, 0)],
            Style::new().with_color(self.color),
        );
        let mut result = RenderResult::default();
        result.size = Size::new(width, mm_from_f64(BAND_STROKE_PITCH_MM));
        Ok(result)
    }
}
