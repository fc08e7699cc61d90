//! Field rendering
//!
//! One pass over an opened document: validate every page reference, draw the
//! fields in request order, serialize once. Field-level failures are logged
//! and reported in [`RenderOutcome::skipped`]; anything else fails the whole
//! render and no output is produced.

use crate::config::RenderConfig;
use crate::schema::{FieldType, FieldValue, PreparedField, SkippedField};
use crate::{Result, SignError};
use layout::{LayoutError, PageBox, PageGeometry};
use pdf_core::{detect_format, PdfDocument, PdfError, PdfRect, Shape};
use tracing::{debug, info, warn};

/// Output of a render
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOutcome {
    /// The serialized document
    pub bytes: Vec<u8>,
    /// Flipped box of every field, in request order
    pub pdf_rects: Vec<PdfRect>,
    /// Number of fields that produced drawing operations
    pub drawn: usize,
    pub skipped: Vec<SkippedField>,
}

/// Where a line of text goes inside a box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextLayout {
    pub font_size: f64,
    pub x: f64,
    pub baseline: f64,
}

/// Convert a top-left page box to a bottom-left PDF rectangle
///
/// `pdf_y = page_height - y - height`, offset by the MediaBox origin.
pub fn flip_to_pdf(bounds: &PageBox, page: &PdfRect) -> PdfRect {
    PdfRect::new(
        page.x + bounds.x,
        page.y + page.height - bounds.y - bounds.height,
        bounds.width,
        bounds.height,
    )
}

/// Single-line text placement: size `min(h * ratio, max)`, inset from the
/// left edge, baseline a third of the size below the vertical middle
pub fn text_layout(rect: &PdfRect, config: &RenderConfig) -> TextLayout {
    let font_size = (rect.height * config.font_size_ratio).min(config.max_font_size);
    TextLayout {
        font_size,
        x: rect.x + config.text_inset,
        baseline: rect.y + rect.height / 2.0 - font_size / 3.0,
    }
}

/// Only PNG and JPEG are drawn, and the declared MIME type has to agree with
/// the bytes
fn check_image_encoding(mime: &str, bytes: &[u8]) -> Result<()> {
    let declared = match mime {
        "image/jpg" => "image/jpeg",
        other => other,
    };
    match detect_format(bytes) {
        Ok(format) if format.mime_type() == declared => Ok(()),
        _ => Err(SignError::UnsupportedImageEncoding(mime.to_string())),
    }
}

/// Draws prepared fields onto a document
#[derive(Debug, Clone)]
pub struct FieldRenderer {
    config: RenderConfig,
}

impl FieldRenderer {
    pub fn new(config: RenderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Render `fields` onto the PDF in `pdf_bytes`
    pub fn render(&self, pdf_bytes: &[u8], fields: &[PreparedField]) -> Result<RenderOutcome> {
        let mut doc = PdfDocument::open_from_bytes(pdf_bytes)
            .map_err(|e| SignError::SourceDocumentUnreadable(e.to_string()))?;

        let pdf_rects = self.resolve_pages(&doc, fields)?;

        let mut drawn = 0;
        let mut skipped = Vec::new();
        for (field, rect) in fields.iter().zip(&pdf_rects) {
            match self.draw_field(&mut doc, field, rect) {
                Ok(true) => drawn += 1,
                Ok(false) => debug!(index = field.index, "field has no value, nothing drawn"),
                Err(e) if e.is_field_level() => {
                    warn!(
                        index = field.index,
                        field_type = %field.field_type,
                        page = field.page_number,
                        error = %e,
                        "skipping field"
                    );
                    skipped.push(SkippedField {
                        index: field.index,
                        field_type: field.field_type,
                        page_number: field.page_number,
                        reason: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        let bytes = doc.to_bytes()?;
        info!(
            fields = fields.len(),
            drawn,
            skipped = skipped.len(),
            size = bytes.len(),
            "document rendered"
        );

        Ok(RenderOutcome {
            bytes,
            pdf_rects,
            drawn,
            skipped,
        })
    }

    /// Check every page reference before anything is drawn and compute the
    /// flipped boxes
    fn resolve_pages(&self, doc: &PdfDocument, fields: &[PreparedField]) -> Result<Vec<PdfRect>> {
        fields
            .iter()
            .map(|field| {
                let page = doc.page_box(field.page_number).map_err(|e| match e {
                    PdfError::InvalidPage(page, page_count) => {
                        SignError::PageOutOfRange { page, page_count }
                    }
                    other => SignError::Pdf(other),
                })?;

                if let Some(container) = field.container {
                    let tolerance = self.config.page_size_tolerance;
                    if (container.width - page.width).abs() > tolerance
                        || (container.height - page.height).abs() > tolerance
                    {
                        warn!(
                            index = field.index,
                            page = field.page_number,
                            client_width = container.width,
                            client_height = container.height,
                            width = page.width,
                            height = page.height,
                            "client page size differs from document"
                        );
                    }
                }

                Ok(flip_to_pdf(&field.bounds, &page))
            })
            .collect()
    }

    /// Draw one field; `Ok(false)` when there was nothing to draw
    fn draw_field(
        &self,
        doc: &mut PdfDocument,
        field: &PreparedField,
        rect: &PdfRect,
    ) -> Result<bool> {
        let (width, height) = doc.page_size(field.page_number)?;
        let geometry = PageGeometry::new(field.page_number - 1, width, height)?;
        field
            .bounds
            .validate(&geometry, self.config.bounds_tolerance)
            .map_err(|e| match e {
                LayoutError::MalformedPlacement(reason) => SignError::MalformedPlacement(reason),
                other => SignError::Layout(other),
            })?;

        let page = field.page_number;
        let ink = self.config.ink();

        match field.field_type {
            FieldType::Text | FieldType::Date => {
                let Some(text) = field.value.display_text() else {
                    return Ok(false);
                };
                let layout = text_layout(rect, &self.config);
                doc.insert_text(
                    &text,
                    page,
                    layout.x,
                    layout.baseline,
                    layout.font_size,
                    ink,
                )?;
            }
            FieldType::Signature | FieldType::Image => {
                let FieldValue::Image(image) = &field.value else {
                    return Ok(false);
                };
                check_image_encoding(&image.mime, &image.bytes)?;
                let placed = doc.insert_image(&image.bytes, page, *rect)?;
                debug!(
                    index = field.index,
                    x = placed.x,
                    y = placed.y,
                    width = placed.width,
                    height = placed.height,
                    "image placed"
                );
            }
            FieldType::Checkbox => {
                let side = rect.min_side() * self.config.checkbox_ratio;
                let square = rect.centered_square(side);
                doc.draw_shape(page, &Shape::rect(square, self.config.border_width, ink))?;
                if field.value == FieldValue::On {
                    doc.draw_shape(page, &Shape::check_mark(&square, ink))?;
                }
            }
            FieldType::Radio => {
                let radius = rect.min_side() * self.config.radio_ratio;
                let (cx, cy) = rect.center();
                doc.draw_shape(
                    page,
                    &Shape::circle_outline(cx, cy, radius, self.config.border_width, ink),
                )?;
                if field.value == FieldValue::On {
                    doc.draw_shape(page, &Shape::disc(cx, cy, radius / 2.0, ink))?;
                }
            }
        }

        Ok(true)
    }
}
