//! PDF Core - Low-level PDF manipulation
//!
//! This crate provides functionality for:
//! - Opening and saving PDF documents
//! - Reading page geometry (MediaBox, inherited from parent nodes)
//! - Inserting text with the standard Helvetica font
//! - Inserting images (JPEG, PNG), aspect-fitted into a box
//! - Drawing stroked and filled vector shapes
//!
//! All drawing coordinates are PDF user space: points, origin at the
//! bottom-left corner of the page.
//!
//! # Example
//!
//! ```ignore
//! use pdf_core::{Color, PdfDocument, PdfRect, Shape};
//!
//! let mut doc = PdfDocument::open("contract.pdf")?;
//! doc.insert_text("Jane Doe", 1, 72.0, 700.0, 14.0, Color::black())?;
//! doc.draw_shape(1, &Shape::rect(PdfRect::new(72.0, 600.0, 24.0, 24.0), 1.5, Color::black()))?;
//! doc.save("signed.pdf")?;
//! ```

mod document;
pub mod geometry;
mod image;
pub mod shapes;
mod text;

pub use document::{Color, PdfDocument};
pub use geometry::{fit_image_in_bounds, FitResult, PdfRect};
pub use image::{detect_format, ImageDimensions, ImageFormat};
pub use shapes::Shape;
pub use text::{encode_win_ansi, generate_text_operators, TextRenderContext};

use thiserror::Error;

/// Errors that can occur during PDF operations
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Failed to open PDF: {0}")]
    OpenError(String),

    #[error("Failed to save PDF: {0}")]
    SaveError(String),

    #[error("Invalid page number: {0} (document has {1} pages)")]
    InvalidPage(usize, usize),

    #[error("Unsupported image format: {0}")]
    UnsupportedImage(String),

    #[error("Image error: {0}")]
    ImageError(String),

    #[error("PDF parsing error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Lopdf error: {0}")]
    LopdfError(#[from] lopdf::Error),
}

/// Result type for PDF operations
pub type Result<T> = std::result::Result<T, PdfError>;

/// Format a number for a content stream.
///
/// Rounds to four decimals and drops trailing zeros so operators stay short
/// and deterministic (`12.5`, `0`, `-3.25`).
pub(crate) fn fmt_num(value: f64) -> String {
    let rounded = (value * 10_000.0).round() / 10_000.0;
    // avoid "-0"
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    let mut s = format!("{rounded:.4}");
    while s.ends_with('0') {
        s.pop();
    }
    if s.ends_with('.') {
        s.pop();
    }
    s
}
