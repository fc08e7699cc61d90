//! Signer - burns placed fields into a PDF
//!
//! This crate provides:
//! - The sign request/response wire types and audit records
//! - Request parsing and value validation
//! - Render configuration
//! - Per-type field drawing (text, date, signature, image, checkbox, radio)
//! - The signing entry points used by the web layer
//!
//! Field boxes arrive in page points with a top-left origin and are flipped
//! to PDF space exactly once, when drawn.
//!
//! # Example
//!
//! ```ignore
//! use signer::{sign_json, RenderConfig};
//!
//! let pdf = std::fs::read("contract.pdf")?;
//! let response = sign_json(request_json, &pdf, &RenderConfig::default())?;
//! std::fs::write(&response.signed_pdf.filename, &response.signed_pdf.bytes)?;
//! ```

pub mod config;
pub mod parser;
mod renderer;
mod schema;
mod sign;

pub use config::RenderConfig;
pub use parser::{parse_data_uri, parse_request, prepare_fields};
pub use renderer::{flip_to_pdf, text_layout, FieldRenderer, RenderOutcome, TextLayout};
pub use schema::*;
pub use sign::{inspect_document, sign_document, sign_document_at, sign_json, signed_filename};

use layout::{FieldType, LayoutError};
use pdf_core::PdfError;
use thiserror::Error;

/// Errors that can occur while signing a document
#[derive(Debug, Error)]
pub enum SignError {
    #[error("Source document unreadable: {0}")]
    SourceDocumentUnreadable(String),

    #[error("Page {page} out of range (document has {page_count} pages)")]
    PageOutOfRange { page: usize, page_count: usize },

    #[error("Unsupported image encoding: {0}")]
    UnsupportedImageEncoding(String),

    #[error("Malformed placement: {0}")]
    MalformedPlacement(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid value for {field_type} field {index}: {reason}")]
    InvalidValue {
        index: usize,
        field_type: FieldType,
        reason: String,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),
}

impl SignError {
    /// Errors that only affect one field; the field is skipped and the rest
    /// of the document is still drawn
    pub fn is_field_level(&self) -> bool {
        matches!(
            self,
            SignError::UnsupportedImageEncoding(_)
                | SignError::MalformedPlacement(_)
                | SignError::Pdf(PdfError::ImageError(_))
                | SignError::Pdf(PdfError::UnsupportedImage(_))
        )
    }
}

/// Result type for signing operations
pub type Result<T> = std::result::Result<T, SignError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_level_classification() {
        assert!(SignError::UnsupportedImageEncoding("image/gif".into()).is_field_level());
        assert!(SignError::MalformedPlacement("x".into()).is_field_level());
        assert!(SignError::Pdf(PdfError::ImageError("truncated".into())).is_field_level());

        assert!(!SignError::PageOutOfRange {
            page: 7,
            page_count: 5
        }
        .is_field_level());
        assert!(!SignError::SourceDocumentUnreadable("empty".into()).is_field_level());
        assert!(!SignError::Pdf(PdfError::SaveError("disk".into())).is_field_level());
    }
}
