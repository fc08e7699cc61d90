//! Signing entry points

use crate::config::RenderConfig;
use crate::parser::{parse_request, prepare_fields};
use crate::renderer::FieldRenderer;
use crate::schema::{
    BrowserCoordinates, DocumentInfo, FieldRecord, PageDimensions, PdfCoordinates, SignRequest,
    SignResponse, SignedDocument,
};
use crate::{Result, SignError};
use base64::Engine;
use chrono::{DateTime, Utc};
use pdf_core::PdfDocument;
use tracing::info;

/// Sign a request given as JSON
pub fn sign_json(
    request_json: &str,
    pdf_bytes: &[u8],
    config: &RenderConfig,
) -> Result<SignResponse> {
    let request = parse_request(request_json)?;
    sign_document(&request, pdf_bytes, config)
}

/// Burn the request's fields into `pdf_bytes`
pub fn sign_document(
    request: &SignRequest,
    pdf_bytes: &[u8],
    config: &RenderConfig,
) -> Result<SignResponse> {
    sign_document_at(request, pdf_bytes, config, Utc::now())
}

/// [`sign_document`] with an explicit timestamp for the output filename
pub fn sign_document_at(
    request: &SignRequest,
    pdf_bytes: &[u8],
    config: &RenderConfig,
    signed_at: DateTime<Utc>,
) -> Result<SignResponse> {
    if request.pdf_filename.trim().is_empty() {
        return Err(SignError::InvalidRequest(
            "pdfFilename must not be empty".to_string(),
        ));
    }
    if pdf_bytes.is_empty() {
        return Err(SignError::SourceDocumentUnreadable(
            "no PDF data".to_string(),
        ));
    }

    let fields = prepare_fields(request)?;
    let renderer = FieldRenderer::new(config.clone())?;
    let outcome = renderer.render(pdf_bytes, &fields)?;

    let records = request
        .fields
        .iter()
        .zip(&outcome.pdf_rects)
        .map(|(field, rect)| {
            let c = field.browser_coordinates;
            FieldRecord {
                document_id: request.document_id.clone(),
                field_type: field.field_type,
                page_number: field.page_number,
                browser_coordinates: BrowserCoordinates {
                    x: c.x,
                    y: c.y,
                    width: c.width,
                    height: c.height,
                    viewport_width: field.container_dimensions.map(|d| d.width),
                    viewport_height: field.container_dimensions.map(|d| d.height),
                },
                pdf_coordinates: PdfCoordinates {
                    x: rect.x,
                    y: rect.y,
                    width: rect.width,
                    height: rect.height,
                },
                value: field.value().to_string(),
            }
        })
        .collect();

    let filename = signed_filename(&request.pdf_filename, signed_at);
    let url = format!("{}/{}", config.url_prefix.trim_end_matches('/'), filename);
    let file_base64 = base64::engine::general_purpose::STANDARD.encode(&outcome.bytes);

    info!(
        filename = %filename,
        fields = request.fields.len(),
        skipped = outcome.skipped.len(),
        "document signed"
    );

    Ok(SignResponse {
        success: true,
        signed_pdf: SignedDocument {
            filename,
            url,
            file_base64,
            bytes: outcome.bytes,
        },
        records,
        skipped: outcome.skipped,
    })
}

/// `signed-<unix millis>-<basename>`
///
/// Directory components of `pdf_filename` (either separator) are dropped.
pub fn signed_filename(pdf_filename: &str, signed_at: DateTime<Utc>) -> String {
    let basename = pdf_filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(pdf_filename);
    format!("signed-{}-{}", signed_at.timestamp_millis(), basename)
}

/// Page count and page sizes of a document
pub fn inspect_document(pdf_bytes: &[u8]) -> Result<DocumentInfo> {
    let doc = PdfDocument::open_from_bytes(pdf_bytes)
        .map_err(|e| SignError::SourceDocumentUnreadable(e.to_string()))?;

    let page_dimensions = doc
        .page_sizes()?
        .into_iter()
        .map(|(width, height)| PageDimensions { width, height })
        .collect();

    Ok(DocumentInfo {
        page_count: doc.page_count(),
        page_dimensions,
    })
}
