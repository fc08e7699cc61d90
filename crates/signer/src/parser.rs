//! Request parsing and value validation

use crate::schema::{FieldRequest, FieldType, FieldValue, ImageData, PreparedField, SignRequest};
use crate::{Result, SignError};
use base64::Engine;
use chrono::NaiveDate;
use layout::PageBox;

/// Parse a sign request from JSON
pub fn parse_request(json: &str) -> Result<SignRequest> {
    let request = SignRequest::from_json(json)?;
    if request.pdf_filename.trim().is_empty() {
        return Err(SignError::InvalidRequest(
            "pdfFilename must not be empty".to_string(),
        ));
    }
    Ok(request)
}

/// Validate every field of a request and decode its value
///
/// Fails on the first value that does not match its type's encoding. Page
/// numbers and bounds are checked later against the document.
pub fn prepare_fields(request: &SignRequest) -> Result<Vec<PreparedField>> {
    request
        .fields
        .iter()
        .enumerate()
        .map(|(index, field)| prepare_field(index, field))
        .collect()
}

fn prepare_field(index: usize, field: &FieldRequest) -> Result<PreparedField> {
    let invalid = |reason: String| SignError::InvalidValue {
        index,
        field_type: field.field_type,
        reason,
    };

    let raw = field.value();
    let value = match field.field_type {
        _ if raw.is_empty() => match field.field_type.on_value() {
            Some(_) => FieldValue::Off,
            None => FieldValue::Empty,
        },
        FieldType::Text => FieldValue::Text(raw.to_string()),
        FieldType::Date => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(FieldValue::Date)
            .map_err(|e| invalid(format!("expected YYYY-MM-DD, got {raw:?} ({e})")))?,
        FieldType::Checkbox | FieldType::Radio => match field.field_type.on_value() {
            Some(on) if raw == on => FieldValue::On,
            Some(on) => return Err(invalid(format!("expected \"{on}\" or \"\", got {raw:?}"))),
            None => FieldValue::Empty,
        },
        FieldType::Signature | FieldType::Image => {
            FieldValue::Image(parse_data_uri(raw).map_err(invalid)?)
        }
    };

    let c = field.browser_coordinates;
    Ok(PreparedField {
        index,
        field_type: field.field_type,
        page_number: field.page_number,
        bounds: PageBox::new(c.x, c.y, c.width, c.height),
        container: field.container_dimensions,
        value,
    })
}

/// Decode a `data:image/<subtype>;base64,<payload>` URI
///
/// Only checks the envelope; whether the bytes are a supported raster format
/// is decided when the image is drawn.
pub fn parse_data_uri(uri: &str) -> std::result::Result<ImageData, String> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| "expected a data URI".to_string())?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| "data URI has no payload".to_string())?;

    let mut params = header.split(';');
    let mime = params.next().unwrap_or_default().trim().to_ascii_lowercase();
    if !mime.starts_with("image/") || mime.len() == "image/".len() {
        return Err(format!("expected an image MIME type, got {mime:?}"));
    }
    if !params.any(|p| p.trim().eq_ignore_ascii_case("base64")) {
        return Err("data URI is not base64 encoded".to_string());
    }

    // browsers may wrap long payloads
    let payload: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload.as_bytes())
        .map_err(|e| format!("invalid base64 payload: {e}"))?;
    if bytes.is_empty() {
        return Err("data URI payload is empty".to_string());
    }

    Ok(ImageData { mime, bytes })
}
