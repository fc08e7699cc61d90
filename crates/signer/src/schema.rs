//! Wire types: request, prepared fields, response and audit records

use chrono::NaiveDate;
use layout::PageBox;
use serde::{Deserialize, Serialize};

pub use layout::{Coordinates, Dimensions, FieldRequest, FieldType, SignRequest};

/// Decoded field value
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Nothing to draw
    Empty,
    Text(String),
    Date(NaiveDate),
    /// Checkbox `"checked"` / radio `"selected"`
    On,
    /// Checkbox or radio present but not ticked
    Off,
    Image(ImageData),
}

impl FieldValue {
    /// Text drawn for text and date fields
    pub fn display_text(&self) -> Option<String> {
        match self {
            FieldValue::Text(text) if !text.is_empty() => Some(text.clone()),
            FieldValue::Date(date) => Some(date.format("%Y-%m-%d").to_string()),
            _ => None,
        }
    }
}

/// Raster payload of a data URI
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    /// MIME type declared by the URI, e.g. `image/png`
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// A validated field ready for the renderer
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedField {
    /// Position in the request
    pub index: usize,
    pub field_type: FieldType,
    /// One-based page number
    pub page_number: usize,
    /// Box in page points, origin top-left
    pub bounds: PageBox,
    /// Page size the client laid the field out against
    pub container: Option<Dimensions>,
    pub value: FieldValue,
}

/// Placement as sent by the client, with the layout page size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowserCoordinates {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewport_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewport_height: Option<f64>,
}

/// Box in PDF space, origin bottom-left
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PdfCoordinates {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Audit record for one request field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub page_number: usize,
    pub browser_coordinates: BrowserCoordinates,
    pub pdf_coordinates: PdfCoordinates,
    pub value: String,
}

/// Field that was not drawn because of a field-level error
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedField {
    pub index: usize,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub page_number: usize,
    pub reason: String,
}

/// The signed output
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedDocument {
    /// `signed-<unix millis>-<source basename>`
    pub filename: String,
    /// Where the web layer serves the file
    pub url: String,
    /// Base64 of `bytes`
    pub file_base64: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

/// Result of a sign request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignResponse {
    pub success: bool,
    pub signed_pdf: SignedDocument,
    pub records: Vec<FieldRecord>,
    pub skipped: Vec<SkippedField>,
}

/// Width and height of one page in points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageDimensions {
    pub width: f64,
    pub height: f64,
}

/// Page count and sizes, read once when a document is uploaded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentInfo {
    pub page_count: usize,
    pub page_dimensions: Vec<PageDimensions>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_display_text() {
        assert_eq!(
            FieldValue::Text("Jane Doe".into()).display_text(),
            Some("Jane Doe".to_string())
        );
        assert_eq!(FieldValue::Text(String::new()).display_text(), None);
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(
            FieldValue::Date(date).display_text(),
            Some("2024-03-09".to_string())
        );
        assert_eq!(FieldValue::On.display_text(), None);
    }

    #[test]
    fn test_record_json_shape() {
        let record = FieldRecord {
            document_id: Some("665f1c".into()),
            field_type: FieldType::Checkbox,
            page_number: 1,
            browser_coordinates: BrowserCoordinates {
                x: 75.2,
                y: 75.2,
                width: 30.0,
                height: 30.0,
                viewport_width: Some(612.0),
                viewport_height: Some(792.0),
            },
            pdf_coordinates: PdfCoordinates {
                x: 75.2,
                y: 686.8,
                width: 30.0,
                height: 30.0,
            },
            value: "checked".into(),
        };

        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            serde_json::json!({
                "documentId": "665f1c",
                "type": "checkbox",
                "pageNumber": 1,
                "browserCoordinates": {
                    "x": 75.2, "y": 75.2, "width": 30.0, "height": 30.0,
                    "viewportWidth": 612.0, "viewportHeight": 792.0
                },
                "pdfCoordinates": { "x": 75.2, "y": 686.8, "width": 30.0, "height": 30.0 },
                "value": "checked"
            })
        );
    }

    #[test]
    fn test_signed_document_hides_bytes() {
        let doc = SignedDocument {
            filename: "signed-1-a.pdf".into(),
            url: "/uploads/signed/signed-1-a.pdf".into(),
            file_base64: "JVBERi0=".into(),
            bytes: b"%PDF-".to_vec(),
        };
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "filename": "signed-1-a.pdf",
                "url": "/uploads/signed/signed-1-a.pdf",
                "fileBase64": "JVBERi0="
            })
        );
    }
}
