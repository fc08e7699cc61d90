//! Sign request wire format (JSON, camelCase)

use crate::field::FieldType;
use serde::{Deserialize, Serialize};

/// Request to burn a set of fields into a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    pub pdf_filename: String,
    pub fields: Vec<FieldRequest>,
}

/// One field of a [`SignRequest`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldRequest {
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// One-based page number
    pub page_number: usize,
    /// Field box in page points, origin top-left
    pub browser_coordinates: Coordinates,
    /// Page size the client laid the field out against
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_dimensions: Option<Dimensions>,
    #[serde(default)]
    pub value: Option<String>,
}

impl FieldRequest {
    pub fn value(&self) -> &str {
        self.value.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinates {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

impl SignRequest {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
