//! Field model

use crate::geometry::{PageBox, PageGeometry, PagePoint};
use crate::{LayoutError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Slack allowed when checking a placement against its page, in points
const PLACEMENT_TOLERANCE: f64 = 1e-6;

/// The six field kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Date,
    Signature,
    Image,
    Checkbox,
    Radio,
}

impl FieldType {
    /// Smallest width a field can be resized to, in points
    pub const MIN_WIDTH: f64 = 30.0;
    /// Smallest height a field can be resized to, in points
    pub const MIN_HEIGHT: f64 = 20.0;

    pub const ALL: [FieldType; 6] = [
        FieldType::Text,
        FieldType::Date,
        FieldType::Signature,
        FieldType::Image,
        FieldType::Checkbox,
        FieldType::Radio,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Date => "date",
            FieldType::Signature => "signature",
            FieldType::Image => "image",
            FieldType::Checkbox => "checkbox",
            FieldType::Radio => "radio",
        }
    }

    /// Size given to a newly dropped field, `(width, height)` in points
    pub fn default_size(&self) -> (f64, f64) {
        match self {
            FieldType::Checkbox | FieldType::Radio => (30.0, 30.0),
            _ => (150.0, 40.0),
        }
    }

    /// `(min width, min height)` in points
    pub fn min_size(&self) -> (f64, f64) {
        (Self::MIN_WIDTH, Self::MIN_HEIGHT)
    }

    /// Signature and image fields hold raster data
    pub fn is_image(&self) -> bool {
        matches!(self, FieldType::Signature | FieldType::Image)
    }

    /// Value that marks a checkbox or radio as on
    pub fn on_value(&self) -> Option<&'static str> {
        match self {
            FieldType::Checkbox => Some("checked"),
            FieldType::Radio => Some("selected"),
            _ => None,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self> {
        FieldType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| LayoutError::UnknownFieldType(s.to_string()))
    }
}

/// `(width, height)` of a new field of `field_type`
pub fn default_size(field_type: FieldType) -> (f64, f64) {
    field_type.default_size()
}

/// Editor-assigned field identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldId(pub u64);

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A field placed on a page, in page points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldPlacement {
    pub id: FieldId,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Zero-based page index
    pub page_index: usize,
    #[serde(flatten)]
    pub bounds: PageBox,
    #[serde(default)]
    pub value: String,
}

impl FieldPlacement {
    /// New empty field of default size with its top-left corner at `origin`
    pub fn new(id: FieldId, field_type: FieldType, page_index: usize, origin: PagePoint) -> Self {
        let (width, height) = field_type.default_size();
        Self {
            id,
            field_type,
            page_index,
            bounds: PageBox::new(origin.x, origin.y, width, height),
            value: String::new(),
        }
    }

    /// Signature or image field still waiting for its picture
    pub fn is_pending_capture(&self) -> bool {
        self.field_type.is_image() && self.value.is_empty()
    }

    /// Check minimum size, page and bounds
    pub fn validate(&self, page: &PageGeometry) -> Result<()> {
        if page.page_index != self.page_index {
            return Err(LayoutError::MalformedPlacement(format!(
                "field {} is on page index {}, checked against {}",
                self.id, self.page_index, page.page_index
            )));
        }

        let (min_width, min_height) = self.field_type.min_size();
        if self.bounds.width < min_width - PLACEMENT_TOLERANCE
            || self.bounds.height < min_height - PLACEMENT_TOLERANCE
        {
            return Err(LayoutError::MalformedPlacement(format!(
                "field {} is {}x{}, below the {min_width}x{min_height} minimum",
                self.id, self.bounds.width, self.bounds.height
            )));
        }

        self.bounds.validate(page, PLACEMENT_TOLERANCE)
    }
}

/// Move a field so it lies on its page
///
/// `x' = clamp(x, 0, page width - width)` and likewise for y. A box larger
/// than the page is pinned to the top-left corner. Idempotent.
pub fn clamp_to_page(field: &FieldPlacement, page: &PageGeometry) -> FieldPlacement {
    let mut clamped = field.clone();
    clamped.bounds = clamp_box(field.bounds, page);
    clamped
}

pub(crate) fn clamp_box(bounds: PageBox, page: &PageGeometry) -> PageBox {
    let clamp_axis = |v: f64, extent: f64, limit: f64| v.min(limit - extent).max(0.0);
    PageBox {
        x: clamp_axis(bounds.x, bounds.width, page.width_points),
        y: clamp_axis(bounds.y, bounds.height, page.height_points),
        ..bounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn letter() -> PageGeometry {
        PageGeometry::new(0, 612.0, 792.0).unwrap()
    }

    fn field(field_type: FieldType, x: f64, y: f64) -> FieldPlacement {
        FieldPlacement::new(FieldId(1), field_type, 0, PagePoint::new(x, y))
    }

    #[test]
    fn test_default_sizes() {
        assert_eq!(default_size(FieldType::Checkbox), (30.0, 30.0));
        assert_eq!(default_size(FieldType::Radio), (30.0, 30.0));
        for t in [
            FieldType::Text,
            FieldType::Date,
            FieldType::Signature,
            FieldType::Image,
        ] {
            assert_eq!(default_size(t), (150.0, 40.0));
        }
    }

    #[test]
    fn test_field_type_strings() {
        for t in FieldType::ALL {
            assert_eq!(t.as_str().parse::<FieldType>().unwrap(), t);
            assert_eq!(serde_json::to_string(&t).unwrap(), format!("\"{t}\""));
        }
        assert_eq!(
            "dropdown".parse::<FieldType>(),
            Err(LayoutError::UnknownFieldType("dropdown".to_string()))
        );
    }

    #[test]
    fn test_clamp_keeps_box_on_page() {
        let page = letter();
        let cases = [
            (-20.0, -5.0),
            (600.0, 100.0),
            (100.0, 780.0),
            (1e6, 1e6),
            (300.0, 300.0),
        ];
        for (x, y) in cases {
            let clamped = clamp_to_page(&field(FieldType::Text, x, y), &page);
            let b = clamped.bounds;
            assert!(b.x >= 0.0 && b.x + b.width <= page.width_points);
            assert!(b.y >= 0.0 && b.y + b.height <= page.height_points);
            assert_eq!(clamp_to_page(&clamped, &page), clamped);
            assert!(clamped.validate(&page).is_ok());
        }
    }

    #[test]
    fn test_clamp_values() {
        let clamped = clamp_to_page(&field(FieldType::Text, 600.0, -3.0), &letter());
        assert_eq!(clamped.bounds, PageBox::new(462.0, 0.0, 150.0, 40.0));
    }

    #[test]
    fn test_clamp_oversized_box_does_not_panic() {
        // 150x40 on a 100x50 page: only the width overflows
        let page = PageGeometry::new(0, 100.0, 50.0).unwrap();
        let clamped = clamp_to_page(&field(FieldType::Text, 10.0, 10.0), &page);
        assert_eq!(clamped.bounds.origin(), PagePoint::new(0.0, 10.0));

        // both sides overflow
        let page = PageGeometry::new(0, 100.0, 30.0).unwrap();
        let clamped = clamp_to_page(&field(FieldType::Text, 10.0, 10.0), &page);
        assert_eq!(clamped.bounds.origin(), PagePoint::new(0.0, 0.0));
    }

    #[test]
    fn test_validate_minimum_size() {
        let mut f = field(FieldType::Checkbox, 10.0, 10.0);
        f.bounds.width = 29.0;
        assert!(matches!(
            f.validate(&letter()),
            Err(LayoutError::MalformedPlacement(_))
        ));
        f.bounds.width = 30.0;
        f.bounds.height = 20.0;
        assert!(f.validate(&letter()).is_ok());
    }

    #[test]
    fn test_pending_capture() {
        let mut f = field(FieldType::Signature, 0.0, 0.0);
        assert!(f.is_pending_capture());
        f.value = "data:image/png;base64,AAAA".to_string();
        assert!(!f.is_pending_capture());
        assert!(!field(FieldType::Text, 0.0, 0.0).is_pending_capture());
    }

    #[test]
    fn test_placement_json_shape() {
        let f = field(FieldType::Radio, 12.5, 40.0);
        let json = serde_json::to_value(&f).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 1,
                "type": "radio",
                "pageIndex": 0,
                "x": 12.5,
                "y": 40.0,
                "width": 30.0,
                "height": 30.0,
                "value": ""
            })
        );
    }
}
