//! Coordinate types
//!
//! `ScreenPoint` is in pixels relative to the rendered page image;
//! `PagePoint` and `PageBox` are in PDF points with the origin at the top-left
//! corner of the page and y growing downward. Nothing converts between them
//! implicitly; see the viewport module.

use crate::{LayoutError, Result};
use serde::{Deserialize, Serialize};

/// Position in pixels, origin top-left of the rendered page image
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Field box in pixels, for drawing the overlay
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScreenRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Position in points, origin top-left of the page
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PagePoint {
    pub x: f64,
    pub y: f64,
}

impl PagePoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Size of one PDF page in points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageGeometry {
    /// Zero-based page index
    pub page_index: usize,
    pub width_points: f64,
    pub height_points: f64,
}

impl PageGeometry {
    /// Fails with `MalformedPlacement` unless both sides are finite and positive
    pub fn new(page_index: usize, width_points: f64, height_points: f64) -> Result<Self> {
        if !(width_points.is_finite() && width_points > 0.0)
            || !(height_points.is_finite() && height_points > 0.0)
        {
            return Err(LayoutError::MalformedPlacement(format!(
                "page {page_index} has invalid size {width_points}x{height_points}"
            )));
        }
        Ok(Self {
            page_index,
            width_points,
            height_points,
        })
    }
}

/// Field box in page points, `y` measured from the top of the page to the
/// top of the box
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PageBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PageBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn origin(&self) -> PagePoint {
        PagePoint::new(self.x, self.y)
    }

    pub fn is_finite(&self) -> bool {
        [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite())
    }

    /// Check that the box has a positive size and lies on `page`
    ///
    /// `tolerance` (points) absorbs float noise from pixel conversion.
    pub fn validate(&self, page: &PageGeometry, tolerance: f64) -> Result<()> {
        if !self.is_finite() {
            return Err(LayoutError::MalformedPlacement(format!(
                "non-finite box {self:?}"
            )));
        }
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(LayoutError::MalformedPlacement(format!(
                "empty box {}x{}",
                self.width, self.height
            )));
        }
        if self.x < -tolerance
            || self.y < -tolerance
            || self.x + self.width > page.width_points + tolerance
            || self.y + self.height > page.height_points + tolerance
        {
            return Err(LayoutError::MalformedPlacement(format!(
                "box ({}, {}, {}x{}) exceeds page {} ({}x{})",
                self.x,
                self.y,
                self.width,
                self.height,
                page.page_index + 1,
                page.width_points,
                page.height_points
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn letter() -> PageGeometry {
        PageGeometry::new(0, 612.0, 792.0).unwrap()
    }

    #[test]
    fn test_page_geometry_rejects_bad_sizes() {
        assert!(PageGeometry::new(0, 0.0, 792.0).is_err());
        assert!(PageGeometry::new(0, 612.0, -1.0).is_err());
        assert!(PageGeometry::new(0, f64::INFINITY, 792.0).is_err());
        assert!(PageGeometry::new(0, f64::NAN, 792.0).is_err());
    }

    #[test]
    fn test_box_validation() {
        let page = letter();
        assert!(PageBox::new(0.0, 0.0, 612.0, 792.0).validate(&page, 0.0).is_ok());
        assert!(PageBox::new(462.0, 752.0, 150.0, 40.0).validate(&page, 0.0).is_ok());
        // float noise within tolerance
        assert!(PageBox::new(462.000001, 0.0, 150.0, 40.0).validate(&page, 0.01).is_ok());

        for bad in [
            PageBox::new(-5.0, 0.0, 30.0, 30.0),
            PageBox::new(600.0, 0.0, 30.0, 30.0),
            PageBox::new(0.0, 780.0, 30.0, 30.0),
            PageBox::new(0.0, 0.0, 0.0, 30.0),
            PageBox::new(f64::NAN, 0.0, 30.0, 30.0),
        ] {
            assert!(
                matches!(bad.validate(&page, 0.01), Err(LayoutError::MalformedPlacement(_))),
                "{bad:?} should be rejected"
            );
        }
    }
}
