//! Geometry shared by the drawing primitives
//!
//! Everything here is in PDF user space: points, origin bottom-left,
//! y growing upward.

/// Axis-aligned rectangle in PDF user space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PdfRect {
    /// Left edge in points
    pub x: f64,
    /// Bottom edge in points
    pub y: f64,
    /// Width in points
    pub width: f64,
    /// Height in points
    pub height: f64,
}

impl PdfRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Center point `(x, y)`
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Length of the shorter side
    pub fn min_side(&self) -> f64 {
        self.width.min(self.height)
    }

    /// Square of side `side` sharing this rectangle's center
    pub fn centered_square(&self, side: f64) -> PdfRect {
        let (cx, cy) = self.center();
        PdfRect::new(cx - side / 2.0, cy - side / 2.0, side, side)
    }
}

/// Placement of an image aspect-fitted inside a box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitResult {
    pub width: f64,
    pub height: f64,
    /// Horizontal margin on each side
    pub offset_x: f64,
    /// Vertical margin on each side
    pub offset_y: f64,
}

impl FitResult {
    /// Absolute rectangle of the fitted image inside `bounds`
    pub fn within(&self, bounds: &PdfRect) -> PdfRect {
        PdfRect::new(
            bounds.x + self.offset_x,
            bounds.y + self.offset_y,
            self.width,
            self.height,
        )
    }
}

/// Fit an image of `image_width` x `image_height` inside a box, preserving
/// the aspect ratio and centering the remainder.
///
/// A wider-than-box image is constrained by width and centered vertically;
/// otherwise it is constrained by height and centered horizontally. The
/// image is never cropped, so at least one side equals its box bound.
pub fn fit_image_in_bounds(
    image_width: f64,
    image_height: f64,
    box_width: f64,
    box_height: f64,
) -> FitResult {
    let image_aspect = image_width / image_height;
    let box_aspect = box_width / box_height;

    if image_aspect > box_aspect {
        let height = box_width / image_aspect;
        FitResult {
            width: box_width,
            height,
            offset_x: 0.0,
            offset_y: (box_height - height) / 2.0,
        }
    } else {
        let width = box_height * image_aspect;
        FitResult {
            width,
            height: box_height,
            offset_x: (box_width - width) / 2.0,
            offset_y: 0.0,
        }
    }
}
