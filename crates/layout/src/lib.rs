//! Layout - viewport coordinate mapping and field placement
//!
//! This crate provides:
//! - Distinct screen (pixel) and page (point) coordinate types
//! - Viewport measurement and pixel/point conversion
//! - The field model with per-type default and minimum sizes
//! - An interactive placement editor (insert, drag, resize, edit, delete)
//! - The sign request sent to the rendering engine
//!
//! All stored geometry is in page points with a top-left origin. Pixels are
//! derived from points and the current viewport, never the other way round
//! outside of an explicit pointer event.
//!
//! # Example
//!
//! ```ignore
//! use layout::{FieldEditor, FieldType, PageGeometry, RenderedRect, ScreenPoint, Viewport};
//!
//! let pages = vec![PageGeometry::new(0, 612.0, 792.0)?];
//! let mut viewport = Viewport::new();
//! viewport.set_page(pages[0]);
//! viewport.measured(RenderedRect::new(814.0, 1053.4))?;
//!
//! let mut editor = FieldEditor::new(pages);
//! let id = editor.insert(FieldType::Checkbox, 0, ScreenPoint::new(100.0, 100.0), &viewport)?;
//! let request = editor.to_sign_request(None, "contract.pdf");
//! ```

mod editor;
mod field;
mod geometry;
mod request;
mod viewport;

pub use editor::FieldEditor;
pub use field::{clamp_to_page, default_size, FieldId, FieldPlacement, FieldType};
pub use geometry::{PageBox, PageGeometry, PagePoint, ScreenPoint, ScreenRect};
pub use request::{Coordinates, Dimensions, FieldRequest, SignRequest};
pub use viewport::{
    pixel_to_point, point_to_container, point_to_pixel, recompute_viewport, RenderedRect, Viewport,
    ViewportState,
};

use thiserror::Error;

/// Errors that can occur while mapping or editing placements
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("Viewport has not been measured for the current page")]
    ViewportNotReady,

    #[error("Page index {0} out of range (document has {1} pages)")]
    PageOutOfRange(usize, usize),

    #[error("Malformed placement: {0}")]
    MalformedPlacement(String),

    #[error("Field {0} not found")]
    FieldNotFound(u64),

    #[error("Unknown field type: {0}")]
    UnknownFieldType(String),
}

/// Result type for layout operations
pub type Result<T> = std::result::Result<T, LayoutError>;
