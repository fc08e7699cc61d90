//! Viewport measurement and pixel/point conversion
//!
//! A [`ViewportState`] only exists once the rendered page has been measured,
//! so the free conversion functions cannot see an unset or zero scale. The
//! [`Viewport`] tracker models the measurement lifecycle: it is reset when the
//! page changes and every conversion made through it before the next
//! measurement fails with `ViewportNotReady`.

use crate::geometry::{PageGeometry, PagePoint, ScreenPoint};
use crate::{LayoutError, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Bounding box of the rendered page image
///
/// `left`/`top` are the image's offset inside its container, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RenderedRect {
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub left: f64,
    #[serde(default)]
    pub top: f64,
}

impl RenderedRect {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            left: 0.0,
            top: 0.0,
        }
    }

    pub fn with_offset(mut self, left: f64, top: f64) -> Self {
        self.left = left;
        self.top = top;
        self
    }
}

/// Measured viewport for one page
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportState {
    page_index: usize,
    rendered_width_px: f64,
    rendered_height_px: f64,
    offset_left_px: f64,
    offset_top_px: f64,
    scale: f64,
}

impl ViewportState {
    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn rendered_width_px(&self) -> f64 {
        self.rendered_width_px
    }

    pub fn rendered_height_px(&self) -> f64 {
        self.rendered_height_px
    }

    pub fn offset_left_px(&self) -> f64 {
        self.offset_left_px
    }

    pub fn offset_top_px(&self) -> f64 {
        self.offset_top_px
    }

    /// Pixels per point, always finite and positive
    pub fn scale(&self) -> f64 {
        self.scale
    }
}

/// Derive the viewport from the rendered page's bounding box
///
/// `scale = rendered width / page width`. Fails with `ViewportNotReady` when
/// the rendered width is not a positive finite number (page not laid out
/// yet).
pub fn recompute_viewport(rendered: RenderedRect, page: &PageGeometry) -> Result<ViewportState> {
    if !(rendered.width.is_finite() && rendered.width > 0.0) {
        return Err(LayoutError::ViewportNotReady);
    }

    let scale = rendered.width / page.width_points;
    if !(scale.is_finite() && scale > 0.0) {
        return Err(LayoutError::ViewportNotReady);
    }

    let finite_or_zero = |v: f64| if v.is_finite() { v } else { 0.0 };

    Ok(ViewportState {
        page_index: page.page_index,
        rendered_width_px: rendered.width,
        rendered_height_px: finite_or_zero(rendered.height),
        offset_left_px: finite_or_zero(rendered.left),
        offset_top_px: finite_or_zero(rendered.top),
        scale,
    })
}

/// Image-relative pixels to page points
pub fn pixel_to_point(pixel: ScreenPoint, viewport: &ViewportState) -> PagePoint {
    PagePoint::new(pixel.x / viewport.scale, pixel.y / viewport.scale)
}

/// Page points to image-relative pixels
pub fn point_to_pixel(point: PagePoint, viewport: &ViewportState) -> ScreenPoint {
    ScreenPoint::new(point.x * viewport.scale, point.y * viewport.scale)
}

/// Page points to container-relative pixels
pub fn point_to_container(point: PagePoint, viewport: &ViewportState) -> ScreenPoint {
    let pixel = point_to_pixel(point, viewport);
    ScreenPoint::new(
        pixel.x + viewport.offset_left_px,
        pixel.y + viewport.offset_top_px,
    )
}

/// Measurement lifecycle for the currently displayed page
#[derive(Debug, Clone, Default)]
pub struct Viewport {
    page: Option<PageGeometry>,
    state: Option<ViewportState>,
}

impl Viewport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch to `page`
    ///
    /// Any previous measurement is dropped unless the page is unchanged;
    /// pages of one document may differ in size.
    pub fn set_page(&mut self, page: PageGeometry) {
        if self.page != Some(page) {
            debug!(page_index = page.page_index, "viewport page changed");
            self.state = None;
        }
        self.page = Some(page);
    }

    /// Record the rendered size of the current page
    pub fn measured(&mut self, rendered: RenderedRect) -> Result<ViewportState> {
        let page = self.page.ok_or(LayoutError::ViewportNotReady)?;
        match recompute_viewport(rendered, &page) {
            Ok(state) => {
                debug!(
                    page_index = page.page_index,
                    scale = state.scale,
                    "viewport measured"
                );
                self.state = Some(state);
                Ok(state)
            }
            Err(e) => {
                self.state = None;
                Err(e)
            }
        }
    }

    /// Forget the measurement (e.g. the container is being re-laid out)
    pub fn invalidate(&mut self) {
        self.state = None;
    }

    pub fn page(&self) -> Option<&PageGeometry> {
        self.page.as_ref()
    }

    pub fn is_ready(&self) -> bool {
        self.state.is_some()
    }

    pub fn state(&self) -> Result<&ViewportState> {
        self.state.as_ref().ok_or(LayoutError::ViewportNotReady)
    }

    /// Measured state, provided it belongs to `page_index`
    pub fn state_for(&self, page_index: usize) -> Result<&ViewportState> {
        let state = self.state()?;
        if state.page_index != page_index {
            return Err(LayoutError::ViewportNotReady);
        }
        Ok(state)
    }

    pub fn pixel_to_point(&self, pixel: ScreenPoint) -> Result<PagePoint> {
        Ok(pixel_to_point(pixel, self.state()?))
    }

    pub fn point_to_pixel(&self, point: PagePoint) -> Result<ScreenPoint> {
        Ok(point_to_pixel(point, self.state()?))
    }

    pub fn point_to_container(&self, point: PagePoint) -> Result<ScreenPoint> {
        Ok(point_to_container(point, self.state()?))
    }
}
