//! Interactive field placement
//!
//! [`FieldEditor`] owns the page geometry and the placement list for one
//! document. Pointer positions come in as image-relative pixels and are
//! converted through the current [`Viewport`]; everything stored is in page
//! points. The list order is the order fields are drawn in.

use crate::field::{clamp_box, clamp_to_page, FieldId, FieldPlacement, FieldType};
use crate::geometry::{PageGeometry, PagePoint, ScreenPoint, ScreenRect};
use crate::request::{Coordinates, Dimensions, FieldRequest, SignRequest};
use crate::viewport::{pixel_to_point, point_to_container, Viewport};
use crate::{LayoutError, Result};
use tracing::debug;

/// Pointer interaction in progress
#[derive(Debug, Clone, Copy, PartialEq)]
enum Interaction {
    Drag {
        id: FieldId,
        /// Pointer position relative to the field's top-left corner, in points
        grab_offset: PagePoint,
    },
    Resize {
        id: FieldId,
        start_pixel: ScreenPoint,
        start_width: f64,
        start_height: f64,
    },
}

/// Placement editor for one document
#[derive(Debug, Clone)]
pub struct FieldEditor {
    pages: Vec<PageGeometry>,
    fields: Vec<FieldPlacement>,
    next_id: u64,
    interaction: Option<Interaction>,
}

impl FieldEditor {
    pub fn new(pages: Vec<PageGeometry>) -> Self {
        Self {
            pages,
            fields: Vec::new(),
            next_id: 1,
            interaction: None,
        }
    }

    pub fn pages(&self) -> &[PageGeometry] {
        &self.pages
    }

    pub fn page(&self, page_index: usize) -> Result<&PageGeometry> {
        self.pages
            .get(page_index)
            .ok_or(LayoutError::PageOutOfRange(page_index, self.pages.len()))
    }

    /// Drop a new field with its top-left corner under `drop`
    ///
    /// The field gets its type's default size, capped to the page, and is
    /// clamped onto the page. Fails with `ViewportNotReady` unless `viewport`
    /// is measured for `page_index`, and with `MalformedPlacement` when the
    /// page is smaller than the type's minimum size.
    pub fn insert(
        &mut self,
        field_type: FieldType,
        page_index: usize,
        drop: ScreenPoint,
        viewport: &Viewport,
    ) -> Result<FieldId> {
        let page = *self.page(page_index)?;
        let state = viewport.state_for(page_index)?;

        let (min_width, min_height) = field_type.min_size();
        if page.width_points < min_width || page.height_points < min_height {
            return Err(LayoutError::MalformedPlacement(format!(
                "page {} ({}x{}) cannot hold a {min_width}x{min_height} {field_type} field",
                page_index + 1,
                page.width_points,
                page.height_points
            )));
        }

        let origin = pixel_to_point(drop, state);
        let id = FieldId(self.next_id);
        let mut field = FieldPlacement::new(id, field_type, page_index, origin);
        // small pages shrink the default size, never below the minimum
        field.bounds.width = field.bounds.width.min(page.width_points);
        field.bounds.height = field.bounds.height.min(page.height_points);
        let field = clamp_to_page(&field, &page);
        self.next_id += 1;

        debug!(
            %id,
            %field_type,
            page = page_index + 1,
            x = field.bounds.x,
            y = field.bounds.y,
            "field inserted"
        );
        self.fields.push(field);
        Ok(id)
    }

    /// Start dragging `id` from the pointer position `pointer`
    pub fn begin_drag(
        &mut self,
        id: FieldId,
        pointer: ScreenPoint,
        viewport: &Viewport,
    ) -> Result<()> {
        let field = self.get(id).ok_or(LayoutError::FieldNotFound(id.0))?;
        let state = viewport.state_for(field.page_index)?;

        let at = pixel_to_point(pointer, state);
        self.interaction = Some(Interaction::Drag {
            id,
            grab_offset: PagePoint::new(at.x - field.bounds.x, at.y - field.bounds.y),
        });
        Ok(())
    }

    /// Move the dragged field so the grab point follows the pointer
    ///
    /// Does nothing unless a drag is in progress.
    pub fn drag_to(&mut self, pointer: ScreenPoint, viewport: &Viewport) -> Result<()> {
        let Some(Interaction::Drag { id, grab_offset }) = self.interaction else {
            return Ok(());
        };

        let (page, page_index) = self.field_page(id)?;
        let state = viewport.state_for(page_index)?;
        let at = pixel_to_point(pointer, state);

        let field = self.get_mut(id)?;
        field.bounds.x = at.x - grab_offset.x;
        field.bounds.y = at.y - grab_offset.y;
        field.bounds = clamp_box(field.bounds, &page);
        Ok(())
    }

    /// Start resizing `id` from its bottom-right handle
    pub fn begin_resize(&mut self, id: FieldId, pointer: ScreenPoint) -> Result<()> {
        let field = self.get(id).ok_or(LayoutError::FieldNotFound(id.0))?;
        self.interaction = Some(Interaction::Resize {
            id,
            start_pixel: pointer,
            start_width: field.bounds.width,
            start_height: field.bounds.height,
        });
        Ok(())
    }

    /// Resize by the pointer travel since [`FieldEditor::begin_resize`]
    ///
    /// Width and height never drop below the type's minimum and never extend
    /// past the page edge. Does nothing unless a resize is in progress.
    pub fn resize_to(&mut self, pointer: ScreenPoint, viewport: &Viewport) -> Result<()> {
        let Some(Interaction::Resize {
            id,
            start_pixel,
            start_width,
            start_height,
        }) = self.interaction
        else {
            return Ok(());
        };

        let (page, page_index) = self.field_page(id)?;
        let scale = viewport.state_for(page_index)?.scale();

        let field = self.get_mut(id)?;
        let (min_width, min_height) = field.field_type.min_size();
        let max_width = (page.width_points - field.bounds.x).max(min_width);
        let max_height = (page.height_points - field.bounds.y).max(min_height);

        let width = start_width + (pointer.x - start_pixel.x) / scale;
        let height = start_height + (pointer.y - start_pixel.y) / scale;
        field.bounds.width = width.max(min_width).min(max_width);
        field.bounds.height = height.max(min_height).min(max_height);
        Ok(())
    }

    /// Finish the current drag or resize
    pub fn end_interaction(&mut self) {
        self.interaction = None;
    }

    /// True while a drag or resize is in progress
    pub fn is_interacting(&self) -> bool {
        self.interaction.is_some()
    }

    pub fn set_value(&mut self, id: FieldId, value: impl Into<String>) -> Result<()> {
        self.get_mut(id)?.value = value.into();
        Ok(())
    }

    /// Delete a field; its id is not handed out again
    pub fn remove(&mut self, id: FieldId) -> Result<FieldPlacement> {
        let position = self
            .fields
            .iter()
            .position(|f| f.id == id)
            .ok_or(LayoutError::FieldNotFound(id.0))?;

        let active = match self.interaction {
            Some(Interaction::Drag { id, .. } | Interaction::Resize { id, .. }) => Some(id),
            None => None,
        };
        if active == Some(id) {
            self.interaction = None;
        }

        Ok(self.fields.remove(position))
    }

    pub fn get(&self, id: FieldId) -> Option<&FieldPlacement> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// All fields in placement order
    pub fn fields(&self) -> &[FieldPlacement] {
        &self.fields
    }

    pub fn fields_on_page(&self, page_index: usize) -> impl Iterator<Item = &FieldPlacement> + '_ {
        self.fields.iter().filter(move |f| f.page_index == page_index)
    }

    /// Container-relative pixel box of a field at the current scale
    pub fn screen_rect(&self, id: FieldId, viewport: &Viewport) -> Result<ScreenRect> {
        let field = self.get(id).ok_or(LayoutError::FieldNotFound(id.0))?;
        let state = viewport.state_for(field.page_index)?;

        let origin = point_to_container(field.bounds.origin(), state);
        Ok(ScreenRect {
            x: origin.x,
            y: origin.y,
            width: field.bounds.width * state.scale(),
            height: field.bounds.height * state.scale(),
        })
    }

    /// Signature and image fields without a picture yet
    pub fn pending_capture(&self) -> Vec<FieldId> {
        self.fields
            .iter()
            .filter(|f| f.is_pending_capture())
            .map(|f| f.id)
            .collect()
    }

    /// Build the request for the rendering engine
    ///
    /// Coordinates are sent in page points; the engine only flips them.
    pub fn to_sign_request(&self, document_id: Option<String>, pdf_filename: &str) -> SignRequest {
        let fields = self
            .fields
            .iter()
            .map(|f| FieldRequest {
                field_type: f.field_type,
                page_number: f.page_index + 1,
                browser_coordinates: Coordinates {
                    x: f.bounds.x,
                    y: f.bounds.y,
                    width: f.bounds.width,
                    height: f.bounds.height,
                },
                container_dimensions: self.pages.get(f.page_index).map(|p| Dimensions {
                    width: p.width_points,
                    height: p.height_points,
                }),
                value: Some(f.value.clone()),
            })
            .collect();

        SignRequest {
            document_id,
            pdf_filename: pdf_filename.to_string(),
            fields,
        }
    }

    fn get_mut(&mut self, id: FieldId) -> Result<&mut FieldPlacement> {
        self.fields
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or(LayoutError::FieldNotFound(id.0))
    }

    fn field_page(&self, id: FieldId) -> Result<(PageGeometry, usize)> {
        let field = self.get(id).ok_or(LayoutError::FieldNotFound(id.0))?;
        Ok((*self.page(field.page_index)?, field.page_index))
    }
}
