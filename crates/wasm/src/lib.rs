//! WASM bindings for pdfsign
//!
//! This crate provides JavaScript-friendly API for:
//! - Reading page count and page sizes of an uploaded PDF
//! - Placing, dragging, resizing and editing fields over the rendered page
//! - Burning the fields into the PDF
//!
//! # Example (JavaScript)
//!
//! ```javascript
//! import init, { PdfEditor, signPdf } from 'pdfsign-wasm';
//!
//! await init();
//!
//! const editor = new PdfEditor(pdfBytes);
//! editor.setPage(0);
//!
//! // once the page canvas has been laid out
//! const rect = canvas.getBoundingClientRect();
//! editor.measured(rect.width, rect.height, rect.left - container.left, rect.top - container.top);
//!
//! const id = editor.insert('signature', 0, event.clientX - rect.left, event.clientY - rect.top);
//! editor.setValue(id, signatureDataUri);
//!
//! const response = signPdf(pdfBytes, editor.toSignRequest(null, 'contract.pdf'));
//! ```

use layout::{
    FieldEditor, FieldId, FieldType, PageGeometry, RenderedRect, ScreenPoint, Viewport,
};
use serde::Serialize;
use signer::RenderConfig;
use wasm_bindgen::prelude::*;

// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn js_error(e: impl ToString) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(JsValue::from)
}

/// Field editor bound to one document
#[wasm_bindgen]
pub struct PdfEditor {
    editor: FieldEditor,
    viewport: Viewport,
}

impl PdfEditor {
    fn open(pdf_bytes: &[u8]) -> Result<PdfEditor, String> {
        let info = signer::inspect_document(pdf_bytes).map_err(|e| e.to_string())?;
        let pages = info
            .page_dimensions
            .iter()
            .enumerate()
            .map(|(index, d)| PageGeometry::new(index, d.width, d.height))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| e.to_string())?;

        Ok(PdfEditor {
            editor: FieldEditor::new(pages),
            viewport: Viewport::new(),
        })
    }

    fn select_page(&mut self, page_index: usize) -> Result<(), String> {
        let page = *self.editor.page(page_index).map_err(|e| e.to_string())?;
        self.viewport.set_page(page);
        Ok(())
    }

    fn insert_field(
        &mut self,
        field_type: &str,
        page_index: usize,
        x: f64,
        y: f64,
    ) -> Result<u32, String> {
        let field_type: FieldType = field_type
            .parse()
            .map_err(|e: layout::LayoutError| e.to_string())?;
        let id = self
            .editor
            .insert(field_type, page_index, ScreenPoint::new(x, y), &self.viewport)
            .map_err(|e| e.to_string())?;
        u32::try_from(id.0).map_err(|_| format!("field id {id} does not fit in u32"))
    }

    fn sign_request_json(
        &self,
        document_id: Option<String>,
        pdf_filename: &str,
    ) -> Result<String, String> {
        self.editor
            .to_sign_request(document_id, pdf_filename)
            .to_json()
            .map_err(|e| e.to_string())
    }
}

#[wasm_bindgen]
impl PdfEditor {
    /// Open an editor for a PDF
    ///
    /// @param pdfBytes - PDF file bytes (Uint8Array)
    #[wasm_bindgen(constructor)]
    pub fn new(pdf_bytes: &[u8]) -> Result<PdfEditor, JsValue> {
        PdfEditor::open(pdf_bytes).map_err(js_error)
    }

    /// Number of pages
    #[wasm_bindgen(js_name = pageCount)]
    pub fn page_count(&self) -> usize {
        self.editor.pages().len()
    }

    /// Page size in points
    ///
    /// @param pageIndex - Zero-based page index
    /// @returns { pageIndex, widthPoints, heightPoints }
    #[wasm_bindgen(js_name = pageSize)]
    pub fn page_size(&self, page_index: usize) -> Result<JsValue, JsValue> {
        let page = self.editor.page(page_index).map_err(js_error)?;
        to_js(page)
    }

    /// Show another page; the viewport must be measured again
    #[wasm_bindgen(js_name = setPage)]
    pub fn set_page(&mut self, page_index: usize) -> Result<(), JsValue> {
        self.select_page(page_index).map_err(js_error)
    }

    /// Report the rendered page's bounding box
    ///
    /// @param width - Rendered width in pixels
    /// @param height - Rendered height in pixels
    /// @param left - Offset of the page image inside its container
    /// @param top - Offset of the page image inside its container
    /// @returns Pixels per point
    pub fn measured(
        &mut self,
        width: f64,
        height: f64,
        left: f64,
        top: f64,
    ) -> Result<f64, JsValue> {
        let rect = RenderedRect::new(width, height).with_offset(left, top);
        let state = self.viewport.measured(rect).map_err(js_error)?;
        Ok(state.scale())
    }

    /// Forget the current measurement
    pub fn invalidate(&mut self) {
        self.viewport.invalidate();
    }

    /// Drop a new field with its top-left corner at an image-relative pixel
    ///
    /// @returns Field id
    pub fn insert(
        &mut self,
        field_type: &str,
        page_index: usize,
        x: f64,
        y: f64,
    ) -> Result<u32, JsValue> {
        self.insert_field(field_type, page_index, x, y).map_err(js_error)
    }

    #[wasm_bindgen(js_name = beginDrag)]
    pub fn begin_drag(&mut self, id: u32, x: f64, y: f64) -> Result<(), JsValue> {
        self.editor
            .begin_drag(FieldId(id.into()), ScreenPoint::new(x, y), &self.viewport)
            .map_err(js_error)
    }

    #[wasm_bindgen(js_name = dragTo)]
    pub fn drag_to(&mut self, x: f64, y: f64) -> Result<(), JsValue> {
        self.editor
            .drag_to(ScreenPoint::new(x, y), &self.viewport)
            .map_err(js_error)
    }

    #[wasm_bindgen(js_name = beginResize)]
    pub fn begin_resize(&mut self, id: u32, x: f64, y: f64) -> Result<(), JsValue> {
        self.editor
            .begin_resize(FieldId(id.into()), ScreenPoint::new(x, y))
            .map_err(js_error)
    }

    #[wasm_bindgen(js_name = resizeTo)]
    pub fn resize_to(&mut self, x: f64, y: f64) -> Result<(), JsValue> {
        self.editor
            .resize_to(ScreenPoint::new(x, y), &self.viewport)
            .map_err(js_error)
    }

    #[wasm_bindgen(js_name = endInteraction)]
    pub fn end_interaction(&mut self) {
        self.editor.end_interaction();
    }

    /// True while a drag or resize is in progress
    #[wasm_bindgen(js_name = isInteracting)]
    pub fn is_interacting(&self) -> bool {
        self.editor.is_interacting()
    }

    #[wasm_bindgen(js_name = setValue)]
    pub fn set_value(&mut self, id: u32, value: &str) -> Result<(), JsValue> {
        self.editor
            .set_value(FieldId(id.into()), value)
            .map_err(js_error)
    }

    pub fn remove(&mut self, id: u32) -> Result<(), JsValue> {
        self.editor
            .remove(FieldId(id.into()))
            .map(|_| ())
            .map_err(js_error)
    }

    /// All placements in page points
    pub fn fields(&self) -> Result<JsValue, JsValue> {
        to_js(&self.editor.fields())
    }

    /// Container-relative pixel box of a field at the current scale
    ///
    /// @returns { x, y, width, height }
    #[wasm_bindgen(js_name = screenRect)]
    pub fn screen_rect(&self, id: u32) -> Result<JsValue, JsValue> {
        let rect = self
            .editor
            .screen_rect(FieldId(id.into()), &self.viewport)
            .map_err(js_error)?;
        to_js(&rect)
    }

    /// Ids of signature/image fields still waiting for a picture
    #[wasm_bindgen(js_name = pendingCapture)]
    pub fn pending_capture(&self) -> Result<JsValue, JsValue> {
        to_js(&self.editor.pending_capture())
    }

    /// Sign request JSON for `signPdf`
    #[wasm_bindgen(js_name = toSignRequest)]
    pub fn to_sign_request(
        &self,
        document_id: Option<String>,
        pdf_filename: &str,
    ) -> Result<String, JsValue> {
        self.sign_request_json(document_id, pdf_filename)
            .map_err(js_error)
    }
}

/// Burn the fields of a sign request into a PDF
///
/// @param pdfBytes - PDF file bytes (Uint8Array)
/// @param requestJson - Sign request JSON
/// @returns { success, signedPdf: { filename, url, fileBase64 }, records, skipped }
#[wasm_bindgen(js_name = signPdf)]
pub fn sign_pdf(pdf_bytes: &[u8], request_json: &str) -> Result<JsValue, JsValue> {
    let response =
        signer::sign_json(request_json, pdf_bytes, &RenderConfig::default()).map_err(js_error)?;
    to_js(&response)
}

/// Page count and page sizes of a PDF
///
/// @returns { pageCount, pageDimensions: [{ width, height }] }
#[wasm_bindgen(js_name = inspectPdf)]
pub fn inspect_pdf(pdf_bytes: &[u8]) -> Result<JsValue, JsValue> {
    let info = signer::inspect_document(pdf_bytes).map_err(js_error)?;
    to_js(&info)
}
