//! PDF Document wrapper

use crate::image::{generate_image_operators, placement_rect, ImageXObject};
use crate::text::{generate_text_operators, TextRenderContext};
use crate::{ImageDimensions, PdfError, PdfRect, Result, Shape};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, HashMap};
use std::hash::{Hash, Hasher};
use std::path::Path;
use tracing::debug;

/// Depth limit when walking the page tree for inherited attributes
const MAX_TREE_DEPTH: usize = 32;

/// US Letter, used when neither the page nor its ancestors carry a MediaBox
const FALLBACK_MEDIA_BOX: [f64; 4] = [0.0, 0.0, 612.0, 792.0];

/// RGB Color (values 0.0 - 1.0)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    /// Create a new RGB color (values 0.0 - 1.0)
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Create color from RGB values (0-255)
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }

    /// Black color
    pub fn black() -> Self {
        Self::rgb(0.0, 0.0, 0.0)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

/// Image already added to the document
#[derive(Debug, Clone, Copy)]
struct EmbeddedImage {
    object_id: ObjectId,
    dimensions: ImageDimensions,
}

/// PDF Document wrapper providing high-level drawing operations
///
/// Drawing calls only buffer content operators; pages are rewritten once in
/// [`PdfDocument::to_bytes`]. Operators for a page are kept in call order, so
/// later calls paint over earlier ones.
pub struct PdfDocument {
    /// The underlying lopdf document
    inner: Document,
    /// Standard Helvetica font dictionary, created on first text insertion
    standard_font: Option<ObjectId>,
    /// Page number -> font resource name
    page_font_resources: HashMap<usize, String>,
    /// Embedded images (data hash -> image)
    embedded_images: HashMap<u64, EmbeddedImage>,
    /// Page number -> image object -> resource name
    page_image_resources: HashMap<usize, HashMap<ObjectId, String>>,
    /// Next resource number, shared by fonts and images
    next_resource: u32,
    /// Buffered content operators per page (page number -> operators)
    page_content_buffer: BTreeMap<usize, Vec<u8>>,
}

impl PdfDocument {
    /// Open a PDF document from a file path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let inner = Document::load(path).map_err(|e| PdfError::OpenError(e.to_string()))?;
        Self::from_document(inner)
    }

    /// Open a PDF document from bytes
    pub fn open_from_bytes(data: &[u8]) -> Result<Self> {
        if data.is_empty() {
            return Err(PdfError::OpenError("empty input".to_string()));
        }
        let inner = Document::load_mem(data).map_err(|e| PdfError::OpenError(e.to_string()))?;
        Self::from_document(inner)
    }

    fn from_document(inner: Document) -> Result<Self> {
        if inner.get_pages().is_empty() {
            return Err(PdfError::OpenError("document has no pages".to_string()));
        }

        Ok(Self {
            inner,
            standard_font: None,
            page_font_resources: HashMap::new(),
            embedded_images: HashMap::new(),
            page_image_resources: HashMap::new(),
            next_resource: 1,
            page_content_buffer: BTreeMap::new(),
        })
    }

    /// Get the number of pages in the document
    pub fn page_count(&self) -> usize {
        self.inner.get_pages().len()
    }

    /// Get a reference to the underlying lopdf document
    pub fn inner(&self) -> &Document {
        &self.inner
    }

    /// Fail with `InvalidPage` unless `page` (1-indexed) exists
    pub fn validate_page(&self, page: usize) -> Result<()> {
        let page_count = self.page_count();
        if page == 0 || page > page_count {
            return Err(PdfError::InvalidPage(page, page_count));
        }
        Ok(())
    }

    /// Page MediaBox as a rectangle
    ///
    /// The box is inherited from ancestor Pages nodes when the page itself
    /// has none; CropBox is not consulted since drawing coordinates are
    /// relative to the MediaBox.
    pub fn page_box(&self, page: usize) -> Result<PdfRect> {
        let page_id = self.page_id(page)?;

        let values = match self.inherited_attribute(page_id, b"MediaBox")? {
            Some(obj) => self.number_array(&obj)?,
            None => FALLBACK_MEDIA_BOX.to_vec(),
        };
        if values.len() < 4 {
            return Err(PdfError::ParseError("Invalid MediaBox format".to_string()));
        }

        let (x1, x2) = (values[0].min(values[2]), values[0].max(values[2]));
        let (y1, y2) = (values[1].min(values[3]), values[1].max(values[3]));
        if x2 - x1 <= 0.0 || y2 - y1 <= 0.0 {
            return Err(PdfError::ParseError(format!(
                "Degenerate MediaBox on page {page}"
            )));
        }

        Ok(PdfRect::new(x1, y1, x2 - x1, y2 - y1))
    }

    /// Page `(width, height)` in points
    pub fn page_size(&self, page: usize) -> Result<(f64, f64)> {
        let rect = self.page_box(page)?;
        Ok((rect.width, rect.height))
    }

    /// Sizes of all pages, in page order
    pub fn page_sizes(&self) -> Result<Vec<(f64, f64)>> {
        (1..=self.page_count()).map(|p| self.page_size(p)).collect()
    }

    /// Insert one line of text with the standard Helvetica font
    ///
    /// # Arguments
    /// * `text` - Text to insert
    /// * `page` - Page number (1-indexed)
    /// * `x` - Left edge in points (PDF coordinates)
    /// * `y` - Baseline in points (PDF coordinates, from bottom)
    /// * `font_size` - Font size in points
    /// * `color` - Fill color
    pub fn insert_text(
        &mut self,
        text: &str,
        page: usize,
        x: f64,
        y: f64,
        font_size: f64,
        color: Color,
    ) -> Result<()> {
        self.validate_page(page)?;

        if text.is_empty() {
            return Ok(());
        }

        let ctx = TextRenderContext {
            font_name: self.get_or_create_font_ref(page)?,
            font_size,
            color,
        };
        let operators = generate_text_operators(text, x, y, &ctx);
        self.buffer_content(page, &operators);

        Ok(())
    }

    /// Insert a PNG or JPEG image, aspect-fitted and centered in `rect`
    ///
    /// Returns the rectangle the image actually occupies.
    pub fn insert_image(&mut self, data: &[u8], page: usize, rect: PdfRect) -> Result<PdfRect> {
        self.validate_page(page)?;

        let (resource_name, dimensions) = self.get_or_create_image_ref(data, page)?;
        let target = placement_rect(dimensions, &rect);

        let operators = generate_image_operators(&resource_name, &target);
        self.buffer_content(page, &operators);

        Ok(target)
    }

    /// Draw a vector shape
    pub fn draw_shape(&mut self, page: usize, shape: &Shape) -> Result<()> {
        self.validate_page(page)?;
        self.buffer_content(page, &shape.to_operators());
        Ok(())
    }

    /// True when nothing has been drawn yet
    pub fn is_unchanged(&self) -> bool {
        self.page_content_buffer.values().all(|ops| ops.is_empty())
    }

    /// Save the document to a file
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.flush_content_buffers()?;
        self.inner
            .save(path)
            .map_err(|e| PdfError::SaveError(e.to_string()))?;
        Ok(())
    }

    /// Save the document to bytes
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        self.flush_content_buffers()?;

        let mut buffer = Vec::new();
        self.inner
            .save_to(&mut buffer)
            .map_err(|e| PdfError::SaveError(e.to_string()))?;

        Ok(buffer)
    }

    /// Get or create the font resource for a page
    fn get_or_create_font_ref(&mut self, page: usize) -> Result<String> {
        if let Some(name) = self.page_font_resources.get(&page) {
            return Ok(name.clone());
        }

        let font_id = match self.standard_font {
            Some(id) => id,
            None => {
                let mut font = Dictionary::new();
                font.set("Type", Object::Name(b"Font".to_vec()));
                font.set("Subtype", Object::Name(b"Type1".to_vec()));
                font.set("BaseFont", Object::Name(b"Helvetica".to_vec()));
                font.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));
                let id = self.inner.add_object(font);
                self.standard_font = Some(id);
                id
            }
        };

        let name = self.unused_resource_name(page, b"Font", "F")?;
        self.set_page_resource(page, b"Font", &name, font_id)?;
        self.page_font_resources.insert(page, name.clone());

        Ok(name)
    }

    /// Get or create an image resource for a page
    ///
    /// Images are deduplicated by a hash of their data, so a signature
    /// placed several times is embedded once.
    fn get_or_create_image_ref(
        &mut self,
        data: &[u8],
        page: usize,
    ) -> Result<(String, ImageDimensions)> {
        let mut hasher = DefaultHasher::new();
        data.hash(&mut hasher);
        let data_hash = hasher.finish();

        let image = match self.embedded_images.get(&data_hash) {
            Some(image) => *image,
            None => {
                let xobject = ImageXObject::from_bytes(data)?;
                let image = EmbeddedImage {
                    object_id: xobject.embed(&mut self.inner),
                    dimensions: xobject.dimensions(),
                };
                debug!(
                    width = image.dimensions.width,
                    height = image.dimensions.height,
                    "embedded image XObject"
                );
                self.embedded_images.insert(data_hash, image);
                image
            }
        };

        if let Some(name) = self
            .page_image_resources
            .get(&page)
            .and_then(|resources| resources.get(&image.object_id))
        {
            return Ok((name.clone(), image.dimensions));
        }

        let name = self.unused_resource_name(page, b"XObject", "Im")?;
        self.set_page_resource(page, b"XObject", &name, image.object_id)?;
        self.page_image_resources
            .entry(page)
            .or_default()
            .insert(image.object_id, name.clone());

        Ok((name, image.dimensions))
    }

    fn page_id(&self, page: usize) -> Result<ObjectId> {
        let pages = self.inner.get_pages();
        pages
            .get(&(page as u32))
            .copied()
            .ok_or(PdfError::InvalidPage(page, pages.len()))
    }

    /// Resolve a direct or referenced object
    fn resolve<'a>(&'a self, obj: &'a Object) -> Result<&'a Object> {
        match obj {
            Object::Reference(id) => Ok(self.inner.get_object(*id)?),
            other => Ok(other),
        }
    }

    fn resolve_dict(&self, obj: &Object) -> Result<Dictionary> {
        self.resolve(obj)?
            .as_dict()
            .cloned()
            .map_err(|_| PdfError::ParseError("expected a dictionary".to_string()))
    }

    fn number_array(&self, obj: &Object) -> Result<Vec<f64>> {
        let array = self
            .resolve(obj)?
            .as_array()
            .map_err(|_| PdfError::ParseError("expected an array".to_string()))?;

        array
            .iter()
            .map(|item| match self.resolve(item)? {
                Object::Integer(i) => Ok(*i as f64),
                Object::Real(r) => Ok(*r as f64),
                _ => Err(PdfError::ParseError("expected a number".to_string())),
            })
            .collect()
    }

    /// Look up `key` on the page, then on its ancestors
    fn inherited_attribute(&self, page_id: ObjectId, key: &[u8]) -> Result<Option<Object>> {
        let mut current_id = page_id;

        for _ in 0..MAX_TREE_DEPTH {
            let dict = self
                .inner
                .get_object(current_id)?
                .as_dict()
                .map_err(|_| {
                    PdfError::ParseError("Page tree node is not a dictionary".to_string())
                })?;

            if let Ok(value) = dict.get(key) {
                return Ok(Some(value.clone()));
            }

            match dict.get(b"Parent") {
                Ok(Object::Reference(parent_id)) => current_id = *parent_id,
                _ => break,
            }
        }

        Ok(None)
    }

    /// Effective Resources dictionary of a page, with references resolved
    fn page_resources(&self, page_id: ObjectId) -> Result<Dictionary> {
        match self.inherited_attribute(page_id, b"Resources")? {
            Some(obj) => self.resolve_dict(&obj),
            None => Ok(Dictionary::new()),
        }
    }

    fn resource_category(&self, resources: &Dictionary, category: &[u8]) -> Result<Dictionary> {
        match resources.get(category) {
            Ok(obj) => self.resolve_dict(obj),
            Err(_) => Ok(Dictionary::new()),
        }
    }

    /// Next `<prefix><n>` not already used in the page's `category` resources
    fn unused_resource_name(
        &mut self,
        page: usize,
        category: &[u8],
        prefix: &str,
    ) -> Result<String> {
        let resources = self.page_resources(self.page_id(page)?)?;
        let existing = self.resource_category(&resources, category)?;

        loop {
            let name = format!("{prefix}{}", self.next_resource);
            self.next_resource += 1;
            if !existing.has(name.as_bytes()) {
                return Ok(name);
            }
        }
    }

    /// Add `name -> id` to a page's resources
    ///
    /// The page gets its own direct Resources dictionary so inherited or
    /// shared resource dictionaries are never modified in place.
    fn set_page_resource(
        &mut self,
        page: usize,
        category: &[u8],
        name: &str,
        id: ObjectId,
    ) -> Result<()> {
        let page_id = self.page_id(page)?;
        let mut resources = self.page_resources(page_id)?;
        let mut entries = self.resource_category(&resources, category)?;

        entries.set(name.as_bytes(), Object::Reference(id));
        resources.set(category, Object::Dictionary(entries));

        let mut page_dict = self
            .inner
            .get_object(page_id)?
            .as_dict()
            .map_err(|_| PdfError::ParseError("Page object is not a dictionary".to_string()))?
            .clone();
        page_dict.set("Resources", Object::Dictionary(resources));
        self.inner.objects.insert(page_id, Object::Dictionary(page_dict));

        Ok(())
    }

    /// Buffer content operators for a page (written at save time)
    fn buffer_content(&mut self, page: usize, content: &[u8]) {
        self.page_content_buffer
            .entry(page)
            .or_default()
            .extend_from_slice(content);
    }

    /// Flush all buffered content to page streams
    ///
    /// The page's original content is bracketed by `q`/`Q` so whatever
    /// graphics state it leaves behind cannot shift the appended drawing.
    /// Existing streams are referenced, not decoded.
    fn flush_content_buffers(&mut self) -> Result<()> {
        let buffers = std::mem::take(&mut self.page_content_buffer);

        for (page, content) in buffers {
            if content.is_empty() {
                continue;
            }

            let page_id = self.page_id(page)?;
            let mut page_dict = self
                .inner
                .get_object(page_id)?
                .as_dict()
                .map_err(|_| PdfError::ParseError("Page object is not a dictionary".to_string()))?
                .clone();

            let existing: Vec<Object> = match page_dict.get(b"Contents") {
                Ok(Object::Array(items)) => items.clone(),
                Ok(Object::Reference(id)) => vec![Object::Reference(*id)],
                Ok(Object::Stream(stream)) => {
                    let id = self.inner.add_object(stream.clone());
                    vec![Object::Reference(id)]
                }
                _ => Vec::new(),
            };

            let mut contents = Vec::with_capacity(existing.len() + 2);
            if !existing.is_empty() {
                let open = self
                    .inner
                    .add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
                contents.push(Object::Reference(open));
                contents.extend(existing);
            }

            let mut appended = Vec::with_capacity(content.len() + 4);
            if !contents.is_empty() {
                appended.extend_from_slice(b"\nQ\n");
            }
            appended.extend_from_slice(&content);
            let appended_id = self
                .inner
                .add_object(Stream::new(Dictionary::new(), appended));
            contents.push(Object::Reference(appended_id));

            page_dict.set("Contents", Object::Array(contents));
            self.inner.objects.insert(page_id, Object::Dictionary(page_dict));
        }

        Ok(())
    }
}
