//! Integration tests for pdf-core
//!
//! These tests verify end-to-end functionality with real PDF operations.

use image::{DynamicImage, ImageBuffer, Luma, Rgb, Rgba};
use lopdf::{dictionary, Document, Object};
use pdf_core::{Color, PdfDocument, PdfError, PdfRect, Shape};
use pretty_assertions::assert_eq;
use std::io::Cursor;

/// Create a minimal valid PDF with US Letter pages for testing
fn create_test_pdf_with_pages(page_count: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");

    let pages_id = doc.add_object(Object::Dictionary(dictionary! {
        "Type" => "Pages",
        "Count" => page_count as i32,
        "Kids" => vec![], // Will be updated below
    }));

    let mut page_ids = Vec::new();
    for _ in 0..page_count {
        let contents_id = doc.add_object(Object::Stream(lopdf::Stream::new(
            dictionary! {},
            b"0 0 1 rg 10 10 50 50 re f".to_vec(),
        )));

        let page_id = doc.add_object(Object::Dictionary(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Resources" => dictionary! {},
            "Contents" => contents_id,
        }));
        page_ids.push(page_id);
    }

    let mut pages_dict = doc.get_object(pages_id).unwrap().as_dict().unwrap().clone();
    pages_dict.set(
        "Kids",
        Object::Array(page_ids.into_iter().map(|id| id.into()).collect()),
    );
    doc.objects.insert(pages_id, pages_dict.into());

    let catalog_id = doc.add_object(Object::Dictionary(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    }));
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

fn create_test_pdf() -> Vec<u8> {
    create_test_pdf_with_pages(1)
}

/// Create a 32x16 RGB JPEG for testing
fn create_test_jpeg() -> Vec<u8> {
    let img = ImageBuffer::from_fn(32, 16, |x, y| Rgb([(x * 8) as u8, (y * 16) as u8, 128]));
    let mut buffer = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Jpeg)
        .unwrap();
    buffer
}

fn encode_png(img: DynamicImage) -> Vec<u8> {
    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Png)
        .unwrap();
    buffer
}

/// 400x100 signature with transparent background
fn create_signature_png() -> Vec<u8> {
    let img = ImageBuffer::from_fn(400, 100, |x, _| {
        if x % 7 == 0 {
            Rgba([0u8, 0, 0, 255])
        } else {
            Rgba([0u8, 0, 0, 0])
        }
    });
    encode_png(DynamicImage::ImageRgba8(img))
}

fn create_gray_png() -> Vec<u8> {
    let img = ImageBuffer::from_fn(16, 16, |x, y| Luma([((x + y) * 8) as u8]));
    encode_png(DynamicImage::ImageLuma8(img))
}

fn page_content(bytes: &[u8], page: u32) -> String {
    let doc = Document::load_mem(bytes).unwrap();
    let page_id = *doc.get_pages().get(&page).unwrap();
    String::from_utf8_lossy(&doc.get_page_content(page_id).unwrap()).into_owned()
}

fn count_objects(bytes: &[u8], predicate: impl Fn(&lopdf::Dictionary) -> bool) -> usize {
    let doc = Document::load_mem(bytes).unwrap();
    doc.objects
        .values()
        .filter(|obj| match obj {
            Object::Stream(stream) => predicate(&stream.dict),
            Object::Dictionary(dict) => predicate(dict),
            _ => false,
        })
        .count()
}

fn is_image(dict: &lopdf::Dictionary) -> bool {
    matches!(dict.get(b"Subtype"), Ok(Object::Name(name)) if name == b"Image")
}

#[test]
fn test_open_save_roundtrip() {
    let pdf_data = create_test_pdf();
    let mut doc = PdfDocument::open_from_bytes(&pdf_data).unwrap();
    assert_eq!(doc.page_count(), 1);
    assert!(doc.is_unchanged());

    let saved = doc.to_bytes().unwrap();
    let doc2 = PdfDocument::open_from_bytes(&saved).unwrap();
    assert_eq!(doc2.page_count(), 1);
    assert_eq!(page_content(&saved, 1), "0 0 1 rg 10 10 50 50 re f");
}

#[test]
fn test_page_geometry() {
    let doc = PdfDocument::open_from_bytes(&create_test_pdf_with_pages(3)).unwrap();
    assert_eq!(doc.page_size(1).unwrap(), (612.0, 792.0));
    assert_eq!(doc.page_sizes().unwrap(), vec![(612.0, 792.0); 3]);
    assert_eq!(
        doc.page_box(2).unwrap(),
        PdfRect::new(0.0, 0.0, 612.0, 792.0)
    );
}

#[test]
fn test_insert_text_basic() {
    let mut doc = PdfDocument::open_from_bytes(&create_test_pdf()).unwrap();
    doc.insert_text("Jane Doe", 1, 74.0, 695.33, 14.0, Color::black())
        .unwrap();
    assert!(!doc.is_unchanged());

    let saved = doc.to_bytes().unwrap();
    let content = page_content(&saved, 1);

    // original content is isolated in its own graphics state
    assert!(content.starts_with("q\n0 0 1 rg 10 10 50 50 re f"));
    assert!(content.contains("\nQ\nBT\n0 0 0 rg\n/F1 14 Tf\n74 695.33 Td\n(Jane Doe) Tj\nET\n"));

    let helvetica = count_objects(&saved, |dict| {
        matches!(dict.get(b"BaseFont"), Ok(Object::Name(name)) if name == b"Helvetica")
    });
    assert_eq!(helvetica, 1);
}

#[test]
fn test_text_on_multiple_pages_shares_font() {
    let mut doc = PdfDocument::open_from_bytes(&create_test_pdf_with_pages(2)).unwrap();
    doc.insert_text("Page one", 1, 72.0, 700.0, 12.0, Color::black())
        .unwrap();
    doc.insert_text("Page two", 2, 72.0, 700.0, 12.0, Color::black())
        .unwrap();

    let saved = doc.to_bytes().unwrap();
    assert!(page_content(&saved, 1).contains("(Page one) Tj"));
    assert!(page_content(&saved, 2).contains("(Page two) Tj"));
    assert!(!page_content(&saved, 1).contains("Page two"));

    let helvetica = count_objects(&saved, |dict| {
        matches!(dict.get(b"BaseFont"), Ok(Object::Name(name)) if name == b"Helvetica")
    });
    assert_eq!(helvetica, 1);
}

#[test]
fn test_insert_image_fit() {
    let mut doc = PdfDocument::open_from_bytes(&create_test_pdf()).unwrap();
    let drawn = doc
        .insert_image(&create_signature_png(), 1, PdfRect::new(100.0, 200.0, 150.0, 40.0))
        .unwrap();
    assert_eq!(drawn, PdfRect::new(100.0, 201.25, 150.0, 37.5));

    let saved = doc.to_bytes().unwrap();
    assert!(page_content(&saved, 1).contains("q\n150 0 0 37.5 100 201.25 cm\n/Im1 Do\nQ\n"));

    // signature stroke plus its transparency mask
    assert_eq!(count_objects(&saved, is_image), 2);
    let with_mask = count_objects(&saved, |dict| is_image(dict) && dict.has(b"SMask"));
    assert_eq!(with_mask, 1);
}

#[test]
fn test_insert_image_jpeg_passthrough() {
    let mut doc = PdfDocument::open_from_bytes(&create_test_pdf()).unwrap();
    let rect = PdfRect::new(10.0, 10.0, 100.0, 100.0);
    let drawn = doc.insert_image(&create_test_jpeg(), 1, rect).unwrap();
    // 2:1 image centered vertically in a square
    assert_eq!(drawn, PdfRect::new(10.0, 35.0, 100.0, 50.0));

    let saved = doc.to_bytes().unwrap();
    let jpeg = count_objects(&saved, |dict| {
        is_image(dict)
            && matches!(dict.get(b"Filter"), Ok(Object::Name(name)) if name == b"DCTDecode")
    });
    assert_eq!(jpeg, 1);
}

#[test]
fn test_image_deduplication() {
    let png = create_gray_png();
    let mut doc = PdfDocument::open_from_bytes(&create_test_pdf_with_pages(2)).unwrap();
    for page in [1, 1, 2] {
        doc.insert_image(&png, page, PdfRect::new(10.0, 10.0, 30.0, 30.0))
            .unwrap();
    }

    let saved = doc.to_bytes().unwrap();
    assert_eq!(count_objects(&saved, is_image), 1);
    assert_eq!(page_content(&saved, 1).matches(" Do\n").count(), 2);
    assert_eq!(page_content(&saved, 2).matches(" Do\n").count(), 1);
}

#[test]
fn test_unsupported_image_is_rejected() {
    let mut doc = PdfDocument::open_from_bytes(&create_test_pdf()).unwrap();
    let result = doc.insert_image(b"GIF89a....", 1, PdfRect::new(0.0, 0.0, 10.0, 10.0));
    assert!(matches!(result, Err(PdfError::UnsupportedImage(_))));
    assert!(doc.is_unchanged());
}

#[test]
fn test_drawing_order_is_preserved() {
    let mut doc = PdfDocument::open_from_bytes(&create_test_pdf()).unwrap();
    let square = PdfRect::new(78.0, 689.8, 24.0, 24.0);
    doc.draw_shape(1, &Shape::rect(square, 1.5, Color::black()))
        .unwrap();
    doc.insert_text("after", 1, 72.0, 600.0, 10.0, Color::black())
        .unwrap();
    doc.draw_shape(1, &Shape::check_mark(&square, Color::black()))
        .unwrap();

    let content = page_content(&doc.to_bytes().unwrap(), 1);
    let rect_at = content.find("78 689.8 24 24 re").unwrap();
    let text_at = content.find("(after) Tj").unwrap();
    let tick_at = content.find("1 J\n1 j\n").unwrap();
    assert!(rect_at < text_at && text_at < tick_at);
}

#[test]
fn test_invalid_page_number() {
    let mut doc = PdfDocument::open_from_bytes(&create_test_pdf_with_pages(5)).unwrap();

    let result = doc.insert_text("Test", 7, 100.0, 100.0, 12.0, Color::black());
    match result {
        Err(PdfError::InvalidPage(page, total)) => {
            assert_eq!(page, 7);
            assert_eq!(total, 5);
        }
        other => panic!("Expected InvalidPage error, got {other:?}"),
    }

    assert!(matches!(doc.validate_page(0), Err(PdfError::InvalidPage(0, 5))));
    assert!(doc.validate_page(5).is_ok());
    assert!(matches!(
        doc.draw_shape(6, &Shape::disc(0.0, 0.0, 1.0, Color::black())),
        Err(PdfError::InvalidPage(6, 5))
    ));
}

#[test]
fn test_save_to_file() {
    let path = std::env::temp_dir().join(format!("pdf-core-save-{}.pdf", std::process::id()));
    let mut doc = PdfDocument::open_from_bytes(&create_test_pdf()).unwrap();
    doc.insert_text("On disk", 1, 72.0, 72.0, 12.0, Color::black())
        .unwrap();
    doc.save(&path).unwrap();

    let reopened = PdfDocument::open(&path).unwrap();
    assert_eq!(reopened.page_count(), 1);
    std::fs::remove_file(&path).unwrap();
}
