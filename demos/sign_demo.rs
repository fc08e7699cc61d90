//! Place fields the way the browser editor does, then sign
//!
//! Usage:
//!   cargo run --example sign_demo -- [input.pdf] [output.pdf]
//!
//! Without an input a blank two-page Letter document is generated. Set
//! `RUST_LOG=debug` to see every placement and drawing step.

use anyhow::Context;
use image::{ImageFormat, Rgba, RgbaImage};
use layout::{FieldEditor, FieldType, PageGeometry, RenderedRect, ScreenPoint, Viewport};
use lopdf::{dictionary, Document, Object};
use signer::{inspect_document, sign_json, RenderConfig};
use std::io::Cursor;
use std::path::Path;
use tracing_subscriber::EnvFilter;

// Width of the page canvas in the editor
const RENDERED_WIDTH_PX: f64 = 814.0;

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args: Vec<String> = std::env::args().collect();
    let (pdf_bytes, pdf_filename) = match args.get(1) {
        Some(path) => {
            let bytes =
                std::fs::read(path).with_context(|| format!("failed to read PDF '{path}'"))?;
            let name = Path::new(path)
                .file_name()
                .and_then(|s| s.to_str())
                .unwrap_or("input.pdf")
                .to_string();
            (bytes, name)
        }
        None => (blank_document(2)?, "blank.pdf".to_string()),
    };
    let output_path = args.get(2).cloned().unwrap_or_else(|| "output/signed.pdf".to_string());

    let info = inspect_document(&pdf_bytes)?;
    println!("Pages: {}", info.page_count);
    let pages = info
        .page_dimensions
        .iter()
        .enumerate()
        .map(|(index, d)| PageGeometry::new(index, d.width, d.height))
        .collect::<Result<Vec<_>, _>>()?;

    let mut editor = FieldEditor::new(pages.clone());
    let mut viewport = Viewport::new();

    // First page, rendered at a fixed canvas width
    let first = pages[0];
    viewport.set_page(first);
    let state = viewport.measured(RenderedRect::new(
        RENDERED_WIDTH_PX,
        RENDERED_WIDTH_PX * first.height_points / first.width_points,
    ))?;
    println!("Scale: {:.4} px/pt", state.scale());

    let name = editor.insert(FieldType::Text, 0, ScreenPoint::new(96.0, 120.0), &viewport)?;
    editor.set_value(name, "Jane Doe")?;

    let date = editor.insert(FieldType::Date, 0, ScreenPoint::new(420.0, 120.0), &viewport)?;
    editor.set_value(date, "2024-05-29")?;

    let agree = editor.insert(FieldType::Checkbox, 0, ScreenPoint::new(100.0, 100.0), &viewport)?;
    editor.set_value(agree, "checked")?;

    // Nudge the checkbox down and make the signature box wider
    editor.begin_drag(agree, ScreenPoint::new(110.0, 110.0), &viewport)?;
    editor.drag_to(ScreenPoint::new(110.0, 210.0), &viewport)?;
    editor.end_interaction();

    let signature =
        editor.insert(FieldType::Signature, 0, ScreenPoint::new(96.0, 900.0), &viewport)?;
    let rect = editor.screen_rect(signature, &viewport)?;
    let handle = ScreenPoint::new(rect.x + rect.width, rect.y + rect.height);
    editor.begin_resize(signature, handle)?;
    editor.resize_to(ScreenPoint::new(handle.x + 100.0, handle.y), &viewport)?;
    editor.end_interaction();

    for id in editor.pending_capture() {
        editor.set_value(id, signature_data_uri()?)?;
    }

    let request = editor.to_sign_request(Some("demo".to_string()), &pdf_filename);
    let request_json = request.to_json()?;
    println!("{request_json}");

    let response = sign_json(&request_json, &pdf_bytes, &RenderConfig::default())?;
    for record in &response.records {
        println!(
            "{:<10} page {} -> ({:.2}, {:.2}) {:.2} x {:.2}",
            record.field_type,
            record.page_number,
            record.pdf_coordinates.x,
            record.pdf_coordinates.y,
            record.pdf_coordinates.width,
            record.pdf_coordinates.height,
        );
    }
    for skipped in &response.skipped {
        println!("Skipped field {}: {}", skipped.index, skipped.reason);
    }

    if let Some(parent) = Path::new(&output_path).parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&output_path, &response.signed_pdf.bytes)
        .with_context(|| format!("failed to write '{output_path}'"))?;

    println!("Generated: {} ({})", output_path, response.signed_pdf.url);

    Ok(())
}

fn blank_document(page_count: usize) -> anyhow::Result<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let kids: Vec<Object> = (0..page_count)
        .map(|_| {
            doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            })
            .into()
        })
        .collect();

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)?;
    Ok(buffer)
}

/// A stroke on a transparent canvas, as a signature pad would export it
fn signature_data_uri() -> anyhow::Result<String> {
    use base64::Engine;

    let mut img = RgbaImage::from_pixel(400, 100, Rgba([0, 0, 0, 0]));
    for x in 20..380u32 {
        let wave = (x as f64 / 30.0).sin() * 25.0 + 50.0;
        for dy in 0..3 {
            img.put_pixel(x, (wave as u32 + dy).min(99), Rgba([20, 20, 120, 255]));
        }
    }

    let mut png = Vec::new();
    img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    Ok(format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(png)
    ))
}
