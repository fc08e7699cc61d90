//! Image handling for PDF documents

use crate::{fmt_num, PdfError, PdfRect, Result};
use image::{DynamicImage, ImageDecoder, ImageReader};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::io::{Cursor, Write};

impl From<image::ImageError> for PdfError {
    fn from(err: image::ImageError) -> Self {
        PdfError::ImageError(err.to_string())
    }
}

/// Detected image format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

impl ImageFormat {
    /// MIME type for the format
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
        }
    }
}

/// Detect image format from magic bytes
pub fn detect_format(data: &[u8]) -> Result<ImageFormat> {
    if data.len() >= 3 && data[0] == 0xFF && data[1] == 0xD8 && data[2] == 0xFF {
        return Ok(ImageFormat::Jpeg);
    }

    if data.len() >= 8 && data[0..8] == [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A] {
        return Ok(ImageFormat::Png);
    }

    Err(PdfError::UnsupportedImage(
        "expected PNG or JPEG data".to_string(),
    ))
}

/// Image dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

/// JPEG info including dimensions and color components
#[derive(Debug, Clone, Copy)]
struct JpegInfo {
    width: u32,
    height: u32,
    num_components: u8,
}

/// Read SOF header of a JPEG
fn get_jpeg_info(data: &[u8]) -> Result<JpegInfo> {
    // SOF segment: marker(2) length(2) precision(1) height(2) width(2) components(1)
    let mut i = 2;
    while i + 10 < data.len() {
        if data[i] != 0xFF {
            i += 1;
            continue;
        }

        let marker = data[i + 1];

        if (0xC0..=0xCF).contains(&marker) && marker != 0xC4 && marker != 0xC8 && marker != 0xCC {
            let height = u16::from_be_bytes([data[i + 5], data[i + 6]]) as u32;
            let width = u16::from_be_bytes([data[i + 7], data[i + 8]]) as u32;
            let num_components = data[i + 9];
            return Ok(JpegInfo {
                width,
                height,
                num_components,
            });
        }

        let length = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
        if length < 2 {
            break;
        }
        i += 2 + length;
    }

    Err(PdfError::ImageError("Could not parse JPEG header".to_string()))
}

/// Image XObject ready for embedding
#[derive(Debug, Clone)]
pub struct ImageXObject {
    pub width: u32,
    pub height: u32,
    /// "DeviceRGB", "DeviceGray" or "DeviceCMYK"
    pub color_space: &'static str,
    pub bits_per_component: u8,
    /// "DCTDecode" for JPEG, "FlateDecode" for decoded PNG samples
    pub filter: &'static str,
    /// Encoded sample data
    pub data: Vec<u8>,
    /// Flate-compressed 8-bit alpha channel, if the source had transparency
    pub soft_mask: Option<Vec<u8>>,
}

impl ImageXObject {
    /// Build an XObject from PNG or JPEG bytes
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        match detect_format(data)? {
            ImageFormat::Jpeg => Self::from_jpeg(data),
            ImageFormat::Png => Self::from_png(data),
        }
    }

    /// JPEG data is embedded as-is with DCTDecode.
    ///
    /// The bytes are decoded once first; a broken scan would otherwise end up
    /// in the output as an unreadable image.
    pub fn from_jpeg(data: &[u8]) -> Result<Self> {
        let info = get_jpeg_info(data)?;
        if info.width == 0 || info.height == 0 {
            return Err(PdfError::ImageError("JPEG has zero dimension".to_string()));
        }
        ImageReader::with_format(Cursor::new(data), image::ImageFormat::Jpeg).decode()?;

        let color_space = match info.num_components {
            1 => "DeviceGray",
            4 => "DeviceCMYK",
            _ => "DeviceRGB",
        };

        Ok(Self {
            width: info.width,
            height: info.height,
            color_space,
            bits_per_component: 8,
            filter: "DCTDecode",
            data: data.to_vec(),
            soft_mask: None,
        })
    }

    /// PNG data is decoded and re-encoded with FlateDecode.
    ///
    /// Alpha is split into a soft mask so transparent signature strokes keep
    /// the page content underneath visible.
    pub fn from_png(data: &[u8]) -> Result<Self> {
        let reader = ImageReader::new(Cursor::new(data)).with_guessed_format()?;
        let decoder = reader.into_decoder()?;
        let (width, height) = decoder.dimensions();
        let color_type = decoder.color_type();
        let image = DynamicImage::from_decoder(decoder)?;

        if width == 0 || height == 0 {
            return Err(PdfError::ImageError("PNG has zero dimension".to_string()));
        }

        let (samples, alpha, color_space) = if color_type.has_color() {
            if color_type.has_alpha() {
                let rgba = image.to_rgba8();
                let mut rgb = Vec::with_capacity((width * height * 3) as usize);
                let mut alpha = Vec::with_capacity((width * height) as usize);
                for pixel in rgba.pixels() {
                    rgb.extend_from_slice(&pixel.0[..3]);
                    alpha.push(pixel.0[3]);
                }
                (rgb, Some(alpha), "DeviceRGB")
            } else {
                (image.to_rgb8().into_raw(), None, "DeviceRGB")
            }
        } else if color_type.has_alpha() {
            let la = image.to_luma_alpha8();
            let mut gray = Vec::with_capacity((width * height) as usize);
            let mut alpha = Vec::with_capacity((width * height) as usize);
            for pixel in la.pixels() {
                gray.push(pixel.0[0]);
                alpha.push(pixel.0[1]);
            }
            (gray, Some(alpha), "DeviceGray")
        } else {
            (image.to_luma8().into_raw(), None, "DeviceGray")
        };

        // Fully opaque alpha carries no information
        let alpha = alpha.filter(|a| a.iter().any(|&v| v != 255));

        Ok(Self {
            width,
            height,
            color_space,
            bits_per_component: 8,
            filter: "FlateDecode",
            data: deflate(&samples)?,
            soft_mask: alpha.map(|a| deflate(&a)).transpose()?,
        })
    }

    /// Pixel dimensions
    pub fn dimensions(&self) -> ImageDimensions {
        ImageDimensions {
            width: self.width,
            height: self.height,
        }
    }

    /// Convert to lopdf Stream object (without the soft mask reference)
    pub fn to_pdf_stream(&self) -> Stream {
        let mut dict = image_dict(self.width, self.height, self.color_space, self.filter);
        dict.set("BitsPerComponent", self.bits_per_component as i64);
        Stream::new(dict, self.data.clone())
    }

    /// Add the image (and its soft mask, if any) to `doc`
    pub fn embed(&self, doc: &mut Document) -> ObjectId {
        let mut stream = self.to_pdf_stream();

        if let Some(mask) = &self.soft_mask {
            let mut mask_dict = image_dict(self.width, self.height, "DeviceGray", "FlateDecode");
            mask_dict.set("BitsPerComponent", 8);
            let mask_id = doc.add_object(Stream::new(mask_dict, mask.clone()));
            stream.dict.set("SMask", Object::Reference(mask_id));
        }

        doc.add_object(stream)
    }
}

fn image_dict(width: u32, height: u32, color_space: &str, filter: &str) -> Dictionary {
    let mut dict = Dictionary::new();
    dict.set("Type", Object::Name(b"XObject".to_vec()));
    dict.set("Subtype", Object::Name(b"Image".to_vec()));
    dict.set("Width", width as i64);
    dict.set("Height", height as i64);
    dict.set("ColorSpace", Object::Name(color_space.as_bytes().to_vec()));
    dict.set("Filter", Object::Name(filter.as_bytes().to_vec()));
    dict
}

fn deflate(raw: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(raw)?;
    Ok(encoder.finish()?)
}

/// Rectangle an image occupies when aspect-fitted and centered in `target`
pub fn placement_rect(dims: ImageDimensions, target: &PdfRect) -> PdfRect {
    crate::fit_image_in_bounds(
        dims.width as f64,
        dims.height as f64,
        target.width,
        target.height,
    )
    .within(target)
}

/// Generate operators to draw an image XObject into `rect`
///
/// `q w 0 0 h x y cm /Im1 Do Q`
pub fn generate_image_operators(image_name: &str, rect: &PdfRect) -> Vec<u8> {
    format!(
        "q\n{} 0 0 {} {} {} cm\n/{image_name} Do\nQ\n",
        fmt_num(rect.width),
        fmt_num(rect.height),
        fmt_num(rect.x),
        fmt_num(rect.y)
    )
    .into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Luma, Rgb, Rgba};

    fn encode_png(img: DynamicImage) -> Vec<u8> {
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Png)
            .unwrap();
        buffer
    }

    #[test]
    fn test_detect_jpeg() {
        let jpeg_header = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46];
        assert_eq!(detect_format(&jpeg_header).unwrap(), ImageFormat::Jpeg);
    }

    #[test]
    fn test_detect_png() {
        let png_header = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        assert_eq!(detect_format(&png_header).unwrap(), ImageFormat::Png);
    }

    #[test]
    fn test_detect_gif_rejected() {
        let gif = b"GIF89a\x01\x00\x01\x00".to_vec();
        assert!(matches!(
            detect_format(&gif),
            Err(PdfError::UnsupportedImage(_))
        ));
    }

    #[test]
    fn test_detect_too_short() {
        assert!(detect_format(&[0x89, 0x50]).is_err());
        assert!(detect_format(&[]).is_err());
    }

    fn encode_jpeg(img: DynamicImage) -> Vec<u8> {
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Jpeg)
            .unwrap();
        buffer
    }

    #[test]
    fn test_jpeg_info() {
        let img = ImageBuffer::from_pixel(200, 100, Rgb([200u8, 30, 30]));
        let jpeg = encode_jpeg(DynamicImage::ImageRgb8(img));

        let xobject = ImageXObject::from_bytes(&jpeg).unwrap();
        assert_eq!(
            xobject.dimensions(),
            ImageDimensions {
                width: 200,
                height: 100
            }
        );
        assert_eq!(xobject.color_space, "DeviceRGB");
        assert_eq!(xobject.filter, "DCTDecode");
        assert_eq!(xobject.data, jpeg);
        assert!(xobject.soft_mask.is_none());
    }

    #[test]
    fn test_jpeg_gray() {
        let img = ImageBuffer::from_pixel(8, 8, Luma([90u8]));
        let jpeg = encode_jpeg(DynamicImage::ImageLuma8(img));
        let xobject = ImageXObject::from_bytes(&jpeg).unwrap();
        assert_eq!(xobject.color_space, "DeviceGray");
    }

    #[test]
    fn test_jpeg_with_corrupt_body() {
        let mut jpeg = vec![
            0xFF, 0xD8, // SOI
            0xFF, 0xC0, // SOF0
            0x00, 0x11, // Length
            0x08, // Precision
            0x00, 0x64, // Height (100)
            0x00, 0xC8, // Width (200)
            0x03, // Components
            0x01, 0x22, 0x00, 0x02, 0x11, 0x01, 0x03, 0x11, 0x01,
        ];
        jpeg.extend((0..64u8).map(|i| i.wrapping_mul(37)));

        assert!(get_jpeg_info(&jpeg).is_ok());
        assert!(matches!(
            ImageXObject::from_bytes(&jpeg),
            Err(PdfError::ImageError(_))
        ));
    }

    #[test]
    fn test_jpeg_truncated() {
        assert!(ImageXObject::from_jpeg(&[0xFF, 0xD8, 0xFF, 0x00, 0x00]).is_err());
    }

    #[test]
    fn test_png_gray_without_alpha() {
        let img: ImageBuffer<Luma<u8>, Vec<u8>> = ImageBuffer::new(16, 8);
        let xobject = ImageXObject::from_bytes(&encode_png(DynamicImage::ImageLuma8(img))).unwrap();
        assert_eq!(xobject.width, 16);
        assert_eq!(xobject.height, 8);
        assert_eq!(xobject.color_space, "DeviceGray");
        assert!(xobject.soft_mask.is_none());
    }

    #[test]
    fn test_png_transparent_signature_gets_soft_mask() {
        let mut img: ImageBuffer<Rgba<u8>, Vec<u8>> = ImageBuffer::new(40, 10);
        img.put_pixel(5, 5, Rgba([0, 0, 0, 255]));
        let xobject = ImageXObject::from_bytes(&encode_png(DynamicImage::ImageRgba8(img))).unwrap();
        assert_eq!(xobject.color_space, "DeviceRGB");
        assert!(xobject.soft_mask.is_some());

        let mut doc = Document::with_version("1.5");
        let id = xobject.embed(&mut doc);
        let stream = doc.get_object(id).unwrap().as_stream().unwrap();
        assert!(stream.dict.get(b"SMask").is_ok());
        assert_eq!(doc.objects.len(), 2);
    }

    #[test]
    fn test_png_opaque_alpha_dropped() {
        let img: ImageBuffer<Rgba<u8>, Vec<u8>> =
            ImageBuffer::from_pixel(4, 4, Rgba([10, 20, 30, 255]));
        let xobject = ImageXObject::from_bytes(&encode_png(DynamicImage::ImageRgba8(img))).unwrap();
        assert!(xobject.soft_mask.is_none());
    }

    #[test]
    fn test_to_pdf_stream() {
        let xobject = ImageXObject {
            width: 100,
            height: 50,
            color_space: "DeviceGray",
            bits_per_component: 8,
            filter: "FlateDecode",
            data: vec![1, 2, 3],
            soft_mask: None,
        };

        let stream = xobject.to_pdf_stream();
        let dict = &stream.dict;
        assert_eq!(dict.get(b"Subtype").unwrap().as_name().unwrap(), b"Image");
        assert_eq!(dict.get(b"Width").unwrap().as_i64().unwrap(), 100);
        assert_eq!(dict.get(b"Height").unwrap().as_i64().unwrap(), 50);
        assert_eq!(
            dict.get(b"ColorSpace").unwrap().as_name().unwrap(),
            b"DeviceGray"
        );
        assert_eq!(stream.content, vec![1, 2, 3]);
    }

    #[test]
    fn test_generate_image_operators() {
        let ops = generate_image_operators("Im1", &PdfRect::new(100.0, 201.25, 150.0, 37.5));
        let ops_str = String::from_utf8(ops).unwrap();
        assert_eq!(ops_str, "q\n150 0 0 37.5 100 201.25 cm\n/Im1 Do\nQ\n");
    }

    #[test]
    fn test_placement_rect_fits() {
        let wide = ImageDimensions {
            width: 400,
            height: 100,
        };
        let target = PdfRect::new(0.0, 0.0, 150.0, 40.0);
        assert_eq!(
            placement_rect(wide, &target),
            PdfRect::new(0.0, 1.25, 150.0, 37.5)
        );

        let tall = ImageDimensions {
            width: 100,
            height: 200,
        };
        assert_eq!(
            placement_rect(tall, &target),
            PdfRect::new(65.0, 0.0, 20.0, 40.0)
        );
    }
}
