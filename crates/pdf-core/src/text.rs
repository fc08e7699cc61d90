//! Text rendering utilities
//!
//! Text is set with the standard Helvetica font, which every conforming
//! reader provides, so nothing is embedded. Strings are encoded as
//! WinAnsiEncoding literal strings.

use crate::document::Color;
use crate::fmt_num;

/// Context for rendering text
pub struct TextRenderContext {
    /// PDF font resource name (e.g., "F1")
    pub font_name: String,
    /// Font size in points
    pub font_size: f64,
    /// Fill color
    pub color: Color,
}

/// Map a char to its WinAnsiEncoding byte
fn win_ansi_byte(c: char) -> Option<u8> {
    let code = c as u32;
    match code {
        0x20..=0x7E => Some(code as u8),
        0xA0..=0xFF => Some(code as u8),
        _ => {
            let byte = match c {
                '€' => 0x80,
                '‚' => 0x82,
                'ƒ' => 0x83,
                '„' => 0x84,
                '…' => 0x85,
                '†' => 0x86,
                '‡' => 0x87,
                'ˆ' => 0x88,
                '‰' => 0x89,
                'Š' => 0x8A,
                '‹' => 0x8B,
                'Œ' => 0x8C,
                'Ž' => 0x8E,
                '\u{2018}' => 0x91,
                '\u{2019}' => 0x92,
                '\u{201C}' => 0x93,
                '\u{201D}' => 0x94,
                '•' => 0x95,
                '–' => 0x96,
                '—' => 0x97,
                '˜' => 0x98,
                '™' => 0x99,
                'š' => 0x9A,
                '›' => 0x9B,
                'œ' => 0x9C,
                'ž' => 0x9E,
                'Ÿ' => 0x9F,
                _ => return None,
            };
            Some(byte)
        }
    }
}

/// Encode text as a PDF literal string in WinAnsiEncoding
///
/// Parentheses and backslashes are escaped; characters outside the encoding
/// become `?`. Control characters (tabs, newlines) become spaces since
/// fields are single-line.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() + 2);
    out.push(b'(');
    for c in text.chars() {
        let byte = if c.is_control() {
            b' '
        } else {
            win_ansi_byte(c).unwrap_or(b'?')
        };
        if matches!(byte, b'(' | b')' | b'\\') {
            out.push(b'\\');
        }
        out.push(byte);
    }
    out.push(b')');
    out
}

/// Generate PDF operators for a single line of text
///
/// # Arguments
/// * `text` - Plain text (encoded here)
/// * `x` - Left edge of the line in points
/// * `y` - Baseline in points (PDF coordinates, from bottom)
/// * `ctx` - Text rendering context
pub fn generate_text_operators(text: &str, x: f64, y: f64, ctx: &TextRenderContext) -> Vec<u8> {
    let mut ops = Vec::new();

    ops.extend_from_slice(b"BT\n");
    ops.extend_from_slice(
        format!(
            "{} {} {} rg\n",
            fmt_num(ctx.color.r as f64),
            fmt_num(ctx.color.g as f64),
            fmt_num(ctx.color.b as f64)
        )
        .as_bytes(),
    );
    ops.extend_from_slice(format!("/{} {} Tf\n", ctx.font_name, fmt_num(ctx.font_size)).as_bytes());
    ops.extend_from_slice(format!("{} {} Td\n", fmt_num(x), fmt_num(y)).as_bytes());
    ops.extend_from_slice(&encode_win_ansi(text));
    ops.extend_from_slice(b" Tj\nET\n");

    ops
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_ascii() {
        assert_eq!(encode_win_ansi("Jane Doe"), b"(Jane Doe)".to_vec());
    }

    #[test]
    fn test_encode_escapes() {
        assert_eq!(encode_win_ansi(r"a(b)\c"), br"(a\(b\)\\c)".to_vec());
    }

    #[test]
    fn test_encode_latin1_and_specials() {
        assert_eq!(encode_win_ansi("é"), vec![b'(', 0xE9, b')']);
        assert_eq!(encode_win_ansi("€"), vec![b'(', 0x80, b')']);
        assert_eq!(encode_win_ansi("\u{201C}"), vec![b'(', 0x93, b')']);
    }

    #[test]
    fn test_encode_unmappable() {
        assert_eq!(encode_win_ansi("สวัสดี✓"), b"(???????)".to_vec());
        assert_eq!(encode_win_ansi("a\tb\n"), b"(a b )".to_vec());
    }

    #[test]
    fn test_generate_text_operators() {
        let ctx = TextRenderContext {
            font_name: "F1".to_string(),
            font_size: 14.0,
            color: Color::black(),
        };
        let ops = generate_text_operators("Jane Doe", 12.0, 700.3333333, &ctx);
        let ops_str = String::from_utf8(ops).unwrap();
        assert_eq!(
            ops_str,
            "BT\n0 0 0 rg\n/F1 14 Tf\n12 700.3333 Td\n(Jane Doe) Tj\nET\n"
        );
    }
}
