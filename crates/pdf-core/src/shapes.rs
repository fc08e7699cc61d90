//! Vector shapes as content stream operators

use crate::document::Color;
use crate::{fmt_num, PdfRect};

/// Control point factor for approximating a quarter circle with one cubic
/// Bezier curve: 4 * (sqrt(2) - 1) / 3
pub const BEZIER_CIRCLE_FACTOR: f64 = 0.552_284_749_831;

/// Shapes the field renderer draws
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Unfilled rectangle
    StrokedRect {
        rect: PdfRect,
        line_width: f64,
        color: Color,
    },
    /// Circle outline or disc
    Circle {
        cx: f64,
        cy: f64,
        radius: f64,
        style: PaintStyle,
    },
    /// Open polyline through the given points
    Polyline {
        points: Vec<(f64, f64)>,
        line_width: f64,
        color: Color,
    },
}

/// Stroke or fill
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PaintStyle {
    Stroke { line_width: f64, color: Color },
    Fill { color: Color },
}

impl Shape {
    pub fn rect(rect: PdfRect, line_width: f64, color: Color) -> Self {
        Shape::StrokedRect {
            rect,
            line_width,
            color,
        }
    }

    pub fn circle_outline(cx: f64, cy: f64, radius: f64, line_width: f64, color: Color) -> Self {
        Shape::Circle {
            cx,
            cy,
            radius,
            style: PaintStyle::Stroke { line_width, color },
        }
    }

    pub fn disc(cx: f64, cy: f64, radius: f64, color: Color) -> Self {
        Shape::Circle {
            cx,
            cy,
            radius,
            style: PaintStyle::Fill { color },
        }
    }

    /// Check mark sized to sit inside `square`
    ///
    /// Short stroke down from the left third, long stroke up to the top
    /// right, with stroke width proportional to the square.
    pub fn check_mark(square: &PdfRect, color: Color) -> Self {
        let side = square.min_side();
        let at = |fx: f64, fy: f64| (square.x + side * fx, square.y + side * fy);
        Shape::Polyline {
            points: vec![at(0.2, 0.52), at(0.42, 0.25), at(0.8, 0.78)],
            line_width: (side * 0.12).max(0.5),
            color,
        }
    }

    /// Content stream operators for this shape, wrapped in `q ... Q`
    pub fn to_operators(&self) -> Vec<u8> {
        let mut ops = String::from("q\n");
        match self {
            Shape::StrokedRect {
                rect,
                line_width,
                color,
            } => {
                push_stroke_state(&mut ops, *line_width, *color);
                ops.push_str(&format!(
                    "{} {} {} {} re\nS\n",
                    fmt_num(rect.x),
                    fmt_num(rect.y),
                    fmt_num(rect.width),
                    fmt_num(rect.height)
                ));
            }
            Shape::Circle {
                cx,
                cy,
                radius,
                style,
            } => {
                let paint = match style {
                    PaintStyle::Stroke { line_width, color } => {
                        push_stroke_state(&mut ops, *line_width, *color);
                        "S"
                    }
                    PaintStyle::Fill { color } => {
                        ops.push_str(&format!("{} rg\n", color_components(*color)));
                        "f"
                    }
                };
                push_circle_path(&mut ops, *cx, *cy, *radius);
                ops.push_str(paint);
                ops.push('\n');
            }
            Shape::Polyline {
                points,
                line_width,
                color,
            } => {
                push_stroke_state(&mut ops, *line_width, *color);
                // round joins and caps read as a hand-drawn tick
                ops.push_str("1 J\n1 j\n");
                for (i, (x, y)) in points.iter().enumerate() {
                    let op = if i == 0 { "m" } else { "l" };
                    ops.push_str(&format!("{} {} {op}\n", fmt_num(*x), fmt_num(*y)));
                }
                ops.push_str("S\n");
            }
        }
        ops.push_str("Q\n");
        ops.into_bytes()
    }
}

fn color_components(color: Color) -> String {
    format!(
        "{} {} {}",
        fmt_num(color.r as f64),
        fmt_num(color.g as f64),
        fmt_num(color.b as f64)
    )
}

fn push_stroke_state(ops: &mut String, line_width: f64, color: Color) {
    ops.push_str(&format!(
        "{} RG\n{} w\n",
        color_components(color),
        fmt_num(line_width)
    ));
}

/// Four Bezier quadrants, counter-clockwise from the rightmost point
fn push_circle_path(ops: &mut String, cx: f64, cy: f64, r: f64) {
    let k = r * BEZIER_CIRCLE_FACTOR;
    let n = fmt_num;
    ops.push_str(&format!("{} {} m\n", n(cx + r), n(cy)));
    ops.push_str(&format!(
        "{} {} {} {} {} {} c\n",
        n(cx + r),
        n(cy + k),
        n(cx + k),
        n(cy + r),
        n(cx),
        n(cy + r)
    ));
    ops.push_str(&format!(
        "{} {} {} {} {} {} c\n",
        n(cx - k),
        n(cy + r),
        n(cx - r),
        n(cy + k),
        n(cx - r),
        n(cy)
    ));
    ops.push_str(&format!(
        "{} {} {} {} {} {} c\n",
        n(cx - r),
        n(cy - k),
        n(cx - k),
        n(cy - r),
        n(cx),
        n(cy - r)
    ));
    ops.push_str(&format!(
        "{} {} {} {} {} {} c\n",
        n(cx + k),
        n(cy - r),
        n(cx + r),
        n(cy - k),
        n(cx + r),
        n(cy)
    ));
    ops.push_str("h\n");
}
