//! Marker geometry
//!
//! A marker is computed as a short list of drawing primitives in PDF user
//! space (origin bottom-left), then encoded into content-stream operators.
//! Keeping the two steps apart lets the geometry be checked without parsing
//! PDF output.

use lopdf::content::Operation;
use lopdf::{Object, StringFormat};
use marker_types::{BorderStyle, LabelSettings};

use crate::error::MarkerError;

/// Every marker is pure red.
pub const MARKER_COLOR: (f32, f32, f32) = (1.0, 0.0, 0.0);

/// Stroke width of circle and rectangle outlines.
pub const OUTLINE_WIDTH: f64 = 2.0;

/// Radius of the dot drawn for [`BorderStyle::None`].
pub const DOT_RADIUS: f64 = 3.0;

/// Horizontal gap between the dot and its label.
pub const DOT_LABEL_OFFSET: f64 = 6.0;

/// Estimated advance of one glyph, as a fraction of the font size.
pub const GLYPH_WIDTH_FACTOR: f64 = 0.62;

/// Control point distance for approximating a quarter circle with a cubic Bezier.
const KAPPA: f64 = 0.552_284_75;

#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    CircleOutline {
        cx: f64,
        cy: f64,
        radius: f64,
        line_width: f64,
    },
    FilledCircle {
        cx: f64,
        cy: f64,
        radius: f64,
    },
    /// `x`/`y` is the lower-left corner.
    RectangleOutline {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        line_width: f64,
    },
    /// `x`/`y` is the start of the baseline.
    Text {
        text: String,
        x: f64,
        y: f64,
        size: f64,
    },
}

/// Radius of the circle drawn around a label.
pub fn circle_radius(font_size: f64) -> f64 {
    let box_size = f64::max(40.0, font_size * 6.0);
    box_size * 0.8 / 2.0
}

/// Text length used by the width heuristics.
pub fn text_length(label: &str) -> f64 {
    label.chars().count() as f64
}

/// Primitives for one marker.
///
/// `x`/`y` are top-origin page coordinates; `page_height` flips them into
/// PDF space. The shape comes from `settings.border_style`.
pub fn marker_primitives(
    x: f64,
    y: f64,
    page_height: f64,
    label: &str,
    settings: &LabelSettings,
) -> Vec<Primitive> {
    let font_size = settings.font_size;
    let cy = page_height - y;
    let len = text_length(label);
    let baseline = cy - font_size / 3.0;

    match settings.border_style {
        BorderStyle::Circle => vec![
            Primitive::CircleOutline {
                cx: x,
                cy,
                radius: circle_radius(font_size),
                line_width: OUTLINE_WIDTH,
            },
            Primitive::Text {
                text: label.to_string(),
                x: x - font_size * len / 4.0,
                y: baseline,
                size: font_size,
            },
        ],
        BorderStyle::Rect => {
            let text_width = font_size * len * GLYPH_WIDTH_FACTOR;
            let padding_x = font_size * 0.8;
            let padding_y = font_size * 0.6;
            let width = text_width + padding_x * 2.0;
            let height = font_size * 2.5 + padding_y * 2.0;
            vec![
                Primitive::RectangleOutline {
                    x: x - width / 2.0,
                    y: cy - height / 2.0,
                    width,
                    height,
                    line_width: OUTLINE_WIDTH,
                },
                Primitive::Text {
                    text: label.to_string(),
                    x: x - text_width / 2.0,
                    y: baseline,
                    size: font_size,
                },
            ]
        }
        BorderStyle::None => vec![
            Primitive::FilledCircle {
                cx: x,
                cy,
                radius: DOT_RADIUS,
            },
            Primitive::Text {
                text: label.to_string(),
                x: x + DOT_LABEL_OFFSET,
                y: baseline,
                size: font_size,
            },
        ],
    }
}

/// Encode one marker as content-stream operators.
///
/// The marker is wrapped in `q`/`Q` so its colors and line width do not leak
/// into the next marker. `font` names a Helvetica entry in the page's
/// `/Font` resources. Fails when a label has characters WinAnsi cannot encode.
pub fn marker_operations(
    primitives: &[Primitive],
    font: &str,
) -> Result<Vec<Operation>, MarkerError> {
    let (r, g, b) = MARKER_COLOR;
    let mut ops = vec![
        Operation::new("q", vec![]),
        Operation::new(
            "RG",
            vec![Object::Real(r), Object::Real(g), Object::Real(b)],
        ),
        Operation::new(
            "rg",
            vec![Object::Real(r), Object::Real(g), Object::Real(b)],
        ),
    ];

    for primitive in primitives {
        match primitive {
            Primitive::CircleOutline {
                cx,
                cy,
                radius,
                line_width,
            } => {
                ops.push(Operation::new("w", vec![real(*line_width)]));
                push_circle_path(&mut ops, *cx, *cy, *radius);
                ops.push(Operation::new("S", vec![]));
            }
            Primitive::FilledCircle { cx, cy, radius } => {
                push_circle_path(&mut ops, *cx, *cy, *radius);
                ops.push(Operation::new("f", vec![]));
            }
            Primitive::RectangleOutline {
                x,
                y,
                width,
                height,
                line_width,
            } => {
                ops.push(Operation::new("w", vec![real(*line_width)]));
                ops.push(Operation::new(
                    "re",
                    vec![real(*x), real(*y), real(*width), real(*height)],
                ));
                ops.push(Operation::new("S", vec![]));
            }
            Primitive::Text { text, x, y, size } => {
                ops.push(Operation::new("BT", vec![]));
                ops.push(Operation::new(
                    "Tf",
                    vec![Object::Name(font.as_bytes().to_vec()), real(*size)],
                ));
                ops.push(Operation::new("Td", vec![real(*x), real(*y)]));
                ops.push(Operation::new(
                    "Tj",
                    vec![Object::String(encode_text(text)?, StringFormat::Literal)],
                ));
                ops.push(Operation::new("ET", vec![]));
            }
        }
    }

    ops.push(Operation::new("Q", vec![]));
    Ok(ops)
}

/// Closed circle path built from four Bezier quarter arcs, starting at 3 o'clock.
fn push_circle_path(ops: &mut Vec<Operation>, cx: f64, cy: f64, r: f64) {
    let k = r * KAPPA;
    ops.push(Operation::new("m", vec![real(cx + r), real(cy)]));
    let arcs = [
        [cx + r, cy + k, cx + k, cy + r, cx, cy + r],
        [cx - k, cy + r, cx - r, cy + k, cx - r, cy],
        [cx - r, cy - k, cx - k, cy - r, cx, cy - r],
        [cx + k, cy - r, cx + r, cy - k, cx + r, cy],
    ];
    for arc in arcs {
        ops.push(Operation::new("c", arc.iter().map(|v| real(*v)).collect()));
    }
    ops.push(Operation::new("h", vec![]));
}

fn real(value: f64) -> Object {
    Object::Real(value as f32)
}

/// WinAnsi (cp1252) bytes 0x80..=0x9F that differ from Latin-1.
///
/// 0x81, 0x8D, 0x8F, 0x90 and 0x9D are unassigned.
pub const WIN_ANSI_HIGH: [(u8, char); 27] = [
    (0x80, '\u{20AC}'),
    (0x82, '\u{201A}'),
    (0x83, '\u{0192}'),
    (0x84, '\u{201E}'),
    (0x85, '\u{2026}'),
    (0x86, '\u{2020}'),
    (0x87, '\u{2021}'),
    (0x88, '\u{02C6}'),
    (0x89, '\u{2030}'),
    (0x8A, '\u{0160}'),
    (0x8B, '\u{2039}'),
    (0x8C, '\u{0152}'),
    (0x8E, '\u{017D}'),
    (0x91, '\u{2018}'),
    (0x92, '\u{2019}'),
    (0x93, '\u{201C}'),
    (0x94, '\u{201D}'),
    (0x95, '\u{2022}'),
    (0x96, '\u{2013}'),
    (0x97, '\u{2014}'),
    (0x98, '\u{02DC}'),
    (0x99, '\u{2122}'),
    (0x9A, '\u{0161}'),
    (0x9B, '\u{203A}'),
    (0x9C, '\u{0153}'),
    (0x9E, '\u{017E}'),
    (0x9F, '\u{0178}'),
];

/// WinAnsi byte for a character, if the standard fonts can show it.
pub fn win_ansi_byte(c: char) -> Option<u8> {
    match c as u32 {
        code @ (0x20..=0x7E | 0xA0..=0xFF) => Some(code as u8),
        _ => WIN_ANSI_HIGH
            .iter()
            .find(|(_, mapped)| *mapped == c)
            .map(|(byte, _)| *byte),
    }
}

/// Encode label text for the standard Helvetica font (WinAnsi).
///
/// A label that cannot be encoded is an error: drawing a substitute would
/// make the PDF disagree with the exported CSV.
pub fn encode_text(text: &str) -> Result<Vec<u8>, MarkerError> {
    text.chars()
        .map(|c| {
            win_ansi_byte(c).ok_or_else(|| MarkerError::UnsupportedCharacter {
                character: c,
                label: text.to_string(),
            })
        })
        .collect()
}
