//! CSV export of an annotation set
//!
//! The output opens directly in spreadsheet applications: a UTF-8 BOM makes
//! them detect the encoding, so labels with non-ASCII text render correctly.

use std::borrow::Cow;

use crate::download::{Downloader, CSV_MIME_TYPE};
use crate::error::MarkerError;
use marker_types::{AnnotationSet, LabelSettings};
use tracing::info;

pub const HEADER: [&str; 5] = ["page", "label", "x", "y", "borderStyle"];

const BOM: &[u8] = b"\xEF\xBB\xBF";

const FILE_SUFFIX: &str = "_annotations.csv";

/// Export every annotation as CSV and hand it to the downloader.
///
/// Returns the filename the CSV was delivered under.
pub fn export_annotations(
    annotations: &AnnotationSet,
    settings: &LabelSettings,
    document_name: &str,
    downloader: &dyn Downloader,
) -> Result<String, MarkerError> {
    let bytes = build_csv(annotations, settings);
    let filename = export_file_name(document_name);
    downloader.download(&bytes, &filename, CSV_MIME_TYPE)?;
    info!(rows = annotations.total(), filename = %filename, "exported annotations");
    Ok(filename)
}

/// BOM followed by the CSV text.
pub fn build_csv(annotations: &AnnotationSet, settings: &LabelSettings) -> Vec<u8> {
    let text = to_csv_text(&csv_rows(annotations, settings));
    let mut bytes = Vec::with_capacity(BOM.len() + text.len());
    bytes.extend_from_slice(BOM);
    bytes.extend_from_slice(text.as_bytes());
    bytes
}

/// Header row followed by one row per annotation, pages ascending.
pub fn csv_rows(annotations: &AnnotationSet, settings: &LabelSettings) -> Vec<Vec<String>> {
    let mut rows = Vec::with_capacity(annotations.total() + 1);
    rows.push(HEADER.iter().map(|h| h.to_string()).collect());

    for (page, page_annotations) in annotations.iter() {
        for annotation in page_annotations {
            rows.push(vec![
                page.to_string(),
                settings.label_for(annotation),
                format_number(round2(annotation.x)),
                format_number(round2(annotation.y)),
                annotation.style.to_string(),
            ]);
        }
    }

    rows
}

/// Join rows with `,` and `\n`, quoting fields as needed. No trailing newline.
pub fn to_csv_text(rows: &[Vec<String>]) -> String {
    rows.iter()
        .map(|row| {
            row.iter()
                .map(|cell| escape_field(cell))
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Quote a field only when it contains a comma, a double quote or a newline.
pub fn escape_field(cell: &str) -> Cow<'_, str> {
    if cell.contains(',') || cell.contains('"') || cell.contains('\n') {
        Cow::Owned(format!("\"{}\"", cell.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(cell)
    }
}

/// `<document name without its last extension>_annotations.csv`
pub fn export_file_name(document_name: &str) -> String {
    let stem = match document_name.rfind('.') {
        Some(dot) if dot + 1 < document_name.len() => &document_name[..dot],
        _ => document_name,
    };
    format!("{}{}", stem, FILE_SUFFIX)
}

/// Round half up to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0 + 0.5).floor() / 100.0
}

/// Shortest decimal form: `12.5`, `100`, never `-0`.
///
/// Magnitudes of at least 1e21 or below 1e-6 switch to exponent form with a
/// signed exponent (`1e+21`, `2.5e-7`).
pub fn format_number(value: f64) -> String {
    let magnitude = value.abs();
    if value == 0.0 {
        "0".to_string()
    } else if value == f64::INFINITY {
        "Infinity".to_string()
    } else if value == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else if magnitude >= 1e21 || magnitude < 1e-6 {
        let formatted = format!("{:e}", value);
        match formatted.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{}e+{}", mantissa, exponent)
            }
            _ => formatted,
        }
    } else {
        value.to_string()
    }
}
