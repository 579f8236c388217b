use serde::{Deserialize, Serialize};

use crate::types::{Annotation, BorderStyle};

/// Numbering and formatting rules for marker labels.
///
/// Field names follow the camelCase keys the front-end sends, and every
/// field falls back to [`LabelSettings::default`] when missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LabelSettings {
    pub start_number: i64,
    pub increment: i64,
    pub prefix: String,
    pub suffix: String,
    /// Point size of label text. Only the renderer reads this.
    pub font_size: f64,
    /// Marker shape. Only the renderer reads this.
    pub border_style: BorderStyle,
}

impl Default for LabelSettings {
    fn default() -> Self {
        Self {
            start_number: 1,
            increment: 1,
            prefix: String::new(),
            suffix: String::new(),
            font_size: 12.0,
            border_style: BorderStyle::Circle,
        }
    }
}

impl LabelSettings {
    /// Label text for a zero-based sequence index:
    /// `prefix + (start_number + number * increment) + suffix`.
    pub fn label(&self, number: i64) -> String {
        // i128 holds any i64 product plus an i64 offset
        let value = self.start_number as i128 + number as i128 * self.increment as i128;
        format!("{}{}{}", self.prefix, value, self.suffix)
    }

    pub fn label_for(&self, annotation: &Annotation) -> String {
        self.label(annotation.number)
    }

    /// Parse settings from the JSON shape used by the front-end.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
