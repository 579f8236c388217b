use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

/// Marker shape drawn around a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BorderStyle {
    #[default]
    Circle,
    Rect,
    None,
}

impl BorderStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            BorderStyle::Circle => "circle",
            BorderStyle::Rect => "rect",
            BorderStyle::None => "none",
        }
    }
}

impl fmt::Display for BorderStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BorderStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "circle" => Ok(BorderStyle::Circle),
            "rect" => Ok(BorderStyle::Rect),
            "none" => Ok(BorderStyle::None),
            other => Err(format!(
                "unknown border style {:?} (expected circle, rect or none)",
                other
            )),
        }
    }
}

/// A single marker placed on a page.
///
/// Coordinates are in page space with the origin at the top-left corner and
/// Y growing downward. `number` is the zero-based sequence index that feeds
/// the label formula; it is not unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub x: f64,
    pub y: f64,
    pub style: BorderStyle,
    pub number: i64,
}

impl Annotation {
    pub fn new(x: f64, y: f64, style: BorderStyle, number: i64) -> Self {
        Self {
            x,
            y,
            style,
            number,
        }
    }
}

/// Annotations keyed by 1-based page number, enumerated in ascending page order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AnnotationSet {
    pages: BTreeMap<u32, Vec<Annotation>>,
}

impl AnnotationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the annotations of a page.
    pub fn insert(&mut self, page: u32, annotations: Vec<Annotation>) {
        self.pages.insert(page, annotations);
    }

    /// Append an annotation to the end of a page's sequence.
    pub fn push(&mut self, page: u32, annotation: Annotation) {
        self.pages.entry(page).or_default().push(annotation);
    }

    /// Annotations on a page, empty when the page has none.
    pub fn page(&self, page: u32) -> &[Annotation] {
        self.pages.get(&page).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Pages with their annotations, in ascending page order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &[Annotation])> {
        self.pages
            .iter()
            .map(|(page, annotations)| (*page, annotations.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Total number of annotations across all pages.
    pub fn total(&self) -> usize {
        self.pages.values().map(Vec::len).sum()
    }

    /// Parse the `{ "<page>": [annotation, ...] }` shape used by the front-end.
    ///
    /// Pages whose value is not a list, keys that are not positive page
    /// numbers, and individual records that are not annotations are skipped
    /// with a warning.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl FromIterator<(u32, Vec<Annotation>)> for AnnotationSet {
    fn from_iter<I: IntoIterator<Item = (u32, Vec<Annotation>)>>(iter: I) -> Self {
        Self {
            pages: iter.into_iter().collect(),
        }
    }
}

impl<'de> Deserialize<'de> for AnnotationSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = BTreeMap::<String, serde_json::Value>::deserialize(deserializer)?;
        let mut pages = BTreeMap::new();

        for (key, value) in raw {
            let page = match key.trim().parse::<u32>() {
                Ok(page) if page > 0 => page,
                _ => {
                    warn!(key = %key, "skipping annotations under a non-page key");
                    continue;
                }
            };

            let records = match value {
                serde_json::Value::Array(records) => records,
                other => {
                    warn!(page, value = %other, "skipping page whose annotations are not a list");
                    continue;
                }
            };

            let annotations = records
                .into_iter()
                .enumerate()
                .filter_map(|(index, record)| {
                    serde_json::from_value::<Annotation>(record)
                        .map_err(|e| {
                            warn!(page, index, error = %e, "skipping malformed annotation");
                        })
                        .ok()
                })
                .collect();
            pages.insert(page, annotations);
        }

        Ok(Self { pages })
    }
}
