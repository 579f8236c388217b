//! Shared data model for page markers.
//!
//! Both the CSV exporter and the PDF annotator consume these types, and the
//! label formula in [`LabelSettings::label`] is the only place label text is
//! produced.

pub mod settings;
pub mod types;

pub use settings::LabelSettings;
pub use types::{Annotation, AnnotationSet, BorderStyle};
