//! Page marker export and rendering
//!
//! This crate turns an [`AnnotationSet`] into two artifacts:
//! - `export`: a CSV listing of every marker, ready for spreadsheet import
//! - `annotate`: a copy of the source PDF with the markers drawn on each page
//!
//! Finished artifacts are handed to a [`Downloader`], the host's save facility.

pub mod annotate;
pub mod download;
pub mod error;
pub mod export;
pub mod marker;

pub use annotate::{download_pdf, render_annotations, DEFAULT_PDF_FILENAME};
pub use download::{
    DirectoryDownloader, DownloadError, DownloadedFile, Downloader, MemoryDownloader,
    CSV_MIME_TYPE, PDF_MIME_TYPE,
};
pub use error::MarkerError;
pub use export::{build_csv, export_annotations, export_file_name};
pub use marker::{marker_primitives, Primitive};

pub use marker_types::{Annotation, AnnotationSet, BorderStyle, LabelSettings};
