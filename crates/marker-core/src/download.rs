//! Hand finished artifacts to the host's save facility.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;
use tracing::info;

pub const CSV_MIME_TYPE: &str = "text/csv;charset=utf-8";
pub const PDF_MIME_TYPE: &str = "application/pdf";

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("Invalid download filename: {0:?}")]
    InvalidFilename(String),

    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Makes bytes available to the user as a saved file.
pub trait Downloader {
    fn download(&self, bytes: &[u8], filename: &str, mime_type: &str)
        -> Result<(), DownloadError>;
}

/// Saves downloads as files inside a directory.
#[derive(Debug, Clone)]
pub struct DirectoryDownloader {
    dir: PathBuf,
}

impl DirectoryDownloader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Where a download with this filename ends up.
    pub fn target_path(&self, filename: &str) -> Result<PathBuf, DownloadError> {
        validate_filename(filename)?;
        Ok(self.dir.join(filename))
    }
}

impl Downloader for DirectoryDownloader {
    fn download(
        &self,
        bytes: &[u8],
        filename: &str,
        mime_type: &str,
    ) -> Result<(), DownloadError> {
        let path = self.target_path(filename)?;
        std::fs::write(&path, bytes).map_err(|source| DownloadError::Io {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), mime_type, bytes = bytes.len(), "saved download");
        Ok(())
    }
}

/// A file captured by [`MemoryDownloader`].
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadedFile {
    pub filename: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Keeps downloads in memory instead of saving them.
#[derive(Debug, Default)]
pub struct MemoryDownloader {
    files: Mutex<Vec<DownloadedFile>>,
}

impl MemoryDownloader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything downloaded so far, oldest first.
    pub fn files(&self) -> Vec<DownloadedFile> {
        self.files
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Downloader for MemoryDownloader {
    fn download(
        &self,
        bytes: &[u8],
        filename: &str,
        mime_type: &str,
    ) -> Result<(), DownloadError> {
        validate_filename(filename)?;
        self.files
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(DownloadedFile {
                filename: filename.to_string(),
                mime_type: mime_type.to_string(),
                bytes: bytes.to_vec(),
            });
        Ok(())
    }
}

/// A download name must be a bare file name.
fn validate_filename(filename: &str) -> Result<(), DownloadError> {
    if filename.is_empty()
        || filename == "."
        || filename == ".."
        || filename.contains(|c: char| c == '/' || c == '\\')
    {
        return Err(DownloadError::InvalidFilename(filename.to_string()));
    }
    Ok(())
}
