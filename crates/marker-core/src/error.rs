use thiserror::Error;

use crate::download::DownloadError;

#[derive(Error, Debug)]
pub enum MarkerError {
    #[error("Failed to load PDF: {0}")]
    DocumentLoad(String),

    #[error("Failed to save PDF: {0}")]
    DocumentSave(String),

    #[error("PDF operation failed: {0}")]
    Operation(String),

    /// The standard Helvetica font (WinAnsi) has no glyph for the character.
    #[error("Label {label:?} contains {character:?}, which Helvetica cannot encode")]
    UnsupportedCharacter { character: char, label: String },

    #[error(transparent)]
    Download(#[from] DownloadError),
}
