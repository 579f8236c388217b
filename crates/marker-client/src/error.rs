use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// The server answered with a non-2xx status.
    #[error("API Error: {status} {reason}")]
    Network { status: u16, reason: String },

    /// The request never completed (DNS, connection refused, reset, ...).
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Response is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl ApiError {
    /// HTTP status for [`ApiError::Network`] errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Network { status, .. } => Some(*status),
            _ => None,
        }
    }
}
