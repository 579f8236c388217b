//! Backend location.

use serde::{Deserialize, Serialize};

/// Environment variable holding the backend base URL.
pub const API_URL_ENV: &str = "PDF_MARKER_API_URL";

/// Local development backend, used when nothing else is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL without a trailing slash, e.g. `http://localhost:8000`
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    DEFAULT_API_URL.to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Read [`API_URL_ENV`] once, falling back to [`DEFAULT_API_URL`].
    pub fn from_env() -> Self {
        Self::from_env_value(std::env::var(API_URL_ENV).ok())
    }

    /// Empty or whitespace-only values count as unset.
    pub fn from_env_value(value: Option<String>) -> Self {
        match value {
            Some(url) if !url.trim().is_empty() => Self::new(url.trim()),
            _ => Self::default(),
        }
    }

    /// Absolute URL for an API path such as `/api/pdf/list`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}
