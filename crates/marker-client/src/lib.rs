//! Client for the PDF processing backend
//!
//! Two calls, both `POST` with a JSON body and a JSON response:
//! - `/api/pdf/process`: submit form data together with a PDF path
//! - `/api/pdf/list`: list the PDF files in a directory
//!
//! The base URL is resolved once into an [`ApiConfig`] and passed to
//! [`ApiClient::new`]. No retries or timeouts are added here.

pub mod client;
pub mod config;
pub mod error;

pub use client::ApiClient;
pub use config::{ApiConfig, API_URL_ENV, DEFAULT_API_URL};
pub use error::ApiError;
