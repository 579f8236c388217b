use chrono::{SecondsFormat, Utc};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error};

use crate::config::ApiConfig;
use crate::error::ApiError;

const PROCESS_PATH: &str = "/api/pdf/process";
const LIST_PATH: &str = "/api/pdf/list";

/// Backend client. Holds no state beyond its configuration.
pub struct ApiClient {
    config: ApiConfig,
    client: Client,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmitRequest<'a, T: ?Sized> {
    data: &'a T,
    pdf_path: &'a str,
    timestamp: String,
}

#[derive(Debug, Serialize)]
struct ListRequest<'a> {
    directory: &'a str,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let client = Client::builder().build().map_err(ApiError::Client)?;
        Ok(Self { config, client })
    }

    /// Use an existing `reqwest` client, e.g. one shared with other services.
    pub fn with_client(config: ApiConfig, client: Client) -> Self {
        Self { config, client }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Submit form data together with the path of the PDF it belongs to.
    ///
    /// The request carries the current UTC time as an RFC 3339 timestamp
    /// with millisecond precision.
    pub async fn submit_pdf_data<T>(&self, data: &T, pdf_path: &str) -> Result<Value, ApiError>
    where
        T: Serialize + ?Sized,
    {
        let body = SubmitRequest {
            data,
            pdf_path,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        };
        self.post_json(PROCESS_PATH, &body).await
    }

    /// List the PDF files available in a directory on the backend.
    pub async fn list_pdfs(&self, directory: &str) -> Result<Value, ApiError> {
        self.post_json(LIST_PATH, &ListRequest { directory }).await
    }

    async fn post_json<B: Serialize>(&self, path: &str, body: &B) -> Result<Value, ApiError> {
        let url = self.config.endpoint(path);
        let result = self.send(&url, body).await;
        if let Err(e) = &result {
            error!(url = %url, error = %e, "API call failed");
        }
        result
    }

    async fn send<B: Serialize>(&self, url: &str, body: &B) -> Result<Value, ApiError> {
        debug!(url, "POST");
        let response = self.client.post(url).json(body).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Network {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
