//! Fetching records from the proxy
//!
//! `HttpFetcher` calls the proxy's `/api/apod` endpoint and checks the shape
//! of what comes back before handing it to the cache hook.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;

use crate::data::PictureRecord;

/// Default proxy base URL
pub const DEFAULT_API_BASE: &str = "http://localhost:4000";

/// Default request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Errors surfaced to the user when a record cannot be loaded
#[derive(Debug, Error)]
pub enum ClientError {
    /// The proxy answered 404
    #[error("No image available for this date.")]
    NotFound,

    /// The proxy answered with another non-success status
    #[error("Fetch error: {0}")]
    FetchStatus(u16),

    /// The payload lacked a `date` or `url`, or did not match the record shape
    #[error("Invalid API response")]
    InvalidResponse,

    /// The proxy could not be reached
    #[error("Unable to reach the APOD service")]
    Network(#[source] reqwest::Error),
}

/// Source of picture records for the cache hook
#[async_trait]
pub trait PictureFetcher: Send + Sync + 'static {
    /// Fetches the record for a normalized `YYYY-MM-DD` date
    async fn fetch(&self, date: &str) -> Result<PictureRecord, ClientError>;
}

#[async_trait]
impl<T: PictureFetcher> PictureFetcher for std::sync::Arc<T> {
    async fn fetch(&self, date: &str) -> Result<PictureRecord, ClientError> {
        (**self).fetch(date).await
    }
}

/// Fetches records from the proxy over HTTP
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    endpoint: String,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE)
    }
}

impl HttpFetcher {
    /// Create a fetcher for the proxy at `api_base`
    pub fn new(api_base: &str) -> Self {
        Self::with_timeout(api_base, DEFAULT_TIMEOUT)
    }

    /// Create a fetcher with a custom request timeout
    pub fn with_timeout(api_base: &str, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self {
            client,
            endpoint: format!("{}/api/apod", api_base.trim_end_matches('/')),
        }
    }
}

#[async_trait]
impl PictureFetcher for HttpFetcher {
    async fn fetch(&self, date: &str) -> Result<PictureRecord, ClientError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("date", date)])
            .send()
            .await
            .map_err(ClientError::Network)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound);
        }
        if !status.is_success() {
            return Err(ClientError::FetchStatus(status.as_u16()));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|_| ClientError::InvalidResponse)?;
        parse_record(payload)
    }
}

/// Checks the payload shape and converts it into a record
pub fn parse_record(payload: Value) -> Result<PictureRecord, ClientError> {
    let has_date = payload.get("date").map_or(false, Value::is_string);
    let has_url = payload
        .get("url")
        .and_then(Value::as_str)
        .map_or(false, |url| !url.is_empty());
    if !has_date || !has_url {
        return Err(ClientError::InvalidResponse);
    }

    serde_json::from_value(payload).map_err(|_| ClientError::InvalidResponse)
}
