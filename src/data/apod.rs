//! NASA APOD API client
//!
//! This module fetches raw records from the upstream Astronomy Picture of the
//! Day endpoint. Responses are read as text first and parsed leniently so that
//! non-JSON error pages can still be translated by the proxy.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;

/// Base URL for the NASA APOD API
pub const APOD_BASE_URL: &str = "https://api.nasa.gov/planetary/apod";

/// Default upstream request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Message used when an upstream error payload names no reason
pub const GENERIC_UPSTREAM_ERROR: &str = "Failed to fetch APOD data";

/// Fields consulted, in order, for an upstream error message
const ERROR_FIELDS: [&str; 3] = ["error", "msg", "message"];

/// Errors that can occur when contacting the APOD API
#[derive(Debug, Error)]
pub enum ApodError {
    /// HTTP request failed before a response body was read
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
}

/// Status and leniently parsed body of an upstream response
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamReply {
    /// HTTP status code returned by upstream
    pub status: u16,
    /// Parsed JSON body, or `None` if the body was empty or not JSON
    pub payload: Option<Value>,
}

impl UpstreamReply {
    /// Builds a reply from a status and raw body text
    pub fn from_body(status: u16, body: &str) -> Self {
        Self {
            status,
            payload: serde_json::from_str(body).ok(),
        }
    }

    /// Whether upstream answered with a 2xx status
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Source of APOD records for the proxy
#[async_trait]
pub trait Upstream: Send + Sync {
    /// Fetches the record for `date` (already normalized) using `api_key`
    async fn fetch_picture(&self, api_key: &str, date: &str) -> Result<UpstreamReply, ApodError>;
}

/// Client for fetching records from the NASA APOD API
#[derive(Debug, Clone)]
pub struct ApodClient {
    client: Client,
    base_url: String,
}

impl Default for ApodClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ApodClient {
    /// Create a new ApodClient pointing at the public NASA endpoint
    pub fn new() -> Self {
        Self::with_base_url(APOD_BASE_URL)
    }

    /// Create a new ApodClient with a custom base URL
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a new ApodClient with a custom base URL and request timeout
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl Upstream for ApodClient {
    async fn fetch_picture(&self, api_key: &str, date: &str) -> Result<UpstreamReply, ApodError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("api_key", api_key), ("date", date)])
            .send()
            .await?;

        let status = response.status().as_u16();
        let text = response.text().await?;
        tracing::debug!(status, date, "upstream responded");

        Ok(UpstreamReply::from_body(status, &text))
    }
}

/// Extracts a human-readable reason from an upstream error payload
///
/// Fields are tried in the order `error`, `msg`, `message`. A field counts
/// when it holds a non-empty string; `error` may also be an object whose
/// `message` is a non-empty string. When nothing matches, or the body did not
/// parse, [`GENERIC_UPSTREAM_ERROR`] is returned.
pub fn upstream_error_message(payload: Option<&Value>) -> String {
    let Some(object) = payload.and_then(Value::as_object) else {
        return GENERIC_UPSTREAM_ERROR.to_string();
    };

    ERROR_FIELDS
        .iter()
        .find_map(|field| match object.get(*field) {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(Value::Object(inner)) if *field == "error" => inner
                .get("message")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            _ => None,
        })
        .unwrap_or_else(|| GENERIC_UPSTREAM_ERROR.to_string())
}
