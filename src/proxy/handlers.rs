//! HTTP handlers for the proxy API.

use axum::{
    extract::{rejection::QueryRejection, OriginalUri, Query, State},
    http::{header, HeaderMap, HeaderValue, Method, Uri},
    response::{IntoResponse, Response},
    Json,
};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::ProxyError;
use super::state::AppState;
use crate::data::{
    format_date, upstream_error_message, validate_date, MediaType, PictureRecord, UpstreamReply,
};

/// Cache directive attached to successful responses
pub const CACHE_CONTROL_VALUE: &str = "public, s-maxage=3600, stale-while-revalidate=60";

/// Result type for handlers.
pub type HandlerResult<T> = Result<T, ProxyError>;

/// Query string of `/api/apod`
#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: Option<String>,
}

/// Body of `/health`
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

// =============================================================================
// APOD
// =============================================================================

/// ANY /api/apod?date=YYYY-MM-DD
///
/// Validates the request, then forwards it upstream (or answers with a
/// placeholder record in mock mode).
pub async fn get_apod(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    OriginalUri(uri): OriginalUri,
    query: Result<Query<DateQuery>, QueryRejection>,
) -> HandlerResult<Response> {
    if method != Method::GET {
        return Err(ProxyError::MethodNotAllowed);
    }

    let config = &state.config;
    if !config.mock_mode && config.api_key().is_none() {
        tracing::error!("missing NASA_API_KEY; refusing to proxy");
        return Err(ProxyError::ServerMisconfiguration);
    }

    let raw_date = query
        .ok()
        .and_then(|Query(q)| q.date)
        .filter(|d| !d.is_empty())
        .or_else(|| date_from_raw_uri(&uri, &headers))
        .ok_or(ProxyError::MissingParameter)?;

    let date = format_date(validate_date(&raw_date)?);

    if config.mock_mode {
        tracing::info!(%date, "mock mode: answering with placeholder record");
        return Ok(success_response(mock_record(&date)));
    }

    let Some(api_key) = config.api_key() else {
        tracing::error!("missing NASA_API_KEY; refusing to proxy");
        return Err(ProxyError::ServerMisconfiguration);
    };

    let reply = state
        .upstream
        .fetch_picture(api_key, &date)
        .await
        .map_err(|e| {
            tracing::error!(%date, error = %e, "upstream unreachable");
            ProxyError::UpstreamUnreachable
        })?;

    translate_reply(reply)
}

/// Maps an upstream reply onto the proxy's response contract
pub fn translate_reply(reply: UpstreamReply) -> HandlerResult<Response> {
    if !reply.is_success() {
        let message = upstream_error_message(reply.payload.as_ref());
        tracing::warn!(status = reply.status, %message, "upstream returned an error");
        let status = axum::http::StatusCode::from_u16(reply.status)
            .unwrap_or(axum::http::StatusCode::BAD_GATEWAY);
        return Err(ProxyError::Upstream { status, message });
    }

    match reply.payload {
        Some(payload @ Value::Object(_)) => Ok(success_response(payload)),
        _ => {
            tracing::warn!(status = reply.status, "upstream returned a non-object body");
            Err(ProxyError::InvalidUpstreamResponse)
        }
    }
}

/// Placeholder served in mock mode
pub fn mock_record(date: &str) -> PictureRecord {
    PictureRecord {
        date: date.to_string(),
        title: "Mock Astronomy Picture".to_string(),
        explanation: "Mock mode is enabled; no request was made to NASA.".to_string(),
        media_type: MediaType::Image,
        url: "https://apod.nasa.gov/apod/image/placeholder.jpg".to_string(),
        hd_url: None,
        service_version: "mock".to_string(),
        copyright: None,
    }
}

fn success_response<T: Serialize>(body: T) -> Response {
    (
        [(header::CACHE_CONTROL, HeaderValue::from_static(CACHE_CONTROL_VALUE))],
        Json(body),
    )
        .into_response()
}

/// Re-reads `date` from the raw request target when the parsed query had none
fn date_from_raw_uri(uri: &Uri, headers: &HeaderMap) -> Option<String> {
    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost");
    let target = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");

    match Url::parse(&format!("http://{}{}", host, target)) {
        Ok(url) => url
            .query_pairs()
            .find(|(key, _)| key == "date")
            .map(|(_, value)| value.into_owned())
            .filter(|d| !d.is_empty()),
        Err(e) => {
            tracing::warn!(error = %e, "failed to re-parse request URL");
            None
        }
    }
}
