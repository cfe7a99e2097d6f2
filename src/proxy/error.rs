//! HTTP error handling and response types.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::DateError;

/// JSON body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable error message
    pub error: String,
}

/// Failures the proxy can answer with.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Only GET is served
    #[error("Method Not Allowed")]
    MethodNotAllowed,

    /// No upstream credential is configured
    #[error("Server misconfiguration")]
    ServerMisconfiguration,

    /// The `date` query parameter is absent
    #[error("Missing required date parameter")]
    MissingParameter,

    /// The date is unparsable or out of range
    #[error(transparent)]
    InvalidParameter(#[from] DateError),

    /// Upstream answered with a non-success status
    #[error("{message}")]
    Upstream { status: StatusCode, message: String },

    /// Upstream answered successfully but without a JSON object
    #[error("Invalid response from upstream")]
    InvalidUpstreamResponse,

    /// Upstream could not be contacted
    #[error("Unable to reach the APOD service")]
    UpstreamUnreachable,

    /// The request budget is exhausted
    #[error("Too many requests, please try again later.")]
    RateLimited,
}

impl ProxyError {
    /// Status code this error is answered with.
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ProxyError::ServerMisconfiguration | ProxyError::UpstreamUnreachable => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ProxyError::MissingParameter | ProxyError::InvalidParameter(_) => {
                StatusCode::BAD_REQUEST
            }
            ProxyError::Upstream { status, .. } => *status,
            ProxyError::InvalidUpstreamResponse => StatusCode::BAD_GATEWAY,
            ProxyError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        let allow_get = matches!(self, ProxyError::MethodNotAllowed);
        let body = ErrorBody {
            error: self.to_string(),
        };

        let mut response = (status, Json(body)).into_response();
        if allow_get {
            response
                .headers_mut()
                .insert(header::ALLOW, HeaderValue::from_static("GET"));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ProxyError::MethodNotAllowed.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            ProxyError::ServerMisconfiguration.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(ProxyError::MissingParameter.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ProxyError::InvalidParameter(DateError::TooEarly).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ProxyError::InvalidUpstreamResponse.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            ProxyError::UpstreamUnreachable.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(ProxyError::RateLimited.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn test_upstream_error_passes_status_and_message_through() {
        let err = ProxyError::Upstream {
            status: StatusCode::NOT_FOUND,
            message: "Date not found".to_string(),
        };
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Date not found");
    }

    #[test]
    fn test_invalid_parameter_uses_date_error_message() {
        let err = ProxyError::from(DateError::Unparsable("abc".to_string()));
        assert_eq!(err.to_string(), "Invalid date \"abc\". Expected YYYY-MM-DD.");
    }

    #[test]
    fn test_method_not_allowed_advertises_get() {
        let response = ProxyError::MethodNotAllowed.into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers().get(header::ALLOW).unwrap(), "GET");
    }

    #[test]
    fn test_other_errors_omit_allow_header() {
        let response = ProxyError::MissingParameter.into_response();
        assert!(response.headers().get(header::ALLOW).is_none());
    }
}
