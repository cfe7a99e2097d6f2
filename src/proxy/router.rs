//! Router configuration for the proxy.
//!
//! This module sets up the routes and middleware (CORS, security headers,
//! tracing, optional rate limiting) and creates the axum router ready for
//! serving.

use axum::{
    error_handling::HandleErrorLayer,
    http::{header, HeaderValue, Method},
    response::{IntoResponse, Response},
    routing::{any, get},
    BoxError, Router,
};
use tower::{buffer::BufferLayer, limit::RateLimitLayer, load_shed::LoadShedLayer, ServiceBuilder};
use tower_http::{
    cors::{Any, CorsLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

use super::error::ProxyError;
use super::handlers;
use super::state::AppState;

/// Requests queued in front of the rate limiter
const RATE_LIMIT_QUEUE: usize = 1024;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(state.config.allowed_origin.as_deref());

    let mut api = Router::new().route("/apod", any(handlers::get_apod));
    if let Some(limit) = state.config.rate_limit {
        tracing::info!(
            max_requests = limit.max_requests,
            window_secs = limit.window.as_secs(),
            "rate limiting /api"
        );
        api = api.layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .layer(BufferLayer::new(RATE_LIMIT_QUEUE))
                .layer(LoadShedLayer::new())
                .layer(RateLimitLayer::new(limit.max_requests, limit.window)),
        );
    }

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api", api)
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::REFERRER_POLICY,
            HeaderValue::from_static("no-referrer"),
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// CORS restricted to `origin`, or open to any origin when unset
fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods([Method::GET]);
    match origin {
        Some(origin) => match HeaderValue::from_str(origin) {
            Ok(value) => cors.allow_origin(value),
            Err(e) => {
                tracing::warn!(origin, error = %e, "ignoring invalid CLIENT_ORIGIN");
                cors.allow_origin(Any)
            }
        },
        None => cors.allow_origin(Any),
    }
}

async fn handle_middleware_error(err: BoxError) -> Response {
    if err.is::<tower::load_shed::error::Overloaded>() {
        return ProxyError::RateLimited.into_response();
    }
    tracing::error!(error = %err, "middleware failure");
    ProxyError::UpstreamUnreachable.into_response()
}
