//! HTTP proxy in front of the NASA APOD API.
//!
//! Inbound requests for a single record are validated, the date normalized,
//! and a credentialed request forwarded upstream. Upstream answers (or
//! failures) are translated into JSON responses with a uniform error shape.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  Router (axum + tower-http)                               │
//! │  - tracing, CORS, security headers, optional rate limit   │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Handler                                                  │
//! │  - method / credential / date validation                  │
//! │  - upstream response translation                          │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Upstream (data::apod)                                    │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use config::{ProxyConfig, RateLimit};
pub use error::{ErrorBody, ProxyError};
pub use router::create_router;
pub use state::AppState;
