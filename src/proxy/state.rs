//! Application state for the proxy server.

use std::sync::Arc;

use super::config::ProxyConfig;
use crate::data::Upstream;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Upstream APOD source
    pub upstream: Arc<dyn Upstream>,
    /// Startup configuration
    pub config: Arc<ProxyConfig>,
}

impl AppState {
    /// Create a new application state with the given upstream and configuration.
    pub fn new(upstream: Arc<dyn Upstream>, config: ProxyConfig) -> Self {
        Self {
            upstream,
            config: Arc::new(config),
        }
    }
}
