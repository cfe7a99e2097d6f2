//! Runtime configuration for the proxy.

use std::time::Duration;

/// Request budget for the `/api` routes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    /// Requests allowed per window
    pub max_requests: u64,
    /// Length of the window
    pub window: Duration,
}

/// Settings read once at startup and shared by every request
#[derive(Debug, Clone, Default)]
pub struct ProxyConfig {
    /// Upstream credential; requests fail with a 500 when absent
    pub api_key: Option<String>,
    /// Answer with a placeholder record instead of calling upstream
    pub mock_mode: bool,
    /// Single origin allowed for cross-origin requests; any origin when unset
    pub allowed_origin: Option<String>,
    /// Optional request budget
    pub rate_limit: Option<RateLimit>,
}

impl ProxyConfig {
    /// Returns the configured credential, treating an empty value as absent
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| !key.trim().is_empty())
    }
}
