//! Backend configuration parsed from environment variables.

use std::time::Duration;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:5000";
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendTimeouts {
    /// Whole-request limit. `None` leaves requests unbounded; callers cancel instead.
    pub request_secs: Option<u64>,
    pub connect_secs: u64,
}

impl BackendTimeouts {
    #[must_use]
    pub fn request(&self) -> Option<Duration> {
        self.request_secs.map(Duration::from_secs)
    }

    #[must_use]
    pub fn connect(&self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Base URL without a trailing slash.
    pub backend_url: String,
    pub timeouts: BackendTimeouts,
}

impl SyncConfig {
    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `NEUROCANVAS_BACKEND_URL`: default `http://localhost:5000`
    /// - `NEUROCANVAS_REQUEST_TIMEOUT_SECS`: unset means no request timeout
    /// - `NEUROCANVAS_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// Values that fail to parse fall back to their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let backend_url = std::env::var("NEUROCANVAS_BACKEND_URL").unwrap_or_else(|_| DEFAULT_BACKEND_URL.to_string());
        let timeouts = BackendTimeouts {
            request_secs: std::env::var("NEUROCANVAS_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok()),
            connect_secs: env_parse_u64("NEUROCANVAS_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };
        Self::new(backend_url, timeouts)
    }

    #[must_use]
    pub fn new(backend_url: impl AsRef<str>, timeouts: BackendTimeouts) -> Self {
        let backend_url = backend_url.as_ref().trim_end_matches('/').to_string();
        Self { backend_url, timeouts }
    }

    /// Replace the backend URL, keeping timeouts.
    #[must_use]
    pub fn with_backend_url(self, backend_url: impl AsRef<str>) -> Self {
        Self::new(backend_url, self.timeouts)
    }

    /// Absolute URL for an endpoint path such as `/plot-system`.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.backend_url, path)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new(
            DEFAULT_BACKEND_URL,
            BackendTimeouts { request_secs: None, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS },
        )
    }
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
