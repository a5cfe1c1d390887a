//! # HTTP client configuration.
//!
//! ## Sentinel values
//! - `timeout = 0s` → no request timeout

use std::time::Duration;

/// Default address of the node daemon REST API.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:4050";

/// Settings for [`HttpClient`](crate::HttpClient).
///
/// ## Field semantics
/// - `base_url`: daemon API root; request paths are appended after a `/`
/// - `timeout`: per-request timeout (`0s` = none)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    /// Root URL of the daemon API, without trailing slash.
    pub base_url: String,

    /// Per-request timeout.
    pub timeout: Duration,
}

impl ClientConfig {
    /// Default settings pointed at `base_url`.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Returns the request timeout as an `Option`.
    ///
    /// - `None` → no timeout
    /// - `Some(d)` → applied to every request
    #[inline]
    pub fn request_timeout(&self) -> Option<Duration> {
        if self.timeout == Duration::ZERO {
            None
        } else {
            Some(self.timeout)
        }
    }

    /// Full URL for `path` (leading/trailing slashes tolerated).
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl Default for ClientConfig {
    /// Default configuration:
    ///
    /// - `base_url = "http://127.0.0.1:4050"` (local daemon)
    /// - `timeout = 20s`
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(20),
        }
    }
}
