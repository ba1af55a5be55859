// crates/client/src/config.rs
use std::time::Duration;

pub const BASE_URL_ENV: &str = "REPORT_PORTAL_URL";
pub const TIMEOUT_ENV: &str = "REPORT_PORTAL_TIMEOUT_SECS";

const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Where the backend lives and how long any single call may take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// REPORT_PORTAL_URL env var. Trailing slashes are dropped.
    pub base_url: String,
    /// REPORT_PORTAL_TIMEOUT_SECS env var. A stalled call fails with a
    /// transport error once this elapses.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        let timeout_secs = std::env::var(TIMEOUT_ENV)
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Self::new(
            std::env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            Duration::from_secs(timeout_secs),
        )
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    pub fn with_base_url(self, base_url: impl Into<String>) -> Self {
        Self::new(base_url, self.timeout)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
