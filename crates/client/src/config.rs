use std::time::Duration;

use crate::poller::PollerConfig;

/// Public ChunkyCloud API.
pub const DEFAULT_API_URL: &str = "https://api.chunkycloud.lemaik.de";

/// Refresh cadence of job and stats views.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Client configuration loaded from environment variables.
///
/// All fields have defaults that talk to the public service.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the render service, without a trailing slash.
    pub api_url: String,
    /// API key used for job submission.
    pub api_key: Option<String>,
    pub poll_interval: Duration,
    /// Per-request timeout applied by the HTTP client.
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: None,
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                             |
    /// |------------------------|-------------------------------------|
    /// | `CHUNKYCLOUD_API_URL`  | `https://api.chunkycloud.lemaik.de` |
    /// | `CHUNKYCLOUD_API_KEY`  | unset                               |
    /// | `POLL_INTERVAL_SECS`   | `30`                                |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                                |
    ///
    /// Unparsable or zero numbers fall back to their defaults.
    pub fn from_env() -> Self {
        let api_url = std::env::var("CHUNKYCLOUD_API_URL")
            .map(|url| normalize_url(&url))
            .unwrap_or_else(|_| DEFAULT_API_URL.into());

        let api_key = std::env::var("CHUNKYCLOUD_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());

        let poll_interval_secs = std::env::var("POLL_INTERVAL_SECS")
            .ok()
            .and_then(|v| parse_positive_secs(&v))
            .unwrap_or(DEFAULT_POLL_INTERVAL_SECS);

        let request_timeout_secs = std::env::var("REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| parse_positive_secs(&v))
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

        Self {
            api_url,
            api_key,
            poll_interval: Duration::from_secs(poll_interval_secs),
            request_timeout: Duration::from_secs(request_timeout_secs),
        }
    }

    /// Poller settings derived from this configuration.
    pub fn poller(&self) -> PollerConfig {
        PollerConfig {
            interval: self.poll_interval,
            ..PollerConfig::default()
        }
    }
}

/// A whole number of seconds greater than zero.
fn parse_positive_secs(value: &str) -> Option<u64> {
    value.trim().parse().ok().filter(|&secs: &u64| secs > 0)
}

/// Strip trailing slashes so paths can be appended with `format!`.
pub fn normalize_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
