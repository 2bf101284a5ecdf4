//! Client configuration from the environment

use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for talking to the detection service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Service root, e.g. `http://localhost:8000`
    pub api_url: String,
    /// Sent as `X-API-Key` when present
    pub api_key: Option<String>,
    /// Upper bound on a single request
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source; missing or unparsable values
    /// fall back to defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let api_url = lookup("HONEYPOT_API_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let api_key = lookup("HONEYPOT_API_KEY").filter(|key| !key.is_empty());

        let timeout = lookup("HONEYPOT_TIMEOUT_SECS")
            .and_then(|secs| secs.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS), Duration::from_secs);

        Self {
            api_url,
            api_key,
            timeout,
        }
    }
}
