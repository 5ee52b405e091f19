//! Configuration types for the Redash SDK.

use std::time::Duration;
use url::Url;

/// Default HTTP request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(30_000);

/// Configuration for the Redash client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the Redash instance.
    pub base_url: Url,
    /// User or service API key, sent as `Authorization: Key <api_key>`.
    pub api_key: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Default polling behavior for query execution jobs.
    pub poll: PollOptions,
}

impl ClientConfig {
    /// Create a new configuration with the given base URL and API key.
    pub fn new(base_url: Url, api_key: impl Into<String>) -> Self {
        Self {
            base_url,
            api_key: api_key.into(),
            timeout: DEFAULT_TIMEOUT,
            poll: PollOptions::default(),
        }
    }
}

/// Interval and upper bound for polling an execution job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    /// Wait between two job status checks.
    pub interval: Duration,
    /// Give up once this much time has passed since the job was first seen.
    pub timeout: Duration,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(1000),
            timeout: Duration::from_millis(60_000),
        }
    }
}

impl PollOptions {
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }
}
