//! Main client for the Redash SDK.

use crate::api::*;
use crate::config::{ClientConfig, PollOptions, DEFAULT_TIMEOUT};
use crate::error::{RedashError, RedashResult};
use crate::transport::HttpTransport;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Main client for interacting with the Redash API.
///
/// Cloning is cheap; clones share the configuration and connection pool.
#[derive(Debug, Clone)]
pub struct RedashClient {
    config: Arc<ClientConfig>,
    pub(crate) http: HttpTransport,
}

impl RedashClient {
    /// Create a new client builder.
    pub fn builder() -> RedashClientBuilder {
        RedashClientBuilder::new()
    }

    /// Create a client from configuration.
    pub fn from_config(config: ClientConfig) -> RedashResult<Self> {
        let config = Arc::new(config);
        let http = HttpTransport::new(config.clone())?;

        Ok(Self { config, http })
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Default polling behavior for execution jobs.
    pub fn poll_options(&self) -> PollOptions {
        self.config.poll
    }

    /// Get the queries API.
    pub fn queries(&self) -> QueriesApi<'_> {
        QueriesApi::new(self)
    }

    /// Get the query results API.
    pub fn query_results(&self) -> QueryResultsApi<'_> {
        QueryResultsApi::new(self)
    }

    /// Get the jobs API.
    pub fn jobs(&self) -> JobsApi<'_> {
        JobsApi::new(self)
    }

    /// Get the dashboards API.
    pub fn dashboards(&self) -> DashboardsApi<'_> {
        DashboardsApi::new(self)
    }

    /// Get the visualizations API.
    pub fn visualizations(&self) -> VisualizationsApi<'_> {
        VisualizationsApi::new(self)
    }

    /// Get the data sources API.
    pub fn data_sources(&self) -> DataSourcesApi<'_> {
        DataSourcesApi::new(self)
    }
}

/// Builder for creating a RedashClient.
pub struct RedashClientBuilder {
    base_url: Option<String>,
    api_key: Option<String>,
    timeout: Duration,
    poll: PollOptions,
}

impl RedashClientBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            base_url: None,
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
            poll: PollOptions::default(),
        }
    }

    /// Set the base URL of the Redash instance.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the API key for authentication.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the default job polling behavior.
    pub fn poll_options(mut self, poll: PollOptions) -> Self {
        self.poll = poll;
        self
    }

    /// Build the client.
    pub fn build(self) -> RedashResult<RedashClient> {
        let base_url_str = self
            .base_url
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| RedashError::Config("base_url is required".to_string()))?;

        let api_key = self
            .api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| RedashError::Config("api_key is required".to_string()))?;

        // Url::join replaces the last path segment unless the base ends with '/'.
        let mut base_url = Url::parse(base_url_str.trim())?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let config = ClientConfig {
            base_url,
            api_key,
            timeout: self.timeout,
            poll: self.poll,
        };

        RedashClient::from_config(config)
    }
}

impl Default for RedashClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_requires_base_url() {
        let err = RedashClient::builder().api_key("k").build().unwrap_err();
        assert!(matches!(err, RedashError::Config(ref m) if m.contains("base_url")));
    }

    #[test]
    fn test_build_requires_api_key() {
        let err = RedashClient::builder()
            .base_url("https://redash.example.com")
            .api_key("  ")
            .build()
            .unwrap_err();
        assert!(matches!(err, RedashError::Config(ref m) if m.contains("api_key")));
    }

    #[test]
    fn test_build_rejects_invalid_url() {
        let err = RedashClient::builder()
            .base_url("not a url")
            .api_key("k")
            .build()
            .unwrap_err();
        assert!(matches!(err, RedashError::InvalidUrl(_)));
    }

    #[test]
    fn test_build_normalizes_base_path() {
        let client = RedashClient::builder()
            .base_url("https://example.com/redash")
            .api_key("k")
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();

        assert_eq!(client.config().base_url.as_str(), "https://example.com/redash/");
        assert_eq!(client.config().timeout, Duration::from_secs(5));
        assert_eq!(client.poll_options(), PollOptions::default());
    }
}
