//! Endpoint groups of the Redash REST API.

mod dashboards;
mod data_sources;
mod jobs;
mod queries;
mod query_results;
mod visualizations;

pub use dashboards::DashboardsApi;
pub use data_sources::DataSourcesApi;
pub use jobs::{ExecutionResponse, JobsApi};
pub use queries::{CreateQueryRequest, ListQueriesParams, QueriesApi, UpdateQueryRequest};
pub use query_results::{AdhocQueryRequest, QueryResultsApi};
pub use visualizations::{
    CreateVisualizationRequest, UpdateVisualizationRequest, VisualizationsApi,
};

#[cfg(test)]
pub(crate) mod test_support {
    use crate::client::RedashClient;
    use crate::config::PollOptions;
    use std::time::Duration;
    use wiremock::MockServer;

    /// Client pointed at a mock server, polling fast enough for tests.
    pub fn client_for(server: &MockServer) -> RedashClient {
        RedashClient::builder()
            .base_url(server.uri())
            .api_key("test-key")
            .poll_options(PollOptions::new(
                Duration::from_millis(20),
                Duration::from_millis(2_000),
            ))
            .build()
            .unwrap()
    }
}
