//! Data sources API endpoints.

use crate::client::RedashClient;
use crate::error::RedashResult;
use crate::types::DataSource;

/// Data sources API.
pub struct DataSourcesApi<'a> {
    client: &'a RedashClient,
}

impl<'a> DataSourcesApi<'a> {
    pub(crate) fn new(client: &'a RedashClient) -> Self {
        Self { client }
    }

    /// List all data sources visible to the API key.
    pub async fn list(&self) -> RedashResult<Vec<DataSource>> {
        self.client.http.get("/api/data_sources").await
    }
}
