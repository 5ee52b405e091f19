//! Query results API endpoints.

use crate::api::jobs::ExecutionResponse;
use crate::client::RedashClient;
use crate::config::PollOptions;
use crate::error::RedashResult;
use crate::types::QueryResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Query results API: stored results and ad-hoc execution.
pub struct QueryResultsApi<'a> {
    client: &'a RedashClient,
}

impl<'a> QueryResultsApi<'a> {
    pub(crate) fn new(client: &'a RedashClient) -> Self {
        Self { client }
    }

    /// Get a stored query result.
    pub async fn get(&self, result_id: i64) -> RedashResult<QueryResult> {
        let response: QueryResultResponse = self
            .client
            .http
            .get(&format!("/api/query_results/{}", result_id))
            .await?;
        Ok(response.query_result)
    }

    /// Run query text against a data source without saving a query.
    pub async fn execute_adhoc(
        &self,
        query: impl Into<String>,
        data_source_id: i64,
    ) -> RedashResult<QueryResult> {
        self.execute_adhoc_with(query, data_source_id, self.client.poll_options())
            .await
    }

    /// Like [`execute_adhoc`](Self::execute_adhoc) with explicit polling options.
    pub async fn execute_adhoc_with(
        &self,
        query: impl Into<String>,
        data_source_id: i64,
        poll: PollOptions,
    ) -> RedashResult<QueryResult> {
        let request = AdhocQueryRequest::new(query, data_source_id);
        let response: ExecutionResponse =
            self.client.http.post("/api/query_results", &request).await?;

        self.client.jobs().resolve(response, poll).await
    }
}

/// Body of an ad-hoc execution. Always bypasses the result cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdhocQueryRequest {
    pub query: String,
    pub data_source_id: i64,
    pub max_age: u64,
    pub parameters: Value,
    pub apply_auto_limit: bool,
}

impl AdhocQueryRequest {
    pub fn new(query: impl Into<String>, data_source_id: i64) -> Self {
        Self {
            query: query.into(),
            data_source_id,
            max_age: 0,
            parameters: Value::Object(Default::default()),
            apply_auto_limit: true,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct QueryResultResponse {
    query_result: QueryResult,
}
