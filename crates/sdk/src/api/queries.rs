//! Queries API endpoints.

use crate::api::jobs::ExecutionResponse;
use crate::client::RedashClient;
use crate::config::PollOptions;
use crate::error::RedashResult;
use crate::types::{ArchiveResult, Paginated, Query, QueryResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Queries API for managing and executing saved queries.
pub struct QueriesApi<'a> {
    client: &'a RedashClient,
}

impl<'a> QueriesApi<'a> {
    pub(crate) fn new(client: &'a RedashClient) -> Self {
        Self { client }
    }

    /// List queries, one page at a time.
    pub async fn list(&self, params: &ListQueriesParams) -> RedashResult<Paginated<Query>> {
        self.client.http.get_with_query("/api/queries", params).await
    }

    /// Get a specific query.
    pub async fn get(&self, query_id: i64) -> RedashResult<Query> {
        self.client
            .http
            .get(&format!("/api/queries/{}", query_id))
            .await
    }

    /// Create a query.
    pub async fn create(&self, request: &CreateQueryRequest) -> RedashResult<Query> {
        self.client.http.post("/api/queries", request).await
    }

    /// Update the fields set in `request`, leaving everything else untouched.
    pub async fn update(&self, query_id: i64, request: &UpdateQueryRequest) -> RedashResult<Query> {
        self.client
            .http
            .post(&format!("/api/queries/{}", query_id), request)
            .await
    }

    /// Archive (soft-delete) a query.
    pub async fn archive(&self, query_id: i64) -> RedashResult<ArchiveResult> {
        self.client
            .http
            .delete_no_response(&format!("/api/queries/{}", query_id))
            .await?;
        Ok(ArchiveResult { success: true })
    }

    /// Execute a saved query using the client's default polling behavior.
    pub async fn execute(
        &self,
        query_id: i64,
        parameters: Option<Value>,
    ) -> RedashResult<QueryResult> {
        self.execute_with(query_id, parameters, self.client.poll_options())
            .await
    }

    /// Execute a saved query, polling with the given options if a job is started.
    pub async fn execute_with(
        &self,
        query_id: i64,
        parameters: Option<Value>,
        poll: PollOptions,
    ) -> RedashResult<QueryResult> {
        let body = ExecuteQueryRequest { parameters };
        let response: ExecutionResponse = self
            .client
            .http
            .post(&format!("/api/queries/{}/results", query_id), &body)
            .await?;

        self.client.jobs().resolve(response, poll).await
    }
}

/// Paging and search parameters for [`QueriesApi::list`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListQueriesParams {
    pub page: u32,
    pub page_size: u32,
    /// Free-text search term.
    #[serde(rename = "q", skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl Default for ListQueriesParams {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 25,
            search: None,
        }
    }
}

/// Request to create a query.
///
/// Optional fields are always transmitted, with their defaults when unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateQueryRequest {
    pub name: String,
    pub data_source_id: i64,
    pub query: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "empty_object")]
    pub options: Value,
    #[serde(default)]
    pub schedule: Value,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl CreateQueryRequest {
    pub fn new(name: impl Into<String>, data_source_id: i64, query: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_source_id,
            query: query.into(),
            description: String::new(),
            options: empty_object(),
            schedule: Value::Null,
            tags: Vec::new(),
        }
    }
}

/// Partial update of a query. Only `Some` fields are sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateQueryRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_source_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
    /// `Some(Value::Null)` clears the schedule.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_archived: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_draft: Option<bool>,
}

#[derive(Debug, Serialize)]
struct ExecuteQueryRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    parameters: Option<Value>,
}

fn empty_object() -> Value {
    Value::Object(Default::default())
}
