// Tools for saved queries, data sources and query execution

use crate::error::McpResult;
use crate::protocol::ToolSchema;
use crate::tools::{
    json_schema_array, json_schema_boolean, json_schema_free_object, json_schema_integer,
    json_schema_object, json_schema_string, parse_arguments, present, Tool, ToolTier,
};
use redash_sdk::{CreateQueryRequest, ListQueriesParams, RedashClient, UpdateQueryRequest};
use serde::Deserialize;
use serde_json::{json, Value};

fn query_fields() -> Value {
    json!({
        "name": json_schema_string("Name of the query"),
        "dataSourceId": json_schema_integer("ID of the data source to run the query against"),
        "query": json_schema_string("SQL query text"),
        "description": json_schema_string("Description of the query"),
        "options": json_schema_free_object("Query options, e.g. parameter definitions"),
        "schedule": {
            "type": ["object", "null"],
            "description": "Refresh schedule, or null for none"
        },
        "tags": json_schema_array(json!({"type": "string"}), "Tags for the query")
    })
}

/// Tool to list saved queries
pub struct ListQueriesTool {
    client: RedashClient,
}

impl ListQueriesTool {
    pub fn new(client: RedashClient) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListQueriesArgs {
    #[serde(default = "default_page")]
    page: u32,
    #[serde(default = "default_page_size")]
    page_size: u32,
    search_term: Option<String>,
}

pub(crate) fn default_page() -> u32 {
    1
}

pub(crate) fn default_page_size() -> u32 {
    25
}

#[async_trait::async_trait]
impl Tool for ListQueriesTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "list-queries".to_string(),
            description: "List saved queries, optionally filtered by a search term".to_string(),
            input_schema: json_schema_object(
                json!({
                    "page": json_schema_integer("Page number (default: 1)"),
                    "pageSize": json_schema_integer("Results per page (default: 25)"),
                    "searchTerm": json_schema_string("Text to search query names and descriptions for")
                }),
                vec![],
            ),
            annotations: None,
        }
    }

    async fn execute(&self, arguments: Value) -> McpResult<Value> {
        let args: ListQueriesArgs = parse_arguments("list-queries", arguments)?;

        let params = ListQueriesParams {
            page: args.page,
            page_size: args.page_size,
            search: args.search_term,
        };
        let page = self.client.queries().list(&params).await?;
        Ok(serde_json::to_value(page)?)
    }
}

/// Tool to get a single query
pub struct GetQueryTool {
    client: RedashClient,
}

impl GetQueryTool {
    pub fn new(client: RedashClient) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryIdArgs {
    query_id: i64,
}

#[async_trait::async_trait]
impl Tool for GetQueryTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get-query".to_string(),
            description: "Get a query by ID, including its SQL and visualizations".to_string(),
            input_schema: json_schema_object(
                json!({ "queryId": json_schema_integer("ID of the query") }),
                vec!["queryId"],
            ),
            annotations: None,
        }
    }

    async fn execute(&self, arguments: Value) -> McpResult<Value> {
        let args: QueryIdArgs = parse_arguments("get-query", arguments)?;
        let query = self.client.queries().get(args.query_id).await?;
        Ok(serde_json::to_value(query)?)
    }
}

/// Tool to create a query
pub struct CreateQueryTool {
    client: RedashClient,
}

impl CreateQueryTool {
    pub fn new(client: RedashClient) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateQueryArgs {
    name: String,
    data_source_id: i64,
    query: String,
    description: Option<String>,
    options: Option<Value>,
    schedule: Option<Value>,
    tags: Option<Vec<String>>,
}

#[async_trait::async_trait]
impl Tool for CreateQueryTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "create-query".to_string(),
            description: "Create a new saved query".to_string(),
            input_schema: json_schema_object(query_fields(), vec!["name", "dataSourceId", "query"]),
            annotations: None,
        }
    }

    async fn execute(&self, arguments: Value) -> McpResult<Value> {
        let args: CreateQueryArgs = parse_arguments("create-query", arguments)?;

        let mut request = CreateQueryRequest::new(args.name, args.data_source_id, args.query);
        if let Some(description) = args.description {
            request.description = description;
        }
        if let Some(options) = args.options {
            request.options = options;
        }
        if let Some(schedule) = args.schedule {
            request.schedule = schedule;
        }
        if let Some(tags) = args.tags {
            request.tags = tags;
        }

        let query = self.client.queries().create(&request).await?;
        Ok(serde_json::to_value(query)?)
    }

    fn tier(&self) -> ToolTier {
        ToolTier::Write
    }
}

/// Tool to update some fields of a query
pub struct UpdateQueryTool {
    client: RedashClient,
}

impl UpdateQueryTool {
    pub fn new(client: RedashClient) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateQueryArgs {
    query_id: i64,
    name: Option<String>,
    data_source_id: Option<i64>,
    query: Option<String>,
    description: Option<String>,
    options: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    schedule: Option<Value>,
    tags: Option<Vec<String>>,
    is_archived: Option<bool>,
    is_draft: Option<bool>,
}

impl From<UpdateQueryArgs> for UpdateQueryRequest {
    fn from(args: UpdateQueryArgs) -> Self {
        Self {
            name: args.name,
            data_source_id: args.data_source_id,
            query: args.query,
            description: args.description,
            options: args.options,
            schedule: args.schedule,
            tags: args.tags,
            is_archived: args.is_archived,
            is_draft: args.is_draft,
        }
    }
}

#[async_trait::async_trait]
impl Tool for UpdateQueryTool {
    fn schema(&self) -> ToolSchema {
        let mut properties = query_fields();
        properties["queryId"] = json_schema_integer("ID of the query to update");
        properties["isArchived"] = json_schema_boolean("Archive or restore the query");
        properties["isDraft"] = json_schema_boolean("Mark the query as draft or published");

        ToolSchema {
            name: "update-query".to_string(),
            description: "Update an existing query. Only the fields provided are changed"
                .to_string(),
            input_schema: json_schema_object(properties, vec!["queryId"]),
            annotations: None,
        }
    }

    async fn execute(&self, arguments: Value) -> McpResult<Value> {
        let args: UpdateQueryArgs = parse_arguments("update-query", arguments)?;
        let query_id = args.query_id;

        let query = self
            .client
            .queries()
            .update(query_id, &UpdateQueryRequest::from(args))
            .await?;
        Ok(serde_json::to_value(query)?)
    }

    fn tier(&self) -> ToolTier {
        ToolTier::Write
    }
}

/// Tool to archive (soft-delete) a query
pub struct ArchiveQueryTool {
    client: RedashClient,
}

impl ArchiveQueryTool {
    pub fn new(client: RedashClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for ArchiveQueryTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "archive-query".to_string(),
            description: "Archive a query. Archived queries are hidden but not destroyed"
                .to_string(),
            input_schema: json_schema_object(
                json!({ "queryId": json_schema_integer("ID of the query to archive") }),
                vec!["queryId"],
            ),
            annotations: None,
        }
    }

    async fn execute(&self, arguments: Value) -> McpResult<Value> {
        let args: QueryIdArgs = parse_arguments("archive-query", arguments)?;
        let result = self.client.queries().archive(args.query_id).await?;
        Ok(serde_json::to_value(result)?)
    }

    fn tier(&self) -> ToolTier {
        ToolTier::Destructive
    }
}

/// Tool to list data sources
pub struct ListDataSourcesTool {
    client: RedashClient,
}

impl ListDataSourcesTool {
    pub fn new(client: RedashClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for ListDataSourcesTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "list-data-sources".to_string(),
            description: "List the data sources queries can run against".to_string(),
            input_schema: json_schema_object(json!({}), vec![]),
            annotations: None,
        }
    }

    async fn execute(&self, _arguments: Value) -> McpResult<Value> {
        let sources = self.client.data_sources().list().await?;
        Ok(Value::Array(sources))
    }
}

/// Tool to run a saved query and wait for its result
pub struct ExecuteQueryTool {
    client: RedashClient,
}

impl ExecuteQueryTool {
    pub fn new(client: RedashClient) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExecuteQueryArgs {
    query_id: i64,
    parameters: Option<Value>,
}

#[async_trait::async_trait]
impl Tool for ExecuteQueryTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "execute-query".to_string(),
            description: "Execute a saved query and return its results".to_string(),
            input_schema: json_schema_object(
                json!({
                    "queryId": json_schema_integer("ID of the query to execute"),
                    "parameters": json_schema_free_object("Values for the query's parameters, by name")
                }),
                vec!["queryId"],
            ),
            annotations: None,
        }
    }

    async fn execute(&self, arguments: Value) -> McpResult<Value> {
        let args: ExecuteQueryArgs = parse_arguments("execute-query", arguments)?;
        let result = self
            .client
            .queries()
            .execute(args.query_id, args.parameters)
            .await?;
        Ok(serde_json::to_value(result)?)
    }
}

/// Tool to run SQL without saving a query
pub struct ExecuteAdhocQueryTool {
    client: RedashClient,
}

impl ExecuteAdhocQueryTool {
    pub fn new(client: RedashClient) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExecuteAdhocQueryArgs {
    query: String,
    data_source_id: i64,
}

#[async_trait::async_trait]
impl Tool for ExecuteAdhocQueryTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "execute-adhoc-query".to_string(),
            description: "Execute SQL directly against a data source without saving it. \
                          Results are never served from cache and are auto-limited"
                .to_string(),
            input_schema: json_schema_object(
                json!({
                    "query": json_schema_string("SQL query text"),
                    "dataSourceId": json_schema_integer("ID of the data source to run against")
                }),
                vec!["query", "dataSourceId"],
            ),
            annotations: None,
        }
    }

    async fn execute(&self, arguments: Value) -> McpResult<Value> {
        let args: ExecuteAdhocQueryArgs = parse_arguments("execute-adhoc-query", arguments)?;
        let result = self
            .client
            .query_results()
            .execute_adhoc(args.query, args.data_source_id)
            .await?;
        Ok(serde_json::to_value(result)?)
    }
}
