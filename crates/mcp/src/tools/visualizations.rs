// Visualization tools
//
// create-visualization and update-visualization take overlapping argument
// shapes, so both check their arguments in `validate` before any API call.

use crate::error::{McpError, McpResult};
use crate::protocol::ToolSchema;
use crate::tools::{
    json_schema_free_object, json_schema_integer, json_schema_object, json_schema_string,
    parse_arguments, Tool, ToolTier,
};
use redash_sdk::{CreateVisualizationRequest, RedashClient, UpdateVisualizationRequest};
use serde::Deserialize;
use serde_json::{json, Value};

fn visualization_fields() -> Value {
    json!({
        "type": json_schema_string("Visualization type, e.g. TABLE, CHART, COUNTER, PIVOT"),
        "name": json_schema_string("Name of the visualization"),
        "description": json_schema_string("Description of the visualization"),
        "options": json_schema_free_object("Type specific visualization options")
    })
}

fn non_blank(tool: &str, arguments: &Value, field: &str) -> McpResult<()> {
    match arguments.get(field).and_then(Value::as_str) {
        Some(s) if s.trim().is_empty() => Err(McpError::validation(
            tool,
            format!("\"{}\" must not be empty", field),
        )),
        _ => Ok(()),
    }
}

/// Tool to get a visualization
pub struct GetVisualizationTool {
    client: RedashClient,
}

impl GetVisualizationTool {
    pub fn new(client: RedashClient) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VisualizationIdArgs {
    visualization_id: i64,
}

#[async_trait::async_trait]
impl Tool for GetVisualizationTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get-visualization".to_string(),
            description: "Get a visualization by ID".to_string(),
            input_schema: json_schema_object(
                json!({ "visualizationId": json_schema_integer("ID of the visualization") }),
                vec!["visualizationId"],
            ),
            annotations: None,
        }
    }

    async fn execute(&self, arguments: Value) -> McpResult<Value> {
        let args: VisualizationIdArgs = parse_arguments("get-visualization", arguments)?;
        let viz = self
            .client
            .visualizations()
            .get(args.visualization_id)
            .await?;
        Ok(serde_json::to_value(viz)?)
    }
}

/// Tool to create a visualization on a query
pub struct CreateVisualizationTool {
    client: RedashClient,
}

impl CreateVisualizationTool {
    pub fn new(client: RedashClient) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateVisualizationArgs {
    query_id: i64,
    #[serde(rename = "type")]
    viz_type: String,
    name: String,
    description: Option<String>,
    options: Value,
}

#[async_trait::async_trait]
impl Tool for CreateVisualizationTool {
    fn schema(&self) -> ToolSchema {
        let mut properties = visualization_fields();
        properties["queryId"] = json_schema_integer("ID of the query to visualize");

        ToolSchema {
            name: "create-visualization".to_string(),
            description: "Create a visualization for a query".to_string(),
            input_schema: json_schema_object(
                properties,
                vec!["queryId", "type", "name", "options"],
            ),
            annotations: None,
        }
    }

    fn validate(&self, arguments: &Value) -> McpResult<()> {
        const TOOL: &str = "create-visualization";

        if arguments.get("visualizationId").is_some() {
            return Err(McpError::validation(
                TOOL,
                "\"visualizationId\" is not accepted; use update-visualization to change an existing visualization",
            ));
        }
        non_blank(TOOL, arguments, "type")?;
        non_blank(TOOL, arguments, "name")
    }

    async fn execute(&self, arguments: Value) -> McpResult<Value> {
        let args: CreateVisualizationArgs = parse_arguments("create-visualization", arguments)?;

        let request = CreateVisualizationRequest {
            query_id: args.query_id,
            viz_type: args.viz_type,
            name: args.name,
            description: args.description,
            options: args.options,
        };
        let viz = self.client.visualizations().create(&request).await?;
        Ok(serde_json::to_value(viz)?)
    }

    fn tier(&self) -> ToolTier {
        ToolTier::Write
    }
}

/// Tool to update some fields of a visualization
pub struct UpdateVisualizationTool {
    client: RedashClient,
}

impl UpdateVisualizationTool {
    pub fn new(client: RedashClient) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateVisualizationArgs {
    visualization_id: i64,
    #[serde(rename = "type")]
    viz_type: Option<String>,
    name: Option<String>,
    description: Option<String>,
    options: Option<Value>,
}

impl From<UpdateVisualizationArgs> for UpdateVisualizationRequest {
    fn from(args: UpdateVisualizationArgs) -> Self {
        Self {
            viz_type: args.viz_type,
            name: args.name,
            description: args.description,
            options: args.options,
        }
    }
}

#[async_trait::async_trait]
impl Tool for UpdateVisualizationTool {
    fn schema(&self) -> ToolSchema {
        let mut properties = visualization_fields();
        properties["visualizationId"] = json_schema_integer("ID of the visualization to update");

        ToolSchema {
            name: "update-visualization".to_string(),
            description: "Update an existing visualization. Only the fields provided are changed"
                .to_string(),
            input_schema: json_schema_object(properties, vec!["visualizationId"]),
            annotations: None,
        }
    }

    fn validate(&self, arguments: &Value) -> McpResult<()> {
        const TOOL: &str = "update-visualization";

        if arguments.get("queryId").is_some() {
            return Err(McpError::validation(
                TOOL,
                "\"queryId\" is not accepted; use create-visualization to add a visualization to a query",
            ));
        }
        let args: UpdateVisualizationArgs = parse_arguments(TOOL, arguments.clone())?;
        if UpdateVisualizationRequest::from(args).is_empty() {
            return Err(McpError::validation(
                TOOL,
                "at least one of \"type\", \"name\", \"description\" or \"options\" is required",
            ));
        }
        non_blank(TOOL, arguments, "type")?;
        non_blank(TOOL, arguments, "name")
    }

    async fn execute(&self, arguments: Value) -> McpResult<Value> {
        let args: UpdateVisualizationArgs = parse_arguments("update-visualization", arguments)?;
        let visualization_id = args.visualization_id;

        let viz = self
            .client
            .visualizations()
            .update(visualization_id, &args.into())
            .await?;
        Ok(serde_json::to_value(viz)?)
    }

    fn tier(&self) -> ToolTier {
        ToolTier::Write
    }
}

/// Tool to delete a visualization
pub struct DeleteVisualizationTool {
    client: RedashClient,
}

impl DeleteVisualizationTool {
    pub fn new(client: RedashClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for DeleteVisualizationTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "delete-visualization".to_string(),
            description: "Delete a visualization".to_string(),
            input_schema: json_schema_object(
                json!({ "visualizationId": json_schema_integer("ID of the visualization to delete") }),
                vec!["visualizationId"],
            ),
            annotations: None,
        }
    }

    async fn execute(&self, arguments: Value) -> McpResult<Value> {
        let args: VisualizationIdArgs = parse_arguments("delete-visualization", arguments)?;
        self.client
            .visualizations()
            .delete(args.visualization_id)
            .await?;
        Ok(json!({ "success": true }))
    }

    fn tier(&self) -> ToolTier {
        ToolTier::Destructive
    }
}

#[cfg(test)]
mod tests {
    use crate::tools::test_support::{client_for, registry_for};
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_create_rejects_update_shape_before_any_call() {
        let server = MockServer::start().await;

        let registry = registry_for(client_for(&server));
        let result = registry
            .call(
                "create-visualization",
                json!({"visualizationId": 9, "queryId": 1, "type": "TABLE", "name": "T", "options": {}}),
            )
            .await;

        assert!(result.is_error());
        assert!(result.content[0].as_text().contains("update-visualization"));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_requires_options() {
        let server = MockServer::start().await;

        let registry = registry_for(client_for(&server));
        let result = registry
            .call(
                "create-visualization",
                json!({"queryId": 1, "type": "TABLE", "name": "T"}),
            )
            .await;

        assert!(result.is_error());
        assert!(result.content[0].as_text().contains("\"options\" is required"));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_without_changes_is_rejected() {
        let server = MockServer::start().await;

        let registry = registry_for(client_for(&server));
        let result = registry
            .call("update-visualization", json!({"visualizationId": 9}))
            .await;

        assert!(result.is_error());
        assert!(result.content[0].as_text().contains("at least one of"));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_rejects_create_shape() {
        let server = MockServer::start().await;

        let registry = registry_for(client_for(&server));
        let result = registry
            .call(
                "update-visualization",
                json!({"visualizationId": 9, "queryId": 1, "name": "T"}),
            )
            .await;

        assert!(result.is_error());
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_sends_only_given_keys() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/visualizations/9"))
            .and(body_json(json!({"name": "Renamed", "options": {}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 9, "type": "TABLE", "name": "Renamed", "options": {}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let registry = registry_for(client_for(&server));
        let result = registry
            .call(
                "update-visualization",
                json!({"visualizationId": 9, "name": "Renamed", "options": {}}),
            )
            .await;

        assert!(!result.is_error(), "{:?}", result);
    }

    #[tokio::test]
    async fn test_create_then_delete() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/visualizations"))
            .and(body_json(json!({
                "query_id": 1, "type": "COUNTER", "name": "Total", "options": {"counterColName": "n"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 12, "type": "COUNTER", "name": "Total", "options": {"counterColName": "n"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("DELETE"))
            .and(path("/api/visualizations/12"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let registry = registry_for(client_for(&server));
        let created = registry
            .call(
                "create-visualization",
                json!({"queryId": 1, "type": "COUNTER", "name": "Total", "options": {"counterColName": "n"}}),
            )
            .await;
        assert!(!created.is_error(), "{:?}", created);

        let deleted = registry
            .call("delete-visualization", json!({"visualizationId": 12}))
            .await;
        assert_eq!(deleted.content[0].as_text(), "{\n  \"success\": true\n}");
    }
}
