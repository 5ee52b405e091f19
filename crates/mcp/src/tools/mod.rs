pub mod dashboards;
pub mod queries;
pub mod visualizations;
mod registry;

pub use dashboards::{GetDashboardTool, ListDashboardsTool};
pub use queries::{
    ArchiveQueryTool, CreateQueryTool, ExecuteAdhocQueryTool, ExecuteQueryTool, GetQueryTool,
    ListDataSourcesTool, ListQueriesTool, UpdateQueryTool,
};
pub use registry::{
    json_schema_array, json_schema_boolean, json_schema_free_object, json_schema_integer,
    json_schema_object, json_schema_string, parse_arguments, present, validate_arguments, Tool,
    ToolRegistry, ToolTier,
};
pub use visualizations::{
    CreateVisualizationTool, DeleteVisualizationTool, GetVisualizationTool,
    UpdateVisualizationTool,
};

use redash_sdk::RedashClient;
use std::sync::Arc;

/// Register the full Redash tool catalog against `client`.
pub fn register_redash_tools(registry: &mut ToolRegistry, client: &RedashClient) {
    // Queries
    registry.register(Arc::new(ListQueriesTool::new(client.clone())));
    registry.register(Arc::new(GetQueryTool::new(client.clone())));
    registry.register(Arc::new(CreateQueryTool::new(client.clone())));
    registry.register(Arc::new(UpdateQueryTool::new(client.clone())));
    registry.register(Arc::new(ArchiveQueryTool::new(client.clone())));
    registry.register(Arc::new(ListDataSourcesTool::new(client.clone())));
    registry.register(Arc::new(ExecuteQueryTool::new(client.clone())));
    registry.register(Arc::new(ExecuteAdhocQueryTool::new(client.clone())));

    // Dashboards
    registry.register(Arc::new(ListDashboardsTool::new(client.clone())));
    registry.register(Arc::new(GetDashboardTool::new(client.clone())));

    // Visualizations
    registry.register(Arc::new(GetVisualizationTool::new(client.clone())));
    registry.register(Arc::new(CreateVisualizationTool::new(client.clone())));
    registry.register(Arc::new(UpdateVisualizationTool::new(client.clone())));
    registry.register(Arc::new(DeleteVisualizationTool::new(client.clone())));
}


#[cfg(test)]
mod tests {
    use super::test_support::{client_for, registry_for};
    use serde_json::json;
    use wiremock::MockServer;

    #[tokio::test]
    async fn test_catalog_is_complete() {
        let server = MockServer::start().await;
        let registry = registry_for(client_for(&server));

        let names: Vec<String> = registry.list_schemas().into_iter().map(|s| s.name).collect();
        assert_eq!(
            names,
            vec![
                "archive-query",
                "create-query",
                "create-visualization",
                "delete-visualization",
                "execute-adhoc-query",
                "execute-query",
                "get-dashboard",
                "get-query",
                "get-visualization",
                "list-dashboards",
                "list-data-sources",
                "list-queries",
                "update-query",
                "update-visualization",
            ]
        );
    }

    #[tokio::test]
    async fn test_unknown_tool_makes_no_upstream_call() {
        let server = MockServer::start().await;
        let registry = registry_for(client_for(&server));

        let result = registry.call("drop-database", json!({})).await;

        assert!(result.is_error());
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
