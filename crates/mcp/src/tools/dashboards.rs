// Dashboard tools

use crate::error::McpResult;
use crate::protocol::ToolSchema;
use crate::tools::queries::{default_page, default_page_size};
use crate::tools::{json_schema_integer, json_schema_object, parse_arguments, Tool};
use redash_sdk::RedashClient;
use serde::Deserialize;
use serde_json::{json, Value};

/// Tool to list dashboards
pub struct ListDashboardsTool {
    client: RedashClient,
}

impl ListDashboardsTool {
    pub fn new(client: RedashClient) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListDashboardsArgs {
    #[serde(default = "default_page")]
    page: u32,
    #[serde(default = "default_page_size")]
    page_size: u32,
}

#[async_trait::async_trait]
impl Tool for ListDashboardsTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "list-dashboards".to_string(),
            description: "List dashboards".to_string(),
            input_schema: json_schema_object(
                json!({
                    "page": json_schema_integer("Page number (default: 1)"),
                    "pageSize": json_schema_integer("Results per page (default: 25)")
                }),
                vec![],
            ),
            annotations: None,
        }
    }

    async fn execute(&self, arguments: Value) -> McpResult<Value> {
        let args: ListDashboardsArgs = parse_arguments("list-dashboards", arguments)?;
        let page = self
            .client
            .dashboards()
            .list(args.page, args.page_size)
            .await?;
        Ok(serde_json::to_value(page)?)
    }
}

/// Tool to get a dashboard with its widgets
pub struct GetDashboardTool {
    client: RedashClient,
}

impl GetDashboardTool {
    pub fn new(client: RedashClient) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetDashboardArgs {
    dashboard_id: i64,
}

#[async_trait::async_trait]
impl Tool for GetDashboardTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get-dashboard".to_string(),
            description: "Get a dashboard by ID, including its widgets and visualizations"
                .to_string(),
            input_schema: json_schema_object(
                json!({ "dashboardId": json_schema_integer("ID of the dashboard") }),
                vec!["dashboardId"],
            ),
            annotations: None,
        }
    }

    async fn execute(&self, arguments: Value) -> McpResult<Value> {
        let args: GetDashboardArgs = parse_arguments("get-dashboard", arguments)?;
        let dashboard = self.client.dashboards().get(args.dashboard_id).await?;
        Ok(serde_json::to_value(dashboard)?)
    }
}

#[cfg(test)]
mod tests {
    use crate::tools::test_support::{client_for, registry_for};
    use serde_json::{json, Value};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_list_dashboards_paging() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/dashboards"))
            .and(query_param("page", "2"))
            .and(query_param("page_size", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 6, "page": 2, "page_size": 5,
                "results": [{"id": 6, "name": "Ops", "slug": "ops", "tags": []}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let registry = registry_for(client_for(&server));
        let result = registry
            .call("list-dashboards", json!({"page": 2, "pageSize": 5}))
            .await;

        assert!(!result.is_error(), "{:?}", result);
        let page: Value = serde_json::from_str(result.content[0].as_text()).unwrap();
        assert_eq!(page["results"][0]["name"], json!("Ops"));
    }

    #[tokio::test]
    async fn test_get_dashboard_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/dashboards/404"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not found"})))
            .mount(&server)
            .await;

        let registry = registry_for(client_for(&server));
        let result = registry.call("get-dashboard", json!({"dashboardId": 404})).await;

        assert!(result.is_error());
        assert_eq!(result.content[0].as_text(), "Error: Resource not found: Not found");
    }

    #[tokio::test]
    async fn test_list_dashboards_passes_null_tags_through() {
        let server = MockServer::start().await;
        let page = json!({
            "count": 1, "page": 1, "page_size": 25,
            "results": [{"id": 3, "name": "KPIs", "slug": "kpis", "tags": null, "is_draft": null}]
        });

        Mock::given(method("GET"))
            .and(path("/api/dashboards"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page.clone()))
            .mount(&server)
            .await;

        let registry = registry_for(client_for(&server));
        let result = registry.call("list-dashboards", json!({})).await;

        assert!(!result.is_error(), "{:?}", result);
        let returned: Value = serde_json::from_str(result.content[0].as_text()).unwrap();
        assert_eq!(returned, page);
    }
}
