//! Dashboards API endpoints.

use crate::client::RedashClient;
use crate::error::RedashResult;
use crate::types::{Dashboard, Paginated};

/// Dashboards API (read-only).
pub struct DashboardsApi<'a> {
    client: &'a RedashClient,
}

impl<'a> DashboardsApi<'a> {
    pub(crate) fn new(client: &'a RedashClient) -> Self {
        Self { client }
    }

    /// List dashboards, one page at a time.
    pub async fn list(&self, page: u32, page_size: u32) -> RedashResult<Paginated<Dashboard>> {
        self.client
            .http
            .get_with_query(
                "/api/dashboards",
                &[("page", page), ("page_size", page_size)],
            )
            .await
    }

    /// Get a dashboard including its widgets.
    pub async fn get(&self, dashboard_id: i64) -> RedashResult<Dashboard> {
        self.client
            .http
            .get(&format!("/api/dashboards/{}", dashboard_id))
            .await
    }
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::client_for;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_list_dashboards() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/dashboards"))
            .and(query_param("page", "1"))
            .and(query_param("page_size", "100"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 1, "page": 1, "page_size": 100,
                "results": [{"id": 3, "name": "KPIs", "slug": "kpis", "tags": ["exec"]}]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let page = client.dashboards().list(1, 100).await.unwrap();

        assert_eq!(page.results[0].name, "KPIs");
        assert_eq!(page.results[0].tags(), vec!["exec"]);
    }

    #[tokio::test]
    async fn test_get_dashboard() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/dashboards/3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 3, "name": "KPIs", "slug": "kpis", "version": 2,
                "widgets": [{"id": 1, "text": "hello", "width": 1, "options": {}}]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let dashboard = client.dashboards().get(3).await.unwrap();

        assert_eq!(dashboard.version(), Some(2));
        assert_eq!(dashboard.widgets().len(), 1);
    }

    #[tokio::test]
    async fn test_list_dashboards_with_null_tags() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/dashboards"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 1, "page": 1, "page_size": 25,
                "results": [{"id": 3, "name": "KPIs", "slug": "kpis", "tags": null}]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let page = client.dashboards().list(1, 25).await.unwrap();

        assert_eq!(page.results.len(), 1);
        assert!(page.results[0].tags().is_empty());
        assert_eq!(
            serde_json::to_value(&page.results[0]).unwrap()["tags"],
            serde_json::Value::Null
        );
    }
}
