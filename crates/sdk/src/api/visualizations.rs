//! Visualizations API endpoints.

use crate::client::RedashClient;
use crate::error::RedashResult;
use crate::types::Visualization;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Visualizations API.
pub struct VisualizationsApi<'a> {
    client: &'a RedashClient,
}

impl<'a> VisualizationsApi<'a> {
    pub(crate) fn new(client: &'a RedashClient) -> Self {
        Self { client }
    }

    /// Get a visualization.
    pub async fn get(&self, visualization_id: i64) -> RedashResult<Visualization> {
        self.client
            .http
            .get(&format!("/api/visualizations/{}", visualization_id))
            .await
    }

    /// Create a visualization on a query.
    pub async fn create(&self, request: &CreateVisualizationRequest) -> RedashResult<Visualization> {
        self.client.http.post("/api/visualizations", request).await
    }

    /// Update the fields set in `request`.
    pub async fn update(
        &self,
        visualization_id: i64,
        request: &UpdateVisualizationRequest,
    ) -> RedashResult<Visualization> {
        self.client
            .http
            .post(&format!("/api/visualizations/{}", visualization_id), request)
            .await
    }

    /// Delete a visualization.
    pub async fn delete(&self, visualization_id: i64) -> RedashResult<()> {
        self.client
            .http
            .delete_no_response(&format!("/api/visualizations/{}", visualization_id))
            .await
    }
}

/// Request to create a visualization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateVisualizationRequest {
    pub query_id: i64,
    #[serde(rename = "type")]
    pub viz_type: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub options: Value,
}

/// Partial update of a visualization. Only `Some` fields are sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateVisualizationRequest {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub viz_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
}

impl UpdateVisualizationRequest {
    /// True when no field would be sent.
    pub fn is_empty(&self) -> bool {
        self.viz_type.is_none()
            && self.name.is_none()
            && self.description.is_none()
            && self.options.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::client_for;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn viz_json() -> Value {
        json!({"id": 9, "type": "TABLE", "name": "Table", "description": "", "options": {}})
    }

    #[tokio::test]
    async fn test_create_visualization() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/visualizations"))
            .and(body_json(json!({
                "query_id": 4, "type": "TABLE", "name": "Table", "options": {}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(viz_json()))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let viz = client
            .visualizations()
            .create(&CreateVisualizationRequest {
                query_id: 4,
                viz_type: "TABLE".to_string(),
                name: "Table".to_string(),
                description: None,
                options: json!({}),
            })
            .await
            .unwrap();

        assert_eq!(viz.viz_type, "TABLE");
    }

    #[tokio::test]
    async fn test_update_sends_only_set_fields() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/visualizations/9"))
            .and(body_json(json!({"description": ""})))
            .respond_with(ResponseTemplate::new(200).set_body_json(viz_json()))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let request = UpdateVisualizationRequest {
            description: Some(String::new()),
            ..Default::default()
        };
        assert!(!request.is_empty());
        client.visualizations().update(9, &request).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_visualization() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/api/visualizations/9"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        client.visualizations().delete(9).await.unwrap();
    }
}
