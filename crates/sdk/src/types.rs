//! Entity shapes returned by the Redash API.
//!
//! These are projections of the upstream JSON. Only fields Redash always sends
//! are typed; the rest stay in `extra` (or the wrapped map) as received, so
//! serializing an entity back out yields the same JSON, explicit `null`s included.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A data source as reported by `/api/data_sources`. Passed through untouched.
pub type DataSource = Value;

/// One page of a paginated listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub count: u64,
    pub page: u32,
    pub page_size: u32,
    pub results: Vec<T>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A saved query. `id` and `name` are always sent; everything else stays in
/// `extra` exactly as received, `null`s included.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Query {
    pub id: i64,
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Query {
    pub fn description(&self) -> Option<&str> {
        str_field(&self.extra, "description")
    }

    /// SQL (or data-source specific) query text.
    pub fn query_text(&self) -> Option<&str> {
        str_field(&self.extra, "query")
    }

    pub fn data_source_id(&self) -> Option<i64> {
        self.extra.get("data_source_id").and_then(Value::as_i64)
    }

    pub fn is_archived(&self) -> bool {
        bool_field(&self.extra, "is_archived")
    }

    pub fn is_draft(&self) -> bool {
        bool_field(&self.extra, "is_draft")
    }

    pub fn tags(&self) -> Vec<&str> {
        string_items(&self.extra, "tags")
    }

    /// Visualizations embedded by `GET /api/queries/{id}`.
    pub fn visualizations(&self) -> &[Value] {
        array_field(&self.extra, "visualizations")
    }
}

/// A visualization attached to a query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Visualization {
    pub id: i64,
    /// Upstream-defined type tag such as `TABLE` or `CHART`.
    #[serde(rename = "type")]
    pub viz_type: String,
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Visualization {
    pub fn description(&self) -> Option<&str> {
        str_field(&self.extra, "description")
    }

    /// Free-form, type specific options.
    pub fn options(&self) -> Option<&Value> {
        self.extra.get("options")
    }
}

/// A dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dashboard {
    pub id: i64,
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Dashboard {
    pub fn slug(&self) -> Option<&str> {
        str_field(&self.extra, "slug")
    }

    /// Redash stores tags as a nullable array; `null` reads as no tags.
    pub fn tags(&self) -> Vec<&str> {
        string_items(&self.extra, "tags")
    }

    pub fn is_archived(&self) -> bool {
        bool_field(&self.extra, "is_archived")
    }

    pub fn is_draft(&self) -> bool {
        bool_field(&self.extra, "is_draft")
    }

    pub fn version(&self) -> Option<i64> {
        self.extra.get("version").and_then(Value::as_i64)
    }

    /// Dashboard cells, each holding either a visualization or a block of text.
    pub fn widgets(&self) -> &[Value] {
        array_field(&self.extra, "widgets")
    }
}

/// The outcome of executing a query, kept as the object Redash sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryResult(Map<String, Value>);

impl QueryResult {
    pub fn id(&self) -> Option<i64> {
        self.0.get("id").and_then(Value::as_i64)
    }

    pub fn query_id(&self) -> Option<i64> {
        self.0.get("query_id").and_then(Value::as_i64)
    }

    pub fn data_source_id(&self) -> Option<i64> {
        self.0.get("data_source_id").and_then(Value::as_i64)
    }

    pub fn query_hash(&self) -> Option<&str> {
        str_field(&self.0, "query_hash")
    }

    /// Execution time in seconds.
    pub fn runtime(&self) -> Option<f64> {
        self.0.get("runtime").and_then(Value::as_f64)
    }

    pub fn retrieved_at(&self) -> Option<&str> {
        str_field(&self.0, "retrieved_at")
    }

    /// Column descriptors from `data.columns`.
    pub fn columns(&self) -> &[Value] {
        self.data().map(|d| array_field(d, "columns")).unwrap_or(&[])
    }

    /// Row objects from `data.rows`.
    pub fn rows(&self) -> &[Value] {
        self.data().map(|d| array_field(d, "rows")).unwrap_or(&[])
    }

    fn data(&self) -> Option<&Map<String, Value>> {
        self.0.get("data").and_then(Value::as_object)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for QueryResult {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

fn str_field<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    map.get(key).and_then(Value::as_str)
}

// Missing and `null` both read as false.
fn bool_field(map: &Map<String, Value>, key: &str) -> bool {
    map.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn array_field<'a>(map: &'a Map<String, Value>, key: &str) -> &'a [Value] {
    map.get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn string_items<'a>(map: &'a Map<String, Value>, key: &str) -> Vec<&'a str> {
    array_field(map, key)
        .iter()
        .filter_map(Value::as_str)
        .collect()
}

/// Status codes reported by `/api/jobs/{id}`.
pub mod job_status {
    pub const PENDING: i32 = 1;
    pub const STARTED: i32 = 2;
    pub const SUCCESS: i32 = 3;
    pub const FAILURE: i32 = 4;
    pub const CANCELLED: i32 = 5;
}

/// An upstream execution job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub status: i32,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub query_result_id: Option<i64>,
    #[serde(default)]
    pub error: Option<String>,
}

impl Job {
    pub fn is_success(&self) -> bool {
        self.status == job_status::SUCCESS
    }

    pub fn is_failure(&self) -> bool {
        self.status == job_status::FAILURE
    }

    /// Upstream error text, ignoring the empty string Redash sends for "no error".
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref().filter(|e| !e.is_empty())
    }
}

/// Acknowledgement returned by soft deletes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveResult {
    pub success: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_keeps_unknown_fields() {
        let raw = json!({
            "id": 7,
            "name": "Daily signups",
            "query": "SELECT 1",
            "data_source_id": 1,
            "is_archived": false,
            "is_draft": true,
            "created_at": "2024-03-01T10:00:00.000Z",
            "schedule": {"interval": 3600},
            "tags": ["growth"]
        });

        let query: Query = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(query.id, 7);
        assert!(query.is_draft());
        assert!(query.visualizations().is_empty());
        assert_eq!(query.tags(), vec!["growth"]);
        assert_eq!(query.query_text(), Some("SELECT 1"));

        assert_eq!(serde_json::to_value(&query).unwrap(), raw);
    }

    #[test]
    fn test_query_tolerates_null_fields() {
        let raw = json!({
            "id": 8,
            "name": "Draft",
            "query": null,
            "description": null,
            "is_archived": null,
            "is_draft": null,
            "tags": null,
            "visualizations": null
        });

        let query: Query = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(query.query_text(), None);
        assert!(!query.is_archived());
        assert!(query.tags().is_empty());

        assert_eq!(serde_json::to_value(&query).unwrap(), raw);
    }

    #[test]
    fn test_dashboard_with_null_tags_round_trips() {
        let raw = json!({
            "id": 3,
            "name": "KPIs",
            "slug": "kpis",
            "tags": null,
            "version": 4,
            "widgets": [
                {"id": 10, "text": "## Header", "width": 1, "options": {}},
                {"id": 11, "width": 1, "options": {"position": {"col": 0}},
                 "visualization": {"id": 5, "type": "CHART", "name": "Chart", "options": {}}}
            ]
        });

        let dashboard: Dashboard = serde_json::from_value(raw.clone()).unwrap();
        assert!(dashboard.tags().is_empty());
        assert_eq!(dashboard.slug(), Some("kpis"));
        assert_eq!(dashboard.version(), Some(4));
        assert_eq!(dashboard.widgets().len(), 2);
        assert_eq!(dashboard.widgets()[1]["visualization"]["type"], json!("CHART"));

        assert_eq!(serde_json::to_value(&dashboard).unwrap(), raw);
    }

    #[test]
    fn test_query_result_is_unchanged_by_round_trip() {
        let raw = json!({
            "id": 5,
            "query_hash": null,
            "runtime": 0,
            "data": {"columns": [{"name": "n", "type": null}], "rows": [{"n": 1}]}
        });

        let result: QueryResult = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(result.id(), Some(5));
        assert_eq!(result.query_hash(), None);
        assert_eq!(result.runtime(), Some(0.0));
        assert_eq!(result.rows().len(), 1);
        assert_eq!(result.columns()[0]["name"], json!("n"));

        assert_eq!(serde_json::to_value(&result).unwrap(), raw);
    }

    #[test]
    fn test_job_error_message_ignores_empty() {
        let job: Job = serde_json::from_value(json!({
            "id": "abc", "status": 2, "error": "", "result": null
        }))
        .unwrap();
        assert_eq!(job.error_message(), None);
        assert!(!job.is_success());
        assert!(!job.is_failure());
    }
}
