// Queries and dashboards exposed as `redash://` resources

use crate::error::{McpError, McpResult};
use crate::protocol::{ReadResourceResult, Resource, ResourceContents, ResourceTemplate};
use redash_sdk::{ListQueriesParams, RedashClient};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

pub const URI_SCHEME: &str = "redash";

/// How many queries and dashboards `list` enumerates.
const LIST_LIMIT: u32 = 100;

const JSON_MIME: &str = "application/json";

/// Address of a readable entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceUri {
    Query(i64),
    Dashboard(i64),
}

impl FromStr for ResourceUri {
    type Err = McpError;

    /// Accepts exactly `redash://query/<digits>` or `redash://dashboard/<digits>`.
    fn from_str(uri: &str) -> Result<Self, Self::Err> {
        let invalid = || McpError::InvalidUri(uri.to_string());

        let rest = uri
            .strip_prefix(URI_SCHEME)
            .and_then(|r| r.strip_prefix("://"))
            .ok_or_else(invalid)?;
        let (kind, id) = rest.split_once('/').ok_or_else(invalid)?;

        if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let id: i64 = id.parse().map_err(|_| invalid())?;

        match kind {
            "query" => Ok(Self::Query(id)),
            "dashboard" => Ok(Self::Dashboard(id)),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for ResourceUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Query(id) => write!(f, "{}://query/{}", URI_SCHEME, id),
            Self::Dashboard(id) => write!(f, "{}://dashboard/{}", URI_SCHEME, id),
        }
    }
}

/// Lists and reads queries and dashboards as resources.
pub struct ResourceExposer {
    client: RedashClient,
}

impl ResourceExposer {
    pub fn new(client: RedashClient) -> Self {
        Self { client }
    }

    /// Enumerate resources. Upstream failures are logged and skipped, never returned.
    pub async fn list(&self) -> Vec<Resource> {
        let mut resources = Vec::new();

        let params = ListQueriesParams {
            page: 1,
            page_size: LIST_LIMIT,
            search: None,
        };
        match self.client.queries().list(&params).await {
            Ok(page) => resources.extend(page.results.into_iter().map(|q| Resource {
                uri: ResourceUri::Query(q.id).to_string(),
                description: Some(
                    q.description()
                        .filter(|d| !d.is_empty())
                        .map_or_else(|| format!("Query {}", q.id), str::to_string),
                ),
                name: q.name,
                mime_type: Some(JSON_MIME.to_string()),
            })),
            Err(e) => warn!(error = %e, "Failed to list queries for resources"),
        }

        match self.client.dashboards().list(1, LIST_LIMIT).await {
            Ok(page) => resources.extend(page.results.into_iter().map(|d| Resource {
                uri: ResourceUri::Dashboard(d.id).to_string(),
                description: Some(format!("Dashboard {}", d.slug().unwrap_or(&d.name))),
                name: d.name,
                mime_type: Some(JSON_MIME.to_string()),
            })),
            Err(e) => warn!(error = %e, "Failed to list dashboards for resources"),
        }

        resources
    }

    /// URI templates clients can fill in without listing first.
    pub fn templates(&self) -> Vec<ResourceTemplate> {
        vec![
            ResourceTemplate {
                uri_template: format!("{}://query/{{id}}", URI_SCHEME),
                name: "Query".to_string(),
                description: Some("A saved query with its latest execution result".to_string()),
                mime_type: Some(JSON_MIME.to_string()),
            },
            ResourceTemplate {
                uri_template: format!("{}://dashboard/{{id}}", URI_SCHEME),
                name: "Dashboard".to_string(),
                description: Some("A dashboard with its widgets".to_string()),
                mime_type: Some(JSON_MIME.to_string()),
            },
        ]
    }

    /// Read a resource. Unlike `list`, upstream failures are returned.
    pub async fn read(&self, uri: &str) -> McpResult<ReadResourceResult> {
        let text = match uri.parse::<ResourceUri>()? {
            ResourceUri::Query(id) => {
                let query = self.client.queries().get(id).await?;
                let result = self.client.queries().execute(id, None).await?;
                serde_json::to_string_pretty(&serde_json::json!({
                    "query": query,
                    "result": result,
                }))?
            }
            ResourceUri::Dashboard(id) => {
                let dashboard = self.client.dashboards().get(id).await?;
                serde_json::to_string_pretty(&dashboard)?
            }
        };

        Ok(ReadResourceResult {
            contents: vec![ResourceContents {
                uri: uri.to_string(),
                mime_type: Some(JSON_MIME.to_string()),
                text,
            }],
        })
    }
}
