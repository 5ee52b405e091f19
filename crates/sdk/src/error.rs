//! Error types for the Redash SDK.

use serde::{Deserialize, Serialize};

/// Result type for SDK operations.
pub type RedashResult<T> = Result<T, RedashError>;

/// Error types that can occur when talking to a Redash instance.
#[derive(Debug, thiserror::Error)]
pub enum RedashError {
    /// HTTP request failed before a response was received.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success response.
    #[error("API error (status {status}): {message}")]
    Api {
        status: u16,
        message: String,
        body: Option<String>,
    },

    /// Resource not found.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The upstream job finished with a failure status.
    #[error("Query execution failed: {0}")]
    QueryExecution(String),

    /// The upstream job did not finish within the polling bound.
    #[error("Query execution timed out after {timeout_ms}ms")]
    QueryExecutionTimeout { timeout_ms: u64 },
}

impl RedashError {
    /// HTTP status code reported by the upstream, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::NotFound(_) => Some(404),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Create an API error from a status code and response body.
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = match serde_json::from_str::<ErrorResponse>(body) {
            Ok(error_response) => error_response.message,
            Err(_) if body.trim().is_empty() => "empty response body".to_string(),
            Err(_) => body.to_string(),
        };

        if status == 404 {
            return Self::NotFound(message);
        }

        Self::Api {
            status,
            message,
            body: (!body.is_empty()).then(|| body.to_string()),
        }
    }
}

/// Error body returned by Redash, e.g. `{"message": "Query not found"}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}
