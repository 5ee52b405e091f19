// Errors raised while serving a single tool call or resource read

use redash_sdk::RedashError;

pub type McpResult<T> = Result<T, McpError>;

#[derive(Debug, thiserror::Error)]
pub enum McpError {
    /// Tool arguments did not match the declared input schema.
    #[error("Invalid arguments for {tool}: {message}")]
    Validation { tool: String, message: String },

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid resource URI: {0}")]
    InvalidUri(String),

    /// The Redash API call failed.
    #[error(transparent)]
    Upstream(#[from] RedashError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl McpError {
    pub fn validation(tool: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            tool: tool.to_string(),
            message: message.into(),
        }
    }
}
