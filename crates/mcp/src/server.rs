// MCP server: JSON-RPC 2.0 over newline-delimited stdio

use crate::error::McpError;
use crate::protocol::*;
use crate::resources::ResourceExposer;
use crate::tools::ToolRegistry;
use anyhow::{Context, Result};
use redash_sdk::RedashError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::{Mutex, PoisonError};
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

const LOGGER_NAME: &str = "redash-mcp";

pub struct McpServer {
    registry: ToolRegistry,
    resources: ResourceExposer,
    info: ServerInfo,
    /// Minimum level forwarded as `notifications/message`; `None` until the
    /// client calls `logging/setLevel`.
    log_level: Mutex<Option<LoggingLevel>>,
    pending_notifications: Mutex<Vec<JsonRpcRequest>>,
}

impl McpServer {
    pub fn new(registry: ToolRegistry, resources: ResourceExposer) -> Self {
        Self {
            registry,
            resources,
            info: ServerInfo {
                name: LOGGER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            log_level: Mutex::new(None),
            pending_notifications: Mutex::new(Vec::new()),
        }
    }

    /// Serve requests from stdin until it is closed.
    pub async fn start(&self) -> Result<()> {
        info!(tools = self.registry.len(), "MCP server listening on stdio");
        self.serve(tokio::io::stdin(), tokio::io::stdout()).await
    }

    /// Serve one request per input line, writing one message per output line.
    pub async fn serve<R, W>(&self, input: R, mut output: W) -> Result<()>
    where
        R: tokio::io::AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        // Split on raw bytes so a line that is not UTF-8 gets a parse error
        // instead of ending the session.
        let mut lines = BufReader::new(input).split(b'\n');

        while let Some(line) = lines.next_segment().await.context("Failed to read request")? {
            let response = match std::str::from_utf8(&line) {
                Ok(text) if text.trim().is_empty() => continue,
                Ok(text) => self.handle_message(text).await,
                Err(e) => {
                    warn!(error = %e, "Request is not valid UTF-8");
                    Some(JsonRpcResponse::error(Value::Null, JsonRpcError::parse_error()))
                }
            };

            for notification in self.take_notifications() {
                write_message(&mut output, &notification).await?;
            }
            if let Some(response) = response {
                write_message(&mut output, &response).await?;
            }
        }

        info!("Input closed, shutting down");
        Ok(())
    }

    /// Handle one raw line. Returns `None` for notifications.
    pub async fn handle_message(&self, line: &str) -> Option<JsonRpcResponse> {
        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "Unparsable message");
                return Some(JsonRpcResponse::error(Value::Null, JsonRpcError::parse_error()));
            }
        };

        self.handle_request(request).await
    }

    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        // Notifications never get a response, not even an error.
        if request.is_notification() {
            debug!(method = %request.method, "Notification received");
            return None;
        }

        let id = request.id.clone().unwrap_or(Value::Null);
        if request.jsonrpc != "2.0" {
            return Some(JsonRpcResponse::error(id, JsonRpcError::invalid_request()));
        }

        debug!(method = %request.method, "Request received");
        let result = match request.method.as_str() {
            "initialize" => self.initialize(request.params),
            "ping" => Ok(json!({})),
            "tools/list" => to_result(ListToolsResult {
                tools: self.registry.list_schemas(),
            }),
            "tools/call" => self.call_tool(request.params).await,
            "resources/list" => to_result(ListResourcesResult {
                resources: self.resources.list().await,
            }),
            "resources/templates/list" => to_result(ListResourceTemplatesResult {
                resource_templates: self.resources.templates(),
            }),
            "resources/read" => self.read_resource(request.params).await,
            "logging/setLevel" => self.set_level(request.params),
            other => Err(JsonRpcError::method_not_found(other)),
        };

        Some(match result {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(error) => JsonRpcResponse::error(id, error),
        })
    }

    fn initialize(&self, params: Option<Value>) -> Result<Value, JsonRpcError> {
        let params: InitializeParams = parse_params(params)?;
        if let Some(client) = &params.client_info {
            info!(client = %client.name, version = %client.version, "Client connected");
        }

        to_result(InitializeResult {
            protocol_version: negotiate_protocol_version(&params.protocol_version).to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: false,
                }),
                resources: Some(ResourcesCapability {
                    subscribe: false,
                    list_changed: false,
                }),
                logging: Some(json!({})),
            },
            server_info: self.info.clone(),
        })
    }

    async fn call_tool(&self, params: Option<Value>) -> Result<Value, JsonRpcError> {
        let params: CallToolParams = parse_params(params)?;

        let result = self.registry.call(&params.name, params.arguments).await;
        if result.is_error() {
            let message = result
                .content
                .first()
                .map(ToolContent::as_text)
                .unwrap_or_default();
            self.notify(
                LoggingLevel::Error,
                json!({ "tool": params.name, "error": message }),
            );
        }

        to_result(result)
    }

    async fn read_resource(&self, params: Option<Value>) -> Result<Value, JsonRpcError> {
        let params: ReadResourceParams = parse_params(params)?;

        match self.resources.read(&params.uri).await {
            Ok(result) => to_result(result),
            Err(e) => {
                warn!(uri = %params.uri, error = %e, "Resource read failed");
                self.notify(
                    LoggingLevel::Error,
                    json!({ "uri": params.uri.clone(), "error": e.to_string() }),
                );
                Err(match e {
                    McpError::InvalidUri(_) => JsonRpcError::invalid_params(e.to_string()),
                    McpError::Upstream(RedashError::NotFound(_)) => {
                        JsonRpcError::resource_not_found(&params.uri)
                    }
                    other => JsonRpcError::internal_error(other.to_string()),
                })
            }
        }
    }

    fn set_level(&self, params: Option<Value>) -> Result<Value, JsonRpcError> {
        let params: SetLevelParams = parse_params(params)?;
        *self
            .log_level
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(params.level);
        info!(level = ?params.level, "Client logging level set");
        Ok(json!({}))
    }

    /// Queue a log notification if the client asked for this level.
    fn notify(&self, level: LoggingLevel, data: Value) {
        let enabled = self
            .log_level
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some_and(|min| level >= min);
        if !enabled {
            return;
        }

        let params = LoggingMessageParams {
            level,
            logger: Some(LOGGER_NAME.to_string()),
            data,
        };
        match serde_json::to_value(params) {
            Ok(params) => self
                .pending_notifications
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(JsonRpcRequest::notification("notifications/message", params)),
            Err(e) => warn!(error = %e, "Failed to encode log notification"),
        }
    }

    /// Drain notifications queued while handling the last request.
    pub fn take_notifications(&self) -> Vec<JsonRpcRequest> {
        std::mem::take(
            &mut *self
                .pending_notifications
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        )
    }
}

fn parse_params<T: DeserializeOwned>(params: Option<Value>) -> Result<T, JsonRpcError> {
    serde_json::from_value(params.unwrap_or_else(|| json!({})))
        .map_err(|e| JsonRpcError::invalid_params(format!("Invalid params: {}", e)))
}

fn to_result(value: impl Serialize) -> Result<Value, JsonRpcError> {
    serde_json::to_value(value).map_err(|e| JsonRpcError::internal_error(e.to_string()))
}

async fn write_message<W: AsyncWrite + Unpin>(output: &mut W, message: &impl Serialize) -> Result<()> {
    let mut line = serde_json::to_vec(message).context("Failed to encode response")?;
    line.push(b'\n');
    output
        .write_all(&line)
        .await
        .context("Failed to write response")?;
    output.flush().await.context("Failed to flush output")?;
    Ok(())
}
