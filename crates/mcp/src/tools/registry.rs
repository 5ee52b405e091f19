// Tool catalog, argument validation and dispatch

use crate::error::{McpError, McpResult};
use crate::protocol::{CallToolResult, ToolAnnotations, ToolSchema};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Tool executor trait
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool schema for MCP
    fn schema(&self) -> ToolSchema;

    /// Checks beyond the input schema, run before `execute`
    fn validate(&self, _arguments: &Value) -> McpResult<()> {
        Ok(())
    }

    /// Execute the tool, returning the value to hand back to the client
    async fn execute(&self, arguments: Value) -> McpResult<Value>;

    /// Get the tool's tier (reported to clients as annotations)
    fn tier(&self) -> ToolTier {
        ToolTier::ReadOnly
    }
}

/// What a tool does to upstream state
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ToolTier {
    /// Reads only
    ReadOnly,
    /// Creates or modifies entities
    Write,
    /// Archives or deletes entities
    Destructive,
}

impl ToolTier {
    fn annotations(self) -> ToolAnnotations {
        ToolAnnotations {
            read_only_hint: Some(self == ToolTier::ReadOnly),
            destructive_hint: Some(self == ToolTier::Destructive),
        }
    }
}

/// Tool registry for managing available tools
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let schema = tool.schema();
        self.tools.insert(schema.name.clone(), tool);
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// List all tool schemas, sorted by name
    pub fn list_schemas(&self) -> Vec<ToolSchema> {
        let mut schemas: Vec<ToolSchema> = self
            .tools
            .values()
            .map(|t| {
                let mut schema = t.schema();
                schema.annotations = Some(t.tier().annotations());
                schema
            })
            .collect();
        schemas.sort_by(|a, b| a.name.cmp(&b.name));
        schemas
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Run a tool call. Every failure comes back as an error-flagged result.
    pub async fn call(&self, name: &str, arguments: Value) -> CallToolResult {
        match self.dispatch(name, arguments).await {
            Ok(value) => match serde_json::to_string_pretty(&value) {
                Ok(text) => CallToolResult::text(text),
                Err(e) => CallToolResult::error(e.to_string()),
            },
            Err(e) => {
                warn!(tool = name, error = %e, "Tool call failed");
                CallToolResult::error(e.to_string())
            }
        }
    }

    async fn dispatch(&self, name: &str, arguments: Value) -> McpResult<Value> {
        let tool = self
            .get(name)
            .ok_or_else(|| McpError::UnknownTool(name.to_string()))?;

        let arguments = match arguments {
            Value::Null => Value::Object(Default::default()),
            other => other,
        };

        let schema = tool.schema();
        validate_arguments(&schema.name, &schema.input_schema, &arguments)?;
        tool.validate(&arguments)?;

        debug!(tool = name, "Executing tool");
        tool.execute(arguments).await
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Check `arguments` against a tool's JSON schema: object shape, required
/// fields, and the declared type of every supplied property (array items too).
pub fn validate_arguments(tool: &str, schema: &Value, arguments: &Value) -> McpResult<()> {
    let args = arguments
        .as_object()
        .ok_or_else(|| McpError::validation(tool, "arguments must be an object"))?;

    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for field in required.iter().filter_map(Value::as_str) {
            if args.get(field).map_or(true, Value::is_null) {
                return Err(McpError::validation(
                    tool,
                    format!("\"{}\" is required", field),
                ));
            }
        }
    }

    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return Ok(());
    };

    for (field, value) in args {
        let Some(property) = properties.get(field) else {
            continue;
        };
        check_type(tool, field, property, value)?;

        if let (Some(items), Some(elements)) = (property.get("items"), value.as_array()) {
            for (i, element) in elements.iter().enumerate() {
                check_type(tool, &format!("{}[{}]", field, i), items, element)?;
            }
        }
    }

    Ok(())
}

fn check_type(tool: &str, field: &str, property: &Value, value: &Value) -> McpResult<()> {
    let allowed: Vec<&str> = match property.get("type") {
        Some(Value::String(t)) => vec![t.as_str()],
        Some(Value::Array(ts)) => ts.iter().filter_map(Value::as_str).collect(),
        _ => return Ok(()),
    };

    if allowed.iter().any(|t| matches_type(t, value)) {
        return Ok(());
    }

    Err(McpError::validation(
        tool,
        format!("\"{}\" must be of type {}", field, allowed.join(" or ")),
    ))
}

fn matches_type(expected: &str, value: &Value) -> bool {
    match expected {
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "boolean" => value.is_boolean(),
        "object" => value.is_object(),
        "array" => value.is_array(),
        "null" => value.is_null(),
        _ => true,
    }
}

/// Deserialize a tool's arguments, reporting failures as validation errors.
pub fn parse_arguments<T: DeserializeOwned>(tool: &str, arguments: Value) -> McpResult<T> {
    serde_json::from_value(arguments).map_err(|e| McpError::validation(tool, e.to_string()))
}

/// Keeps an explicit `null` as `Some(Value::Null)`; absent stays `None`.
/// Use with `#[serde(default, deserialize_with = "present")]`.
pub fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

// Helper functions for creating tool schemas

pub fn json_schema_object(properties: Value, required: Vec<&str>) -> Value {
    serde_json::json!({
        "type": "object",
        "properties": properties,
        "required": required
    })
}

pub fn json_schema_string(description: &str) -> Value {
    serde_json::json!({
        "type": "string",
        "description": description
    })
}

pub fn json_schema_integer(description: &str) -> Value {
    serde_json::json!({
        "type": "integer",
        "description": description
    })
}

pub fn json_schema_boolean(description: &str) -> Value {
    serde_json::json!({
        "type": "boolean",
        "description": description
    })
}

pub fn json_schema_free_object(description: &str) -> Value {
    serde_json::json!({
        "type": "object",
        "description": description
    })
}

pub fn json_schema_array(items: Value, description: &str) -> Value {
    serde_json::json!({
        "type": "array",
        "items": items,
        "description": description
    })
}
