// Tool trait, registry, and schema helpers

use crate::protocol::{CallToolResult, ToolContent, ToolErrorPayload, ToolSchema};
use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;

/// Tool executor trait
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool schema for MCP
    fn schema(&self) -> ToolSchema;

    /// Execute the tool with given arguments
    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult>;
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
        self.tools.insert(schema.name, tool);
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// List all tool schemas, sorted by name so `tools/list` is stable.
    pub fn list_schemas(&self) -> Vec<ToolSchema> {
        let mut schemas: Vec<ToolSchema> = self.tools.values().map(|t| t.schema()).collect();
        schemas.sort_by(|a, b| a.name.cmp(&b.name));
        schemas
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Map an SDK error to a failed tool result carrying the structured
/// `{kind, message, retry_after_secs}` payload.
pub fn error_result(error: &flock_sdk::Error) -> CallToolResult {
    let payload = ToolErrorPayload {
        kind: error.kind().to_string(),
        message: error.to_string(),
        retry_after_secs: error.retry_after().map(|wait| wait.as_secs()),
    };
    CallToolResult {
        content: vec![ToolContent::text(
            serde_json::to_string(&payload).unwrap_or_else(|_| payload.message.clone()),
        )],
        is_error: Some(true),
    }
}

/// Render a successful payload as pretty-printed JSON text.
pub fn json_result(payload: &impl serde::Serialize) -> Result<CallToolResult> {
    Ok(CallToolResult::text(serde_json::to_string_pretty(payload)?))
}

// Helper functions for creating tool schemas

pub fn json_schema_object(properties: serde_json::Value, required: Vec<&str>) -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": properties,
        "required": required
    })
}

pub fn json_schema_string(description: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "string",
        "description": description
    })
}

pub fn json_schema_integer(description: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "integer",
        "minimum": 0,
        "description": description
    })
}

pub fn json_schema_boolean(description: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "boolean",
        "description": description
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct EchoTool;

    #[async_trait::async_trait]
    impl Tool for EchoTool {
        fn schema(&self) -> ToolSchema {
            ToolSchema {
                name: "echo".to_string(),
                description: "Echo the arguments back".to_string(),
                input_schema: json_schema_object(json!({}), vec![]),
            }
        }

        async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
            json_result(&arguments)
        }
    }

    #[tokio::test]
    async fn registry_round_trip() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool));

        assert_eq!(registry.len(), 1);
        assert!(registry.get("echo").is_some());
        assert!(registry.get("missing").is_none());

        let result = registry
            .get("echo")
            .unwrap()
            .execute(json!({"hello": 1}))
            .await
            .unwrap();
        assert!(result.is_error.is_none());
    }

    #[test]
    fn error_result_carries_branchable_kind() {
        let error = flock_sdk::Error::RateLimited {
            retry_after: Some(std::time::Duration::from_secs(42)),
        };
        let result = error_result(&error);
        assert_eq!(result.is_error, Some(true));

        let ToolContent::Text { text } = &result.content[0];
        let payload: ToolErrorPayload = serde_json::from_str(text).unwrap();
        assert_eq!(payload.kind, "rate_limited");
        assert_eq!(payload.retry_after_secs, Some(42));
    }
}
