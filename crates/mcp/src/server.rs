// MCP server: JSON-RPC 2.0 dispatch over line-delimited stdio

use crate::protocol::{
    CallToolParams, InitializeResult, JsonRpcError, JsonRpcRequest, JsonRpcResponse,
    ListToolsResult, ServerCapabilities, ServerInfo, ToolsCapability,
};
use crate::tools::ToolRegistry;
use anyhow::Result;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Serves the tool registry to an MCP host over stdio. Responses are
/// written one JSON object per line and flushed; logging stays on stderr
/// so stdout carries nothing but protocol frames.
pub struct McpServer {
    registry: ToolRegistry,
}

impl McpServer {
    pub fn new(registry: ToolRegistry) -> Self {
        Self { registry }
    }

    pub async fn run(&self) -> Result<()> {
        let stdin = BufReader::new(tokio::io::stdin());
        let mut lines = stdin.lines();
        let mut stdout = tokio::io::stdout();

        tracing::info!(tools = self.registry.len(), "MCP server listening on stdio");

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            if let Some(response) = self.handle_line(&line).await {
                let mut frame = serde_json::to_string(&response)?;
                frame.push('\n');
                stdout.write_all(frame.as_bytes()).await?;
                stdout.flush().await?;
            }
        }

        tracing::info!("stdin closed, shutting down");
        Ok(())
    }

    /// Parse one frame and dispatch it. Returns `None` for notifications,
    /// which take no response.
    pub async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        match serde_json::from_str::<JsonRpcRequest>(line) {
            Ok(request) => self.handle_request(request).await,
            Err(_) => Some(JsonRpcResponse::error(
                Value::Null,
                JsonRpcError::parse_error(),
            )),
        }
    }

    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let Some(id) = request.id else {
            // Notifications (e.g. notifications/initialized) take no reply.
            tracing::debug!(method = %request.method, "notification");
            return None;
        };

        let outcome = match request.method.as_str() {
            "initialize" => serde_json::to_value(self.initialize_result())
                .map_err(|e| JsonRpcError::internal_error(e.to_string())),
            "ping" => Ok(serde_json::json!({})),
            "tools/list" => serde_json::to_value(ListToolsResult {
                tools: self.registry.list_schemas(),
            })
            .map_err(|e| JsonRpcError::internal_error(e.to_string())),
            "tools/call" => self.call_tool(request.params).await,
            other => Err(JsonRpcError::method_not_found(other)),
        };

        Some(match outcome {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(error) => JsonRpcResponse::error(id, error),
        })
    }

    async fn call_tool(&self, params: Option<Value>) -> Result<Value, JsonRpcError> {
        let params: CallToolParams = serde_json::from_value(params.unwrap_or(Value::Null))
            .map_err(|e| JsonRpcError::invalid_params(format!("Invalid tool call params: {e}")))?;

        let tool = self
            .registry
            .get(&params.name)
            .ok_or_else(|| JsonRpcError::invalid_params(format!("Unknown tool: {}", params.name)))?;

        tracing::debug!(tool = %params.name, "tools/call");
        match tool.execute(params.arguments).await {
            Ok(result) => serde_json::to_value(result)
                .map_err(|e| JsonRpcError::internal_error(e.to_string())),
            Err(error) => Err(JsonRpcError::internal_error(error.to_string())),
        }
    }

    fn initialize_result(&self) -> InitializeResult {
        InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: false,
                }),
            },
            server_info: ServerInfo {
                name: "flock-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{CallToolResult, ToolSchema};
    use crate::tools::{json_schema_object, Tool};
    use serde_json::json;
    use std::sync::Arc;

    struct StaticTool;

    #[async_trait::async_trait]
    impl Tool for StaticTool {
        fn schema(&self) -> ToolSchema {
            ToolSchema {
                name: "static_tool".to_string(),
                description: "Answers with a constant".to_string(),
                input_schema: json_schema_object(json!({}), vec![]),
            }
        }

        async fn execute(&self, _arguments: serde_json::Value) -> Result<CallToolResult> {
            Ok(CallToolResult::text("42"))
        }
    }

    fn server() -> McpServer {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(StaticTool));
        McpServer::new(registry)
    }

    #[tokio::test]
    async fn initialize_handshake() {
        let response = server()
            .handle_line(r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#)
            .await
            .unwrap();

        let result = response.result.unwrap();
        assert_eq!(result["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(result["serverInfo"]["name"], "flock-mcp");
    }

    #[tokio::test]
    async fn notifications_take_no_response() {
        let response = server()
            .handle_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await;
        assert!(response.is_none());
    }

    #[tokio::test]
    async fn tools_list_returns_registered_schemas() {
        let response = server()
            .handle_line(r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#)
            .await
            .unwrap();

        let result = response.result.unwrap();
        assert_eq!(result["tools"][0]["name"], "static_tool");
    }

    #[tokio::test]
    async fn tools_call_dispatches_to_the_tool() {
        let response = server()
            .handle_line(
                r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"static_tool","arguments":{}}}"#,
            )
            .await
            .unwrap();

        let result = response.result.unwrap();
        assert_eq!(result["content"][0]["text"], "42");
    }

    #[tokio::test]
    async fn unknown_tool_is_invalid_params() {
        let response = server()
            .handle_line(
                r#"{"jsonrpc":"2.0","id":4,"method":"tools/call","params":{"name":"nope"}}"#,
            )
            .await
            .unwrap();
        assert_eq!(response.error.unwrap().code, -32602);
    }

    #[tokio::test]
    async fn unknown_method_is_method_not_found() {
        let response = server()
            .handle_line(r#"{"jsonrpc":"2.0","id":5,"method":"resources/list"}"#)
            .await
            .unwrap();
        assert_eq!(response.error.unwrap().code, -32601);
    }

    #[tokio::test]
    async fn malformed_frame_is_a_parse_error() {
        let response = server().handle_line("{not json").await.unwrap();
        assert_eq!(response.error.unwrap().code, -32700);
        assert_eq!(response.id, Value::Null);
    }
}
