//! MCP protocol server over stdin/stdout.
//!
//! Implements the slice of MCP (JSON-RPC 2.0, newline-delimited) the tool
//! surface needs: `initialize`, `ping`, `tools/list`, and `tools/call`.
//! Notifications are absorbed without a response. Tool failures are
//! reported as tool results with `isError: true`, never as transport
//! errors, so callers always receive the human-readable message.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value as JsonValue};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, error, info};

use crate::client::ObsidianClient;
use crate::error::{McpError, Result};
use crate::tools::ToolRegistry;

/// MCP protocol revision this server speaks.
const PROTOCOL_VERSION: &str = "2024-11-05";

const PARSE_ERROR: i64 = -32700;
const METHOD_NOT_FOUND: i64 = -32601;
const INVALID_PARAMS: i64 = -32602;

/// An incoming JSON-RPC 2.0 request or notification.
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    /// Request id; absent for notifications
    #[serde(default)]
    pub id: Option<JsonValue>,
    /// Method name, e.g. "tools/call"
    pub method: String,
    /// Method parameters
    #[serde(default)]
    pub params: Option<JsonValue>,
}

/// An outgoing JSON-RPC 2.0 response.
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    jsonrpc: &'static str,
    id: JsonValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonValue>,
}

impl JsonRpcResponse {
    /// A successful response.
    pub fn success(id: JsonValue, result: JsonValue) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        }
    }

    /// A protocol-level error response.
    pub fn error(id: JsonValue, code: i64, message: String) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(json!({ "code": code, "message": message })),
        }
    }
}

/// MCP server binding the tool registry to a shared store client.
pub struct McpServer {
    client: ObsidianClient,
    registry: ToolRegistry,
}

impl McpServer {
    /// Create a server around a store client built once at startup.
    pub fn new(client: ObsidianClient) -> Self {
        Self {
            client,
            registry: ToolRegistry::new(),
        }
    }

    /// Run the request loop until stdin closes.
    pub async fn run(&self) -> Result<()> {
        let stdin = tokio::io::stdin();
        let mut lines = BufReader::new(stdin).lines();
        let mut stdout = tokio::io::stdout();

        while let Some(line) = lines
            .next_line()
            .await
            .map_err(|e| McpError::Internal(format!("failed to read stdin: {e}")))?
        {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let response = match serde_json::from_str::<JsonRpcRequest>(line) {
                Ok(request) => self.handle(request).await,
                Err(e) => Some(JsonRpcResponse::error(
                    JsonValue::Null,
                    PARSE_ERROR,
                    format!("Parse error: {e}"),
                )),
            };

            if let Some(response) = response {
                let mut payload = serde_json::to_string(&response)
                    .map_err(|e| McpError::Internal(format!("failed to encode response: {e}")))?;
                payload.push('\n');
                stdout
                    .write_all(payload.as_bytes())
                    .await
                    .map_err(|e| McpError::Internal(format!("failed to write stdout: {e}")))?;
                stdout
                    .flush()
                    .await
                    .map_err(|e| McpError::Internal(format!("failed to flush stdout: {e}")))?;
            }
        }

        info!("stdin closed, shutting down");
        Ok(())
    }

    /// Handle one request. Returns None for notifications.
    async fn handle(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        // Requests without an id are notifications and get no response.
        let id = request.id?;
        debug!(method = %request.method, "handling request");

        let response = match request.method.as_str() {
            "initialize" => JsonRpcResponse::success(
                id,
                json!({
                    "protocolVersion": PROTOCOL_VERSION,
                    "capabilities": { "tools": {} },
                    "serverInfo": {
                        "name": env!("CARGO_PKG_NAME"),
                        "version": env!("CARGO_PKG_VERSION"),
                    },
                }),
            ),

            "ping" => JsonRpcResponse::success(id, json!({})),

            "tools/list" => JsonRpcResponse::success(
                id,
                json!({ "tools": self.registry.tools() }),
            ),

            "tools/call" => self.handle_tool_call(id, request.params).await,

            other => JsonRpcResponse::error(
                id,
                METHOD_NOT_FOUND,
                format!("Unknown method: {other}"),
            ),
        };
        Some(response)
    }

    async fn handle_tool_call(&self, id: JsonValue, params: Option<JsonValue>) -> JsonRpcResponse {
        let params = match params {
            Some(JsonValue::Object(map)) => map,
            _ => {
                return JsonRpcResponse::error(
                    id,
                    INVALID_PARAMS,
                    "params must be an object".to_string(),
                )
            }
        };

        let name = match params.get("name").and_then(|v| v.as_str()) {
            Some(name) => name.to_string(),
            None => {
                return JsonRpcResponse::error(
                    id,
                    INVALID_PARAMS,
                    "missing tool name".to_string(),
                )
            }
        };

        let args = match params.get("arguments") {
            None | Some(JsonValue::Null) => Map::new(),
            Some(JsonValue::Object(map)) => map.clone(),
            Some(_) => {
                return JsonRpcResponse::error(
                    id,
                    INVALID_PARAMS,
                    "arguments must be an object".to_string(),
                )
            }
        };

        debug!(tool = %name, "dispatching tool call");
        match self.registry.dispatch(&self.client, &name, args).await {
            Ok(result) => JsonRpcResponse::success(
                id,
                json!({
                    "content": [{ "type": "text", "text": render_result(result) }],
                    "isError": false,
                }),
            ),
            Err(McpError::UnknownTool(tool)) => JsonRpcResponse::error(
                id,
                INVALID_PARAMS,
                format!("Unknown tool: {tool}"),
            ),
            Err(err) => {
                error!(tool = %name, error = %err, "tool call failed");
                JsonRpcResponse::success(
                    id,
                    json!({
                        "content": [{ "type": "text", "text": err.to_string() }],
                        "isError": true,
                    }),
                )
            }
        }
    }
}

/// Render a tool result as the text content of the response.
///
/// Plain strings pass through unquoted; everything else is pretty-printed
/// JSON.
fn render_result(result: JsonValue) -> String {
    match result {
        JsonValue::String(text) => text,
        other => serde_json::to_string_pretty(&other).unwrap_or_else(|_| other.to_string()),
    }
}
