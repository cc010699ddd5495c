//! Tool registry and dispatch.
//!
//! Exposes the twelve vault operations as MCP tools. Each module declares
//! its tool definitions in `tools()` and routes calls in `dispatch()`; the
//! registry concatenates the definitions once at startup and is read-only
//! afterwards. Argument validation happens in the handlers, before the
//! client is ever invoked.

pub mod periodic;
pub mod search;
pub mod vault;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::client::ObsidianClient;
use crate::error::{McpError, Result};

/// A tool definition for the MCP tools/list response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDef {
    /// Tool name (e.g., "simple_search")
    pub name: String,
    /// Tool description
    pub description: String,
    /// JSON Schema for the input parameters
    #[serde(rename = "inputSchema")]
    pub input_schema: JsonValue,
}

impl ToolDef {
    /// Create a new tool definition.
    pub fn new(name: &str, description: &str, input_schema: JsonValue) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            input_schema,
        }
    }
}

/// Registry of available MCP tools.
///
/// Built once at startup; the single source of truth for what an external
/// caller may invoke.
pub struct ToolRegistry {
    tools: Vec<ToolDef>,
}

impl ToolRegistry {
    /// Create the registry with all twelve vault tools.
    pub fn new() -> Self {
        let mut tools = Vec::new();
        tools.extend(vault::tools());
        tools.extend(search::tools());
        tools.extend(periodic::tools());
        Self { tools }
    }

    /// Get all tool definitions.
    pub fn tools(&self) -> &[ToolDef] {
        &self.tools
    }

    /// Dispatch a tool call to the appropriate handler.
    pub async fn dispatch(
        &self,
        client: &ObsidianClient,
        name: &str,
        args: Map<String, JsonValue>,
    ) -> Result<JsonValue> {
        match name {
            "list_files_in_vault"
            | "list_files_in_dir"
            | "get_file_contents"
            | "batch_get_file_contents"
            | "append_content"
            | "patch_content"
            | "delete_file" => vault::dispatch(client, name, args).await,

            "simple_search" | "complex_search" | "get_recent_changes" => {
                search::dispatch(client, name, args).await
            }

            "get_periodic_note" | "get_recent_periodic_notes" => {
                periodic::dispatch(client, name, args).await
            }

            _ => Err(McpError::UnknownTool(name.to_string())),
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper macro for creating JSON Schema for tool input parameters.
#[macro_export]
macro_rules! schema {
    // Object with required and optional properties
    (object {
        required: { $($req_name:literal : $req_type:tt),* $(,)? },
        optional: { $($opt_name:literal : $opt_type:tt),* $(,)? }
    }) => {{
        let mut required = Vec::new();
        $(required.push($req_name);)*

        let mut props = serde_json::Map::new();
        $(props.insert($req_name.to_string(), schema!(@type $req_type));)*
        $(props.insert($opt_name.to_string(), schema!(@type $opt_type));)*

        serde_json::json!({
            "type": "object",
            "properties": props,
            "required": required
        })
    }};

    // Object with only required properties
    (object {
        required: { $($req_name:literal : $req_type:tt),* $(,)? }
    }) => {{
        let mut required = Vec::new();
        $(required.push($req_name);)*

        let mut props = serde_json::Map::new();
        $(props.insert($req_name.to_string(), schema!(@type $req_type));)*

        serde_json::json!({
            "type": "object",
            "properties": props,
            "required": required
        })
    }};

    // Empty object (no parameters)
    (object {}) => {{
        serde_json::json!({
            "type": "object",
            "properties": {},
            "required": []
        })
    }};

    // Type mappings
    (@type string) => { serde_json::json!({"type": "string"}) };
    (@type integer) => { serde_json::json!({"type": "integer"}) };
    (@type boolean) => { serde_json::json!({"type": "boolean"}) };
    (@type any) => { serde_json::json!({}) };
    (@type array_string) => { serde_json::json!({"type": "array", "items": {"type": "string"}}) };
}
