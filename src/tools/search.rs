//! Search tools.
//!
//! Tools: simple_search, complex_search, get_recent_changes

use serde_json::{json, Map, Value as JsonValue};

use crate::client::ObsidianClient;
use crate::convert::{
    format_search_results, get_int_in_range, get_int_min, get_object_arg, get_string_arg,
};
use crate::error::{McpError, Result};
use crate::tools::ToolDef;

/// Get all search tool definitions.
pub fn tools() -> Vec<ToolDef> {
    vec![
        ToolDef::new(
            "simple_search",
            "Simple search for documents matching a specified text query across all files \
             in the vault. Use this tool when you want to do a simple text search.",
            json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Text to search for in the vault"
                    },
                    "context_length": {
                        "type": "integer",
                        "description": "How much context to return around the matching string",
                        "default": 100,
                        "minimum": 1
                    }
                },
                "required": ["query"]
            }),
        ),
        ToolDef::new(
            "complex_search",
            "Complex search for documents using a JsonLogic query. Supports standard \
             JsonLogic operators plus 'glob' and 'regexp' for pattern matching. Results \
             must be non-falsy. Use this tool when you want to do a complex search, e.g. \
             for all documents with certain tags. Example: \
             {\"glob\": [\"*.md\", {\"var\": \"path\"}]} matches all markdown files.",
            json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "object",
                        "description": "JsonLogic query object, forwarded to the store verbatim"
                    }
                },
                "required": ["query"]
            }),
        ),
        ToolDef::new(
            "get_recent_changes",
            "Get recently modified files in the vault.",
            json!({
                "type": "object",
                "properties": {
                    "limit": {
                        "type": "integer",
                        "description": "Maximum number of files to return",
                        "default": 10,
                        "minimum": 1,
                        "maximum": 100
                    },
                    "days": {
                        "type": "integer",
                        "description": "Only include files modified within this many days",
                        "default": 90,
                        "minimum": 1
                    }
                },
                "required": []
            }),
        ),
    ]
}

/// Dispatch a search tool call.
pub async fn dispatch(
    client: &ObsidianClient,
    name: &str,
    args: Map<String, JsonValue>,
) -> Result<JsonValue> {
    match name {
        "simple_search" => {
            let query = get_string_arg(&args, "query")?;
            let context_length = get_int_min(&args, "context_length", 100, 1)? as u64;
            let raw = client.search(&query, context_length).await?;
            Ok(format_search_results(raw))
        }

        "complex_search" => {
            let query = get_object_arg(&args, "query")?;
            client.search_json(&query).await
        }

        "get_recent_changes" => {
            let limit = get_int_in_range(&args, "limit", 10, 1, 100)? as u64;
            let days = get_int_min(&args, "days", 90, 1)? as u64;
            client.get_recent_changes(limit, days).await
        }

        _ => Err(McpError::UnknownTool(name.to_string())),
    }
}
