//! Periodic note tools.
//!
//! Tools: get_periodic_note, get_recent_periodic_notes

use serde_json::{json, Map, Value as JsonValue};

use crate::client::{ObsidianClient, Period};
use crate::convert::{get_bool_or, get_int_in_range, get_string_arg};
use crate::error::{McpError, Result};
use crate::tools::ToolDef;

/// Get all periodic note tool definitions.
pub fn tools() -> Vec<ToolDef> {
    vec![
        ToolDef::new(
            "get_periodic_note",
            "Get current periodic note for the specified period.",
            json!({
                "type": "object",
                "properties": {
                    "period": {
                        "type": "string",
                        "enum": ["daily", "weekly", "monthly", "quarterly", "yearly"],
                        "description": "The period type"
                    }
                },
                "required": ["period"]
            }),
        ),
        ToolDef::new(
            "get_recent_periodic_notes",
            "Get most recent periodic notes for the specified period type.",
            json!({
                "type": "object",
                "properties": {
                    "period": {
                        "type": "string",
                        "enum": ["daily", "weekly", "monthly", "quarterly", "yearly"],
                        "description": "The period type"
                    },
                    "limit": {
                        "type": "integer",
                        "description": "Maximum number of notes to return",
                        "default": 5,
                        "minimum": 1,
                        "maximum": 50
                    },
                    "include_content": {
                        "type": "boolean",
                        "description": "Whether to include note content",
                        "default": false
                    }
                },
                "required": ["period"]
            }),
        ),
    ]
}

/// Dispatch a periodic note tool call.
pub async fn dispatch(
    client: &ObsidianClient,
    name: &str,
    args: Map<String, JsonValue>,
) -> Result<JsonValue> {
    match name {
        "get_periodic_note" => {
            let period = get_period_arg(&args)?;
            let content = client.get_periodic_note(period).await?;
            Ok(JsonValue::String(content))
        }

        "get_recent_periodic_notes" => {
            let period = get_period_arg(&args)?;
            let limit = get_int_in_range(&args, "limit", 5, 1, 50)? as u64;
            let include_content = get_bool_or(&args, "include_content", false)?;
            client
                .get_recent_periodic_notes(period, limit, include_content)
                .await
        }

        _ => Err(McpError::UnknownTool(name.to_string())),
    }
}

fn get_period_arg(args: &Map<String, JsonValue>) -> Result<Period> {
    let raw = get_string_arg(args, "period")?;
    Period::parse(&raw).ok_or_else(|| McpError::InvalidArg {
        name: "period".to_string(),
        reason: "must be one of: daily, weekly, monthly, quarterly, yearly".to_string(),
    })
}
