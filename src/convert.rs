//! Argument extraction and result shaping.
//!
//! Helpers for pulling typed values out of a tool call's argument map, with
//! validation that fails before any network traffic, plus the projection of
//! raw simple-search responses into the fixed output shape.

use serde_json::{json, Map, Value as JsonValue};

use crate::error::{McpError, Result};

/// Get a required string argument.
pub fn get_string_arg(args: &Map<String, JsonValue>, name: &str) -> Result<String> {
    match args.get(name) {
        None => Err(McpError::MissingArg(name.to_string())),
        Some(JsonValue::String(s)) => Ok(s.clone()),
        Some(_) => Err(McpError::InvalidArg {
            name: name.to_string(),
            reason: "expected a string".to_string(),
        }),
    }
}

/// Get a required list-of-strings argument.
pub fn get_string_list_arg(args: &Map<String, JsonValue>, name: &str) -> Result<Vec<String>> {
    let arr = match args.get(name) {
        None => return Err(McpError::MissingArg(name.to_string())),
        Some(JsonValue::Array(arr)) => arr,
        Some(_) => {
            return Err(McpError::InvalidArg {
                name: name.to_string(),
                reason: "expected an array of strings".to_string(),
            })
        }
    };
    arr.iter()
        .map(|v| {
            v.as_str().map(|s| s.to_string()).ok_or_else(|| McpError::InvalidArg {
                name: name.to_string(),
                reason: "expected an array of strings".to_string(),
            })
        })
        .collect()
}

/// Get a required JSON object argument, passed through verbatim.
pub fn get_object_arg(args: &Map<String, JsonValue>, name: &str) -> Result<JsonValue> {
    match args.get(name) {
        None => Err(McpError::MissingArg(name.to_string())),
        Some(value @ JsonValue::Object(_)) => Ok(value.clone()),
        Some(_) => Err(McpError::InvalidArg {
            name: name.to_string(),
            reason: "expected a JSON object".to_string(),
        }),
    }
}

/// Get an optional boolean argument, defaulting when absent.
///
/// A present value of any other type is a validation failure, not the
/// default.
pub fn get_bool_or(args: &Map<String, JsonValue>, name: &str, default: bool) -> Result<bool> {
    match args.get(name) {
        None => Ok(default),
        Some(JsonValue::Bool(b)) => Ok(*b),
        Some(_) => Err(McpError::InvalidArg {
            name: name.to_string(),
            reason: "expected a boolean".to_string(),
        }),
    }
}

/// Get an optional integer argument with a lower bound.
pub fn get_int_min(args: &Map<String, JsonValue>, name: &str, default: i64, min: i64) -> Result<i64> {
    let value = match args.get(name) {
        None => return Ok(default),
        Some(v) => v.as_i64().ok_or_else(|| McpError::InvalidArg {
            name: name.to_string(),
            reason: "expected an integer".to_string(),
        })?,
    };
    if value < min {
        return Err(McpError::InvalidArg {
            name: name.to_string(),
            reason: format!("must be at least {min}"),
        });
    }
    Ok(value)
}

/// Get an optional integer argument constrained to an inclusive range.
pub fn get_int_in_range(
    args: &Map<String, JsonValue>,
    name: &str,
    default: i64,
    min: i64,
    max: i64,
) -> Result<i64> {
    let value = match args.get(name) {
        None => return Ok(default),
        Some(v) => v.as_i64().ok_or_else(|| McpError::InvalidArg {
            name: name.to_string(),
            reason: "expected an integer".to_string(),
        })?,
    };
    if value < min || value > max {
        return Err(McpError::InvalidArg {
            name: name.to_string(),
            reason: format!("must be between {min} and {max}"),
        });
    }
    Ok(value)
}

/// Project raw simple-search results into the fixed output shape.
///
/// Each result becomes `{filename, score, matches:[{context,
/// match_position:{start, end}}]}`. Fields the store omits default to the
/// empty string, 0, and the empty list; fields it adds are dropped.
pub fn format_search_results(raw: JsonValue) -> JsonValue {
    let results = match raw {
        JsonValue::Array(results) => results,
        _ => return JsonValue::Array(Vec::new()),
    };

    let formatted: Vec<JsonValue> = results
        .into_iter()
        .map(|result| {
            let filename = result
                .get("filename")
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string();
            let score = result
                .get("score")
                .filter(|v| v.is_number())
                .cloned()
                .unwrap_or_else(|| json!(0));
            let matches: Vec<JsonValue> = result
                .get("matches")
                .and_then(|v| v.as_array())
                .map(|matches| matches.iter().map(format_match).collect())
                .unwrap_or_default();
            json!({
                "filename": filename,
                "score": score,
                "matches": matches,
            })
        })
        .collect();

    JsonValue::Array(formatted)
}

fn format_match(entry: &JsonValue) -> JsonValue {
    let context = entry.get("context").and_then(|v| v.as_str()).unwrap_or("");
    let start = entry.pointer("/match/start").and_then(|v| v.as_u64()).unwrap_or(0);
    let end = entry.pointer("/match/end").and_then(|v| v.as_u64()).unwrap_or(0);
    json!({
        "context": context,
        "match_position": { "start": start, "end": end },
    })
}
