//! Vault file tools.
//!
//! Tools: list_files_in_vault, list_files_in_dir, get_file_contents,
//! batch_get_file_contents, append_content, patch_content, delete_file

use serde_json::{json, Map, Value as JsonValue};

use crate::client::{ObsidianClient, PatchOperation, TargetType};
use crate::convert::{get_bool_or, get_string_arg, get_string_list_arg};
use crate::error::{McpError, Result};
use crate::schema;
use crate::tools::ToolDef;

/// Get all vault tool definitions.
pub fn tools() -> Vec<ToolDef> {
    vec![
        ToolDef::new(
            "list_files_in_vault",
            "Lists all files and directories in the root directory of your Obsidian vault.",
            schema!(object {}),
        ),
        ToolDef::new(
            "list_files_in_dir",
            "Lists all files and directories that exist in a specific Obsidian directory. \
             Note that empty directories will not be returned.",
            schema!(object {
                required: { "dirpath": string }
            }),
        ),
        ToolDef::new(
            "get_file_contents",
            "Return the content of a single file in your vault, together with the current \
             date.",
            schema!(object {
                required: { "filepath": string }
            }),
        ),
        ToolDef::new(
            "batch_get_file_contents",
            "Return the contents of multiple files in your vault, concatenated with headers. \
             A file that cannot be read contributes an inline error block instead of failing \
             the whole call.",
            schema!(object {
                required: { "filepaths": array_string }
            }),
        ),
        ToolDef::new(
            "append_content",
            "Append content to a new or existing file in the vault.",
            schema!(object {
                required: { "filepath": string, "content": string }
            }),
        ),
        ToolDef::new(
            "patch_content",
            "Insert content into an existing note relative to a heading, block reference, \
             or frontmatter field.",
            json!({
                "type": "object",
                "properties": {
                    "filepath": {
                        "type": "string",
                        "description": "Path to the file (relative to vault root)"
                    },
                    "operation": {
                        "type": "string",
                        "enum": ["append", "prepend", "replace"],
                        "description": "Operation to perform on the target"
                    },
                    "target_type": {
                        "type": "string",
                        "enum": ["heading", "block", "frontmatter"],
                        "description": "Type of target to patch"
                    },
                    "target": {
                        "type": "string",
                        "description": "Target identifier (heading path, block reference, or frontmatter field)"
                    },
                    "content": {
                        "type": "string",
                        "description": "Content to insert"
                    }
                },
                "required": ["filepath", "operation", "target_type", "target", "content"]
            }),
        ),
        ToolDef::new(
            "delete_file",
            "Delete a file or directory from the vault. Irreversible; requires confirm=true.",
            json!({
                "type": "object",
                "properties": {
                    "filepath": {
                        "type": "string",
                        "description": "Path to the file or directory to delete (relative to vault root)"
                    },
                    "confirm": {
                        "type": "boolean",
                        "description": "Confirmation to delete the file (must be true)",
                        "default": false
                    }
                },
                "required": ["filepath"]
            }),
        ),
    ]
}

/// Dispatch a vault tool call.
pub async fn dispatch(
    client: &ObsidianClient,
    name: &str,
    args: Map<String, JsonValue>,
) -> Result<JsonValue> {
    match name {
        "list_files_in_vault" => client.list_files_in_vault().await,

        "list_files_in_dir" => {
            let dirpath = get_string_arg(&args, "dirpath")?;
            client.list_files_in_dir(&dirpath).await
        }

        "get_file_contents" => {
            let filepath = get_string_arg(&args, "filepath")?;
            let file = client.get_file_contents(&filepath).await?;
            Ok(json!({ "now": file.now, "content": file.content }))
        }

        "batch_get_file_contents" => {
            let filepaths = get_string_list_arg(&args, "filepaths")?;
            let content = client.get_batch_file_contents(&filepaths).await?;
            Ok(JsonValue::String(content))
        }

        "append_content" => {
            let filepath = get_string_arg(&args, "filepath")?;
            let content = get_string_arg(&args, "content")?;
            client.append_content(&filepath, &content).await?;
            Ok(json!({
                "message": format!("Successfully appended content to {filepath}")
            }))
        }

        "patch_content" => {
            let filepath = get_string_arg(&args, "filepath")?;
            let operation = get_patch_operation(&args)?;
            let target_type = get_target_type(&args)?;
            let target = get_string_arg(&args, "target")?;
            let content = get_string_arg(&args, "content")?;
            client
                .patch_content(&filepath, operation, target_type, &target, &content)
                .await?;
            Ok(json!({
                "message": format!("Successfully patched content in {filepath}")
            }))
        }

        "delete_file" => {
            let filepath = get_string_arg(&args, "filepath")?;
            // Safety gate: never contact the store without explicit consent.
            if !get_bool_or(&args, "confirm", false)? {
                return Err(McpError::ConfirmationRequired(filepath));
            }
            let status = client.delete_file(&filepath).await?;
            Ok(json!({
                "status": status,
                "message": format!("Successfully deleted {filepath}")
            }))
        }

        _ => Err(McpError::UnknownTool(name.to_string())),
    }
}

fn get_patch_operation(args: &Map<String, JsonValue>) -> Result<PatchOperation> {
    let raw = get_string_arg(args, "operation")?;
    PatchOperation::parse(&raw).ok_or_else(|| McpError::InvalidArg {
        name: "operation".to_string(),
        reason: "must be one of: append, prepend, replace".to_string(),
    })
}

fn get_target_type(args: &Map<String, JsonValue>) -> Result<TargetType> {
    let raw = get_string_arg(args, "target_type")?;
    TargetType::parse(&raw).ok_or_else(|| McpError::InvalidArg {
        name: "target_type".to_string(),
        reason: "must be one of: heading, block, frontmatter".to_string(),
    })
}
