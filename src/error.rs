//! Error types for the MCP server.
//!
//! Every failure in the crate flows through [`McpError`]. Validation and
//! safety-gate failures are raised by the gateway before any network call;
//! store failures originate in the client and propagate unchanged.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, McpError>;

/// Errors surfaced by the MCP server.
#[derive(Debug, Error)]
pub enum McpError {
    /// The Obsidian REST API rejected or failed to service a request.
    ///
    /// `code` is the store-defined error code from the response body, or -1
    /// when the body carried none or the failure happened at the transport
    /// level (connection refused, timeout, TLS).
    #[error("Error {code}: {message}")]
    Store {
        /// Store-defined numeric error code, -1 if absent
        code: i64,
        /// Human-readable failure description
        message: String,
    },

    /// A required tool argument was not provided.
    #[error("Missing required argument: {0}")]
    MissingArg(String),

    /// A tool argument had the wrong type or an out-of-range value.
    #[error("Invalid argument '{name}': {reason}")]
    InvalidArg {
        /// The offending argument name
        name: String,
        /// The accepted constraint
        reason: String,
    },

    /// An irreversible operation was invoked without explicit confirmation.
    #[error("confirm must be set to true to delete {0}")]
    ConfirmationRequired(String),

    /// The requested tool name is not in the registry.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Unexpected internal failure.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<reqwest::Error> for McpError {
    /// Transport-level failures (connection refused, timeout, DNS, TLS) and
    /// body-decoding failures collapse into the single store error channel.
    fn from(err: reqwest::Error) -> Self {
        McpError::Store {
            code: -1,
            message: format!("Request failed: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_display_carries_code_and_message() {
        let err = McpError::Store {
            code: 40102,
            message: "not found".to_string(),
        };
        assert_eq!(err.to_string(), "Error 40102: not found");
    }

    #[test]
    fn invalid_arg_display_names_the_field() {
        let err = McpError::InvalidArg {
            name: "limit".to_string(),
            reason: "must be between 1 and 50".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid argument 'limit': must be between 1 and 50"
        );
    }

    #[test]
    fn confirmation_required_display() {
        let err = McpError::ConfirmationRequired("notes/old.md".to_string());
        assert_eq!(
            err.to_string(),
            "confirm must be set to true to delete notes/old.md"
        );
    }
}
