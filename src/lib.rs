//! # obsidian-mcp
//!
//! MCP (Model Context Protocol) server for the Obsidian Local REST API.
//!
//! This crate exposes a local Obsidian vault as tools for AI agents: list
//! notes, read and search content, and make bounded edits. It implements
//! the MCP protocol over stdin/stdout using JSON-RPC 2.0 and talks to the
//! vault through the Local REST API plugin over HTTP.
//!
//! ## Tools
//!
//! `list_files_in_vault`, `list_files_in_dir`, `get_file_contents`,
//! `batch_get_file_contents`, `simple_search`, `complex_search`,
//! `append_content`, `patch_content`, `delete_file`, `get_periodic_note`,
//! `get_recent_periodic_notes`, `get_recent_changes`
//!
//! ## Usage
//!
//! The server is typically run as an executable and configured in AI tools
//! like Claude Desktop:
//!
//! ```json
//! {
//!   "mcpServers": {
//!     "obsidian": {
//!       "command": "/path/to/obsidian-mcp",
//!       "env": { "OBSIDIAN_API_KEY": "<token>" }
//!     }
//!   }
//! }
//! ```
//!
//! ## Library Usage
//!
//! For testing or embedding, the client and registry are usable directly:
//!
//! ```no_run
//! use obsidian_mcp::{ClientConfig, McpServer, ObsidianClient};
//!
//! # async fn run() -> obsidian_mcp::Result<()> {
//! let client = ObsidianClient::new(ClientConfig {
//!     api_key: "token".to_string(),
//!     protocol: "https".to_string(),
//!     host: "127.0.0.1".to_string(),
//!     port: 27124,
//!     verify_tls: false,
//! })?;
//! McpServer::new(client).run().await
//! # }
//! ```

#![warn(missing_docs)]

mod client;
mod convert;
mod error;
mod server;
mod tools;

pub use client::{ClientConfig, FileContents, ObsidianClient, PatchOperation, Period, TargetType};
pub use convert::format_search_results;
pub use error::{McpError, Result};
pub use server::{JsonRpcRequest, JsonRpcResponse, McpServer};
pub use tools::{ToolDef, ToolRegistry};
