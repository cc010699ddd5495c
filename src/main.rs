//! obsidian-mcp executable entry point.

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use obsidian_mcp::{ClientConfig, McpError, McpServer, ObsidianClient, Result};

/// MCP server exposing an Obsidian vault through its Local REST API.
#[derive(Debug, Parser)]
#[command(name = "obsidian-mcp", version, about)]
struct Args {
    /// Host where the Obsidian Local REST API listens
    #[arg(long, env = "OBSIDIAN_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port of the Obsidian Local REST API
    #[arg(long, env = "OBSIDIAN_PORT", default_value_t = 27124)]
    port: u16,

    /// URL scheme used to reach the API
    #[arg(long, env = "OBSIDIAN_PROTOCOL", default_value = "https", value_parser = ["http", "https"])]
    protocol: String,

    /// Verify the API's TLS certificate (the plugin ships a self-signed one,
    /// so verification is off by default)
    #[arg(long, env = "OBSIDIAN_VERIFY_TLS", default_value_t = false)]
    verify_tls: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries the protocol; all diagnostics go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let api_key = std::env::var("OBSIDIAN_API_KEY")
        .ok()
        .filter(|key| !key.is_empty())
        .ok_or_else(|| {
            McpError::Internal("OBSIDIAN_API_KEY environment variable is required".to_string())
        })?;

    let config = ClientConfig {
        api_key,
        protocol: args.protocol,
        host: args.host,
        port: args.port,
        verify_tls: args.verify_tls,
    };
    let client = ObsidianClient::new(config)?;

    info!(base_url = %client.base_url(), "obsidian-mcp server starting");
    McpServer::new(client).run().await
}
