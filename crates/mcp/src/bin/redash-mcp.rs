// Standalone MCP server binary

use anyhow::{Context, Result};
use clap::Parser;
use redash_mcp::resources::ResourceExposer;
use redash_mcp::server::McpServer;
use redash_mcp::tools::{register_redash_tools, ToolRegistry};
use redash_sdk::{PollOptions, RedashClient};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "redash-mcp")]
#[command(about = "Model Context Protocol server for Redash", long_about = None)]
struct Args {
    /// Base URL of the Redash instance
    #[arg(long, env = "REDASH_URL")]
    url: Option<String>,

    /// Redash API key
    #[arg(long, env = "REDASH_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// HTTP request timeout in milliseconds
    #[arg(long, env = "REDASH_TIMEOUT", default_value = "30000")]
    timeout: u64,

    /// Wait between job status checks in milliseconds
    #[arg(long, env = "REDASH_POLL_INTERVAL", default_value = "1000")]
    poll_interval: u64,

    /// Give up waiting for a query job after this many milliseconds
    #[arg(long, env = "REDASH_POLL_TIMEOUT", default_value = "60000")]
    poll_timeout: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries the protocol, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    tracing::info!("Redash MCP server starting...");

    let client = RedashClient::builder()
        .base_url(args.url.unwrap_or_default())
        .api_key(args.api_key.unwrap_or_default())
        .timeout(Duration::from_millis(args.timeout))
        .poll_options(PollOptions::new(
            Duration::from_millis(args.poll_interval),
            Duration::from_millis(args.poll_timeout),
        ))
        .build()
        .context("Invalid Redash configuration (set REDASH_URL and REDASH_API_KEY)")?;

    tracing::info!(url = %client.config().base_url, "Using Redash instance");

    let mut registry = ToolRegistry::new();
    register_redash_tools(&mut registry, &client);

    tracing::info!("Registered {} tools", registry.len());

    let server = McpServer::new(registry, ResourceExposer::new(client));
    server.start().await?;

    Ok(())
}
