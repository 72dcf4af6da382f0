use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

mod api;
mod config;
mod middleware;

use config::{ServerConfig, Variant};

#[derive(Parser, Debug)]
#[command(name = "notion-bridge")]
#[command(about = "Simplified HTTP API in front of Notion, via REST or MCP", long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, env = "NOTION_BRIDGE_CONFIG", default_value = "notion-bridge.toml")]
    config: PathBuf,

    /// Upstream to bridge to
    #[arg(long, env = "BRIDGE_VARIANT", value_enum, default_value_t = Variant::Mcp)]
    variant: Variant,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "3000")]
    port: u16,

    /// Host to bind to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Notion integration token (overrides the config file)
    #[arg(long, env = "NOTION_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Remote MCP endpoint (overrides the config file)
    #[arg(long, env = "MCP_ENDPOINT")]
    mcp_endpoint: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "notion_bridge=info,tower_http=debug".into()),
        )
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    let args = Args::parse();

    tracing::info!("Starting Notion bridge ({} variant)", args.variant);

    // Load configuration
    let mut config = ServerConfig::load(&args.config)?;
    if let Some(token) = args.token {
        config.notion.token = token;
    }
    if let Some(endpoint) = args.mcp_endpoint {
        config.mcp.endpoint = endpoint;
    }
    if config.notion.token.is_empty() {
        tracing::warn!("No Notion token configured; upstream calls will be rejected");
    }

    // Start API server
    let addr = format!("{}:{}", args.host, args.port);
    tracing::info!("Starting API server on {}", addr);

    api::serve(&addr, config, args.variant).await?;

    Ok(())
}
