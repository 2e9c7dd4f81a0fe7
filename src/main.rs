//! Kiosk - MCP server for Jira Service Management
//!
//! This binary runs as an MCP server using stdio transport.
//!
//! # Configuration
//!
//! Set the following environment variables (or use a `.env` file):
//!
//! - `JIRA_URL`: Base URL of the Jira site
//! - `JIRA_USERNAME` and `JIRA_API_TOKEN`, or `JIRA_PERSONAL_TOKEN`
//!
//! # Usage
//!
//! ```bash
//! JIRA_URL=https://example.atlassian.net JIRA_USERNAME=me@example.com JIRA_API_TOKEN=xxx ./kiosk
//! ```

use anyhow::{Context, Result};
use rmcp::{transport::stdio, ServiceExt};
use tracing_subscriber::{fmt, EnvFilter};

use kiosk::{config, desk_client, server};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (ignore errors if not found)
    dotenvy::dotenv().ok();

    // stdout is reserved for MCP JSON-RPC messages
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("kiosk=info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    tracing::info!("Starting Kiosk MCP server v{}", env!("CARGO_PKG_VERSION"));

    let config = config::Config::from_env().context("Failed to load configuration")?;

    tracing::debug!(
        base_url = %config.base_url,
        auth = config.auth.kind(),
        default_service_desk_id = ?config.default_service_desk_id,
        read_only = config.read_only,
        "Configuration loaded"
    );

    let client = desk_client::DeskClient::new(&config).context("Failed to create HTTP client")?;

    tracing::info!("Testing connection to Jira Service Management...");
    if let Err(e) = client.test_connection().await {
        tracing::error!(error = %e, "Connection test failed");
        tracing::warn!(
            "Server will start but may not be able to reach Jira. \
             Check configuration and network connectivity."
        );
    }

    let server = server::KioskServer::new(client, &config);

    tracing::info!("Server initialized, starting stdio transport");

    let service = server
        .serve(stdio())
        .await
        .inspect_err(|e| {
            tracing::error!("serving error: {:?}", e);
        })
        .context("Failed to start server")?;

    tracing::info!("Server running, waiting for requests");

    service
        .waiting()
        .await
        .context("Server error during operation")?;

    tracing::info!("Server shutting down");

    Ok(())
}
