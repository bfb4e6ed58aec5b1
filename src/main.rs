//! MCP Server Entry Point
//!
//! Loads configuration, initializes logging on stderr, builds the tool
//! registry and serves on the configured transport.

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use toolbox_mcp_server::core::config::Notice;
use toolbox_mcp_server::core::{Config, McpServer, TransportService};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;

    init_logging(&config.logging.level, config.logging.with_timestamps);

    info!("Starting {} v{}", config.server.name, config.server.version);
    for notice in config.notices() {
        match notice {
            Notice::Info(msg) => info!("{}", msg),
            Notice::Warn(msg) => warn!("{}", msg),
        }
    }

    let server = McpServer::new(config.clone()).context("Failed to build tool registry")?;
    info!("Server initialized");

    TransportService::new(config.transport)
        .run(server)
        .await
        .context("Transport failed")?;

    info!("Server shutting down");
    Ok(())
}

/// Initialize the logging subsystem.
///
/// Logs always go to stderr: stdout belongs to the protocol. `RUST_LOG`
/// directives take precedence over `MCP_LOG_LEVEL`.
fn init_logging(level: &str, with_timestamps: bool) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_ansi(false)
        .with_writer(std::io::stderr);

    if with_timestamps {
        builder.init();
    } else {
        builder.without_time().init();
    }
}
