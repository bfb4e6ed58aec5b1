//! STDIO transport.
//!
//! Stdout carries protocol frames only; all logging goes to stderr. A session
//! lasts until the host closes stdin or the process receives Ctrl-C.

use rmcp::ServiceExt;
use tracing::{info, warn};

use super::{TransportError, TransportResult};
use crate::core::McpServer;

/// Why a stdio session stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    /// The host closed the stream; carries rmcp's quit reason.
    HostClosed(String),
    /// Ctrl-C arrived while the session was running.
    Interrupted,
}

/// Run one MCP session over stdin/stdout.
pub async fn serve(server: McpServer) -> TransportResult<SessionEnd> {
    let tool_count = server.dispatcher().list_tools().len();

    let running = server
        .serve(rmcp::transport::stdio())
        .await
        .map_err(|e| TransportError::init(e.to_string()))?;
    info!("Session initialized, serving {} tools", tool_count);

    let end = tokio::select! {
        quit = running.waiting() => {
            let reason = quit.map_err(|e| TransportError::service(e.to_string()))?;
            SessionEnd::HostClosed(format!("{:?}", reason))
        }
        Ok(()) = tokio::signal::ctrl_c() => {
            warn!("Interrupted, closing session");
            SessionEnd::Interrupted
        }
    };
    Ok(end)
}
