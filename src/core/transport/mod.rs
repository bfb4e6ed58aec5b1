//! Transport layer for the MCP server.
//!
//! The host launches the server as a subprocess and exchanges
//! newline-delimited JSON-RPC over stdin/stdout (feature: `stdio`).
//! [`TransportService`] owns the session lifecycle and hands message
//! processing to the [`McpServer`](crate::core::McpServer) handler.

mod config;
mod error;
mod service;

#[cfg(feature = "stdio")]
pub mod stdio;

pub use config::TransportConfig;
pub use error::{TransportError, TransportResult};
pub use service::TransportService;
