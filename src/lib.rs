//! Toolbox MCP Server Library
//!
//! A Model Context Protocol server that exposes a fixed set of tools to an
//! MCP host over stdio (or TCP). Every tool declares its arguments with a
//! [`Schema`](domains::tools::schema::Schema) that both validates incoming
//! calls and produces the JSON Schema advertised in `tools/list`.
//!
//! # Architecture
//!
//! - **core**: configuration, errors, path security, the rmcp handler and transports
//! - **domains::tools**: schema, descriptors, registry, dispatcher and tool definitions
//!
//! # Example
//!
//! ```rust,no_run
//! use toolbox_mcp_server::core::{Config, McpServer, TransportService};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let server = McpServer::new(config.clone())?;
//!     TransportService::new(config.transport).run(server).await?;
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

pub use core::{Config, Error, McpServer, Result};
pub use domains::tools::{Dispatcher, ToolDescriptor, ToolError, ToolRegistry};
