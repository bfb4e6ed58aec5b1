//! MCP Server implementation.
//!
//! [`McpServer`] is the rmcp `ServerHandler`. It answers `tools/list` from the
//! registry and forwards every `tools/call` to the [`Dispatcher`], which is
//! what guarantees a well-formed result for any call, unknown tools included.

use std::sync::Arc;

use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler, model::*, service::RequestContext,
};
use tracing::{info, instrument};

use super::config::Config;
use super::error::Result;
use crate::domains::tools::{Dispatcher, ToolRegistry, build_registry};

/// The main MCP server handler.
#[derive(Debug, Clone)]
pub struct McpServer {
    config: Arc<Config>,
    dispatcher: Dispatcher,
}

impl McpServer {
    /// Create a server exposing every built-in tool.
    pub fn new(config: Config) -> Result<Self> {
        let config = Arc::new(config);
        let registry = build_registry(config.clone())?;
        Ok(Self::with_registry(config, registry))
    }

    /// Create a server over an explicit registry.
    pub fn with_registry(config: Arc<Config>, registry: ToolRegistry) -> Self {
        Self {
            config,
            dispatcher: Dispatcher::new(Arc::new(registry)),
        }
    }

    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }
}

impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Tool server with web search, page fetching, SQLite queries, file reading \
                 and a calculator. Call tools/list for argument schemas."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: self.config.server.name.clone(),
                version: self.config.server.version.clone(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[instrument(skip(self, _request, _context))]
    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<ListToolsResult, McpError> {
        let tools = self.dispatcher.list_tools();
        info!("Listing {} tools", tools.len());
        Ok(ListToolsResult {
            tools,
            next_cursor: None,
            meta: None,
        })
    }

    #[instrument(skip(self, request, _context), fields(tool = %request.name))]
    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<CallToolResult, McpError> {
        Ok(self
            .dispatcher
            .call_tool(&request.name, request.arguments)
            .await)
    }
}
