//! Tool Registry - central registration and lookup for all tools.
//!
//! The registry is built once at startup by [`build_registry`] and is
//! read-only afterwards. Registration order is preserved and is the order
//! in which the host sees tools listed.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::core::config::Config;

use super::definitions::{
    CalculatorTool, DatabaseQueryTool, FetchPageTool, ReadFileTool, WebSearchTool,
};
use super::descriptor::{ToolDescriptor, ToolHandler};
use super::error::ToolError;

// ============================================================================
// Tool Registry
// ============================================================================

/// Ordered, immutable collection of tool descriptors.
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    tools: Vec<ToolDescriptor>,
    index: HashMap<&'static str, usize>,
}

impl ToolRegistry {
    /// Start building a registry.
    pub fn builder() -> ToolRegistryBuilder {
        ToolRegistryBuilder::default()
    }

    /// All descriptors, in registration order.
    pub fn list(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    /// Exact, case-sensitive lookup by name.
    pub fn find(&self, name: &str) -> Option<&ToolDescriptor> {
        self.index.get(name).map(|&i| &self.tools[i])
    }

    /// Get all tool names, in registration order.
    pub fn tool_names(&self) -> Vec<&'static str> {
        self.tools.iter().map(ToolDescriptor::name).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Collects descriptors before freezing them into a [`ToolRegistry`].
#[derive(Debug, Default)]
pub struct ToolRegistryBuilder {
    tools: Vec<ToolDescriptor>,
}

impl ToolRegistryBuilder {
    /// Register a descriptor.
    pub fn register(mut self, descriptor: ToolDescriptor) -> Self {
        self.tools.push(descriptor);
        self
    }

    /// Register a typed tool.
    pub fn register_tool<T: ToolHandler>(self, tool: T) -> Self {
        self.register(ToolDescriptor::from_handler(tool))
    }

    /// Freeze the registry. Fails if two tools share a name.
    pub fn build(self) -> Result<ToolRegistry, ToolError> {
        let mut index = HashMap::with_capacity(self.tools.len());
        for (i, tool) in self.tools.iter().enumerate() {
            if index.insert(tool.name(), i).is_some() {
                return Err(ToolError::DuplicateTool(tool.name().to_string()));
            }
            debug!("Registered tool: {}", tool.name());
        }
        Ok(ToolRegistry {
            tools: self.tools,
            index,
        })
    }
}

/// Build the registry with every built-in tool.
///
/// This is the single source of truth for the tools the server exposes.
pub fn build_registry(config: Arc<Config>) -> Result<ToolRegistry, ToolError> {
    let registry = ToolRegistry::builder()
        .register_tool(WebSearchTool::new(&config)?)
        .register_tool(FetchPageTool::new(&config)?)
        .register_tool(DatabaseQueryTool::new())
        .register_tool(ReadFileTool::new(config))
        .register_tool(CalculatorTool)
        .build()?;

    info!("Registered {} tools", registry.len());
    Ok(registry)
}
