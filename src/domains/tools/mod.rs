//! Tools domain module.
//!
//! Tools are executable functions that MCP clients call by name with JSON
//! arguments.
//!
//! ## Architecture
//!
//! - `schema/` - Declarative argument schemas: validation and JSON Schema output
//! - `descriptor.rs` - `ToolDescriptor` and the typed `ToolHandler` trait
//! - `registry.rs` - Ordered, immutable name-to-descriptor registry
//! - `dispatcher.rs` - Resolve, validate, execute and normalize one call
//! - `definitions/` - Individual tool implementations (one file per tool)
//! - `error.rs` - Tool-specific error types
//!
//! ## Adding a New Tool
//!
//! 1. Create a new file in `definitions/` with an args struct and a
//!    `ToolHandler` impl whose `input_schema()` matches the struct
//! 2. Export it in `definitions/mod.rs`
//! 3. Register it in `build_registry` in `registry.rs`

pub mod definitions;
pub mod descriptor;
pub mod dispatcher;
mod error;
pub mod registry;
pub mod schema;

pub use descriptor::{ToolDescriptor, ToolHandler, ToolResult};
pub use dispatcher::Dispatcher;
pub use error::ToolError;
pub use registry::{ToolRegistry, build_registry};
