//! Tool descriptors and the handler trait.
//!
//! A [`ToolDescriptor`] is the unit of registration: a name, a description,
//! an input [`Schema`] and a type-erased async handler. Tools are usually
//! written as a [`ToolHandler`] implementation with a typed `Args` struct and
//! converted with [`ToolDescriptor::from_handler`].

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use rmcp::model::{CallToolResult, Tool};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::ToolError;
use super::schema::{Schema, describe};

/// Outcome of a tool handler.
///
/// `Ok` carries a result that may itself be a soft failure
/// (`is_error: Some(true)`); `Err` is a hard failure the dispatcher reports.
pub type ToolResult = Result<CallToolResult, ToolError>;

type HandlerFn = dyn Fn(Value) -> BoxFuture<'static, ToolResult> + Send + Sync;

/// Trait for implementing tools with typed arguments.
#[async_trait::async_trait]
pub trait ToolHandler: Send + Sync + 'static {
    /// Validated arguments, deserialized from the normalized JSON value.
    type Args: DeserializeOwned + Send + 'static;

    /// Tool name as registered in MCP.
    const NAME: &'static str;

    /// Tool description shown to clients.
    const DESCRIPTION: &'static str;

    /// Declarative schema for the tool's arguments.
    fn input_schema() -> Schema;

    /// Execute the tool.
    async fn call(&self, args: Self::Args) -> ToolResult;
}

/// An immutable registered tool.
#[derive(Clone)]
pub struct ToolDescriptor {
    name: &'static str,
    description: &'static str,
    input_schema: Schema,
    handler: Arc<HandlerFn>,
}

impl ToolDescriptor {
    /// Create a descriptor from a handler working on validated JSON.
    pub fn new<F, Fut>(
        name: &'static str,
        description: &'static str,
        input_schema: Schema,
        handler: F,
    ) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ToolResult> + Send + 'static,
    {
        Self {
            name,
            description,
            input_schema,
            handler: Arc::new(move |args| handler(args).boxed()),
        }
    }

    /// Create a descriptor from a typed [`ToolHandler`].
    pub fn from_handler<T: ToolHandler>(tool: T) -> Self {
        let tool = Arc::new(tool);
        Self::new(T::NAME, T::DESCRIPTION, T::input_schema(), move |args| {
            let tool = tool.clone();
            async move {
                let args: T::Args = serde_json::from_value(args)
                    .map_err(|e| ToolError::invalid_arguments(e.to_string()))?;
                tool.call(args).await
            }
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn description(&self) -> &'static str {
        self.description
    }

    pub fn input_schema(&self) -> &Schema {
        &self.input_schema
    }

    /// Run the handler on already-validated arguments.
    ///
    /// The handler is only entered when the returned future is first polled.
    pub fn invoke(&self, args: Value) -> BoxFuture<'static, ToolResult> {
        let handler = self.handler.clone();
        async move { handler(args).await }.boxed()
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool(&self) -> Tool {
        Tool {
            name: self.name.into(),
            description: Some(self.description.into()),
            input_schema: Arc::new(describe(&self.input_schema)),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        }
    }
}

impl fmt::Debug for ToolDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolDescriptor")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}
