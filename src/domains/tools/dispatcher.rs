//! Tool call dispatch.
//!
//! The [`Dispatcher`] turns a `tools/call` request into exactly one
//! [`CallToolResult`]: it resolves the tool, validates the arguments against
//! the tool's schema, runs the handler and normalizes whatever comes back.
//! Nothing that happens inside a tool call escapes as an error or a panic.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use rmcp::model::{CallToolResult, Content, JsonObject, Tool};
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use super::error::ToolError;
use super::registry::ToolRegistry;

/// Stateless per-call dispatcher over an immutable registry.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// The host-facing catalog, generated fresh from the registry.
    pub fn list_tools(&self) -> Vec<Tool> {
        self.registry.list().iter().map(|t| t.to_tool()).collect()
    }

    /// Resolve, validate, execute and normalize a single tool call.
    #[instrument(skip(self, arguments))]
    pub async fn call_tool(&self, name: &str, arguments: Option<JsonObject>) -> CallToolResult {
        let Some(tool) = self.registry.find(name) else {
            warn!("Unknown tool requested: {}", name);
            return error_text(ToolError::not_found(name).to_string());
        };

        let raw = Value::Object(arguments.unwrap_or_default());
        let args = match tool.input_schema().validate(&raw) {
            Ok(args) => args,
            Err(errors) => {
                warn!("Rejected arguments for '{}': {} error(s)", name, errors.len());
                debug!("Validation errors: {}", errors);
                return error_text(format!("Invalid arguments for tool '{}': {}", name, errors));
            }
        };

        info!("Calling tool '{}'", name);
        let outcome = AssertUnwindSafe(tool.invoke(args)).catch_unwind().await;

        match outcome {
            Ok(Ok(result)) => normalize(name, result),
            Ok(Err(err)) => {
                warn!("Tool '{}' failed: {}", name, err);
                error_text(format!("Error: {}", err))
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                error!("Tool '{}' panicked: {}", name, message);
                error_text(format!("Error: {}", message))
            }
        }
    }
}

fn normalize(name: &str, mut result: CallToolResult) -> CallToolResult {
    let is_error = result.is_error.unwrap_or(false);
    if is_error {
        warn!("Tool '{}' reported a failure", name);
    } else if result.content.is_empty() {
        error!("Tool '{}' returned an empty success result", name);
        return error_text(format!("Error: tool '{}' returned no content", name));
    }
    result.is_error = Some(is_error);
    result
}

fn error_text(message: String) -> CallToolResult {
    CallToolResult::error(vec![Content::text(message)])
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown error".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Config;
    use crate::domains::tools::definitions::common::result_text;
    use crate::domains::tools::descriptor::ToolDescriptor;
    use crate::domains::tools::registry::build_registry;
    use crate::domains::tools::schema::{Field, ObjectSchema, Schema, StringSchema};
    use serde_json::json;

    fn args(value: Value) -> Option<JsonObject> {
        match value {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    fn query_schema() -> Schema {
        ObjectSchema::new()
            .field(Field::required(
                "query",
                "Query",
                StringSchema::new().min_length(1),
            ))
            .into_schema()
    }

    fn test_dispatcher() -> Dispatcher {
        let registry = build_registry(Arc::new(Config::default())).unwrap();
        Dispatcher::new(Arc::new(registry))
    }

    fn custom_dispatcher(tools: Vec<ToolDescriptor>) -> Dispatcher {
        let registry = tools
            .into_iter()
            .fold(ToolRegistry::builder(), |b, t| b.register(t))
            .build()
            .unwrap();
        Dispatcher::new(Arc::new(registry))
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let result = test_dispatcher()
            .call_tool("does_not_exist", args(json!({})))
            .await;
        assert_eq!(result.is_error, Some(true));
        assert_eq!(result_text(&result), "Unknown tool: does_not_exist");
    }

    #[tokio::test]
    async fn test_divide_by_zero() {
        let result = test_dispatcher()
            .call_tool(
                "calculator",
                args(json!({ "operation": "divide", "a": 10, "b": 0 })),
            )
            .await;
        assert_eq!(result.is_error, Some(true));
        assert_eq!(result_text(&result), "Error: Cannot divide by zero");
    }

    #[tokio::test]
    async fn test_missing_required_query() {
        let result = test_dispatcher()
            .call_tool("web_search", args(json!({})))
            .await;
        assert_eq!(result.is_error, Some(true));
        let text = result_text(&result);
        assert!(text.contains("query"), "{}", text);
        assert!(text.starts_with("Invalid arguments for tool 'web_search'"));
    }

    #[tokio::test]
    async fn test_valid_call() {
        let dispatcher = test_dispatcher();
        let first = dispatcher
            .call_tool("calculator", args(json!({ "operation": "add", "a": 2, "b": 3 })))
            .await;
        let second = dispatcher
            .call_tool("calculator", args(json!({ "operation": "add", "a": 2, "b": 3 })))
            .await;
        assert_eq!(first.is_error, Some(false));
        assert_eq!(result_text(&first), "2 add 3 = 5");
        assert_eq!(result_text(&first), result_text(&second));
    }

    #[tokio::test]
    async fn test_hard_failure_then_recovery() {
        let failing = ToolDescriptor::new("explode", "Always fails", query_schema(), |_| async {
            Err(ToolError::execution_failed("boom"))
        });
        let dispatcher = custom_dispatcher(vec![failing]);

        let result = dispatcher
            .call_tool("explode", args(json!({ "query": "x" })))
            .await;
        assert_eq!(result.is_error, Some(true));
        assert!(result_text(&result).contains("boom"));

        let again = dispatcher
            .call_tool("explode", args(json!({ "query": "y" })))
            .await;
        assert!(result_text(&again).contains("boom"));
    }

    #[tokio::test]
    async fn test_panicking_handler_is_contained() {
        let panicking = ToolDescriptor::new("panics", "Panics", query_schema(), |_| async {
            panic!("boom")
        });
        let healthy = ToolDescriptor::new("ok", "Fine", query_schema(), |v: Value| async move {
            Ok(CallToolResult::success(vec![Content::text(
                v["query"].as_str().unwrap_or_default().to_string(),
            )]))
        });
        let dispatcher = custom_dispatcher(vec![panicking, healthy]);

        let result = dispatcher
            .call_tool("panics", args(json!({ "query": "x" })))
            .await;
        assert_eq!(result.is_error, Some(true));
        assert_eq!(result_text(&result), "Error: boom");

        let result = dispatcher.call_tool("ok", args(json!({ "query": "still here" }))).await;
        assert_eq!(result.is_error, Some(false));
        assert_eq!(result_text(&result), "still here");
    }

    #[tokio::test]
    async fn test_panic_without_message() {
        let panicking = ToolDescriptor::new("opaque", "Panics", query_schema(), |_| async {
            std::panic::panic_any(42_u8)
        });
        let dispatcher = custom_dispatcher(vec![panicking]);
        let result = dispatcher
            .call_tool("opaque", args(json!({ "query": "x" })))
            .await;
        assert_eq!(result_text(&result), "Error: unknown error");
    }

    #[tokio::test]
    async fn test_validation_failure_skips_handler() {
        let called = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let flag = called.clone();
        let tool = ToolDescriptor::new("guarded", "Guarded", query_schema(), move |_| {
            flag.store(true, std::sync::atomic::Ordering::SeqCst);
            async { Ok(CallToolResult::success(vec![Content::text("ran")])) }
        });
        let dispatcher = custom_dispatcher(vec![tool]);

        let result = dispatcher.call_tool("guarded", None).await;
        assert_eq!(result.is_error, Some(true));
        assert_eq!(
            result_text(&result),
            "Invalid arguments for tool 'guarded': query: Required"
        );
        assert!(!called.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_soft_failure_passes_through() {
        let tool = ToolDescriptor::new("soft", "Soft", query_schema(), |_| async {
            Ok(CallToolResult::error(vec![Content::text("upstream said no")]))
        });
        let dispatcher = custom_dispatcher(vec![tool]);
        let result = dispatcher.call_tool("soft", args(json!({ "query": "x" }))).await;
        assert_eq!(result.is_error, Some(true));
        assert_eq!(result_text(&result), "upstream said no");
    }

    #[tokio::test]
    async fn test_unset_is_error_defaults_to_false() {
        let tool = ToolDescriptor::new("unset", "Unset", query_schema(), |_| async {
            let mut result = CallToolResult::success(vec![Content::text("done")]);
            result.is_error = None;
            Ok(result)
        });
        let dispatcher = custom_dispatcher(vec![tool]);
        let result = dispatcher.call_tool("unset", args(json!({ "query": "x" }))).await;
        assert_eq!(result.is_error, Some(false));
    }

    #[tokio::test]
    async fn test_empty_success_is_rejected() {
        let tool = ToolDescriptor::new("silent", "Silent", query_schema(), |_| async {
            Ok(CallToolResult::success(vec![]))
        });
        let dispatcher = custom_dispatcher(vec![tool]);
        let result = dispatcher.call_tool("silent", args(json!({ "query": "x" }))).await;
        assert_eq!(result.is_error, Some(true));
        assert_eq!(result_text(&result), "Error: tool 'silent' returned no content");
    }

    #[test]
    fn test_list_tools_is_idempotent() {
        let dispatcher = test_dispatcher();
        let first = serde_json::to_value(dispatcher.list_tools()).unwrap();
        let second = serde_json::to_value(dispatcher.list_tools()).unwrap();
        assert_eq!(first, second);

        let names: Vec<_> = first
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, dispatcher.registry().tool_names());
        for tool in first.as_array().unwrap() {
            assert_eq!(tool["inputSchema"]["type"], "object");
            assert!(tool["description"].as_str().is_some());
        }
    }

    #[test]
    fn test_concurrent_calls_are_isolated() {
        let dispatcher = test_dispatcher();
        let results = tokio_test::block_on(futures::future::join_all((0..8).map(|i| {
            let dispatcher = dispatcher.clone();
            async move {
                dispatcher
                    .call_tool(
                        "calculator",
                        args(json!({ "operation": "multiply", "a": i, "b": 2 })),
                    )
                    .await
            }
        })));
        for (i, result) in results.iter().enumerate() {
            assert_eq!(result_text(result), format!("{} multiply 2 = {}", i, i * 2));
        }
    }
}
