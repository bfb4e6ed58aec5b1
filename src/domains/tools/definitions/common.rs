//! Common utilities shared across tool definitions.
//!
//! Result builders, per-call environment lookups and the shared HTTP client.

use std::time::Duration;

use rmcp::model::{CallToolResult, Content};
use tracing::warn;

use crate::core::config::Config;
use crate::domains::tools::ToolError;

/// User agent sent with outbound HTTP requests.
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Create an error result with a formatted message.
pub fn error_result(message: &str) -> CallToolResult {
    warn!("{}", message);
    CallToolResult::error(vec![Content::text(message.to_string())])
}

/// Create a success result with text content.
pub fn success_result(content: String) -> CallToolResult {
    CallToolResult::success(vec![Content::text(content)])
}

/// Read a required environment variable at call time.
///
/// Empty values count as unset. The error names the variable, never a value.
pub fn required_env(name: &str) -> Result<String, ToolError> {
    optional_env(name).ok_or_else(|| ToolError::missing_config(name))
}

/// Read an optional environment variable at call time.
pub fn optional_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Build the HTTP client used by network tools.
pub fn http_client(config: &Config) -> Result<reqwest::Client, ToolError> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(config.http.timeout_secs))
        .build()
        .map_err(|e| ToolError::internal(format!("Failed to build HTTP client: {}", e)))
}

/// Keep at most `max` characters of `text`, starting at character `start`.
///
/// Returns the window and whether more text follows it.
pub fn char_window(text: &str, start: usize, max: usize) -> (String, bool) {
    let mut chars = text.chars().skip(start);
    let window: String = chars.by_ref().take(max).collect();
    let more = chars.next().is_some();
    (window, more)
}

/// Concatenated text content of a result.
#[cfg(test)]
pub fn result_text(result: &CallToolResult) -> String {
    result
        .content
        .iter()
        .filter_map(|c| match &c.raw {
            rmcp::model::RawContent::Text(text) => Some(text.text.as_str()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Serializes tests that mutate the process environment.
#[cfg(test)]
pub static ENV_TEST_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_env_names_variable() {
        let _lock = ENV_TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        unsafe {
            std::env::remove_var("TOOLBOX_TEST_MISSING");
        }
        let err = required_env("TOOLBOX_TEST_MISSING").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing required configuration: TOOLBOX_TEST_MISSING is not set"
        );
    }

    #[test]
    fn test_blank_env_counts_as_unset() {
        let _lock = ENV_TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        unsafe {
            std::env::set_var("TOOLBOX_TEST_BLANK", "   ");
        }
        assert!(optional_env("TOOLBOX_TEST_BLANK").is_none());
        unsafe {
            std::env::set_var("TOOLBOX_TEST_BLANK", " value ");
        }
        assert_eq!(required_env("TOOLBOX_TEST_BLANK").unwrap(), "value");
        unsafe {
            std::env::remove_var("TOOLBOX_TEST_BLANK");
        }
    }

    #[test]
    fn test_char_window() {
        assert_eq!(char_window("héllo world", 0, 5), ("héllo".to_string(), true));
        assert_eq!(char_window("héllo world", 6, 100), ("world".to_string(), false));
        assert_eq!(char_window("abc", 0, 3), ("abc".to_string(), false));
        assert_eq!(char_window("abc", 5, 3), (String::new(), false));
    }

    #[test]
    fn test_result_builders() {
        let ok = success_result("done".to_string());
        assert_eq!(ok.is_error, Some(false));
        assert_eq!(result_text(&ok), "done");

        let err = error_result("nope");
        assert_eq!(err.is_error, Some(true));
        assert_eq!(result_text(&err), "nope");
    }
}
