//! Fetch page tool definition.
//!
//! Downloads a web page and returns it as plain text, one window at a time.

use serde::Deserialize;
use tracing::{debug, info, instrument};

use super::common::{char_window, error_result, http_client, success_result};
use crate::core::config::Config;
use crate::domains::tools::descriptor::{ToolHandler, ToolResult};
use crate::domains::tools::schema::{
    Field, NumberSchema, ObjectSchema, Schema, StringFormat, StringSchema,
};
use crate::domains::tools::ToolError;

/// Column width used when rendering HTML as text.
const RENDER_WIDTH: usize = 100;

/// Body bytes read per requested character, leaving room for markup.
const BYTES_PER_CHAR: usize = 16;

const MIN_BODY_BYTES: usize = 1024 * 1024;

const MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

// ============================================================================
// Tool Parameters
// ============================================================================

/// Parameters for fetching a page.
#[derive(Debug, Clone, Deserialize)]
pub struct FetchPageArgs {
    pub url: String,
    pub max_length: usize,
    pub start_index: usize,
}

// ============================================================================
// Tool Definition
// ============================================================================

/// Fetch page tool.
pub struct FetchPageTool {
    client: reqwest::Client,
}

impl FetchPageTool {
    pub fn new(config: &Config) -> Result<Self, ToolError> {
        Ok(Self {
            client: http_client(config)?,
        })
    }

    #[instrument(skip_all, fields(url = %display_url(&args.url)))]
    async fn fetch(&self, args: &FetchPageArgs) -> ToolResult {
        let shown_url = display_url(&args.url);
        let response = self.client.get(&args.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Ok(error_result(&format!(
                "Failed to fetch {}: {} {}",
                shown_url,
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        let is_html = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_none_or(|ct| ct.contains("html"));
        let (body, cut) = read_body(response, body_limit(args)).await?;
        debug!("Fetched {} bytes (html: {}, cut: {})", body.len(), is_html, cut);

        let text = if is_html {
            html_to_text(&body)?
        } else {
            String::from_utf8_lossy(&body).into_owned()
        };

        let total = text.chars().count();
        if args.start_index > 0 && args.start_index >= total {
            return Ok(error_result(&format!(
                "start_index {} is beyond the end of the content ({} characters)",
                args.start_index, total
            )));
        }

        let (window, more) = char_window(&text, args.start_index, args.max_length);
        let shown = window.chars().count();
        info!("Returning {} of {} characters", shown, total);

        let mut output = format!("Contents of {}:\n\n{}", shown_url, window);
        if more {
            output.push_str(&format!(
                "\n\n[Content truncated. Call fetch_page again with start_index={} to continue.]",
                args.start_index + shown
            ));
        } else if cut {
            output.push_str(&format!(
                "\n\n[Page larger than {} bytes; the remainder was not downloaded.]",
                body.len()
            ));
        }
        Ok(success_result(output))
    }
}

/// Byte budget for the response body of one call.
fn body_limit(args: &FetchPageArgs) -> usize {
    args.start_index
        .saturating_add(args.max_length)
        .saturating_mul(BYTES_PER_CHAR)
        .clamp(MIN_BODY_BYTES, MAX_BODY_BYTES)
}

/// Stream the body until it ends or `limit` bytes are read. The flag reports
/// whether bytes were left unread.
async fn read_body(
    mut response: reqwest::Response,
    limit: usize,
) -> Result<(Vec<u8>, bool), ToolError> {
    let capacity = response
        .content_length()
        .map_or(0, |len| len.min(limit as u64) as usize);
    let mut body = Vec::with_capacity(capacity);

    while let Some(chunk) = response.chunk().await? {
        let room = limit - body.len();
        if chunk.len() > room {
            body.extend_from_slice(&chunk[..room]);
            return Ok((body, true));
        }
        body.extend_from_slice(&chunk);
    }
    Ok((body, false))
}

/// The URL as shown to the host: userinfo, query and fragment removed.
fn display_url(raw: &str) -> String {
    match reqwest::Url::parse(raw) {
        Ok(mut url) => {
            let _ = url.set_username("");
            let _ = url.set_password(None);
            url.set_query(None);
            url.set_fragment(None);
            url.to_string()
        }
        Err(_) => "<invalid url>".to_string(),
    }
}

fn html_to_text(html: &[u8]) -> Result<String, ToolError> {
    html2text::config::plain()
        .string_from_read(html, RENDER_WIDTH)
        .map_err(|e| ToolError::execution_failed(format!("Failed to render page: {}", e)))
}

#[async_trait::async_trait]
impl ToolHandler for FetchPageTool {
    type Args = FetchPageArgs;

    const NAME: &'static str = "fetch_page";

    const DESCRIPTION: &'static str = "Fetch a web page and return its content as plain text. \
        Long pages are truncated; pass start_index to read further.";

    fn input_schema() -> Schema {
        ObjectSchema::new()
            .field(Field::required(
                "url",
                "Absolute http(s) URL of the page",
                StringSchema::new().format(StringFormat::Url),
            ))
            .field(Field::with_default(
                "max_length",
                "Maximum number of characters to return (100-100000)",
                NumberSchema::integer().range(100.0, 100_000.0).coerce(),
                20_000,
            ))
            .field(Field::with_default(
                "start_index",
                "Character offset to start reading from",
                NumberSchema::integer().min(0.0).coerce(),
                0,
            ))
            .into_schema()
    }

    async fn call(&self, args: FetchPageArgs) -> ToolResult {
        self.fetch(&args).await
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::definitions::common::result_text;
    use httpmock::prelude::*;
    use serde_json::json;

    fn tool() -> FetchPageTool {
        FetchPageTool::new(&Config::default()).unwrap()
    }

    fn args(url: String, max_length: usize, start_index: usize) -> FetchPageArgs {
        FetchPageArgs {
            url,
            max_length,
            start_index,
        }
    }

    #[tokio::test]
    async fn test_html_is_rendered_as_text() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/page");
                then.status(200)
                    .header("content-type", "text/html; charset=utf-8")
                    .body("<html><body><h1>Title</h1><p>Hello world</p></body></html>");
            })
            .await;

        let url = server.url("/page");
        let result = tool().call(args(url.clone(), 1000, 0)).await.unwrap();
        let text = result_text(&result);

        assert_eq!(result.is_error, Some(false));
        assert!(text.starts_with(&format!("Contents of {}:", url)));
        assert!(text.contains("Title"));
        assert!(text.contains("Hello world"));
        assert!(!text.contains("<p>"));
        assert!(!text.contains("truncated"));
    }

    #[tokio::test]
    async fn test_long_content_is_windowed() {
        let server = MockServer::start_async().await;
        let body = "a".repeat(150) + &"b".repeat(150);
        server
            .mock_async(|when, then| {
                when.method(GET).path("/plain");
                then.status(200).header("content-type", "text/plain").body(&body);
            })
            .await;

        let url = server.url("/plain");
        let first = tool().call(args(url.clone(), 150, 0)).await.unwrap();
        let text = result_text(&first);
        assert!(text.contains(&"a".repeat(150)));
        assert!(!text.contains('b'));
        assert!(text.contains("start_index=150"));

        let second = tool().call(args(url, 150, 150)).await.unwrap();
        let text = result_text(&second);
        assert!(text.contains(&"b".repeat(150)));
        assert!(!text.contains("truncated"));
    }

    #[tokio::test]
    async fn test_start_index_past_end() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/short");
                then.status(200).header("content-type", "text/plain").body("tiny");
            })
            .await;

        let result = tool()
            .call(args(server.url("/short"), 100, 50))
            .await
            .unwrap();
        assert_eq!(result.is_error, Some(true));
        assert!(result_text(&result).contains("beyond the end"));
    }

    #[tokio::test]
    async fn test_http_error_is_soft_failure() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/missing");
                then.status(404);
            })
            .await;

        let result = tool()
            .call(args(server.url("/missing"), 100, 0))
            .await
            .unwrap();
        assert_eq!(result.is_error, Some(true));
        assert!(result_text(&result).ends_with("404 Not Found"));
    }

    #[tokio::test]
    async fn test_failure_text_omits_credentials() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/private");
                then.status(403);
            })
            .await;

        let url = format!(
            "http://admin:hunter2@{}/private?token=s3cret#frag",
            server.address()
        );
        let result = tool().call(args(url, 100, 0)).await.unwrap();
        let text = result_text(&result);

        assert_eq!(result.is_error, Some(true));
        assert_eq!(
            text,
            format!("Failed to fetch {}: 403 Forbidden", server.url("/private"))
        );
        assert!(!text.contains("hunter2"));
        assert!(!text.contains("s3cret"));
    }

    #[tokio::test]
    async fn test_oversized_body_is_not_fully_read() {
        let server = MockServer::start_async().await;
        let body = "x".repeat(3 * MIN_BODY_BYTES);
        server
            .mock_async(|when, then| {
                when.method(GET).path("/huge");
                then.status(200).header("content-type", "text/plain").body(&body);
            })
            .await;

        let response = reqwest::get(server.url("/huge")).await.unwrap();
        let (read, cut) = read_body(response, MIN_BODY_BYTES).await.unwrap();
        assert_eq!(read.len(), MIN_BODY_BYTES);
        assert!(cut);

        let result = tool().call(args(server.url("/huge"), 100, 0)).await.unwrap();
        assert_eq!(result.is_error, Some(false));
        assert!(result_text(&result).contains("start_index=100"));
    }

    #[tokio::test]
    async fn test_window_beyond_limit_reports_cut() {
        let server = MockServer::start_async().await;
        let body = "y".repeat(MAX_BODY_BYTES + 10);
        server
            .mock_async(|when, then| {
                when.method(GET).path("/edge");
                then.status(200).header("content-type", "text/plain").body(&body);
            })
            .await;

        let start = MAX_BODY_BYTES - 50;
        let result = tool().call(args(server.url("/edge"), 100, start)).await.unwrap();
        let text = result_text(&result);
        assert_eq!(result.is_error, Some(false));
        assert!(text.contains(&"y".repeat(50)));
        assert!(!text.contains("start_index="));
        assert!(text.ends_with(&format!(
            "[Page larger than {} bytes; the remainder was not downloaded.]",
            MAX_BODY_BYTES
        )));
    }

    #[test]
    fn test_body_limit_bounds() {
        assert_eq!(body_limit(&args(String::new(), 100, 0)), MIN_BODY_BYTES);
        assert_eq!(body_limit(&args(String::new(), 100_000, 0)), 1_600_000);
        assert_eq!(body_limit(&args(String::new(), 100, usize::MAX)), MAX_BODY_BYTES);
    }

    #[test]
    fn test_display_url_redaction() {
        assert_eq!(
            display_url("https://u:p@example.com/a/b?key=1#x"),
            "https://example.com/a/b"
        );
        assert_eq!(display_url("not a url"), "<invalid url>");
    }

    #[test]
    fn test_schema_rejects_non_http_url() {
        let errors = FetchPageTool::input_schema()
            .validate(&json!({ "url": "ftp://example.com/file" }))
            .unwrap_err();
        assert_eq!(errors.errors()[0].path_string(), "url");

        let value = FetchPageTool::input_schema()
            .validate(&json!({ "url": "https://example.com" }))
            .unwrap();
        assert_eq!(value["max_length"], 20_000);
        assert_eq!(value["start_index"], 0);
    }
}
