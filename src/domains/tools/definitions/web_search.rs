//! Web search tool definition.
//!
//! Queries a Brave-compatible web search API. The API key is read from the
//! environment on every call so it can be rotated without a restart.

use serde::Deserialize;
use tracing::{debug, info, instrument};

use super::common::{error_result, http_client, optional_env, required_env, success_result};
use crate::core::config::Config;
use crate::domains::tools::descriptor::{ToolHandler, ToolResult};
use crate::domains::tools::schema::{Field, NumberSchema, ObjectSchema, Schema, StringSchema};
use crate::domains::tools::ToolError;

pub const API_KEY_VAR: &str = "SEARCH_API_KEY";
pub const API_URL_VAR: &str = "SEARCH_API_URL";
pub const DEFAULT_API_URL: &str = "https://api.search.brave.com/res/v1/web/search";

// ============================================================================
// Tool Parameters
// ============================================================================

/// Parameters for web search.
#[derive(Debug, Clone, Deserialize)]
pub struct WebSearchArgs {
    pub query: String,
    pub count: u32,
    pub offset: u32,
}

// ============================================================================
// API Response
// ============================================================================

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    web: Option<WebResults>,
}

#[derive(Debug, Default, Deserialize)]
struct WebResults {
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    description: String,
}

// ============================================================================
// Tool Definition
// ============================================================================

/// Web search tool.
pub struct WebSearchTool {
    client: reqwest::Client,
}

impl WebSearchTool {
    pub fn new(config: &Config) -> Result<Self, ToolError> {
        Ok(Self {
            client: http_client(config)?,
        })
    }

    /// Run a search against `endpoint` with the given key.
    #[instrument(skip(self, api_key), fields(query = %args.query))]
    pub async fn search(&self, endpoint: &str, api_key: &str, args: &WebSearchArgs) -> ToolResult {
        let count = args.count.to_string();
        let offset = args.offset.to_string();
        let response = self
            .client
            .get(endpoint)
            .header("Accept", "application/json")
            .header("X-Subscription-Token", api_key)
            .query(&[
                ("q", args.query.as_str()),
                ("count", count.as_str()),
                ("offset", offset.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Ok(error_result(&format!(
                "Search API error: {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        let body: SearchResponse = response.json().await?;
        let hits = body.web.unwrap_or_default().results;
        debug!("Search returned {} result(s)", hits.len());

        if hits.is_empty() {
            return Ok(success_result(format!(
                "No results found for '{}'",
                args.query
            )));
        }

        info!("Found {} result(s)", hits.len());
        Ok(success_result(format_hits(&hits)))
    }
}

fn format_hits(hits: &[SearchHit]) -> String {
    hits.iter()
        .enumerate()
        .map(|(i, hit)| {
            format!(
                "{}. {}\n   URL: {}\n   {}",
                i + 1,
                hit.title,
                hit.url,
                hit.description
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[async_trait::async_trait]
impl ToolHandler for WebSearchTool {
    type Args = WebSearchArgs;

    const NAME: &'static str = "web_search";

    const DESCRIPTION: &'static str = "Search the web and return a numbered list of results \
        with title, URL and description. Use offset to page through results.";

    fn input_schema() -> Schema {
        ObjectSchema::new()
            .field(Field::required(
                "query",
                "Search query",
                StringSchema::new().min_length(1).max_length(400),
            ))
            .field(Field::with_default(
                "count",
                "Number of results to return (1-20)",
                NumberSchema::integer().range(1.0, 20.0).coerce(),
                5,
            ))
            .field(Field::with_default(
                "offset",
                "Page offset for pagination (0-9)",
                NumberSchema::integer().range(0.0, 9.0).coerce(),
                0,
            ))
            .into_schema()
    }

    async fn call(&self, args: WebSearchArgs) -> ToolResult {
        let api_key = required_env(API_KEY_VAR)?;
        let endpoint = optional_env(API_URL_VAR).unwrap_or_else(|| DEFAULT_API_URL.to_string());
        self.search(&endpoint, &api_key, &args).await
    }
}

// ============================================================================
// Tests
// ============================================================================
