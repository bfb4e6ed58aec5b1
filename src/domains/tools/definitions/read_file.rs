//! Read file tool definition.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, instrument};

use super::common::{error_result, success_result};
use crate::core::config::Config;
use crate::core::security::PathGuard;
use crate::domains::tools::descriptor::{ToolHandler, ToolResult};
use crate::domains::tools::schema::{Field, NumberSchema, ObjectSchema, Schema, StringSchema};
use crate::domains::tools::ToolError;

// ============================================================================
// Tool Parameters
// ============================================================================

/// Parameters for reading a file.
#[derive(Debug, Clone, Deserialize)]
pub struct ReadFileArgs {
    pub path: String,
    pub max_bytes: u64,
}

// ============================================================================
// Tool Definition
// ============================================================================

/// Read file tool - returns the text of a file under the allowed root.
pub struct ReadFileTool {
    config: Arc<Config>,
}

impl ReadFileTool {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    fn read(path: &Path, max_bytes: u64) -> Result<(String, u64), ToolError> {
        let file = File::open(path)?;
        let size = file.metadata()?.len();
        let mut buf = Vec::with_capacity(size.min(max_bytes) as usize);
        file.take(max_bytes).read_to_end(&mut buf)?;
        Ok((String::from_utf8_lossy(&buf).into_owned(), size))
    }
}

#[async_trait::async_trait]
impl ToolHandler for ReadFileTool {
    type Args = ReadFileArgs;

    const NAME: &'static str = "read_file";

    const DESCRIPTION: &'static str = "Read a text file from the server's filesystem. \
        Relative paths are resolved against the configured root directory.";

    fn input_schema() -> Schema {
        ObjectSchema::new()
            .field(Field::required(
                "path",
                "Path of the file to read",
                StringSchema::new().min_length(1),
            ))
            .field(Field::with_default(
                "max_bytes",
                "Maximum number of bytes to read (1-1048576)",
                NumberSchema::integer().range(1.0, 1_048_576.0).coerce(),
                65_536,
            ))
            .into_schema()
    }

    #[instrument(skip_all, fields(path = %args.path))]
    async fn call(&self, args: ReadFileArgs) -> ToolResult {
        let guard = PathGuard::from_config(&self.config.security);
        let path = guard
            .resolve(&args.path)
            .map_err(|e| ToolError::execution_failed(e.to_string()))?;

        if path.is_dir() {
            return Ok(error_result(&format!("'{}' is a directory", args.path)));
        }

        let max_bytes = args.max_bytes;
        let (text, size) = tokio::task::spawn_blocking(move || Self::read(&path, max_bytes))
            .await
            .map_err(|e| ToolError::internal(format!("Read task failed: {}", e)))??;

        info!("Read {} of {} bytes", size.min(max_bytes), size);

        let mut output = text;
        if size > max_bytes {
            output.push_str(&format!(
                "\n\n[Truncated: showing first {} of {} bytes]",
                max_bytes, size
            ));
        }
        Ok(success_result(output))
    }
}

// ============================================================================
// Tests
// ============================================================================
