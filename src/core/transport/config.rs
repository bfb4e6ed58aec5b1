//! Transport configuration types.

use serde::{Deserialize, Serialize};

use super::{TransportError, TransportResult};

/// Transport selected by `MCP_TRANSPORT`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TransportConfig {
    /// Standard input/output transport (default for MCP).
    #[cfg(feature = "stdio")]
    Stdio,
}

impl Default for TransportConfig {
    fn default() -> Self {
        #[cfg(feature = "stdio")]
        {
            return Self::Stdio;
        }

        #[cfg(not(feature = "stdio"))]
        {
            compile_error!("The stdio transport feature must be enabled");
        }
    }
}

impl TransportConfig {
    /// Select a transport by name, case-insensitively. An empty name picks
    /// the default.
    pub fn parse(name: &str) -> TransportResult<Self> {
        match name.trim().to_lowercase().as_str() {
            "" => Ok(Self::default()),
            #[cfg(feature = "stdio")]
            "stdio" => Ok(Self::Stdio),
            other => Err(TransportError::Unsupported(other.to_string())),
        }
    }

    /// Get a description of this transport for logging.
    pub fn description(&self) -> &'static str {
        match self {
            #[cfg(feature = "stdio")]
            Self::Stdio => "STDIO (standard MCP mode)",
        }
    }
}
