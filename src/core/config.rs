//! Configuration management for the MCP server.
//!
//! Settings come from `MCP_*` environment variables, optionally seeded from
//! `.env` and overridden by `.env.local`. Tool credentials such as
//! `SEARCH_API_KEY` or `DATABASE_PATH` are deliberately absent: tools read
//! them on each call.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::error::{Error, Result};
use super::transport::TransportConfig;

/// Main configuration structure for the MCP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Transport configuration.
    pub transport: TransportConfig,

    /// Outbound HTTP settings shared by network tools.
    pub http: HttpClientConfig,

    /// Security and path validation configuration.
    pub security: SecurityConfig,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The name of the server as reported to clients.
    pub name: String,

    /// The version of the server.
    pub version: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,

    /// Whether to include timestamps in log output.
    pub with_timestamps: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpClientConfig {
    /// Whole-request timeout, in seconds.
    pub timeout_secs: u64,
}

/// Configuration for security and path validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Optional root directory for file access. `None` means unrestricted.
    pub root_path: Option<PathBuf>,

    /// Whether symlinks may be followed. Targets must still lie inside the root.
    pub allow_symlinks: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            root_path: None,
            allow_symlinks: true,
        }
    }
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                with_timestamps: true,
            },
            transport: TransportConfig::default(),
            http: HttpClientConfig::default(),
            security: SecurityConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// `.env` fills in unset variables; `.env.local` overrides everything.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        dotenvy::from_filename_override(".env.local").ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(name) = get("MCP_SERVER_NAME") {
            config.server.name = name;
        }

        if let Some(level) = get("MCP_LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Some(timestamps) = get("MCP_LOG_TIMESTAMPS") {
            config.logging.with_timestamps = parse_bool("MCP_LOG_TIMESTAMPS", &timestamps)?;
        }

        config.transport = TransportConfig::parse(&get("MCP_TRANSPORT").unwrap_or_default())?;

        if let Some(timeout) = get("MCP_HTTP_TIMEOUT_SECS") {
            config.http.timeout_secs = timeout
                .parse()
                .ok()
                .filter(|&secs: &u64| secs > 0)
                .ok_or_else(|| {
                    Error::config(format!(
                        "MCP_HTTP_TIMEOUT_SECS must be a positive integer, got '{}'",
                        timeout
                    ))
                })?;
        }

        if let Some(root_path) = get("MCP_ROOT_PATH") {
            config.security.root_path = Some(PathBuf::from(root_path));
        }

        if let Some(allow) = get("MCP_ALLOW_SYMLINKS") {
            config.security.allow_symlinks = parse_bool("MCP_ALLOW_SYMLINKS", &allow)?;
        }

        Ok(config)
    }

    /// Startup notices about the loaded settings, for logging once the
    /// subscriber is installed.
    pub fn notices(&self) -> Vec<Notice> {
        let mut notices = Vec::new();
        match &self.security.root_path {
            Some(root) => notices.push(Notice::Info(format!(
                "Path security enabled: root directory set to {:?}",
                root
            ))),
            None => notices.push(Notice::Warn(
                "MCP_ROOT_PATH not set - read_file may access any path".to_string(),
            )),
        }
        if !self.security.allow_symlinks {
            notices.push(Notice::Info("Symlinks are not followed".to_string()));
        }
        notices
    }
}

/// A startup message and its severity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Warn(String),
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Error::config(format!(
            "{} must be true or false, got '{}'",
            key, value
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.with_timestamps);
        assert_eq!(config.http.timeout_secs, 30);
        assert!(config.security.root_path.is_none());
        assert!(config.security.allow_symlinks);
        assert_eq!(config.transport, TransportConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("MCP_SERVER_NAME", "toolbox"),
            ("MCP_LOG_LEVEL", "debug"),
            ("MCP_LOG_TIMESTAMPS", "false"),
            ("MCP_HTTP_TIMEOUT_SECS", "5"),
            ("MCP_ROOT_PATH", "/srv/data"),
            ("MCP_ALLOW_SYMLINKS", "no"),
        ])
        .unwrap();
        assert_eq!(config.server.name, "toolbox");
        assert_eq!(config.logging.level, "debug");
        assert!(!config.logging.with_timestamps);
        assert_eq!(config.http.timeout_secs, 5);
        assert_eq!(config.security.root_path, Some(PathBuf::from("/srv/data")));
        assert!(!config.security.allow_symlinks);
    }

    #[test]
    fn test_blank_values_ignored() {
        let config = load(&[("MCP_SERVER_NAME", "  "), ("MCP_ROOT_PATH", "")]).unwrap();
        assert_eq!(config.server.name, env!("CARGO_PKG_NAME"));
        assert!(config.security.root_path.is_none());
    }

    #[test]
    fn test_notices() {
        let notices = load(&[]).unwrap().notices();
        assert_eq!(
            notices,
            vec![Notice::Warn(
                "MCP_ROOT_PATH not set - read_file may access any path".to_string()
            )]
        );

        let notices = load(&[("MCP_ROOT_PATH", "/srv/data"), ("MCP_ALLOW_SYMLINKS", "off")])
            .unwrap()
            .notices();
        assert_eq!(notices.len(), 2);
        assert!(matches!(&notices[0], Notice::Info(msg) if msg.contains("/srv/data")));
        assert_eq!(notices[1], Notice::Info("Symlinks are not followed".to_string()));
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            load(&[("MCP_HTTP_TIMEOUT_SECS", "0")]),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            load(&[("MCP_ALLOW_SYMLINKS", "maybe")]),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            load(&[("MCP_TRANSPORT", "tcp")]),
            Err(Error::Transport(_))
        ));
    }
}
