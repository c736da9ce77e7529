//! Application configuration
//!
//! Settings come from an optional TOML file and are then overlaid with
//! environment variables. Every section is optional:
//!
//! ```toml
//! [server]
//! name = "psa-tools"
//!
//! [logging]
//! level = "debug"
//! format = "json"
//!
//! [cache]
//! label_ttl_secs = 900
//! enhance_responses = true
//!
//! [source]
//! fixture_path = "fixtures/demo.toml"
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid value for {key}: {value:?} ({expected})")]
    InvalidEnv {
        key: &'static str,
        value: String,
        expected: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Simple,
    Json,
}

impl FromStr for LogFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simple" => Ok(LogFormat::Simple),
            "json" => Ok(LogFormat::Json),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub name: String,
    pub version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "psa-tools".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub format: LogFormat,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Age after which label lists are reported stale and eligible for refresh
    pub label_ttl_secs: u64,
    /// Inline company/resource names into tool results
    pub enhance_responses: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            label_ttl_secs: 30 * 60,
            enhance_responses: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub fixture_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub cache: CacheConfig,
    pub source: SourceConfig,
}

impl AppConfig {
    /// Load from an optional TOML file, then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                Self::from_toml_str(&content)?
            }
            None => Self::default(),
        };
        config.apply_env()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Overlay values from the process environment
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Overlay values from an arbitrary lookup; empty values are ignored
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(name) = get("MCP_SERVER_NAME") {
            self.server.name = name;
        }
        if let Some(version) = get("MCP_SERVER_VERSION") {
            self.server.version = version;
        }
        if let Some(level) = get("LOG_LEVEL") {
            self.logging.level = level.parse().map_err(|_| ConfigError::InvalidEnv {
                key: "LOG_LEVEL",
                value: level.clone(),
                expected: "error, warn, info, debug or trace",
            })?;
        }
        if let Some(format) = get("LOG_FORMAT") {
            self.logging.format = format.parse().map_err(|_| ConfigError::InvalidEnv {
                key: "LOG_FORMAT",
                value: format.clone(),
                expected: "simple or json",
            })?;
        }
        if let Some(ttl) = get("PSA_LABEL_CACHE_TTL_SECS") {
            self.cache.label_ttl_secs =
                ttl.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                    key: "PSA_LABEL_CACHE_TTL_SECS",
                    value: ttl.clone(),
                    expected: "a whole number of seconds",
                })?;
        }
        if let Some(enhance) = get("PSA_ENHANCE_RESPONSES") {
            self.cache.enhance_responses = match enhance.trim() {
                "true" | "1" => true,
                "false" | "0" => false,
                _ => {
                    return Err(ConfigError::InvalidEnv {
                        key: "PSA_ENHANCE_RESPONSES",
                        value: enhance.clone(),
                        expected: "true or false",
                    })
                }
            };
        }
        if let Some(path) = get("PSA_FIXTURE_PATH") {
            self.source.fixture_path = Some(PathBuf::from(path));
        }
        Ok(())
    }

    pub fn label_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.label_ttl_secs)
    }

    /// Problems that make this configuration unusable, empty when valid
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.server.name.trim().is_empty() {
            errors.push("Server name is required".to_string());
        }
        if self.server.version.trim().is_empty() {
            errors.push("Server version is required".to_string());
        }
        if self.cache.label_ttl_secs == 0 {
            errors.push("Label cache TTL must be greater than zero".to_string());
        }
        if self.source.fixture_path.is_none() {
            errors.push("A fixture file is required (--fixture or PSA_FIXTURE_PATH)".to_string());
        }
        errors
    }
}

pub fn config_help() -> &'static str {
    r#"PSA Tools Configuration:

Config file (--config <file>, TOML, all sections optional):
  [server]   name, version
  [logging]  level, format
  [cache]    label_ttl_secs, enhance_responses
  [source]   fixture_path

Environment Variables (override the config file):
  MCP_SERVER_NAME          - Server name (default: psa-tools)
  MCP_SERVER_VERSION       - Server version (default: crate version)
  LOG_LEVEL                - Logging level: error, warn, info, debug, trace (default: info)
  LOG_FORMAT               - Log format: simple, json (default: simple)
  PSA_LABEL_CACHE_TTL_SECS - Label cache TTL in seconds (default: 1800)
  PSA_ENHANCE_RESPONSES    - Inline company/resource names: true, false (default: true)
  PSA_FIXTURE_PATH         - TOML fixture backing the data source
  RUST_LOG                 - Full tracing filter, takes precedence over LOG_LEVEL

Example:
  PSA_FIXTURE_PATH=fixtures/demo.toml LOG_LEVEL=debug psa-tools call list_queues"#
}
