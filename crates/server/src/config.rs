//! Configuration management for the Videobrowser server.
//!
//! This module provides TOML-based configuration file loading and saving.
//! The default configuration path is `~/.config/videobrowser/config.toml`.

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use browse::{BrowseOptions, DEFAULT_MAX_DEPTH, DEFAULT_PREVIEW_MAX_BYTES};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default listen address.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8900";

/// Upper bound accepted for `browse.max_depth`.
pub const MAX_DEPTH_LIMIT: usize = 64;

/// Configuration validation errors.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("max_depth must be between 1 and 64, got {0}")]
    InvalidMaxDepth(usize),

    #[error("preview_max_bytes must be greater than 0, got {0}")]
    InvalidPreviewLimit(u64),

    #[error("bind_addr must be a socket address like 127.0.0.1:8900, got {0}")]
    InvalidBindAddr(String),

    #[error("log_level must be one of: trace, debug, info, warn, error; got {0}")]
    InvalidLogLevel(String),
}

/// Valid log level values for tracing configuration.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Main configuration structure for the Videobrowser server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    /// HTTP server and logging configuration.
    pub server: ServerConfig,

    /// Browsing configuration.
    pub browse: BrowseConfig,
}

/// HTTP server and logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to listen on.
    pub bind_addr: String,

    /// Logging level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Directory for daily rolling log files. Logs go to stdout only when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
}

/// Browsing configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BrowseConfig {
    /// Directory all browsing is confined to.
    pub root: PathBuf,

    /// Maximum depth for directory listings.
    pub max_depth: usize,

    /// List entries whose name starts with `.`.
    pub show_hidden: bool,

    /// Largest file shown as text, in bytes (default: 4MB).
    pub preview_max_bytes: u64,

    /// Reject paths whose symlink-resolved form leaves the root.
    pub enforce_real_path: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            log_level: "info".to_string(),
            log_dir: None,
        }
    }
}

impl Default for BrowseConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("indir"),
            max_depth: DEFAULT_MAX_DEPTH,
            show_hidden: true,
            preview_max_bytes: DEFAULT_PREVIEW_MAX_BYTES,
            enforce_real_path: true,
        }
    }
}

impl BrowseConfig {
    /// Options for the request orchestrator.
    pub fn options(&self) -> BrowseOptions {
        BrowseOptions {
            max_depth: self.max_depth,
            show_hidden: self.show_hidden,
            preview_max_bytes: self.preview_max_bytes,
            enforce_real_path: self.enforce_real_path,
        }
    }
}

/// Returns the default configuration file path.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("videobrowser")
        .join("config.toml")
}

const ENV_ROOT: &str = "VIDEOBROWSER_ROOT";
const ENV_BIND_ADDR: &str = "VIDEOBROWSER_BIND_ADDR";
const ENV_LOG_LEVEL: &str = "VIDEOBROWSER_LOG_LEVEL";

/// Non-empty value of an environment variable.
fn env_override(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

impl Config {
    /// Apply environment variable overrides to the configuration.
    ///
    /// Environment variables take precedence over config file values.
    /// Supported variables:
    /// - VIDEOBROWSER_ROOT: Override the browse root
    /// - VIDEOBROWSER_BIND_ADDR: Override the listen address
    /// - VIDEOBROWSER_LOG_LEVEL: Override log level (trace, debug, info, warn, error)
    ///
    /// Returns the names of the variables that were applied. This runs before
    /// logging is initialized, so callers log the result afterwards.
    pub fn apply_env_overrides(&mut self) -> Vec<&'static str> {
        let mut applied = Vec::new();

        if let Some(root) = env_override(ENV_ROOT) {
            self.browse.root = PathBuf::from(root);
            applied.push(ENV_ROOT);
        }

        if let Some(addr) = env_override(ENV_BIND_ADDR) {
            self.server.bind_addr = addr;
            applied.push(ENV_BIND_ADDR);
        }

        if let Some(level) = env_override(ENV_LOG_LEVEL) {
            self.server.log_level = level;
            applied.push(ENV_LOG_LEVEL);
        }

        applied
    }

    /// Validate the configuration values.
    ///
    /// The root directory is not checked here; it is established when the
    /// server starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.browse.max_depth < 1 || self.browse.max_depth > MAX_DEPTH_LIMIT {
            return Err(ConfigError::InvalidMaxDepth(self.browse.max_depth));
        }

        if self.browse.preview_max_bytes == 0 {
            return Err(ConfigError::InvalidPreviewLimit(self.browse.preview_max_bytes));
        }

        self.bind_addr()?;

        let level = self.server.log_level.to_lowercase();
        if !VALID_LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(self.server.log_level.clone()));
        }

        Ok(())
    }

    /// Parsed listen address.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.server
            .bind_addr
            .parse()
            .map_err(|_| ConfigError::InvalidBindAddr(self.server.bind_addr.clone()))
    }

    /// Load configuration from a file.
    ///
    /// If the file does not exist, returns the default configuration.
    /// If the file exists but is invalid TOML, returns an error with
    /// a helpful message.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::debug!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Load configuration from the default path.
    pub fn load_default() -> Result<Self> {
        Self::load(default_config_path())
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str)
            .map_err(|e| anyhow::anyhow!("Invalid TOML configuration: {}", format_toml_error(&e)))
    }

    /// Save configuration to a file.
    ///
    /// Creates parent directories if they don't exist.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let contents = self.to_toml()?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::debug!("Configuration saved to {:?}", path);
        Ok(())
    }

    /// Serialize configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")
    }
}

/// Format a TOML deserialization error for user-friendly display.
fn format_toml_error(error: &toml::de::Error) -> String {
    let mut msg = error.message().to_string();

    if let Some(span) = error.span() {
        msg.push_str(&format!(" (at position {}..{})", span.start, span.end));
    }

    msg
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.server.bind_addr, "127.0.0.1:8900");
        assert_eq!(config.server.log_level, "info");
        assert!(config.server.log_dir.is_none());
        assert_eq!(config.browse.root, PathBuf::from("indir"));
        assert_eq!(config.browse.max_depth, 4);
        assert!(config.browse.show_hidden);
        assert_eq!(config.browse.preview_max_bytes, 4 * 1024 * 1024);
        assert!(config.browse.enforce_real_path);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_browse_options() {
        let options = BrowseConfig::default().options();
        assert_eq!(options, BrowseOptions::default());
    }

    #[test]
    fn test_from_toml_empty() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_from_toml_partial() {
        let toml = r#"
[browse]
root = "/srv/media"
show_hidden = false
"#;
        let config = Config::from_toml(toml).unwrap();

        assert_eq!(config.browse.root, PathBuf::from("/srv/media"));
        assert!(!config.browse.show_hidden);
        // Other values should be defaults
        assert_eq!(config.browse.max_depth, 4);
        assert_eq!(config.server.bind_addr, DEFAULT_BIND_ADDR);
    }

    #[test]
    fn test_from_toml_full() {
        let toml = r#"
[server]
bind_addr = "0.0.0.0:9000"
log_level = "debug"
log_dir = "/var/log/videobrowser"

[browse]
root = "/data"
max_depth = 8
show_hidden = false
preview_max_bytes = 1024
enforce_real_path = false
"#;
        let config = Config::from_toml(toml).unwrap();

        assert_eq!(config.server.bind_addr, "0.0.0.0:9000");
        assert_eq!(config.server.log_level, "debug");
        assert_eq!(
            config.server.log_dir,
            Some(PathBuf::from("/var/log/videobrowser"))
        );
        assert_eq!(config.browse.root, PathBuf::from("/data"));
        assert_eq!(config.browse.max_depth, 8);
        assert!(!config.browse.show_hidden);
        assert_eq!(config.browse.preview_max_bytes, 1024);
        assert!(!config.browse.enforce_real_path);
        assert_eq!(config.bind_addr().unwrap().port(), 9000);
    }

    #[test]
    fn test_from_toml_invalid_syntax() {
        let toml = r#"
[browse
root = "/data"
"#;
        let result = Config::from_toml(toml);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("Invalid TOML"));
    }

    #[test]
    fn test_from_toml_wrong_type() {
        let toml = r#"
[browse]
max_depth = "deep"
"#;
        assert!(Config::from_toml(toml).is_err());
    }

    #[test]
    fn test_roundtrip_custom() {
        let mut original = Config::default();
        original.server.log_level = "warn".to_string();
        original.server.log_dir = Some(PathBuf::from("/tmp/logs"));
        original.browse.root = PathBuf::from("/srv");
        original.browse.max_depth = 2;

        let loaded = Config::from_toml(&original.to_toml().unwrap()).unwrap();
        assert_eq!(original, loaded);
    }

    #[test]
    fn test_to_toml_sections() {
        let toml = Config::default().to_toml().unwrap();
        assert!(toml.contains("[server]"));
        assert!(toml.contains("[browse]"));
        assert!(!toml.contains("log_dir"));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::load(temp_dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested/dir/config.toml");

        let mut config = Config::default();
        config.browse.root = PathBuf::from("/media");
        config.save(&path).unwrap();

        assert!(path.exists());
        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn test_load_invalid_file_mentions_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[server\n").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("config.toml"));
    }

    #[test]
    fn test_validate_max_depth() {
        let mut config = Config::default();

        config.browse.max_depth = 0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidMaxDepth(0)));

        config.browse.max_depth = 65;
        assert_eq!(config.validate(), Err(ConfigError::InvalidMaxDepth(65)));

        config.browse.max_depth = 64;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_preview_limit() {
        let mut config = Config::default();
        config.browse.preview_max_bytes = 0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidPreviewLimit(0)));
    }

    #[test]
    fn test_validate_bind_addr() {
        let mut config = Config::default();
        config.server.bind_addr = "localhost".to_string();
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidBindAddr("localhost".to_string()))
        );

        config.server.bind_addr = "[::1]:8900".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_log_level() {
        let mut config = Config::default();

        config.server.log_level = "verbose".to_string();
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidLogLevel("verbose".to_string()))
        );

        config.server.log_level = "WARN".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        std::env::set_var("VIDEOBROWSER_ROOT", "/env/root");
        std::env::set_var("VIDEOBROWSER_BIND_ADDR", "0.0.0.0:1234");
        std::env::set_var("VIDEOBROWSER_LOG_LEVEL", "trace");

        let mut config = Config::default();
        let applied = config.apply_env_overrides();

        assert_eq!(
            applied,
            vec![
                "VIDEOBROWSER_ROOT",
                "VIDEOBROWSER_BIND_ADDR",
                "VIDEOBROWSER_LOG_LEVEL"
            ]
        );
        assert_eq!(config.browse.root, PathBuf::from("/env/root"));
        assert_eq!(config.server.bind_addr, "0.0.0.0:1234");
        assert_eq!(config.server.log_level, "trace");

        std::env::remove_var("VIDEOBROWSER_ROOT");
        std::env::remove_var("VIDEOBROWSER_BIND_ADDR");
        std::env::remove_var("VIDEOBROWSER_LOG_LEVEL");
    }

    #[test]
    #[serial]
    fn test_env_override_empty_does_not_override() {
        std::env::set_var("VIDEOBROWSER_ROOT", "");

        let mut config = Config::default();
        let applied = config.apply_env_overrides();

        assert!(!applied.contains(&"VIDEOBROWSER_ROOT"));
        assert_eq!(config.browse.root, PathBuf::from("indir"));

        std::env::remove_var("VIDEOBROWSER_ROOT");
    }

    #[test]
    #[serial]
    fn test_env_override_unset_does_not_override() {
        std::env::remove_var("VIDEOBROWSER_BIND_ADDR");

        let mut config = Config::default();
        config.apply_env_overrides();

        assert_eq!(config.server.bind_addr, DEFAULT_BIND_ADDR);
    }
}
