//! Configuration management for ledgerweb
//!
//! This module handles loading, validation, and management of
//! ledgerweb configuration from YAML files.

pub mod error;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use error::{ConfigError, ConfigErrorCode, ConfigResult};

// ==================== Configuration Types ====================

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Permissive CORS for browser clients served from elsewhere
    #[serde(default)]
    pub cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors: false,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

/// Data file configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Path to the JSON document
    #[serde(default = "default_data_path")]
    pub path: PathBuf,
    /// Pretty-print the document on save
    #[serde(default = "default_true")]
    pub pretty: bool,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: default_data_path(),
            pretty: true,
        }
    }
}

fn default_data_path() -> PathBuf {
    PathBuf::from("data.json")
}

fn default_true() -> bool {
    true
}

/// Defaults applied to newly created accounts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountsConfig {
    #[serde(default = "default_budget_limit")]
    pub default_budget_limit: f64,
}

impl Default for AccountsConfig {
    fn default() -> Self {
        Self {
            default_budget_limit: default_budget_limit(),
        }
    }
}

fn default_budget_limit() -> f64 {
    10000.0
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

const LOG_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Data file settings
    #[serde(default)]
    pub data: DataConfig,
    /// New account defaults
    #[serde(default)]
    pub accounts: AccountsConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: PathBuf) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::FileNotFound {
                path: path.display().to_string(),
            },
            _ => ConfigError::IoError {
                path: path.display().to_string(),
                message: e.to_string(),
            },
        })?;

        let config = Self::from_yaml(&content)?;
        config.validate()?;

        Ok(config)
    }

    /// Parse configuration from YAML text without validating it
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        // An empty file means "all defaults"
        if content.trim().is_empty() {
            return Ok(Config::default());
        }
        serde_yaml::from_str(content).map_err(|e| ConfigError::InvalidYaml {
            message: e.to_string(),
        })
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        if self.data.path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "data.path".to_string(),
                reason: "Data path must not be empty".to_string(),
            });
        }

        let limit = self.accounts.default_budget_limit;
        if !limit.is_finite() || limit < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "accounts.default_budget_limit".to_string(),
                reason: "Budget limit must be a non-negative number".to_string(),
            });
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "logging.level".to_string(),
                reason: format!("Log level must be one of: {}", LOG_LEVELS.join(", ")),
            });
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }

    /// Address the HTTP server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.bind_address(), "127.0.0.1:5000");
        assert_eq!(config.data.path, PathBuf::from("data.json"));
        assert!(config.data.pretty);
        assert_eq!(config.accounts.default_budget_limit, 10000.0);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bundled_template_matches_defaults() {
        let config = Config::from_yaml(Config::generate_default()).unwrap();
        let defaults = Config::default();
        assert_eq!(config.bind_address(), defaults.bind_address());
        assert_eq!(config.data.path, defaults.data.path);
        assert_eq!(config.accounts.default_budget_limit, defaults.accounts.default_budget_limit);
        assert_eq!(config.logging.level, defaults.logging.level);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let config = Config::from_yaml("server:\n  port: 8080\n").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.data.path, PathBuf::from("data.json"));
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let config = Config::from_yaml("   \n").unwrap();
        assert_eq!(config.server.port, 5000);
    }

    #[test]
    fn test_invalid_yaml() {
        let err = Config::from_yaml("server: [unclosed").unwrap_err();
        assert_eq!(err.code(), ConfigErrorCode::InvalidYaml);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "server.port"
        ));

        let mut config = Config::default();
        config.accounts.default_budget_limit = -1.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.data.path = PathBuf::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "data:\n  path: ledger/data.json\nlogging:\n  level: debug").unwrap();

        let config = Config::load(file.path().to_path_buf()).unwrap();
        assert_eq!(config.data.path, PathBuf::from("ledger/data.json"));
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(dir.path().join("nope.yaml")).unwrap_err();
        assert_eq!(err.code(), ConfigErrorCode::FileNotFound);
    }

    #[test]
    fn test_load_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(dir.path().to_path_buf()).unwrap_err();
        assert_eq!(err.code(), ConfigErrorCode::IoError);
        assert!(matches!(err, ConfigError::IoError { ref message, .. } if !message.is_empty()));
    }
}
