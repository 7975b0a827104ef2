//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use crate::ingest::BatchPolicy;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub ingest: IngestConfig,

    #[serde(default)]
    pub query: QueryConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Which point store to open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    #[default]
    Sqlite,
}

impl std::str::FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "sqlite" => Ok(Self::Sqlite),
            other => Err(format!("unknown storage backend: {}", other)),
        }
    }
}

/// Point store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// SQLite database file
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

fn default_db_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|p| p.join("refluxdb").join("points.db"))
        .unwrap_or_else(|| PathBuf::from("./refluxdb_data/points.db"))
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            path: default_db_path(),
        }
    }
}

/// Write path configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IngestConfig {
    #[serde(default)]
    pub batch_policy: BatchPolicy,
}

/// Query configuration
#[derive(Debug, Clone, Deserialize)]
pub struct QueryConfig {
    #[serde(default = "default_database")]
    pub default_database: String,
}

fn default_database() -> String {
    "mydb".to_string()
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_database: default_database(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("refluxdb").join("config.toml")),
            Some(PathBuf::from("/etc/refluxdb/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        // Fall back to environment-only config
        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        // Storage overrides
        if let Ok(backend) = std::env::var("REFLUXDB_STORAGE_BACKEND") {
            match backend.parse() {
                Ok(b) => self.storage.backend = b,
                Err(e) => tracing::warn!("Ignoring REFLUXDB_STORAGE_BACKEND: {}", e),
            }
        }
        if let Ok(path) = std::env::var("REFLUXDB_DB_PATH") {
            self.storage.path = PathBuf::from(path);
        }

        // Ingest overrides
        if let Ok(policy) = std::env::var("REFLUXDB_BATCH_POLICY") {
            match policy.to_ascii_lowercase().as_str() {
                "abort" => self.ingest.batch_policy = BatchPolicy::Abort,
                "skip" => self.ingest.batch_policy = BatchPolicy::Skip,
                other => tracing::warn!("Ignoring REFLUXDB_BATCH_POLICY: {}", other),
            }
        }

        // Query overrides
        if let Ok(database) = std::env::var("REFLUXDB_DEFAULT_DATABASE") {
            self.query.default_database = database;
        }

        // Logging overrides
        if let Ok(level) = std::env::var("REFLUXDB_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("REFLUXDB_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# refluxdb Configuration
#
# Environment variables override these settings:
# - REFLUXDB_STORAGE_BACKEND
# - REFLUXDB_DB_PATH
# - REFLUXDB_BATCH_POLICY
# - REFLUXDB_DEFAULT_DATABASE
# - REFLUXDB_LOG_LEVEL
# - REFLUXDB_LOG_FORMAT

[storage]
# Point store: memory (lost on exit) or sqlite
backend = "sqlite"

# SQLite database file
path = "./refluxdb_data/points.db"

[ingest]
# On a malformed line: abort (stop the batch) or skip (report and continue)
batch_policy = "abort"

[query]
# Database reported by SHOW DATABASES before any CREATE DATABASE
default_database = "mydb"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
