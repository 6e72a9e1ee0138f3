//! Configuration loading.
//!
//! ```toml
//! [database]
//! path = "/var/lib/payments/payments.db"   # omit for an in-memory database
//! busy_timeout_ms = 5000
//!
//! [log]
//! filter = "info,payments_store=debug"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use payments_store::SqliteOptions;
use serde::Deserialize;
use thiserror::Error;

/// Environment variable that overrides `database.path`.
pub const DB_ADDR_ENV: &str = "DB_ADDR";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Service configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Logging configuration.
    pub log: LogConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file. `None` keeps everything in memory.
    pub path: Option<PathBuf>,
    /// Lock wait before a statement fails with `SQLITE_BUSY`.
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: None,
            busy_timeout_ms: 5_000,
        }
    }
}

impl DatabaseConfig {
    /// Connection options for the store.
    pub fn sqlite_options(&self) -> SqliteOptions {
        SqliteOptions {
            busy_timeout: Duration::from_millis(self.busy_timeout_ms),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default `tracing` filter directive, used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, then apply environment overrides.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::parse(&content)?;
        Ok(config.with_env_overrides(std::env::var(DB_ADDR_ENV).ok()))
    }

    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Configuration from defaults and the environment alone.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides(std::env::var(DB_ADDR_ENV).ok())
    }

    /// Apply the `DB_ADDR` override, if set and non-empty.
    pub fn with_env_overrides(mut self, db_addr: Option<String>) -> Self {
        if let Some(addr) = db_addr.filter(|a| !a.is_empty()) {
            self.database.path = Some(PathBuf::from(addr));
        }
        self
    }
}
