//! Service configuration: an optional TOML file, then environment overrides.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_PATH_ENV: &str = "SCHOOL_SCHEDULE_CONFIG";
pub const HTTP_ADDR_ENV: &str = "SCHOOL_SCHEDULE_HTTP_ADDR";
pub const DATABASE_ENV: &str = "SCHOOL_SCHEDULE_DB";
pub const LOG_FILTER_ENV: &str = "SCHOOL_SCHEDULE_LOG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid listen address '{0}'")]
    InvalidAddr(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Address the HTTP API binds to.
    pub http_addr: String,
    /// SQLite database file. The in-memory store is used when unset.
    pub database_path: Option<PathBuf>,
    /// `tracing_subscriber::EnvFilter` directive; `RUST_LOG` wins when set.
    pub log_filter: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            http_addr: "0.0.0.0:3000".to_string(),
            database_path: None,
            log_filter: "info".to_string(),
        }
    }
}

impl ServiceConfig {
    pub fn from_toml_str(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents, path)
    }

    /// Reads the file named by `SCHOOL_SCHEDULE_CONFIG` (if any) and applies
    /// the remaining environment variables on top.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup(CONFIG_PATH_ENV) {
            Some(path) if !path.trim().is_empty() => Self::load_file(Path::new(path.trim()))?,
            _ => Self::default(),
        };
        if let Some(addr) = lookup(HTTP_ADDR_ENV) {
            config.http_addr = addr;
        }
        if let Some(db) = lookup(DATABASE_ENV) {
            config.database_path = if db.trim().is_empty() {
                None
            } else {
                Some(PathBuf::from(db))
            };
        }
        if let Some(filter) = lookup(LOG_FILTER_ENV) {
            config.log_filter = filter;
        }
        Ok(config)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.http_addr
            .parse()
            .map_err(|_| ConfigError::InvalidAddr(self.http_addr.clone()))
    }
}

/// Installs the global tracing subscriber, writing to stderr. `RUST_LOG`
/// takes precedence over the configured filter.
pub fn init_tracing(config: &ServiceConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
