//! Server configuration loaded from TOML.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse the configuration file as valid TOML.
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    /// `host` and `port` do not form a socket address.
    #[error("Invalid listen address: {0}")]
    InvalidAddress(String),
}

/// Server settings.
///
/// Every key is optional; missing keys fall back to their defaults, and a
/// missing file yields [`ServerConfig::default`].
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Interface to bind. Defaults to `127.0.0.1`.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on. Defaults to 3000.
    #[serde(default = "default_port")]
    pub port: u16,
    /// SQLite database file. Defaults to `data/ratings.db`.
    #[serde(default = "default_database")]
    pub database: PathBuf,
    /// Delay before the computer replies in AI modes. Defaults to 300 ms.
    #[serde(default = "default_autoplay_delay_ms")]
    pub autoplay_delay_ms: u64,
    /// Log filter used when `RUST_LOG` is unset. Defaults to `info`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_database() -> PathBuf {
    PathBuf::from("data/ratings.db")
}

fn default_autoplay_delay_ms() -> u64 {
    300
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            database: default_database(),
            autoplay_delay_ms: default_autoplay_delay_ms(),
            log_level: default_log_level(),
        }
    }
}

impl ServerConfig {
    /// Loads the configuration from `path`, or defaults if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ReadError`] if the file exists but cannot be read,
    /// or [`ConfigError::ParseError`] if the file contains invalid TOML.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    /// Default configuration file name, relative to the working directory.
    pub fn default_path() -> PathBuf {
        PathBuf::from("server.toml")
    }

    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse().map_err(|_| ConfigError::InvalidAddress(addr))
    }

    pub fn autoplay_delay(&self) -> Duration {
        Duration::from_millis(self.autoplay_delay_ms)
    }
}
