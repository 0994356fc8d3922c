//! # Configuration
//!
//! TOML configuration for the admin stores and the in-process registry.
//! Every section and key has a default, so an empty file (or no file) is a
//! valid configuration.
//!
//! ```toml
//! [stores]
//! page_size = 10
//! candidate_page_size = 10
//! search_debounce_ms = 350
//!
//! [remote]
//! channel_buffer = 32
//! username = "admin"
//! password = "admin"
//!
//! [logging]
//! level = "info"
//! ```

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::remote::Credentials;

/// Environment variable naming the config file the demo binary loads.
pub const CONFIG_ENV: &str = "PET_ADMIN_CONFIG";

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub stores: StoreConfig,
    pub remote: RemoteConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Rows per page on the list screens.
    pub page_size: u32,
    /// Rows per page in the link candidate search.
    pub candidate_page_size: u32,
    pub search_debounce_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            candidate_page_size: 10,
            search_debounce_ms: 350,
        }
    }
}

impl StoreConfig {
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub channel_buffer: usize,
    pub username: String,
    pub password: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            channel_buffer: 32,
            username: "admin".to_string(),
            password: "admin".to_string(),
        }
    }
}

impl RemoteConfig {
    pub fn credentials(&self) -> Credentials {
        Credentials {
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is not set.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AdminConfig {
    /// Loads and validates a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Loads the file named by [`CONFIG_ENV`], or the defaults when it is unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::load(PathBuf::from(path)),
            None => Ok(Self::default()),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: AdminConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stores.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "stores.page_size",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.stores.candidate_page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "stores.candidate_page_size",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.remote.channel_buffer == 0 {
            return Err(ConfigError::InvalidValue {
                field: "remote.channel_buffer",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.remote.username.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "remote.username",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}
