//! TOML configuration for the watchfeed query service.
//!
//! ```toml
//! [query]
//! caller = "WatchedItemQueryService"
//! mysql_timestamp_hint = true
//! ```


use serde::{Deserialize, Serialize};
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error as ThisError;

/// Executor label used when `[query] caller` is not set.
pub const DEFAULT_CALLER: &str = "WatchedItemQueryService";

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to read config file '{}': {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config value '{key}': {reason}")]
    Invalid { key: &'static str, reason: String },
}

///
/// ServiceConfig
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    pub query: QueryConfig,
}

impl ServiceConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;

        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.query.caller.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "query.caller",
                reason: "must not be empty".to_string(),
            });
        }

        Ok(())
    }
}

///
/// QueryConfig
///
/// Settings that shape every compiled select.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct QueryConfig {
    /// Label passed to the executor with each select.
    pub caller: String,

    /// Add the legacy `rc_timestamp > ''` condition on MySQL when the
    /// change-feed window is unbounded.
    pub mysql_timestamp_hint: bool,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            caller: DEFAULT_CALLER.to_string(),
            mysql_timestamp_hint: true,
        }
    }
}
