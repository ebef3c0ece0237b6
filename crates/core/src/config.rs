// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persistence configuration
//!
//! ```toml
//! name = "orders"
//! restore_on_start = true
//! persist_interval = "30s"
//!
//! [store]
//! kind = "file"
//! path = "/var/lib/ck/orders"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("execution context name must not be empty")]
    EmptyName,
    #[error("persist_interval must be greater than zero")]
    ZeroInterval,
}

/// Where checkpoints are written
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StoreConfig {
    /// No store; persist and restore fail with a configuration error
    #[default]
    None,
    /// Process-local store, lost on exit
    Memory,
    /// Directory-backed store
    File { path: PathBuf },
}

/// Persistence settings for one execution context
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Execution context name; also the state image's logical store name
    pub name: String,
    #[serde(default)]
    pub store: StoreConfig,
    /// Restore the latest checkpoint when the context starts
    #[serde(default = "default_restore_on_start")]
    pub restore_on_start: bool,
    /// Persist periodically; `None` leaves checkpoints to explicit calls
    #[serde(default, with = "humantime_serde")]
    pub persist_interval: Option<Duration>,
}

fn default_restore_on_start() -> bool {
    true
}

impl PersistenceConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            store: StoreConfig::None,
            restore_on_start: default_restore_on_start(),
            persist_interval: None,
        }
    }

    pub fn with_store(mut self, store: StoreConfig) -> Self {
        self.store = store;
        self
    }

    pub fn with_persist_interval(mut self, interval: Duration) -> Self {
        self.persist_interval = Some(interval);
        self
    }

    pub fn with_restore_on_start(mut self, restore: bool) -> Self {
        self.restore_on_start = restore;
        self
    }

    /// Load and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate TOML content
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::EmptyName);
        }
        if self.persist_interval == Some(Duration::ZERO) {
            return Err(ConfigError::ZeroInterval);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
