// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::StoreError;

pub const ENV_ROLEMESH_BUSY_TIMEOUT_MS: &str = "ROLEMESH_BUSY_TIMEOUT_MS";
pub const MAX_BUSY_TIMEOUT_MS: u64 = 600_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum JournalMode {
    #[default]
    Wal,
    Delete,
    Memory,
}

impl JournalMode {
    #[must_use]
    pub const fn as_pragma(self) -> &'static str {
        match self {
            Self::Wal => "WAL",
            Self::Delete => "DELETE",
            Self::Memory => "MEMORY",
        }
    }
}

/// Connection settings applied every time a store is opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    #[serde(default)]
    pub journal_mode: JournalMode,
    #[serde(default = "default_foreign_keys")]
    pub foreign_keys: bool,
}

fn default_busy_timeout_ms() -> u64 {
    5_000
}

fn default_foreign_keys() -> bool {
    true
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            busy_timeout_ms: default_busy_timeout_ms(),
            journal_mode: JournalMode::default(),
            foreign_keys: default_foreign_keys(),
        }
    }
}

impl StoreConfig {
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.busy_timeout_ms == 0 || self.busy_timeout_ms > MAX_BUSY_TIMEOUT_MS {
            return Err(StoreError::Config(format!(
                "busy_timeout_ms must be within 1..={MAX_BUSY_TIMEOUT_MS}"
            )));
        }
        if !self.foreign_keys {
            return Err(StoreError::Config(
                "foreign_keys must stay enabled: tag and node cascades depend on it".to_string(),
            ));
        }
        Ok(())
    }

    /// Applies `ROLEMESH_BUSY_TIMEOUT_MS` when it is set.
    pub fn with_env_overrides(mut self) -> Result<Self, StoreError> {
        if let Ok(raw) = std::env::var(ENV_ROLEMESH_BUSY_TIMEOUT_MS) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                self.busy_timeout_ms = trimmed.parse::<u64>().map_err(|_| {
                    StoreError::Config(format!(
                        "{ENV_ROLEMESH_BUSY_TIMEOUT_MS} must be an integer, got '{trimmed}'"
                    ))
                })?;
            }
        }
        Ok(self)
    }
}

/// The `config.toml` document: a `[store]` table plus the database location.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RolemeshConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,
    #[serde(default)]
    pub store: StoreConfig,
}

impl RolemeshConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, StoreError> {
        let cfg: Self = toml::from_str(raw).map_err(|e| StoreError::Config(e.to_string()))?;
        cfg.store.validate()?;
        Ok(cfg)
    }

    /// Reads `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        match std::fs::read_to_string(path) {
            Ok(raw) => Self::from_toml_str(&raw),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(StoreError::Config(format!(
                "failed to read {}: {e}",
                path.display()
            ))),
        }
    }

    pub fn to_toml_string(&self) -> Result<String, StoreError> {
        toml::to_string(self).map_err(|e| StoreError::Config(e.to_string()))
    }
}
