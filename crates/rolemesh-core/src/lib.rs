// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
//! Shared primitives for the rolemesh workspace: machine-readable error
//! codes, process exit codes, canonical JSON helpers and config path
//! resolution.

pub mod canonical;
mod errors;

use std::path::PathBuf;

pub use errors::{ConfigPathScope, ErrorCode, ExitCode, MachineError, ERROR_CODES};

pub const CRATE_NAME: &str = "rolemesh-core";

pub const ENV_ROLEMESH_LOG_LEVEL: &str = "ROLEMESH_LOG_LEVEL";
pub const ENV_ROLEMESH_LOG_JSON: &str = "ROLEMESH_LOG_JSON";
pub const ENV_ROLEMESH_CONFIG: &str = "ROLEMESH_CONFIG";
pub const ENV_ROLEMESH_DB: &str = "ROLEMESH_DB";

/// Resolves the config file location for `scope`.
///
/// `ROLEMESH_CONFIG` wins for the user scope when set to a non-empty value,
/// then the XDG and `HOME` conventions, then a workspace-relative fallback.
#[must_use]
pub fn resolve_rolemesh_config_path(scope: ConfigPathScope) -> PathBuf {
    match scope {
        ConfigPathScope::User => {
            if let Some(explicit) = non_empty_env(ENV_ROLEMESH_CONFIG) {
                return PathBuf::from(explicit);
            }
            if let Some(xdg_config_home) = non_empty_env("XDG_CONFIG_HOME") {
                return PathBuf::from(xdg_config_home)
                    .join("rolemesh")
                    .join("config.toml");
            }
            if let Some(home) = non_empty_env("HOME") {
                return PathBuf::from(home)
                    .join(".config")
                    .join("rolemesh")
                    .join("config.toml");
            }
            workspace_config_path()
        }
        ConfigPathScope::Workspace => workspace_config_path(),
    }
}

fn workspace_config_path() -> PathBuf {
    PathBuf::from(".rolemesh").join("config.toml")
}

fn non_empty_env(name: &str) -> Option<String> {
    let value = std::env::var(name).ok()?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
