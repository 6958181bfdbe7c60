// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;
use std::fmt;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ExitCode {
    Success = 0,
    Usage = 2,
    Validation = 3,
    DependencyFailure = 4,
    Internal = 10,
}

impl ExitCode {
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Usage => "usage",
            Self::Validation => "validation",
            Self::DependencyFailure => "dependency_failure",
            Self::Internal => "internal",
        }
    }
}

/// Stable machine-readable error codes shared by the API mapping and the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[non_exhaustive]
pub enum ErrorCode {
    ValidationFailed,
    RoleNotFound,
    NotFound,
    NameMismatch,
    DuplicateRole,
    RoleInUse,
    UnknownReference,
    PrimaryNotAllowed,
    StorageFailure,
    UsageError,
    Internal,
}

pub const ERROR_CODES: &[ErrorCode] = &[
    ErrorCode::ValidationFailed,
    ErrorCode::RoleNotFound,
    ErrorCode::NotFound,
    ErrorCode::NameMismatch,
    ErrorCode::DuplicateRole,
    ErrorCode::RoleInUse,
    ErrorCode::UnknownReference,
    ErrorCode::PrimaryNotAllowed,
    ErrorCode::StorageFailure,
    ErrorCode::UsageError,
    ErrorCode::Internal,
];

impl ErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ValidationFailed => "ValidationFailed",
            Self::RoleNotFound => "RoleNotFound",
            Self::NotFound => "NotFound",
            Self::NameMismatch => "NameMismatch",
            Self::DuplicateRole => "DuplicateRole",
            Self::RoleInUse => "RoleInUse",
            Self::UnknownReference => "UnknownReference",
            Self::PrimaryNotAllowed => "PrimaryNotAllowed",
            Self::StorageFailure => "StorageFailure",
            Self::UsageError => "UsageError",
            Self::Internal => "Internal",
        }
    }

    #[must_use]
    pub const fn exit_code(self) -> ExitCode {
        match self {
            Self::ValidationFailed
            | Self::NameMismatch
            | Self::DuplicateRole
            | Self::RoleInUse
            | Self::UnknownReference
            | Self::PrimaryNotAllowed
            | Self::RoleNotFound
            | Self::NotFound => ExitCode::Validation,
            Self::UsageError => ExitCode::Usage,
            Self::StorageFailure => ExitCode::DependencyFailure,
            Self::Internal => ExitCode::Internal,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigPathScope {
    User,
    Workspace,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MachineError {
    pub code: String,
    pub message: String,
    #[serde(default)]
    pub details: BTreeMap<String, String>,
}

impl MachineError {
    #[must_use]
    pub fn new(code: ErrorCode, message: &str) -> Self {
        Self {
            code: code.as_str().to_string(),
            message: message.to_string(),
            details: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_detail(mut self, key: &str, value: &str) -> Self {
        self.details.insert(key.to_string(), value.to_string());
        self
    }
}

impl fmt::Display for MachineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for MachineError {}
