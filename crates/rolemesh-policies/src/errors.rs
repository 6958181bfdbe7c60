// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ValidationErrorKind {
    MissingField,
    InvalidDocument,
    InvalidRoleName,
    EmptyVolumesMapping,
    UnknownVolumeId,
    InvalidAllocateSize,
    UnknownRoleReference,
    ConditionSyntaxError,
    InvalidLimit,
}

impl ValidationErrorKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MissingField => "MissingField",
            Self::InvalidDocument => "InvalidDocument",
            Self::InvalidRoleName => "InvalidRoleName",
            Self::EmptyVolumesMapping => "EmptyVolumesMapping",
            Self::UnknownVolumeId => "UnknownVolumeId",
            Self::InvalidAllocateSize => "InvalidAllocateSize",
            Self::UnknownRoleReference => "UnknownRoleReference",
            Self::ConditionSyntaxError => "ConditionSyntaxError",
            Self::InvalidLimit => "InvalidLimit",
        }
    }
}

impl Display for ValidationErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One rejected field: where it is, what rule it broke, and a message in
/// the wording operators already know.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldError {
    pub path: String,
    pub kind: ValidationErrorKind,
    pub message: String,
}

impl FieldError {
    pub(crate) fn new(path: impl Into<String>, kind: ValidationErrorKind, message: String) -> Self {
        Self {
            path: path.into(),
            kind,
            message,
        }
    }
}

/// Every field error found in the first failing validation category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    #[must_use]
    pub fn has_kind(&self, kind: ValidationErrorKind) -> bool {
        self.0.iter().any(|e| e.kind == kind)
    }

    #[must_use]
    pub fn paths(&self) -> Vec<&str> {
        self.0.iter().map(|e| e.path.as_str()).collect()
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", err.path, err.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}
