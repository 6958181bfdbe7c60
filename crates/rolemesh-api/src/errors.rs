// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ApiErrorCode {
    ValidationFailed,
    RoleNotFound,
    NotFound,
    NameMismatch,
    DuplicateRole,
    RoleInUse,
    PrimaryNotAllowed,
    ForeignTag,
    InvalidRequest,
    StorageFailure,
    Internal,
}

pub const API_ERROR_CODES: &[ApiErrorCode] = &[
    ApiErrorCode::ValidationFailed,
    ApiErrorCode::RoleNotFound,
    ApiErrorCode::NotFound,
    ApiErrorCode::NameMismatch,
    ApiErrorCode::DuplicateRole,
    ApiErrorCode::RoleInUse,
    ApiErrorCode::PrimaryNotAllowed,
    ApiErrorCode::ForeignTag,
    ApiErrorCode::InvalidRequest,
    ApiErrorCode::StorageFailure,
    ApiErrorCode::Internal,
];

impl ApiErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ValidationFailed => "ValidationFailed",
            Self::RoleNotFound => "RoleNotFound",
            Self::NotFound => "NotFound",
            Self::NameMismatch => "NameMismatch",
            Self::DuplicateRole => "DuplicateRole",
            Self::RoleInUse => "RoleInUse",
            Self::PrimaryNotAllowed => "PrimaryNotAllowed",
            Self::ForeignTag => "ForeignTag",
            Self::InvalidRequest => "InvalidRequest",
            Self::StorageFailure => "StorageFailure",
            Self::Internal => "Internal",
        }
    }
}

impl Display for ApiErrorCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error body returned to API clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
    pub details: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl ApiError {
    #[must_use]
    pub fn new(code: ApiErrorCode, message: impl Into<String>, details: Value) -> Self {
        Self {
            code,
            message: message.into(),
            details,
            request_id: None,
        }
    }

    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    #[must_use]
    pub fn validation_failed(message: impl Into<String>, field_errors: Value) -> Self {
        Self::new(
            ApiErrorCode::ValidationFailed,
            message,
            json!({ "field_errors": field_errors }),
        )
    }

    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ApiErrorCode::Internal, message, json!({}))
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}
