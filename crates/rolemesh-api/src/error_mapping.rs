// SPDX-License-Identifier: Apache-2.0

use rolemesh_policies::ValidationErrors;
use rolemesh_store::StoreError;
use serde_json::{json, Value};

use crate::{ApiError, ApiErrorCode};

pub const API_ERROR_SCHEMA_REF: &str = "#/components/schemas/ApiError";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiErrorMapping {
    pub status_code: u16,
    pub schema_ref: &'static str,
}

#[must_use]
pub fn map_error(error: &ApiError) -> ApiErrorMapping {
    let status_code = match error.code {
        ApiErrorCode::ValidationFailed
        | ApiErrorCode::NameMismatch
        | ApiErrorCode::RoleInUse
        | ApiErrorCode::PrimaryNotAllowed
        | ApiErrorCode::ForeignTag
        | ApiErrorCode::InvalidRequest => 400,
        ApiErrorCode::RoleNotFound | ApiErrorCode::NotFound => 404,
        ApiErrorCode::DuplicateRole => 409,
        _ => 500,
    };

    ApiErrorMapping {
        status_code,
        schema_ref: API_ERROR_SCHEMA_REF,
    }
}

/// `details.field_errors` entries: one object per rejected field.
#[must_use]
pub fn field_errors(errors: &ValidationErrors) -> Value {
    Value::Array(
        errors
            .errors()
            .iter()
            .map(|e| {
                json!({
                    "path": e.path,
                    "kind": e.kind.as_str(),
                    "message": e.message,
                })
            })
            .collect(),
    )
}

/// Translates a store failure into the body a handler returns.
#[must_use]
pub fn api_error_from_store(error: &StoreError) -> ApiError {
    let message = error.to_string();
    match error {
        StoreError::Validation(errors) => {
            ApiError::validation_failed(message, field_errors(errors))
        }
        StoreError::RoleNotFound { release_id, name } => ApiError::new(
            ApiErrorCode::RoleNotFound,
            message,
            json!({"release_id": release_id.get(), "role": name}),
        ),
        StoreError::NameMismatch { expected, found } => ApiError::new(
            ApiErrorCode::NameMismatch,
            message,
            json!({"expected": expected, "found": found}),
        ),
        StoreError::DuplicateRole { release_id, name } => ApiError::new(
            ApiErrorCode::DuplicateRole,
            message,
            json!({"release_id": release_id.get(), "role": name}),
        ),
        StoreError::RoleInUse { name, node_ids } => ApiError::new(
            ApiErrorCode::RoleInUse,
            message,
            json!({
                "role": name,
                "node_ids": node_ids.iter().map(|id| id.get()).collect::<Vec<_>>(),
            }),
        ),
        StoreError::UnknownRelease(id) => not_found(message, "release", id.get()),
        StoreError::UnknownCluster(id) => not_found(message, "cluster", id.get()),
        StoreError::UnknownNode(id) => not_found(message, "node", id.get()),
        StoreError::UnknownTag(id) => not_found(message, "tag", id.get()),
        StoreError::PrimaryNotAllowed { tag_id, tag } => ApiError::new(
            ApiErrorCode::PrimaryNotAllowed,
            message,
            json!({"tag_id": tag_id.get(), "tag": tag}),
        ),
        StoreError::ForeignTag { tag_id, node_id } => ApiError::new(
            ApiErrorCode::ForeignTag,
            message,
            json!({"tag_id": tag_id.get(), "node_id": node_id.get()}),
        ),
        StoreError::Config(_) => ApiError::new(ApiErrorCode::InvalidRequest, message, json!({})),
        StoreError::Storage(_) => ApiError::new(
            ApiErrorCode::StorageFailure,
            "storage failure",
            json!({"cause": message}),
        ),
        _ => ApiError::internal(message),
    }
}

fn not_found(message: String, kind: &str, id: i64) -> ApiError {
    ApiError::new(
        ApiErrorCode::NotFound,
        message,
        json!({"kind": kind, "id": id}),
    )
}
