// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
//! Maps registry and tag index failures onto stable API error bodies and
//! HTTP statuses. Routing and handlers live outside this crate.

pub mod error_mapping;
mod errors;
pub mod openapi;

pub use error_mapping::{api_error_from_store, map_error, ApiErrorMapping, API_ERROR_SCHEMA_REF};
pub use errors::{ApiError, ApiErrorCode, API_ERROR_CODES};
pub use openapi::{openapi_v1_digest, openapi_v1_spec};

pub const CRATE_NAME: &str = "rolemesh-api";

/// Body and status for a store failure in one call.
#[must_use]
pub fn respond_to_store_error(error: &rolemesh_store::StoreError) -> (u16, ApiError) {
    let body = api_error_from_store(error);
    (map_error(&body).status_code, body)
}
