// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

mod context;
mod errors;
mod validate;
mod validated;

pub use context::ReleaseContext;
pub use errors::{FieldError, ValidationErrorKind, ValidationErrors};
pub use validate::{validate_role, REQUIRED_FIELDS, VOLUMES_FIELD};
pub use validated::ValidatedRole;

pub const CRATE_NAME: &str = "rolemesh-policies";
