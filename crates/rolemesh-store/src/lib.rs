// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
//! SQLite persistence for releases, roles and node tags.
//!
//! Every mutation runs in its own `BEGIN IMMEDIATE` transaction, so
//! existence checks, guard checks and writes observe one snapshot.

mod backfill;
mod config;
mod error;
mod guard;
mod legacy;
mod registry;
mod release;
mod schema;
mod store;
mod tags;

pub use backfill::{BackfillReport, SkippedReference};
pub use config::{
    JournalMode, RolemeshConfig, StoreConfig, ENV_ROLEMESH_BUSY_TIMEOUT_MS, MAX_BUSY_TIMEOUT_MS,
};
pub use error::{StoreError, StoreErrorCode};
pub use guard::{AssignmentGuard, AssignmentSource, LegacyFields, TagBindings};
pub use registry::RoleRegistry;
pub use schema::{MigrationReport, SCHEMA_VERSION, TAGGING_REVISION};
pub use store::{ReleaseDeletion, RoleStore};
pub use tags::{AssignOutcome, SnapshotAssignment, SnapshotTag, TagIndex, TagSnapshot};

pub const CRATE_NAME: &str = "rolemesh-store";
