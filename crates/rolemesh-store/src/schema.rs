// SPDX-License-Identifier: Apache-2.0

use rusqlite::{Connection, OptionalExtension, TransactionBehavior};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::backfill::{backfill_release, BackfillReport};
use crate::error::{storage, StoreError};
use rolemesh_model::ReleaseId;

/// Latest schema revision. Revision 1 holds releases, clusters and nodes;
/// revision 2 adds node tagging.
pub const SCHEMA_VERSION: i64 = 2;
pub const TAGGING_REVISION: i64 = 2;

const REVISION_1: &str = "
CREATE TABLE releases (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  name TEXT NOT NULL,
  roles_metadata TEXT,
  volumes_metadata TEXT NOT NULL DEFAULT '{}'
);
CREATE TABLE clusters (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  name TEXT NOT NULL,
  release_id INTEGER NOT NULL REFERENCES releases(id) ON DELETE CASCADE,
  mode TEXT NOT NULL DEFAULT 'multinode',
  status TEXT NOT NULL DEFAULT 'new'
);
CREATE TABLE nodes (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  hostname TEXT NOT NULL,
  cluster_id INTEGER REFERENCES clusters(id) ON DELETE SET NULL,
  roles TEXT NOT NULL DEFAULT '[]',
  pending_roles TEXT NOT NULL DEFAULT '[]',
  primary_roles TEXT NOT NULL DEFAULT '[]'
);
CREATE INDEX clusters_release_idx ON clusters(release_id);
CREATE INDEX nodes_cluster_idx ON nodes(cluster_id);
";

const REVISION_2: &str = "
CREATE TABLE tags (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  tag TEXT NOT NULL,
  owner_id INTEGER NOT NULL,
  owner_type TEXT NOT NULL CHECK (owner_type IN ('release', 'cluster', 'plugin')),
  has_primary INTEGER NOT NULL DEFAULT 0,
  read_only INTEGER NOT NULL DEFAULT 0,
  UNIQUE (owner_type, owner_id, tag)
);
CREATE TABLE node_tags (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  node_id INTEGER NOT NULL REFERENCES nodes(id) ON DELETE CASCADE,
  tag_id INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
  is_primary INTEGER NOT NULL DEFAULT 0,
  UNIQUE (node_id, tag_id)
);
CREATE INDEX node_tags_tag_idx ON node_tags(tag_id);
ALTER TABLE releases ADD COLUMN tags_metadata TEXT;
";

const DOWNGRADE_2: &str = "
DROP TABLE node_tags;
DROP TABLE tags;
ALTER TABLE releases DROP COLUMN tags_metadata;
";

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MigrationReport {
    pub from_version: i64,
    pub to_version: i64,
    pub backfills: Vec<BackfillReport>,
}

pub fn schema_version(conn: &Connection) -> Result<i64, StoreError> {
    conn.query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(storage)
}

pub(crate) fn has_tagging(conn: &Connection) -> Result<bool, StoreError> {
    Ok(schema_version(conn)? >= TAGGING_REVISION)
}

/// Applies every revision between the current one and `target` in a single
/// transaction. Revision 2 backfills tags for each release with role
/// metadata; re-running it on an up-to-date store changes nothing.
pub fn migrate_to(conn: &mut Connection, target: i64) -> Result<MigrationReport, StoreError> {
    if !(0..=SCHEMA_VERSION).contains(&target) {
        return Err(StoreError::Config(format!(
            "schema revision must be within 0..={SCHEMA_VERSION}, got {target}"
        )));
    }
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(storage)?;
    let from_version = schema_version(&tx)?;
    let mut report = MigrationReport {
        from_version,
        to_version: from_version.max(target),
        backfills: Vec::new(),
    };

    if from_version < 1 && target >= 1 {
        tx.execute_batch(REVISION_1).map_err(storage)?;
        info!(revision = 1, "schema revision applied");
    }
    if from_version < 2 && target >= 2 {
        tx.execute_batch(REVISION_2).map_err(storage)?;
        for release_id in releases_with_roles(&tx)? {
            report.backfills.push(backfill_release(&tx, release_id)?);
        }
        info!(
            revision = 2,
            releases = report.backfills.len(),
            "schema revision applied"
        );
    }
    tx.execute_batch(&format!("PRAGMA user_version={};", report.to_version))
        .map_err(storage)?;
    tx.commit().map_err(storage)?;
    Ok(report)
}

/// Reverts the node tagging revision. Only revision 1 is a supported target.
pub fn downgrade_to(conn: &mut Connection, target: i64) -> Result<i64, StoreError> {
    if target != 1 {
        return Err(StoreError::Config(format!(
            "downgrade target must be revision 1, got {target}"
        )));
    }
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(storage)?;
    let from_version = schema_version(&tx)?;
    if from_version < 1 {
        return Err(StoreError::Config(
            "store has no schema to downgrade".to_string(),
        ));
    }
    if from_version >= 2 {
        tx.execute_batch(DOWNGRADE_2).map_err(storage)?;
        info!(revision = 2, "schema revision reverted");
    }
    tx.execute_batch("PRAGMA user_version=1;").map_err(storage)?;
    tx.commit().map_err(storage)?;
    Ok(from_version)
}

pub(crate) fn releases_with_roles(conn: &Connection) -> Result<Vec<ReleaseId>, StoreError> {
    let mut stmt = conn
        .prepare("SELECT id FROM releases WHERE roles_metadata IS NOT NULL ORDER BY id")
        .map_err(storage)?;
    let rows = stmt
        .query_map([], |row| row.get::<_, i64>(0))
        .map_err(storage)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(storage)?;
    Ok(rows.into_iter().map(ReleaseId).collect())
}

pub(crate) fn table_exists(conn: &Connection, name: &str) -> Result<bool, StoreError> {
    let found: Option<String> = conn
        .query_row(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [name],
            |row| row.get(0),
        )
        .optional()
        .map_err(storage)?;
    Ok(found.is_some())
}
