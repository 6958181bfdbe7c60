// SPDX-License-Identifier: Apache-2.0

use rolemesh_model::{
    ClusterId, ClusterRecord, NewNode, NewRelease, NodeId, NodeRecord, ReleaseId, ReleaseRecord,
    VolumeSpec, VolumesMetadata,
};
use rolemesh_policies::ReleaseContext;
use rusqlite::{params, Connection, TransactionBehavior};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::StoreConfig;
use crate::error::{storage, StoreError};
use crate::guard::AssignmentGuard;
use crate::legacy::LegacyRoleAdapter;
use crate::registry::RoleRegistry;
use crate::release::{encode_json, load_cluster, load_release};
use crate::schema::{self, has_tagging, table_exists, MigrationReport, SCHEMA_VERSION};
use crate::tags::TagIndex;

/// What `delete_release` removed besides the release row itself.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReleaseDeletion {
    pub release_id: Option<ReleaseId>,
    pub clusters_removed: usize,
    pub nodes_detached: usize,
    pub tags_removed: usize,
}

/// An open rolemesh database.
#[derive(Debug)]
pub struct RoleStore {
    conn: Connection,
    config: StoreConfig,
}

fn apply_pragmas(conn: &Connection, config: &StoreConfig) -> Result<(), StoreError> {
    config.validate()?;
    conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))
        .map_err(storage)?;
    conn.execute_batch(&format!(
        "PRAGMA foreign_keys=ON; PRAGMA journal_mode={};",
        config.journal_mode.as_pragma()
    ))
    .map_err(storage)?;
    Ok(())
}

impl RoleStore {
    /// Opens `path` without touching the schema.
    pub fn open_raw(path: &Path, config: StoreConfig) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(storage)?;
        Self::from_connection(conn, config)
    }

    /// Opens `path` and brings the schema to the latest revision.
    pub fn open(path: &Path, config: StoreConfig) -> Result<Self, StoreError> {
        let mut store = Self::open_raw(path, config)?;
        store.migrate()?;
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(storage)?;
        let mut store = Self::from_connection(conn, StoreConfig::default())?;
        store.migrate()?;
        Ok(store)
    }

    fn from_connection(conn: Connection, config: StoreConfig) -> Result<Self, StoreError> {
        apply_pragmas(&conn, &config)?;
        if schema::schema_version(&conn)? == 0 && table_exists(&conn, "releases")? {
            return Err(StoreError::Config(
                "database has a releases table but no schema revision".to_string(),
            ));
        }
        Ok(Self { conn, config })
    }

    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn schema_version(&self) -> Result<i64, StoreError> {
        schema::schema_version(&self.conn)
    }

    pub fn migrate(&mut self) -> Result<MigrationReport, StoreError> {
        self.migrate_to(SCHEMA_VERSION)
    }

    pub fn migrate_to(&mut self, target: i64) -> Result<MigrationReport, StoreError> {
        schema::migrate_to(&mut self.conn, target)
    }

    /// Returns the revision the store was at before the downgrade.
    pub fn downgrade_to(&mut self, target: i64) -> Result<i64, StoreError> {
        schema::downgrade_to(&mut self.conn, target)
    }

    pub fn registry(&mut self, release_id: ReleaseId) -> RoleRegistry<'_> {
        RoleRegistry::new(&mut self.conn, release_id)
    }

    pub fn tags(&mut self) -> TagIndex<'_> {
        TagIndex::new(&mut self.conn)
    }

    pub fn guard(&self) -> Result<AssignmentGuard<'_>, StoreError> {
        AssignmentGuard::new(&self.conn)
    }

    pub fn create_release(&mut self, release: &NewRelease) -> Result<ReleaseRecord, StoreError> {
        if release.name.trim().is_empty() {
            return Err(StoreError::Config("release name must not be empty".to_string()));
        }
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(storage)?;
        let volumes = VolumesMetadata {
            volumes: release.volume_ids.iter().map(|id| VolumeSpec::new(id)).collect(),
            ..VolumesMetadata::default()
        };
        tx.execute(
            "INSERT INTO releases (name, volumes_metadata) VALUES (?1, ?2)",
            params![release.name, encode_json(&volumes)?],
        )
        .map_err(storage)?;
        let id = ReleaseId(tx.last_insert_rowid());
        if let Some(tags) = &release.tags_metadata {
            if !has_tagging(&tx)? {
                return Err(StoreError::Config(
                    "tags_metadata requires schema revision 2".to_string(),
                ));
            }
            tx.execute(
                "UPDATE releases SET tags_metadata = ?1 WHERE id = ?2",
                params![encode_json(tags)?, id.get()],
            )
            .map_err(storage)?;
        }
        tx.commit().map_err(storage)?;
        info!(release_id = id.get(), name = %release.name, "release created");
        Ok(ReleaseRecord {
            id,
            name: release.name.clone(),
        })
    }

    pub fn create_cluster(
        &mut self,
        release_id: ReleaseId,
        name: &str,
        mode: &str,
    ) -> Result<ClusterRecord, StoreError> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(storage)?;
        load_release(&tx, release_id)?;
        tx.execute(
            "INSERT INTO clusters (name, release_id, mode) VALUES (?1, ?2, ?3)",
            params![name, release_id.get(), mode],
        )
        .map_err(storage)?;
        let cluster = load_cluster(&tx, ClusterId(tx.last_insert_rowid()))?;
        tx.commit().map_err(storage)?;
        info!(cluster_id = cluster.id.get(), release_id = release_id.get(), "cluster created");
        Ok(cluster)
    }

    pub fn get_cluster(&self, id: ClusterId) -> Result<ClusterRecord, StoreError> {
        load_cluster(&self.conn, id)
    }

    pub fn create_node(
        &mut self,
        cluster_id: Option<ClusterId>,
        node: &NewNode,
    ) -> Result<NodeRecord, StoreError> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(storage)?;
        if let Some(cluster_id) = cluster_id {
            load_cluster(&tx, cluster_id)?;
        }
        let record = LegacyRoleAdapter.insert(&tx, cluster_id, node)?;
        tx.commit().map_err(storage)?;
        Ok(record)
    }

    /// Replaces the current, pending and primary role lists of a node.
    pub fn set_node_roles(
        &mut self,
        id: NodeId,
        roles: &[String],
        pending_roles: &[String],
        primary_roles: &[String],
    ) -> Result<NodeRecord, StoreError> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(storage)?;
        let record = LegacyRoleAdapter.write_roles(&tx, id, roles, pending_roles, primary_roles)?;
        tx.commit().map_err(storage)?;
        Ok(record)
    }

    pub fn get_node(&self, id: NodeId) -> Result<NodeRecord, StoreError> {
        LegacyRoleAdapter.read(&self.conn, id)
    }

    /// Deletes a node; its tag bindings go with it.
    pub fn delete_node(&mut self, id: NodeId) -> Result<(), StoreError> {
        let removed = self
            .conn
            .execute("DELETE FROM nodes WHERE id = ?1", params![id.get()])
            .map_err(storage)?;
        if removed == 0 {
            return Err(StoreError::UnknownNode(id));
        }
        info!(node_id = id.get(), "node deleted");
        Ok(())
    }

    /// Deletes a release with its clusters. Tags owned by the release or by
    /// one of its clusters are removed explicitly since the owner reference
    /// is polymorphic; their bindings cascade.
    pub fn delete_release(&mut self, id: ReleaseId) -> Result<ReleaseDeletion, StoreError> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(storage)?;
        load_release(&tx, id)?;
        let mut report = ReleaseDeletion {
            release_id: Some(id),
            ..ReleaseDeletion::default()
        };
        report.nodes_detached = tx
            .query_row(
                "SELECT COUNT(*) FROM nodes n JOIN clusters c ON c.id = n.cluster_id
                 WHERE c.release_id = ?1",
                params![id.get()],
                |row| row.get::<_, i64>(0),
            )
            .map_err(storage)? as usize;
        if has_tagging(&tx)? {
            report.tags_removed += tx
                .execute(
                    "DELETE FROM tags WHERE owner_type = 'cluster'
                     AND owner_id IN (SELECT id FROM clusters WHERE release_id = ?1)",
                    params![id.get()],
                )
                .map_err(storage)?;
            report.tags_removed += tx
                .execute(
                    "DELETE FROM tags WHERE owner_type = 'release' AND owner_id = ?1",
                    params![id.get()],
                )
                .map_err(storage)?;
        }
        report.clusters_removed = tx
            .execute("DELETE FROM clusters WHERE release_id = ?1", params![id.get()])
            .map_err(storage)?;
        tx.execute("DELETE FROM releases WHERE id = ?1", params![id.get()])
            .map_err(storage)?;
        tx.commit().map_err(storage)?;
        info!(
            release_id = id.get(),
            clusters = report.clusters_removed,
            tags = report.tags_removed,
            "release deleted"
        );
        Ok(report)
    }

    /// What role documents of the release are validated against.
    pub fn release_context(&self, id: ReleaseId) -> Result<ReleaseContext, StoreError> {
        Ok(load_release(&self.conn, id)?.context())
    }

    pub fn release(&self, id: ReleaseId) -> Result<ReleaseRecord, StoreError> {
        Ok(load_release(&self.conn, id)?.record())
    }
}
