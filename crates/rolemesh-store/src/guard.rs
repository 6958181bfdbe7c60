// SPDX-License-Identifier: Apache-2.0

use rolemesh_model::{NodeId, ReleaseId};
use rusqlite::{params, Connection};
use std::collections::BTreeSet;
use tracing::warn;

use crate::error::{storage, StoreError};
use crate::schema::has_tagging;

/// One representation of "which nodes hold this role". The legacy node
/// fields and the tag index are both read through this seam.
pub trait AssignmentSource {
    fn name(&self) -> &'static str;

    fn nodes_referencing(
        &self,
        conn: &Connection,
        release_id: ReleaseId,
        role: &str,
    ) -> Result<BTreeSet<NodeId>, StoreError>;
}

/// Current and pending roles stored on each node of the release's clusters.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyFields;

impl AssignmentSource for LegacyFields {
    fn name(&self) -> &'static str {
        "legacy_fields"
    }

    fn nodes_referencing(
        &self,
        conn: &Connection,
        release_id: ReleaseId,
        role: &str,
    ) -> Result<BTreeSet<NodeId>, StoreError> {
        let mut stmt = conn
            .prepare(
                "SELECT DISTINCT n.id FROM nodes n JOIN clusters c ON c.id = n.cluster_id
                 WHERE c.release_id = ?1 AND (
                   EXISTS (SELECT 1 FROM json_each(n.roles) WHERE json_each.value = ?2)
                   OR EXISTS (SELECT 1 FROM json_each(n.pending_roles) WHERE json_each.value = ?2)
                 )",
            )
            .map_err(storage)?;
        let ids = stmt
            .query_map(params![release_id.get(), role], |row| row.get::<_, i64>(0))
            .map_err(storage)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(storage)?;
        Ok(ids.into_iter().map(NodeId).collect())
    }
}

/// Bindings to the release-owned tag named after the role.
#[derive(Debug, Clone, Copy, Default)]
pub struct TagBindings;

impl AssignmentSource for TagBindings {
    fn name(&self) -> &'static str {
        "tag_index"
    }

    fn nodes_referencing(
        &self,
        conn: &Connection,
        release_id: ReleaseId,
        role: &str,
    ) -> Result<BTreeSet<NodeId>, StoreError> {
        let mut stmt = conn
            .prepare(
                "SELECT DISTINCT nt.node_id FROM node_tags nt JOIN tags t ON t.id = nt.tag_id
                 WHERE t.owner_type = 'release' AND t.owner_id = ?1 AND t.tag = ?2",
            )
            .map_err(storage)?;
        let ids = stmt
            .query_map(params![release_id.get(), role], |row| row.get::<_, i64>(0))
            .map_err(storage)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(storage)?;
        Ok(ids.into_iter().map(NodeId).collect())
    }
}

/// Refuses role removal while any node holds the role, currently or pending,
/// in either representation.
pub struct AssignmentGuard<'c> {
    conn: &'c Connection,
    sources: Vec<Box<dyn AssignmentSource>>,
}

impl<'c> AssignmentGuard<'c> {
    /// Reads the legacy fields, plus the tag index once the schema has it.
    pub fn new(conn: &'c Connection) -> Result<Self, StoreError> {
        let mut sources: Vec<Box<dyn AssignmentSource>> = vec![Box::new(LegacyFields)];
        if has_tagging(conn)? {
            sources.push(Box::new(TagBindings));
        }
        Ok(Self { conn, sources })
    }

    #[must_use]
    pub fn source_names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    pub fn nodes_using(
        &self,
        release_id: ReleaseId,
        role: &str,
    ) -> Result<BTreeSet<NodeId>, StoreError> {
        let mut nodes = BTreeSet::new();
        for source in &self.sources {
            nodes.extend(source.nodes_referencing(self.conn, release_id, role)?);
        }
        Ok(nodes)
    }

    pub fn can_delete(&self, release_id: ReleaseId, role: &str) -> Result<bool, StoreError> {
        Ok(self.nodes_using(release_id, role)?.is_empty())
    }

    pub fn check_delete(&self, release_id: ReleaseId, role: &str) -> Result<(), StoreError> {
        let nodes = self.nodes_using(release_id, role)?;
        if nodes.is_empty() {
            return Ok(());
        }
        let node_ids: Vec<NodeId> = nodes.into_iter().collect();
        warn!(
            release_id = release_id.get(),
            role,
            nodes = node_ids.len(),
            "role deletion refused: role is assigned"
        );
        Err(StoreError::RoleInUse {
            name: role.to_string(),
            node_ids,
        })
    }
}
