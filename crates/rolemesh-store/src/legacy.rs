// SPDX-License-Identifier: Apache-2.0

use rolemesh_model::{ClusterId, NewNode, NodeId, NodeRecord, ReleaseId};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::{storage, StoreError};
use crate::release::{decode_json, encode_json};

/// Reads and writes the per-node `roles`, `pending_roles` and
/// `primary_roles` JSON columns. Nothing else in the crate writes them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyRoleAdapter;

const NODE_SELECT: &str = "n.id, n.hostname, n.cluster_id, n.roles, n.pending_roles, n.primary_roles";

type NodeColumns = (i64, String, Option<i64>, String, String, String);

fn node_from_row(row: &Row<'_>) -> rusqlite::Result<NodeColumns> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn decode_node(raw: NodeColumns) -> Result<NodeRecord, StoreError> {
    let (id, hostname, cluster_id, roles, pending, primary) = raw;
    Ok(NodeRecord {
        id: NodeId(id),
        hostname,
        cluster_id: cluster_id.map(ClusterId),
        roles: decode_json("nodes.roles", &roles)?,
        pending_roles: decode_json("nodes.pending_roles", &pending)?,
        primary_roles: decode_json("nodes.primary_roles", &primary)?,
    })
}

impl LegacyRoleAdapter {
    pub fn insert(
        self,
        conn: &Connection,
        cluster_id: Option<ClusterId>,
        node: &NewNode,
    ) -> Result<NodeRecord, StoreError> {
        conn.execute(
            "INSERT INTO nodes (hostname, cluster_id, roles, pending_roles, primary_roles)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                node.hostname,
                cluster_id.map(ClusterId::get),
                encode_json(&node.roles)?,
                encode_json(&node.pending_roles)?,
                encode_json(&node.primary_roles)?
            ],
        )
        .map_err(storage)?;
        let id = NodeId(conn.last_insert_rowid());
        self.read(conn, id)
    }

    pub fn read(self, conn: &Connection, id: NodeId) -> Result<NodeRecord, StoreError> {
        let raw = conn
            .query_row(
                &format!("SELECT {NODE_SELECT} FROM nodes n WHERE n.id = ?1"),
                params![id.get()],
                node_from_row,
            )
            .optional()
            .map_err(storage)?
            .ok_or(StoreError::UnknownNode(id))?;
        decode_node(raw)
    }

    /// Replaces the legacy role fields of a node.
    pub fn write_roles(
        self,
        conn: &Connection,
        id: NodeId,
        roles: &[String],
        pending_roles: &[String],
        primary_roles: &[String],
    ) -> Result<NodeRecord, StoreError> {
        let changed = conn
            .execute(
                "UPDATE nodes SET roles = ?1, pending_roles = ?2, primary_roles = ?3 WHERE id = ?4",
                params![
                    encode_json(&roles)?,
                    encode_json(&pending_roles)?,
                    encode_json(&primary_roles)?,
                    id.get()
                ],
            )
            .map_err(storage)?;
        if changed == 0 {
            return Err(StoreError::UnknownNode(id));
        }
        self.read(conn, id)
    }

    /// Nodes in any cluster of the release, ordered by id.
    pub fn nodes_for_release(
        self,
        conn: &Connection,
        release_id: ReleaseId,
    ) -> Result<Vec<NodeRecord>, StoreError> {
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {NODE_SELECT} FROM nodes n JOIN clusters c ON c.id = n.cluster_id
                 WHERE c.release_id = ?1 ORDER BY n.id"
            ))
            .map_err(storage)?;
        let rows = stmt
            .query_map(params![release_id.get()], node_from_row)
            .map_err(storage)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(storage)?;
        rows.into_iter().map(decode_node).collect()
    }
}
