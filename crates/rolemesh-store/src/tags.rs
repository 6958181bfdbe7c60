// SPDX-License-Identifier: Apache-2.0

use rolemesh_core::canonical;
use rolemesh_model::{
    ClusterId, NodeId, NodeTagAssignment, NodeTagView, OwnerType, ReleaseId, Tag, TagId,
};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::backfill::{backfill_release, BackfillReport};
use crate::error::{storage, StoreError};
use crate::legacy::LegacyRoleAdapter;
use crate::release::load_cluster;
use crate::schema::{has_tagging, releases_with_roles};

/// Result of an `assign` call. Assignments are only ever upgraded from
/// non-primary to primary, never downgraded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum AssignOutcome {
    Created,
    Upgraded,
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SnapshotTag {
    pub owner_type: OwnerType,
    pub owner_id: i64,
    pub tag: String,
    pub has_primary: bool,
    pub read_only: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SnapshotAssignment {
    pub node_id: NodeId,
    pub owner_type: OwnerType,
    pub owner_id: i64,
    pub tag: String,
    pub is_primary: bool,
}

/// Id-independent view of every tag and binding, sorted, for comparing
/// index state across runs.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TagSnapshot {
    pub tags: Vec<SnapshotTag>,
    pub assignments: Vec<SnapshotAssignment>,
}

impl TagSnapshot {
    pub fn digest(&self) -> Result<String, StoreError> {
        canonical::stable_json_hash_hex(self).map_err(storage)
    }
}

const TAG_SELECT: &str = "t.id, t.tag, t.owner_type, t.owner_id, t.has_primary, t.read_only";

type TagColumns = (i64, String, String, i64, bool, bool);

fn tag_from_row(row: &Row<'_>) -> rusqlite::Result<TagColumns> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn decode_tag(raw: TagColumns) -> Result<Tag, StoreError> {
    let (id, tag, owner_type, owner_id, has_primary, read_only) = raw;
    Ok(Tag {
        id: TagId(id),
        tag,
        owner_type: OwnerType::parse(&owner_type).map_err(storage)?,
        owner_id,
        has_primary,
        read_only,
    })
}

pub(crate) fn require_tagging(conn: &Connection) -> Result<(), StoreError> {
    if has_tagging(conn)? {
        Ok(())
    } else {
        Err(StoreError::Config(
            "node tagging requires schema revision 2; run the migration first".to_string(),
        ))
    }
}

pub(crate) fn find_tag_in(
    conn: &Connection,
    owner_type: OwnerType,
    owner_id: i64,
    tag: &str,
) -> Result<Option<Tag>, StoreError> {
    let raw = conn
        .query_row(
            &format!(
                "SELECT {TAG_SELECT} FROM tags t
                 WHERE t.owner_type = ?1 AND t.owner_id = ?2 AND t.tag = ?3"
            ),
            params![owner_type.as_str(), owner_id, tag],
            tag_from_row,
        )
        .optional()
        .map_err(storage)?;
    raw.map(decode_tag).transpose()
}

pub(crate) fn get_tag_in(conn: &Connection, id: TagId) -> Result<Tag, StoreError> {
    let raw = conn
        .query_row(
            &format!("SELECT {TAG_SELECT} FROM tags t WHERE t.id = ?1"),
            params![id.get()],
            tag_from_row,
        )
        .optional()
        .map_err(storage)?
        .ok_or(StoreError::UnknownTag(id))?;
    decode_tag(raw)
}

/// Returns the tag for `(owner_type, owner_id, tag)`, inserting it when
/// absent. An existing tag is returned unchanged. The flag tells whether a
/// row was created.
pub(crate) fn ensure_tag_in(
    conn: &Connection,
    owner_type: OwnerType,
    owner_id: i64,
    tag: &str,
    has_primary: bool,
    read_only: bool,
) -> Result<(Tag, bool), StoreError> {
    if let Some(existing) = find_tag_in(conn, owner_type, owner_id, tag)? {
        return Ok((existing, false));
    }
    conn.execute(
        "INSERT INTO tags (tag, owner_id, owner_type, has_primary, read_only)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![tag, owner_id, owner_type.as_str(), has_primary, read_only],
    )
    .map_err(storage)?;
    let created = get_tag_in(conn, TagId(conn.last_insert_rowid()))?;
    Ok((created, true))
}

/// Inserts or upgrades a binding without ownership checks.
pub(crate) fn bind_in(
    conn: &Connection,
    node_id: NodeId,
    tag_id: TagId,
    is_primary: bool,
) -> Result<AssignOutcome, StoreError> {
    let current: Option<bool> = conn
        .query_row(
            "SELECT is_primary FROM node_tags WHERE node_id = ?1 AND tag_id = ?2",
            params![node_id.get(), tag_id.get()],
            |row| row.get(0),
        )
        .optional()
        .map_err(storage)?;
    match current {
        None => {
            conn.execute(
                "INSERT INTO node_tags (node_id, tag_id, is_primary) VALUES (?1, ?2, ?3)",
                params![node_id.get(), tag_id.get(), is_primary],
            )
            .map_err(storage)?;
            Ok(AssignOutcome::Created)
        }
        Some(false) if is_primary => {
            conn.execute(
                "UPDATE node_tags SET is_primary = 1 WHERE node_id = ?1 AND tag_id = ?2",
                params![node_id.get(), tag_id.get()],
            )
            .map_err(storage)?;
            Ok(AssignOutcome::Upgraded)
        }
        Some(_) => Ok(AssignOutcome::Unchanged),
    }
}

fn ensure_owner_exists(
    conn: &Connection,
    owner_type: OwnerType,
    owner_id: i64,
) -> Result<(), StoreError> {
    match owner_type {
        OwnerType::Release => {
            let found: Option<i64> = conn
                .query_row(
                    "SELECT id FROM releases WHERE id = ?1",
                    params![owner_id],
                    |row| row.get(0),
                )
                .optional()
                .map_err(storage)?;
            found
                .map(|_| ())
                .ok_or(StoreError::UnknownRelease(ReleaseId(owner_id)))
        }
        OwnerType::Cluster => load_cluster(conn, ClusterId(owner_id)).map(|_| ()),
        _ => Ok(()),
    }
}

/// Node/tag bindings with primary-flag semantics.
pub struct TagIndex<'s> {
    conn: &'s mut Connection,
}

impl<'s> TagIndex<'s> {
    pub(crate) fn new(conn: &'s mut Connection) -> Self {
        Self { conn }
    }

    pub fn ensure_tag(
        &mut self,
        owner_type: OwnerType,
        owner_id: i64,
        tag: &str,
        has_primary: bool,
        read_only: bool,
    ) -> Result<Tag, StoreError> {
        if tag.trim().is_empty() {
            return Err(StoreError::Config("tag name must not be empty".to_string()));
        }
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(storage)?;
        require_tagging(&tx)?;
        ensure_owner_exists(&tx, owner_type, owner_id)?;
        let (tag, created) = ensure_tag_in(&tx, owner_type, owner_id, tag, has_primary, read_only)?;
        tx.commit().map_err(storage)?;
        if created {
            info!(
                tag_id = tag.id.get(),
                tag = %tag.tag,
                owner_type = %owner_type,
                owner_id,
                "tag created"
            );
        }
        Ok(tag)
    }

    /// Binds a node to a tag. Release-owned tags must belong to the release
    /// of the node's cluster, cluster-owned tags to the node's cluster.
    pub fn assign(
        &mut self,
        node_id: NodeId,
        tag_id: TagId,
        is_primary: bool,
    ) -> Result<AssignOutcome, StoreError> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(storage)?;
        require_tagging(&tx)?;
        let tag = get_tag_in(&tx, tag_id)?;
        let node = LegacyRoleAdapter.read(&tx, node_id)?;
        if is_primary && !tag.has_primary {
            return Err(StoreError::PrimaryNotAllowed {
                tag_id,
                tag: tag.tag,
            });
        }
        let belongs = match tag.owner_type {
            OwnerType::Release => match node.cluster_id {
                Some(cluster_id) => load_cluster(&tx, cluster_id)?.release_id.get() == tag.owner_id,
                None => false,
            },
            OwnerType::Cluster => node.cluster_id.map(ClusterId::get) == Some(tag.owner_id),
            _ => true,
        };
        if !belongs {
            return Err(StoreError::ForeignTag { tag_id, node_id });
        }
        let outcome = bind_in(&tx, node_id, tag_id, is_primary)?;
        tx.commit().map_err(storage)?;
        Ok(outcome)
    }

    /// Removes a binding; returns whether one existed.
    pub fn unassign(&mut self, node_id: NodeId, tag_id: TagId) -> Result<bool, StoreError> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(storage)?;
        require_tagging(&tx)?;
        let removed = tx
            .execute(
                "DELETE FROM node_tags WHERE node_id = ?1 AND tag_id = ?2",
                params![node_id.get(), tag_id.get()],
            )
            .map_err(storage)?;
        tx.commit().map_err(storage)?;
        Ok(removed > 0)
    }

    pub fn assignments_for_node(&self, node_id: NodeId) -> Result<Vec<NodeTagView>, StoreError> {
        require_tagging(self.conn)?;
        LegacyRoleAdapter.read(self.conn, node_id)?;
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT {TAG_SELECT}, nt.is_primary FROM node_tags nt
                 JOIN tags t ON t.id = nt.tag_id
                 WHERE nt.node_id = ?1 ORDER BY t.id"
            ))
            .map_err(storage)?;
        let rows = stmt
            .query_map(params![node_id.get()], |row| {
                Ok((tag_from_row(row)?, row.get::<_, bool>(6)?))
            })
            .map_err(storage)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(storage)?;
        rows.into_iter()
            .map(|(raw, is_primary)| {
                Ok(NodeTagView {
                    tag: decode_tag(raw)?,
                    is_primary,
                })
            })
            .collect()
    }

    /// Bindings to one tag, ordered by node id.
    pub fn assignments_for_tag(&self, tag_id: TagId) -> Result<Vec<NodeTagAssignment>, StoreError> {
        require_tagging(self.conn)?;
        get_tag_in(self.conn, tag_id)?;
        let mut stmt = self
            .conn
            .prepare("SELECT node_id, is_primary FROM node_tags WHERE tag_id = ?1 ORDER BY node_id")
            .map_err(storage)?;
        let rows = stmt
            .query_map(params![tag_id.get()], |row| {
                Ok(NodeTagAssignment {
                    node_id: NodeId(row.get(0)?),
                    tag_id,
                    is_primary: row.get(1)?,
                })
            })
            .map_err(storage)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(storage)?;
        Ok(rows)
    }

    pub fn find_tag(
        &self,
        owner_type: OwnerType,
        owner_id: i64,
        tag: &str,
    ) -> Result<Option<Tag>, StoreError> {
        require_tagging(self.conn)?;
        find_tag_in(self.conn, owner_type, owner_id, tag)
    }

    pub fn tags_for_owner(
        &self,
        owner_type: OwnerType,
        owner_id: i64,
    ) -> Result<Vec<Tag>, StoreError> {
        require_tagging(self.conn)?;
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT {TAG_SELECT} FROM tags t
                 WHERE t.owner_type = ?1 AND t.owner_id = ?2 ORDER BY t.tag"
            ))
            .map_err(storage)?;
        let rows = stmt
            .query_map(params![owner_type.as_str(), owner_id], tag_from_row)
            .map_err(storage)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(storage)?;
        rows.into_iter().map(decode_tag).collect()
    }

    /// Deletes a tag together with every binding to it.
    pub fn delete_tag(&mut self, tag_id: TagId) -> Result<bool, StoreError> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(storage)?;
        require_tagging(&tx)?;
        let removed = tx
            .execute("DELETE FROM tags WHERE id = ?1", params![tag_id.get()])
            .map_err(storage)?;
        tx.commit().map_err(storage)?;
        if removed > 0 {
            info!(tag_id = tag_id.get(), "tag deleted");
        }
        Ok(removed > 0)
    }

    pub fn snapshot(&self) -> Result<TagSnapshot, StoreError> {
        require_tagging(self.conn)?;
        let mut stmt = self
            .conn
            .prepare(
                "SELECT owner_type, owner_id, tag, has_primary, read_only FROM tags
                 ORDER BY owner_type, owner_id, tag",
            )
            .map_err(storage)?;
        let raw_tags = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, bool>(3)?,
                    row.get::<_, bool>(4)?,
                ))
            })
            .map_err(storage)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(storage)?;
        let mut tags = Vec::with_capacity(raw_tags.len());
        for (owner_type, owner_id, tag, has_primary, read_only) in raw_tags {
            tags.push(SnapshotTag {
                owner_type: OwnerType::parse(&owner_type).map_err(storage)?,
                owner_id,
                tag,
                has_primary,
                read_only,
            });
        }

        let mut stmt = self
            .conn
            .prepare(
                "SELECT nt.node_id, t.owner_type, t.owner_id, t.tag, nt.is_primary
                 FROM node_tags nt JOIN tags t ON t.id = nt.tag_id",
            )
            .map_err(storage)?;
        let raw_assignments = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, bool>(4)?,
                ))
            })
            .map_err(storage)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(storage)?;
        let mut assignments = Vec::with_capacity(raw_assignments.len());
        for (node_id, owner_type, owner_id, tag, is_primary) in raw_assignments {
            assignments.push(SnapshotAssignment {
                node_id: NodeId(node_id),
                owner_type: OwnerType::parse(&owner_type).map_err(storage)?,
                owner_id,
                tag,
                is_primary,
            });
        }
        tags.sort();
        assignments.sort();
        Ok(TagSnapshot { tags, assignments })
    }

    /// Derives release tags and node bindings from role metadata and the
    /// legacy node fields, in one transaction.
    pub fn backfill_from_roles(
        &mut self,
        release_id: ReleaseId,
    ) -> Result<BackfillReport, StoreError> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(storage)?;
        require_tagging(&tx)?;
        let report = backfill_release(&tx, release_id)?;
        tx.commit().map_err(storage)?;
        Ok(report)
    }

    /// Backfills every release that has role metadata, in one transaction.
    pub fn backfill_all(&mut self) -> Result<Vec<BackfillReport>, StoreError> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(storage)?;
        require_tagging(&tx)?;
        let mut reports = Vec::new();
        for release_id in releases_with_roles(&tx)? {
            reports.push(backfill_release(&tx, release_id)?);
        }
        tx.commit().map_err(storage)?;
        Ok(reports)
    }
}
