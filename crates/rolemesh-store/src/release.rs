// SPDX-License-Identifier: Apache-2.0

use rolemesh_conditions::Facts;
use rolemesh_model::{ClusterId, ClusterRecord, ReleaseId, ReleaseRecord, VolumesMetadata};
use rolemesh_policies::ReleaseContext;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::{Map, Value};

use crate::error::{storage, StoreError};
use crate::schema::has_tagging;

/// A release row with its JSON columns decoded.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ReleaseRow {
    pub id: ReleaseId,
    pub name: String,
    pub roles_metadata: Option<Map<String, Value>>,
    pub volumes: VolumesMetadata,
    pub tags_metadata: Option<Map<String, Value>>,
}

impl ReleaseRow {
    pub fn has_role(&self, name: &str) -> bool {
        self.roles_metadata
            .as_ref()
            .is_some_and(|roles| roles.contains_key(name))
    }

    pub fn role_names(&self) -> Vec<String> {
        self.roles_metadata
            .as_ref()
            .map(|roles| roles.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn context(&self) -> ReleaseContext {
        let declared: Vec<String> = self
            .tags_metadata
            .as_ref()
            .map(|tags| tags.keys().cloned().collect())
            .unwrap_or_default();
        ReleaseContext::new(self.volumes.volume_ids())
            .with_roles(self.role_names())
            .with_declared_tags(declared)
    }

    pub fn record(&self) -> ReleaseRecord {
        ReleaseRecord {
            id: self.id,
            name: self.name.clone(),
        }
    }
}

pub(crate) fn decode_json<T: serde::de::DeserializeOwned>(
    column: &str,
    raw: &str,
) -> Result<T, StoreError> {
    serde_json::from_str(raw)
        .map_err(|e| StoreError::Storage(format!("invalid JSON in column {column}: {e}")))
}

pub(crate) fn encode_json<T: serde::Serialize>(value: &T) -> Result<String, StoreError> {
    serde_json::to_string(value).map_err(storage)
}

fn decode_object(
    column: &str,
    raw: Option<String>,
) -> Result<Option<Map<String, Value>>, StoreError> {
    match raw {
        None => Ok(None),
        Some(text) => match decode_json::<Value>(column, &text)? {
            Value::Null => Ok(None),
            Value::Object(map) => Ok(Some(map)),
            _ => Err(StoreError::Storage(format!(
                "column {column} must hold a JSON object"
            ))),
        },
    }
}

pub(crate) fn load_release(conn: &Connection, id: ReleaseId) -> Result<ReleaseRow, StoreError> {
    let row: Option<(String, Option<String>, String)> = conn
        .query_row(
            "SELECT name, roles_metadata, volumes_metadata FROM releases WHERE id = ?1",
            params![id.get()],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .optional()
        .map_err(storage)?;
    let Some((name, roles_raw, volumes_raw)) = row else {
        return Err(StoreError::UnknownRelease(id));
    };

    let tags_raw: Option<String> = if has_tagging(conn)? {
        conn.query_row(
            "SELECT tags_metadata FROM releases WHERE id = ?1",
            params![id.get()],
            |row| row.get(0),
        )
        .map_err(storage)?
    } else {
        None
    };

    Ok(ReleaseRow {
        id,
        name,
        roles_metadata: decode_object("roles_metadata", roles_raw)?,
        volumes: decode_json("volumes_metadata", &volumes_raw)?,
        tags_metadata: decode_object("tags_metadata", tags_raw)?,
    })
}

/// Writes back the role-bearing columns of a release.
pub(crate) fn save_release_roles(conn: &Connection, row: &ReleaseRow) -> Result<(), StoreError> {
    let roles = match &row.roles_metadata {
        Some(map) => Some(encode_json(map)?),
        None => None,
    };
    conn.execute(
        "UPDATE releases SET roles_metadata = ?1, volumes_metadata = ?2 WHERE id = ?3",
        params![roles, encode_json(&row.volumes)?, row.id.get()],
    )
    .map_err(storage)?;
    Ok(())
}

pub(crate) fn load_cluster(conn: &Connection, id: ClusterId) -> Result<ClusterRecord, StoreError> {
    conn.query_row(
        "SELECT name, release_id, mode, status FROM clusters WHERE id = ?1",
        params![id.get()],
        |row| {
            Ok(ClusterRecord {
                id,
                name: row.get(0)?,
                release_id: ReleaseId(row.get(1)?),
                mode: row.get(2)?,
                status: row.get(3)?,
            })
        },
    )
    .optional()
    .map_err(storage)?
    .ok_or(StoreError::UnknownCluster(id))
}

/// Facts a cluster exposes to role conditions: `cluster:id`, `cluster:name`,
/// `cluster:mode`, `cluster:status`, `release:id` and `release:name`.
pub(crate) fn cluster_facts(cluster: &ClusterRecord, release: &ReleaseRow) -> Facts {
    Facts::new()
        .with("cluster:id", cluster.id.get())
        .with("cluster:name", cluster.name.as_str())
        .with("cluster:mode", cluster.mode.as_str())
        .with("cluster:status", cluster.status.as_str())
        .with("release:id", release.id.get())
        .with("release:name", release.name.as_str())
}
