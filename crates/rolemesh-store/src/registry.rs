// SPDX-License-Identifier: Apache-2.0

use rolemesh_model::{
    ActiveRestriction, ClusterId, EffectiveLimits, ReleaseId, RoleDocument, RoleMeta,
    VolumeMapping,
};
use rolemesh_policies::{validate_role, ValidatedRole};
use rusqlite::{Connection, TransactionBehavior};
use serde_json::{Map, Value};
use tracing::info;

use crate::error::{storage, StoreError};
use crate::guard::AssignmentGuard;
use crate::release::{cluster_facts, load_cluster, load_release, save_release_roles, ReleaseRow};

/// Roles of one release. Role metadata lives in `releases.roles_metadata`
/// keyed by name; volume mappings in `volumes_metadata.volumes_roles_mapping`.
pub struct RoleRegistry<'s> {
    conn: &'s mut Connection,
    release_id: ReleaseId,
}

fn stored_document(release: &ReleaseRow, name: &str) -> Result<Option<RoleDocument>, StoreError> {
    let Some(meta) = release
        .roles_metadata
        .as_ref()
        .and_then(|roles| roles.get(name))
    else {
        return Ok(None);
    };
    let meta: RoleMeta = serde_json::from_value(meta.clone()).map_err(|e| {
        StoreError::Storage(format!("invalid metadata stored for role {name}: {e}"))
    })?;
    let volumes_roles_mapping: Vec<VolumeMapping> = release
        .volumes
        .volumes_roles_mapping
        .get(name)
        .cloned()
        .unwrap_or_default();
    Ok(Some(RoleDocument {
        name: name.to_string(),
        meta,
        volumes_roles_mapping,
    }))
}

fn put_role(release: &mut ReleaseRow, role: ValidatedRole) -> Result<(), StoreError> {
    let document = role.into_document();
    let meta = serde_json::to_value(&document.meta).map_err(storage)?;
    release
        .roles_metadata
        .get_or_insert_with(Map::new)
        .insert(document.name.clone(), meta);
    release
        .volumes
        .volumes_roles_mapping
        .insert(document.name, document.volumes_roles_mapping);
    Ok(())
}

fn document_name(doc: &Value) -> Option<&str> {
    doc.get("name").and_then(Value::as_str)
}

impl<'s> RoleRegistry<'s> {
    pub(crate) fn new(conn: &'s mut Connection, release_id: ReleaseId) -> Self {
        Self { conn, release_id }
    }

    #[must_use]
    pub fn release_id(&self) -> ReleaseId {
        self.release_id
    }

    /// Validates `doc` and stores it as a new role of the release.
    pub fn create(&mut self, doc: &Value) -> Result<RoleDocument, StoreError> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(storage)?;
        let mut release = load_release(&tx, self.release_id)?;
        let validated = validate_role(doc, &release.context())?;
        let name = validated.name().to_string();
        if release.has_role(&name) {
            return Err(StoreError::DuplicateRole {
                release_id: self.release_id,
                name,
            });
        }
        put_role(&mut release, validated)?;
        save_release_roles(&tx, &release)?;
        let stored = stored_document(&release, &name)?.ok_or_else(|| {
            StoreError::Storage(format!("role {name} missing right after insert"))
        })?;
        tx.commit().map_err(storage)?;
        info!(release_id = self.release_id.get(), role = %name, "role created");
        Ok(stored)
    }

    /// Replaces role `name` with `doc` entirely.
    pub fn update(&mut self, name: &str, doc: &Value) -> Result<RoleDocument, StoreError> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(storage)?;
        let mut release = load_release(&tx, self.release_id)?;
        if !release.has_role(name) {
            return Err(StoreError::RoleNotFound {
                release_id: self.release_id,
                name: name.to_string(),
            });
        }
        if let Some(found) = document_name(doc) {
            if found != name {
                return Err(StoreError::NameMismatch {
                    expected: name.to_string(),
                    found: found.to_string(),
                });
            }
        }
        let validated = validate_role(doc, &release.context())?;
        put_role(&mut release, validated)?;
        save_release_roles(&tx, &release)?;
        let stored = stored_document(&release, name)?.ok_or_else(|| {
            StoreError::Storage(format!("role {name} missing right after update"))
        })?;
        tx.commit().map_err(storage)?;
        info!(release_id = self.release_id.get(), role = name, "role updated");
        Ok(stored)
    }

    /// Removes role `name` unless a node holds it. The release tag named
    /// after the role is left in place.
    pub fn delete(&mut self, name: &str) -> Result<(), StoreError> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(storage)?;
        let mut release = load_release(&tx, self.release_id)?;
        if !release.has_role(name) {
            return Err(StoreError::RoleNotFound {
                release_id: self.release_id,
                name: name.to_string(),
            });
        }
        AssignmentGuard::new(&tx)?.check_delete(self.release_id, name)?;
        if let Some(roles) = release.roles_metadata.as_mut() {
            roles.remove(name);
        }
        release.volumes.volumes_roles_mapping.remove(name);
        save_release_roles(&tx, &release)?;
        tx.commit().map_err(storage)?;
        info!(release_id = self.release_id.get(), role = name, "role deleted");
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<RoleDocument, StoreError> {
        let release = load_release(self.conn, self.release_id)?;
        stored_document(&release, name)?.ok_or_else(|| StoreError::RoleNotFound {
            release_id: self.release_id,
            name: name.to_string(),
        })
    }

    /// Every role of the release, ordered by name.
    pub fn list(&self) -> Result<Vec<RoleDocument>, StoreError> {
        let release = load_release(self.conn, self.release_id)?;
        let mut out = Vec::new();
        for name in release.role_names() {
            if let Some(doc) = stored_document(&release, &name)? {
                out.push(doc);
            }
        }
        Ok(out)
    }

    pub fn effective_limits(
        &self,
        name: &str,
        cluster_id: ClusterId,
    ) -> Result<EffectiveLimits, StoreError> {
        let (role, release) = self.compiled(name)?;
        let facts = self.facts_for(cluster_id, &release)?;
        Ok(role.effective_limits(&facts))
    }

    pub fn active_restrictions(
        &self,
        name: &str,
        cluster_id: ClusterId,
    ) -> Result<Vec<ActiveRestriction>, StoreError> {
        let (role, release) = self.compiled(name)?;
        let facts = self.facts_for(cluster_id, &release)?;
        Ok(role.active_restrictions(&facts))
    }

    fn compiled(&self, name: &str) -> Result<(ValidatedRole, ReleaseRow), StoreError> {
        let release = load_release(self.conn, self.release_id)?;
        let document = stored_document(&release, name)?.ok_or_else(|| StoreError::RoleNotFound {
            release_id: self.release_id,
            name: name.to_string(),
        })?;
        let raw = serde_json::to_value(&document).map_err(storage)?;
        let role = validate_role(&raw, &release.context())?;
        Ok((role, release))
    }

    fn facts_for(
        &self,
        cluster_id: ClusterId,
        release: &ReleaseRow,
    ) -> Result<rolemesh_conditions::Facts, StoreError> {
        let cluster = load_cluster(self.conn, cluster_id)?;
        if cluster.release_id != self.release_id {
            return Err(StoreError::Config(format!(
                "cluster {cluster_id} does not run release {}",
                self.release_id
            )));
        }
        Ok(cluster_facts(&cluster, release))
    }
}
