// SPDX-License-Identifier: Apache-2.0

use rolemesh_model::{NodeId, OwnerType, ReleaseId};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::error::StoreError;
use crate::legacy::LegacyRoleAdapter;
use crate::release::load_release;
use crate::tags::{bind_in, ensure_tag_in, find_tag_in, AssignOutcome};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SkippedReference {
    pub node_id: NodeId,
    pub role: String,
}

/// What one backfill run changed. A second run over unchanged input reports
/// zero created and upgraded rows.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BackfillReport {
    pub release_id: Option<ReleaseId>,
    pub tags_created: usize,
    pub tags_existing: usize,
    pub assignments_created: usize,
    pub assignments_upgraded: usize,
    pub assignments_unchanged: usize,
    pub skipped_references: Vec<SkippedReference>,
    pub primary_clamped: Vec<SkippedReference>,
}

impl BackfillReport {
    #[must_use]
    pub fn changed_anything(&self) -> bool {
        self.tags_created > 0 || self.assignments_created > 0 || self.assignments_upgraded > 0
    }
}

fn role_has_primary(meta: &Value) -> bool {
    meta.get("has_primary")
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

/// Runs inside the caller's transaction.
pub(crate) fn backfill_release(
    conn: &Connection,
    release_id: ReleaseId,
) -> Result<BackfillReport, StoreError> {
    let release = load_release(conn, release_id)?;
    let mut report = BackfillReport {
        release_id: Some(release_id),
        ..BackfillReport::default()
    };

    if let Some(roles) = &release.roles_metadata {
        for (name, meta) in roles {
            let (_, created) = ensure_tag_in(
                conn,
                OwnerType::Release,
                release_id.get(),
                name,
                role_has_primary(meta),
                true,
            )?;
            if created {
                report.tags_created += 1;
            } else {
                report.tags_existing += 1;
            }
        }
    }

    for node in LegacyRoleAdapter.nodes_for_release(conn, release_id)? {
        for role in node.all_roles() {
            let Some(tag) = find_tag_in(conn, OwnerType::Release, release_id.get(), role)? else {
                warn!(
                    release_id = release_id.get(),
                    node_id = node.id.get(),
                    role,
                    "node references a role without a release tag; skipped"
                );
                report.skipped_references.push(SkippedReference {
                    node_id: node.id,
                    role: role.to_string(),
                });
                continue;
            };
            let mut is_primary = node.primary_roles.iter().any(|p| p == role);
            if is_primary && !tag.has_primary {
                warn!(
                    release_id = release_id.get(),
                    node_id = node.id.get(),
                    role,
                    "primary flag dropped for a tag without has_primary"
                );
                report.primary_clamped.push(SkippedReference {
                    node_id: node.id,
                    role: role.to_string(),
                });
                is_primary = false;
            }
            match bind_in(conn, node.id, tag.id, is_primary)? {
                AssignOutcome::Created => report.assignments_created += 1,
                AssignOutcome::Upgraded => report.assignments_upgraded += 1,
                AssignOutcome::Unchanged => report.assignments_unchanged += 1,
            }
        }
    }

    info!(
        release_id = release_id.get(),
        tags_created = report.tags_created,
        assignments_created = report.assignments_created,
        assignments_upgraded = report.assignments_upgraded,
        skipped = report.skipped_references.len(),
        "tag backfill finished"
    );
    Ok(report)
}
