// SPDX-License-Identifier: Apache-2.0

use rolemesh_conditions::Condition;
use rolemesh_model::{ClusterId, NewRelease, NodeId, ReleaseId};
use rolemesh_store::SCHEMA_VERSION;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

use crate::commands::{
    ConditionCommand, DbCommand, OpenapiCommand, ReleaseCommand, RoleCommand, TagCommand,
};
use crate::helpers::{collect_facts, read_document};
use crate::{CliError, StoreTarget};

fn to_payload<T: serde::Serialize>(value: &T) -> Result<Value, CliError> {
    serde_json::to_value(value).map_err(|e| CliError::internal(e.to_string()))
}

pub(crate) fn run_db(command: DbCommand, target: &StoreTarget) -> Result<Value, CliError> {
    let mut store = target.open_raw()?;
    match command {
        DbCommand::Migrate { to } => {
            let report = store.migrate_to(to.unwrap_or(SCHEMA_VERSION))?;
            info!(
                from = report.from_version,
                to = report.to_version,
                "schema migrated"
            );
            Ok(json!({"command": "db migrate", "report": to_payload(&report)?}))
        }
        DbCommand::Downgrade { to } => {
            let from = store.downgrade_to(to)?;
            Ok(json!({"command": "db downgrade", "from_version": from, "to_version": to}))
        }
        DbCommand::Version => Ok(json!({
            "command": "db version",
            "schema_version": store.schema_version()?,
            "latest": SCHEMA_VERSION,
        })),
    }
}

pub(crate) fn run_release(
    command: ReleaseCommand,
    target: &StoreTarget,
) -> Result<Value, CliError> {
    let mut store = target.open()?;
    match command {
        ReleaseCommand::Create {
            name,
            volumes,
            tags_metadata,
        } => {
            let tags_metadata = match tags_metadata {
                Some(path) => Some(tags_metadata_from(&path)?),
                None => None,
            };
            let record = store.create_release(&NewRelease {
                name,
                volume_ids: volumes,
                tags_metadata,
            })?;
            Ok(json!({"command": "release create", "release": to_payload(&record)?}))
        }
        ReleaseCommand::Delete { release } => {
            let report = store.delete_release(ReleaseId(release))?;
            Ok(json!({"command": "release delete", "report": to_payload(&report)?}))
        }
    }
}

fn tags_metadata_from(path: &Path) -> Result<BTreeMap<String, Value>, CliError> {
    match read_document(path)? {
        Value::Object(map) => Ok(map.into_iter().collect()),
        _ => Err(CliError::invalid_document(format!(
            "{} must hold a mapping of tag names",
            path.display()
        ))),
    }
}

pub(crate) fn run_role(command: RoleCommand, target: &StoreTarget) -> Result<Value, CliError> {
    let mut store = target.open()?;
    match command {
        RoleCommand::Create { release, file } => {
            let doc = read_document(&file)?;
            let stored = store.registry(ReleaseId(release)).create(&doc)?;
            Ok(json!({"command": "role create", "role": to_payload(&stored)?}))
        }
        RoleCommand::Update {
            release,
            name,
            file,
        } => {
            let doc = read_document(&file)?;
            let stored = store.registry(ReleaseId(release)).update(&name, &doc)?;
            Ok(json!({"command": "role update", "role": to_payload(&stored)?}))
        }
        RoleCommand::Delete { release, name } => {
            store.registry(ReleaseId(release)).delete(&name)?;
            Ok(json!({"command": "role delete", "deleted": name}))
        }
        RoleCommand::Get { release, name } => {
            let stored = store.registry(ReleaseId(release)).get(&name)?;
            Ok(json!({"command": "role get", "role": to_payload(&stored)?}))
        }
        RoleCommand::List { release } => {
            let roles = store.registry(ReleaseId(release)).list()?;
            Ok(json!({"command": "role list", "roles": to_payload(&roles)?}))
        }
        RoleCommand::Limits {
            release,
            cluster,
            name,
        } => {
            let registry = store.registry(ReleaseId(release));
            let limits = registry.effective_limits(&name, ClusterId(cluster))?;
            let restrictions = registry.active_restrictions(&name, ClusterId(cluster))?;
            Ok(json!({
                "command": "role limits",
                "role": name,
                "limits": to_payload(&limits)?,
                "restrictions": to_payload(&restrictions)?,
            }))
        }
    }
}

pub(crate) fn run_tag(command: TagCommand, target: &StoreTarget) -> Result<Value, CliError> {
    let mut store = target.open()?;
    match command {
        TagCommand::Backfill { release } => {
            let reports = match release {
                Some(id) => vec![store.tags().backfill_from_roles(ReleaseId(id))?],
                None => store.tags().backfill_all()?,
            };
            Ok(json!({"command": "tag backfill", "reports": to_payload(&reports)?}))
        }
        TagCommand::Node { node } => {
            let views = store.tags().assignments_for_node(NodeId(node))?;
            Ok(json!({"command": "tag node", "node_id": node, "tags": to_payload(&views)?}))
        }
        TagCommand::Snapshot => {
            let snapshot = store.tags().snapshot()?;
            Ok(json!({
                "command": "tag snapshot",
                "digest": snapshot.digest()?,
                "snapshot": to_payload(&snapshot)?,
            }))
        }
    }
}

pub(crate) fn run_condition(command: ConditionCommand) -> Result<Value, CliError> {
    match command {
        ConditionCommand::Eval {
            expression,
            facts,
            fact,
        } => {
            let condition = Condition::parse(&expression).map_err(CliError::condition)?;
            let facts = collect_facts(facts.as_deref(), &fact)?;
            Ok(json!({
                "command": "condition eval",
                "condition": condition.to_string(),
                "facts_used": condition.fact_names(),
                "result": condition.evaluate(&facts),
            }))
        }
    }
}

pub(crate) fn run_openapi(command: OpenapiCommand) -> Result<Value, CliError> {
    match command {
        OpenapiCommand::Generate { out } => {
            let spec = rolemesh_api::openapi_v1_spec();
            let bytes = rolemesh_core::canonical::stable_json_bytes(&spec)
                .map_err(|e| CliError::internal(e.to_string()))?;
            if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .map_err(|e| CliError::dependency(format!("{}: {e}", parent.display())))?;
            }
            std::fs::write(&out, bytes)
                .map_err(|e| CliError::dependency(format!("{}: {e}", out.display())))?;
            Ok(json!({
                "command": "openapi generate",
                "out": out,
                "digest": rolemesh_api::openapi_v1_digest()
                    .map_err(|e| CliError::internal(e.to_string()))?,
            }))
        }
    }
}
