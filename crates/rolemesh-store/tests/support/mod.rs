// SPDX-License-Identifier: Apache-2.0
#![allow(dead_code)]

use rolemesh_model::{ClusterRecord, NewNode, NewRelease, NodeRecord, ReleaseId};
use rolemesh_store::{RoleStore, StoreConfig};
use serde_json::{json, Value};
use std::path::Path;
use tempfile::TempDir;

pub fn temp_store() -> (TempDir, RoleStore) {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = RoleStore::open(&dir.path().join("rolemesh.sqlite"), StoreConfig::default())
        .expect("open store");
    (dir, store)
}

/// A store left at revision 1, as it looked before node tagging existed.
pub fn legacy_store(path: &Path) -> RoleStore {
    let mut store = RoleStore::open_raw(path, StoreConfig::default()).expect("open raw");
    store.migrate_to(1).expect("revision 1");
    store
}

pub fn seed_release(store: &mut RoleStore) -> ReleaseId {
    store
        .create_release(&NewRelease {
            name: "2014.2-6.0".to_string(),
            volume_ids: vec!["os".to_string(), "image".to_string(), "cinder".to_string()],
            tags_metadata: None,
        })
        .expect("create release")
        .id
}

pub fn seed_cluster(store: &mut RoleStore, release_id: ReleaseId, mode: &str) -> ClusterRecord {
    store
        .create_cluster(release_id, "env", mode)
        .expect("create cluster")
}

pub fn seed_node(
    store: &mut RoleStore,
    cluster: &ClusterRecord,
    roles: &[&str],
    pending: &[&str],
    primary: &[&str],
) -> NodeRecord {
    let owned = |items: &[&str]| items.iter().map(|s| (*s).to_string()).collect::<Vec<_>>();
    store
        .create_node(
            Some(cluster.id),
            &NewNode {
                hostname: format!("node-{}", roles.join("-")),
                roles: owned(roles),
                pending_roles: owned(pending),
                primary_roles: owned(primary),
            },
        )
        .expect("create node")
}

pub fn simple_role(name: &str) -> Value {
    json!({
        "name": name,
        "meta": {"name": name, "description": "Something goes here"},
        "volumes_roles_mapping": [{"id": "os", "allocate_size": "all"}]
    })
}

pub fn primary_role(name: &str) -> Value {
    let mut doc = simple_role(name);
    doc["meta"]["has_primary"] = json!(true);
    doc
}

pub fn controller_fixture() -> Value {
    serde_yaml::from_str(include_str!("../fixtures/new_controller.yaml")).expect("fixture yaml")
}

pub fn seed_roles(store: &mut RoleStore, release_id: ReleaseId, docs: &[Value]) {
    let mut registry = store.registry(release_id);
    for doc in docs {
        registry.create(doc).expect("create role");
    }
}
