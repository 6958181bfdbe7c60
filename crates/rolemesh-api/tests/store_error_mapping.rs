// SPDX-License-Identifier: Apache-2.0

use rolemesh_api::{api_error_from_store, map_error, respond_to_store_error, ApiErrorCode};
use rolemesh_model::{ClusterId, NewNode, NewRelease, NodeId, ReleaseId, TagId};
use rolemesh_policies::{FieldError, ValidationErrorKind, ValidationErrors};
use rolemesh_store::{RoleStore, StoreConfig, StoreError};
use serde_json::{json, Value};

fn role(name: &str) -> Value {
    serde_yaml::from_str(&format!(
        "name: {name}\nmeta:\n  name: {name}\n  description: test role\nvolumes_roles_mapping:\n  - id: os\n    allocate_size: all\n"
    ))
    .expect("yaml role")
}

fn open_store() -> (tempfile::TempDir, RoleStore, ReleaseId) {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut store = RoleStore::open(&dir.path().join("api.sqlite"), StoreConfig::default())
        .expect("open store");
    let release = store
        .create_release(&NewRelease {
            name: "2014.2-6.0".to_string(),
            volume_ids: vec!["os".to_string()],
            tags_metadata: None,
        })
        .expect("release")
        .id;
    (dir, store, release)
}

#[test]
fn validation_failures_carry_field_errors() {
    let (_dir, mut store, release) = open_store();
    let mut doc = role("my_role");
    doc["volumes_roles_mapping"][0]["id"] = json!("missing");
    let err = store.registry(release).create(&doc).expect_err("invalid");

    let (status, body) = respond_to_store_error(&err);
    assert_eq!(status, 400);
    assert_eq!(body.code, ApiErrorCode::ValidationFailed);
    let fields = body.details["field_errors"].as_array().expect("field errors");
    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0]["path"], "volumes_roles_mapping[0].id");
    assert_eq!(fields[0]["kind"], "UnknownVolumeId");
}

#[test]
fn missing_role_maps_to_404_with_the_registry_message() {
    let (_dir, mut store, release) = open_store();
    let err = store.registry(release).delete("ghost").expect_err("missing");
    let (status, body) = respond_to_store_error(&err);
    assert_eq!(status, 404);
    assert_eq!(body.code, ApiErrorCode::RoleNotFound);
    assert_eq!(
        body.message,
        format!("Role ghost is not found for the release {release}")
    );
    assert_eq!(body.details, json!({"release_id": release.get(), "role": "ghost"}));
}

#[test]
fn duplicate_role_is_a_conflict() {
    let (_dir, mut store, release) = open_store();
    store.registry(release).create(&role("my_role")).expect("create");
    let err = store.registry(release).create(&role("my_role")).expect_err("dup");
    let (status, body) = respond_to_store_error(&err);
    assert_eq!(status, 409);
    assert_eq!(body.code, ApiErrorCode::DuplicateRole);
}

#[test]
fn role_in_use_lists_the_blocking_nodes() {
    let (_dir, mut store, release) = open_store();
    store.registry(release).create(&role("my_role")).expect("create");
    let cluster = store.create_cluster(release, "env", "multinode").expect("cluster");
    let node = store
        .create_node(
            Some(cluster.id),
            &NewNode {
                hostname: "node-1".to_string(),
                roles: vec!["my_role".to_string()],
                pending_roles: Vec::new(),
                primary_roles: Vec::new(),
            },
        )
        .expect("node");

    let err = store.registry(release).delete("my_role").expect_err("in use");
    let (status, body) = respond_to_store_error(&err);
    assert_eq!(status, 400);
    assert_eq!(body.code, ApiErrorCode::RoleInUse);
    assert_eq!(body.details["node_ids"], json!([node.id.get()]));
    assert!(body
        .message
        .starts_with("Can't delete roles that are assigned to some node"));
}

#[test]
fn name_mismatch_is_a_bad_request() {
    let (_dir, mut store, release) = open_store();
    store.registry(release).create(&role("my_role")).expect("create");
    let err = store
        .registry(release)
        .update("my_role", &role("other_role"))
        .expect_err("mismatch");
    let (status, body) = respond_to_store_error(&err);
    assert_eq!(status, 400);
    assert_eq!(body.code, ApiErrorCode::NameMismatch);
    assert_eq!(body.details, json!({"expected": "my_role", "found": "other_role"}));
}

#[test]
fn every_store_variant_has_a_status() {
    let cases = vec![
        (
            StoreError::Validation(ValidationErrors(vec![FieldError {
                path: "name".to_string(),
                kind: ValidationErrorKind::MissingField,
                message: "'name' is a required property".to_string(),
            }])),
            400,
            ApiErrorCode::ValidationFailed,
        ),
        (StoreError::UnknownRelease(ReleaseId(9)), 404, ApiErrorCode::NotFound),
        (StoreError::UnknownCluster(ClusterId(9)), 404, ApiErrorCode::NotFound),
        (StoreError::UnknownNode(NodeId(9)), 404, ApiErrorCode::NotFound),
        (StoreError::UnknownTag(TagId(9)), 404, ApiErrorCode::NotFound),
        (
            StoreError::PrimaryNotAllowed {
                tag_id: TagId(1),
                tag: "compute".to_string(),
            },
            400,
            ApiErrorCode::PrimaryNotAllowed,
        ),
        (
            StoreError::ForeignTag {
                tag_id: TagId(1),
                node_id: NodeId(2),
            },
            400,
            ApiErrorCode::ForeignTag,
        ),
        (
            StoreError::Config("bad journal mode".to_string()),
            400,
            ApiErrorCode::InvalidRequest,
        ),
        (
            StoreError::Storage("disk I/O error".to_string()),
            500,
            ApiErrorCode::StorageFailure,
        ),
    ];
    for (err, status, code) in cases {
        let body = api_error_from_store(&err);
        assert_eq!(body.code, code, "{err}");
        assert_eq!(map_error(&body).status_code, status, "{err}");
        assert!(body.details.is_object(), "{err}");
    }
}

#[test]
fn storage_details_never_leak_into_the_message() {
    let body = api_error_from_store(&StoreError::Storage("database is locked".to_string()));
    assert_eq!(body.message, "storage failure");
    assert_eq!(body.details["cause"], "storage_error: database is locked");
}

#[test]
fn error_body_round_trips_with_request_id() {
    let body = api_error_from_store(&StoreError::UnknownNode(NodeId(4))).with_request_id("req-1");
    let raw = serde_json::to_value(&body).expect("encode");
    assert_eq!(raw["code"], "NotFound");
    assert_eq!(raw["request_id"], "req-1");
    let back: rolemesh_api::ApiError = serde_json::from_value(raw).expect("decode");
    assert_eq!(back, body);
}
