// SPDX-License-Identifier: Apache-2.0

use rolemesh_model::{
    AllocateSize, ConditionSource, OwnerType, Restriction, RestrictionAction, RoleDocument,
};
use serde_json::{json, Value};

fn full_role() -> Value {
    let raw = include_str!("fixtures/new_controller.yaml");
    serde_yaml::from_str(raw).expect("fixture yaml")
}

#[test]
fn full_role_document_round_trips_to_identical_json() {
    let original = full_role();
    let doc: RoleDocument = serde_json::from_value(original.clone()).expect("decode role");
    let encoded = serde_json::to_value(&doc).expect("encode role");
    assert_eq!(encoded, original);
}

#[test]
fn restriction_shapes_decode_to_expected_variants() {
    let doc: RoleDocument = serde_json::from_value(full_role()).expect("decode role");
    let restrictions = doc.meta.restrictions();
    assert_eq!(restrictions.len(), 3);
    assert!(matches!(
        &restrictions[0],
        Restriction::Bare(ConditionSource::Expression(s)) if s == "cluster:mode == 'multinode'"
    ));
    assert!(matches!(
        &restrictions[1],
        Restriction::Bare(ConditionSource::Mapping(m)) if m.get("multinode") == Some(&json!(true))
    ));
    assert_eq!(restrictions[2].action(), RestrictionAction::Hide);
    assert_eq!(
        restrictions[2].message(),
        Some("Multi-node environment can not have more.")
    );
}

#[test]
fn unknown_meta_attributes_are_preserved_verbatim() {
    let raw = json!({
        "name": "mongo",
        "meta": {"name": "Telemetry - MongoDB", "weight": 100, "group": "other"},
        "volumes_roles_mapping": [{"id": "os", "allocate_size": "all"}]
    });
    let doc: RoleDocument = serde_json::from_value(raw.clone()).expect("decode role");
    assert_eq!(doc.meta.extra.get("weight"), Some(&json!(100)));
    assert_eq!(serde_json::to_value(&doc).expect("encode"), raw);
}

#[test]
fn role_document_rejects_unknown_top_level_fields() {
    let raw = json!({
        "name": "x",
        "meta": {},
        "volumes_roles_mapping": [],
        "extra": 1
    });
    assert!(serde_json::from_value::<RoleDocument>(raw).is_err());
}

#[test]
fn allocate_size_accepts_numbers_and_text() {
    let n: AllocateSize = serde_json::from_value(json!(2048)).expect("bytes");
    assert_eq!(n, AllocateSize::Bytes(2048));
    let all: AllocateSize = serde_json::from_value(json!("all")).expect("all");
    assert!(all.is_all());
}

#[test]
fn allocate_size_keeps_unsupported_values_for_validation() {
    for raw in [json!(-1), json!(true), json!(1.5), Value::Null] {
        let size: AllocateSize = serde_json::from_value(raw.clone()).expect("decode");
        assert_eq!(size, AllocateSize::Other(raw));
    }
}

#[test]
fn restriction_with_condition_key_never_falls_back_to_shorthand() {
    let bad_action = json!({
        "condition": "cluster:mode == 'multinode'",
        "action": "explode",
        "message": "m"
    });
    assert!(serde_json::from_value::<Restriction>(bad_action).is_err());

    let misspelled = json!({"condition": "cluster:mode == 'multinode'", "mesage": "m"});
    assert!(serde_json::from_value::<Restriction>(misspelled).is_err());

    let disable: Restriction = serde_json::from_value(json!({
        "condition": "cluster:mode == 'multinode'",
        "action": "disable"
    }))
    .expect("detailed");
    assert_eq!(disable.action(), RestrictionAction::Disable);
}

#[test]
fn empty_override_list_survives_round_trip() {
    let raw = json!({
        "name": "compute",
        "meta": {"limits": {"min": 1, "overrides": []}},
        "volumes_roles_mapping": [{"id": "os", "allocate_size": "all"}]
    });
    let doc: RoleDocument = serde_json::from_value(raw.clone()).expect("decode role");
    assert!(doc.meta.limits.as_ref().is_some_and(|l| l.overrides().is_empty()));
    assert_eq!(serde_json::to_value(&doc).expect("encode"), raw);
}

#[test]
fn owner_type_serializes_snake_case() {
    assert_eq!(
        serde_json::to_value(OwnerType::Release).expect("encode"),
        json!("release")
    );
    assert_eq!(OwnerType::parse("plugin").expect("parse"), OwnerType::Plugin);
    assert!(OwnerType::parse("node").is_err());
}
