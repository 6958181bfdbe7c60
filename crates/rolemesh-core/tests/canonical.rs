// SPDX-License-Identifier: Apache-2.0

use rolemesh_core::canonical;
use serde_json::json;

#[test]
fn stable_json_bytes_are_key_order_deterministic() {
    let a = json!({"z": 2, "a": 1});
    let b = json!({"a": 1, "z": 2});
    let ba = canonical::stable_json_bytes(&a).expect("stable json a");
    let bb = canonical::stable_json_bytes(&b).expect("stable json b");
    assert_eq!(ba, bb);
}

#[test]
fn stable_hash_is_repeatable_for_same_bytes() {
    let bytes = b"rolemesh-core-determinism";
    let h1 = canonical::stable_hash_hex(bytes);
    let h2 = canonical::stable_hash_hex(bytes);
    assert_eq!(h1, h2);
    assert_eq!(h1.len(), 64);
}

#[test]
fn stable_json_hash_ignores_key_order_of_nested_roles_metadata() {
    let a = json!({"controller": {"has_primary": true, "name": "Controller"}, "compute": {}});
    let b = json!({"compute": {}, "controller": {"name": "Controller", "has_primary": true}});
    let h1 = canonical::stable_json_hash_hex(&a).expect("hash a");
    let h2 = canonical::stable_json_hash_hex(&b).expect("hash b");
    assert_eq!(h1, h2);
}
