// SPDX-License-Identifier: Apache-2.0

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rolemesh_model::RoleDocument;
use serde_json::{json, Value};

fn large_role() -> Value {
    let restrictions: Vec<Value> = (0..64)
        .map(|i| json!({"condition": format!("cluster:mode == 'mode_{i}'"), "action": "disable"}))
        .collect();
    let mappings: Vec<Value> = (0..32)
        .map(|i| json!({"id": format!("vol_{i}"), "allocate_size": "all"}))
        .collect();
    json!({
        "name": "controller",
        "meta": {
            "name": "Controller",
            "conflicts": ["compute"],
            "has_primary": true,
            "limits": {"min": 1, "overrides": [{"condition": {"multinode": true}, "max": 1, "message": "m"}]},
            "restrictions": restrictions
        },
        "volumes_roles_mapping": mappings
    })
}

fn bench_role_codec(c: &mut Criterion) {
    let raw = large_role();
    c.bench_function("role_document_decode", |b| {
        b.iter(|| {
            let doc: RoleDocument =
                serde_json::from_value(black_box(raw.clone())).expect("decode role");
            black_box(doc)
        })
    });
}

criterion_group!(benches, bench_role_codec);
criterion_main!(benches);
