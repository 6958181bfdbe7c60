// SPDX-License-Identifier: Apache-2.0

use criterion::{criterion_group, criterion_main, Criterion};
use rolemesh_api::respond_to_store_error;
use rolemesh_model::NodeId;
use rolemesh_store::StoreError;
use std::hint::black_box;

fn bench_error_mapping(c: &mut Criterion) {
    let in_use = StoreError::RoleInUse {
        name: "controller".to_string(),
        node_ids: (1..=64).map(NodeId).collect(),
    };
    c.bench_function("map_role_in_use", |b| {
        b.iter(|| respond_to_store_error(black_box(&in_use)))
    });
}

criterion_group!(benches, bench_error_mapping);
criterion_main!(benches);
