// SPDX-License-Identifier: Apache-2.0

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rolemesh_conditions::{Condition, Facts};

fn bench_condition_eval(c: &mut Criterion) {
    let source = "cluster:mode == 'multinode' and (cluster:status != 'error' or \
                  settings:common.debug.value) and not cluster:net_provider == 'nova_network'";
    let facts = Facts::new()
        .with("cluster:mode", "multinode")
        .with("cluster:status", "operational")
        .with("settings:common.debug.value", false)
        .with("cluster:net_provider", "neutron");

    c.bench_function("condition_parse", |b| {
        b.iter(|| Condition::parse(black_box(source)).expect("parse"))
    });

    let compiled = Condition::parse(source).expect("parse");
    c.bench_function("condition_evaluate", |b| {
        b.iter(|| black_box(&compiled).evaluate(black_box(&facts)))
    });
}

criterion_group!(benches, bench_condition_eval);
criterion_main!(benches);
