// SPDX-License-Identifier: Apache-2.0

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rolemesh_conditions::Facts;
use rolemesh_policies::{validate_role, ReleaseContext};
use serde_json::json;

fn bench_role_validate(c: &mut Criterion) {
    let doc = json!({
        "name": "new_controller",
        "meta": {
            "name": "Controller",
            "conflicts": ["compute"],
            "update_required": ["compute", "cinder"],
            "has_primary": true,
            "limits": {
                "min": 1,
                "overrides": [{"condition": "cluster:mode == 'multinode'", "max": 1, "message": "m"}]
            },
            "restrictions": [
                "cluster:mode == 'multinode'",
                {"multinode": true},
                {"condition": "cluster:mode == 'multinode'", "action": "hide", "message": "m"}
            ]
        },
        "volumes_roles_mapping": [
            {"id": "os", "allocate_size": "all"},
            {"id": "image", "allocate_size": "2 * 1024 + 512"}
        ]
    });
    let ctx = ReleaseContext::new(["os", "image"]).with_roles(["compute", "cinder"]);

    c.bench_function("validate_role", |b| {
        b.iter(|| validate_role(black_box(&doc), black_box(&ctx)).expect("valid role"))
    });

    let role = validate_role(&doc, &ctx).expect("valid role");
    let facts = Facts::new().with("cluster:mode", "multinode");
    c.bench_function("effective_limits", |b| {
        b.iter(|| role.effective_limits(black_box(&facts)))
    });
}

criterion_group!(benches, bench_role_validate);
criterion_main!(benches);
