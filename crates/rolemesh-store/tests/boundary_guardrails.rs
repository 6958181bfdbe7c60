// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

#[test]
fn store_crate_has_no_runtime_or_cli_dependencies() {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let cargo = std::fs::read_to_string(root.join("Cargo.toml")).expect("read Cargo.toml");
    for forbidden in ["tokio", "clap", "tracing-subscriber", "rolemesh-api", "rolemesh-cli"] {
        assert!(
            !cargo.contains(forbidden),
            "store must not depend on {forbidden}"
        );
    }
}

#[test]
fn legacy_node_fields_are_written_only_by_the_adapter() {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("src");
    for entry in std::fs::read_dir(&root).expect("read src") {
        let path = entry.expect("entry").path();
        if path.file_name().and_then(|n| n.to_str()) == Some("legacy.rs") {
            continue;
        }
        let text = std::fs::read_to_string(&path).expect("read source");
        for needle in ["UPDATE nodes", "INSERT INTO nodes"] {
            assert!(
                !text.contains(needle),
                "{} writes node role fields directly",
                path.display()
            );
        }
    }
}
