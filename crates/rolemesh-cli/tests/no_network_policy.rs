// SPDX-License-Identifier: Apache-2.0

use std::fs;
use std::path::PathBuf;

fn crate_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

#[test]
fn cli_sources_do_not_open_network_connections() {
    let src = crate_root().join("src");
    for entry in fs::read_dir(&src).expect("read src") {
        let path = entry.expect("entry").path();
        if path.extension().and_then(|e| e.to_str()) != Some("rs") {
            continue;
        }
        let text = fs::read_to_string(&path).expect("read source");
        for forbidden in ["TcpStream::connect", "UdpSocket::bind", "hyper::", "reqwest::"] {
            assert!(
                !text.contains(forbidden),
                "forbidden network token {forbidden} in {}",
                path.display()
            );
        }
    }
}

#[test]
fn cli_reaches_sqlite_only_through_the_store() {
    let manifest = fs::read_to_string(crate_root().join("Cargo.toml")).expect("read Cargo.toml");
    assert!(!manifest.contains("rusqlite"));
    assert!(!manifest.contains("tokio"));
    assert!(manifest.contains("tracing-subscriber"));
}
