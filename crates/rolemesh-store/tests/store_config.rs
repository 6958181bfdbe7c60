// SPDX-License-Identifier: Apache-2.0

use rolemesh_store::{
    JournalMode, RoleStore, RolemeshConfig, StoreConfig, StoreErrorCode,
    ENV_ROLEMESH_BUSY_TIMEOUT_MS, SCHEMA_VERSION,
};
use std::path::PathBuf;

#[test]
fn config_toml_fills_defaults_and_round_trips() {
    let cfg = RolemeshConfig::from_toml_str(
        r#"
database_path = "/var/lib/rolemesh/rolemesh.sqlite"

[store]
journal_mode = "delete"
"#,
    )
    .expect("parse");
    assert_eq!(
        cfg.database_path,
        Some(PathBuf::from("/var/lib/rolemesh/rolemesh.sqlite"))
    );
    assert_eq!(cfg.store.journal_mode, JournalMode::Delete);
    assert_eq!(cfg.store.busy_timeout_ms, StoreConfig::default().busy_timeout_ms);
    assert!(cfg.store.foreign_keys);

    let rendered = cfg.to_toml_string().expect("render");
    assert_eq!(RolemeshConfig::from_toml_str(&rendered).expect("reparse"), cfg);
}

#[test]
fn config_contract_rejects_bad_values() {
    for raw in [
        "[store]\nbusy_timeout_ms = 0\n",
        "[store]\nbusy_timeout_ms = 600001\n",
        "[store]\nforeign_keys = false\n",
        "[store]\ncache_pages = 12\n",
        "[store]\njournal_mode = \"truncate\"\n",
    ] {
        let err = RolemeshConfig::from_toml_str(raw).expect_err(raw);
        assert_eq!(err.code(), StoreErrorCode::Config, "{raw}");
    }
}

#[test]
fn missing_config_file_yields_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cfg = RolemeshConfig::load(&dir.path().join("absent.toml")).expect("load");
    assert_eq!(cfg, RolemeshConfig::default());

    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[store]\nbusy_timeout_ms = 250\n").expect("write");
    let cfg = RolemeshConfig::load(&path).expect("load");
    assert_eq!(cfg.store.busy_timeout_ms, 250);
}

#[test]
fn busy_timeout_env_override_is_parsed() {
    std::env::set_var(ENV_ROLEMESH_BUSY_TIMEOUT_MS, "1500");
    let cfg = StoreConfig::default().with_env_overrides().expect("override");
    assert_eq!(cfg.busy_timeout_ms, 1500);

    std::env::set_var(ENV_ROLEMESH_BUSY_TIMEOUT_MS, "soon");
    let err = StoreConfig::default().with_env_overrides().expect_err("bad value");
    assert_eq!(err.code(), StoreErrorCode::Config);
    std::env::remove_var(ENV_ROLEMESH_BUSY_TIMEOUT_MS);
}

#[test]
fn store_opens_with_each_journal_mode() {
    let dir = tempfile::tempdir().expect("tempdir");
    for (i, mode) in [JournalMode::Wal, JournalMode::Delete, JournalMode::Memory]
        .into_iter()
        .enumerate()
    {
        let config = StoreConfig {
            journal_mode: mode,
            ..StoreConfig::default()
        };
        let store = RoleStore::open(&dir.path().join(format!("db{i}.sqlite")), config)
            .expect("open");
        assert_eq!(store.schema_version().expect("version"), SCHEMA_VERSION);
        assert_eq!(store.config().journal_mode, mode);
    }
}

#[test]
fn invalid_config_refuses_to_open() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = StoreConfig {
        busy_timeout_ms: 0,
        ..StoreConfig::default()
    };
    let err = RoleStore::open(&dir.path().join("db.sqlite"), config).expect_err("invalid");
    assert_eq!(err.code(), StoreErrorCode::Config);
}
