// SPDX-License-Identifier: Apache-2.0

use assert_cmd::Command;
use rolemesh_model::{NewNode, ReleaseId};
use rolemesh_store::{RoleStore, StoreConfig};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::Output;

struct Workspace {
    dir: tempfile::TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("tempdir"),
        }
    }

    fn db(&self) -> PathBuf {
        self.dir.path().join("rolemesh.sqlite")
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_rolemesh"));
        cmd.env("ROLEMESH_CONFIG", self.dir.path().join("config.toml"))
            .env_remove("ROLEMESH_DB")
            .env_remove("ROLEMESH_BUSY_TIMEOUT_MS");
        cmd
    }

    fn run(&self, args: &[&str]) -> Output {
        self.command()
            .arg("--json")
            .arg("--db")
            .arg(self.db())
            .args(args)
            .output()
            .expect("run rolemesh")
    }

    fn ok(&self, args: &[&str]) -> Value {
        let output = self.run(args);
        assert!(
            output.status.success(),
            "{args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).expect("json payload")
    }

    fn fails(&self, args: &[&str], exit: i32) -> Value {
        let output = self.run(args);
        assert_eq!(output.status.code(), Some(exit), "{args:?}");
        serde_json::from_slice(&output.stderr).expect("json error")
    }
}

fn fixture(name: &str) -> String {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
        .display()
        .to_string()
}

fn seeded(ws: &Workspace) -> i64 {
    let created = ws.ok(&["release", "create", "--name", "2014.2-6.0", "--volume", "os"]);
    let release = created["release"]["id"].as_i64().expect("release id");
    let role = ws.ok(&[
        "role",
        "create",
        "--release",
        &release.to_string(),
        &fixture("my_role.yaml"),
    ]);
    assert_eq!(role["role"]["name"], "my_role");
    release
}

#[test]
fn role_lifecycle_through_the_binary() {
    let ws = Workspace::new();
    let release = seeded(&ws).to_string();

    let listed = ws.ok(&["role", "list", "--release", &release]);
    let names: Vec<&str> = listed["roles"]
        .as_array()
        .expect("roles")
        .iter()
        .filter_map(|r| r["name"].as_str())
        .collect();
    assert_eq!(names, vec!["my_role"]);

    let fetched = ws.ok(&["role", "get", "--release", &release, "my_role"]);
    assert_eq!(fetched["role"]["meta"]["limits"]["max"], 3);

    let deleted = ws.ok(&["role", "delete", "--release", &release, "my_role"]);
    assert_eq!(deleted["deleted"], "my_role");

    let err = ws.fails(&["role", "get", "--release", &release, "my_role"], 3);
    assert_eq!(err["code"], "RoleNotFound");
    assert_eq!(
        err["message"],
        format!("Role my_role is not found for the release {release}")
    );
}

#[test]
fn invalid_role_file_reports_the_field_path() {
    let ws = Workspace::new();
    let release = seeded(&ws).to_string();
    let err = ws.fails(
        &["role", "create", "--release", &release, &fixture("bad_volume_role.yaml")],
        3,
    );
    assert_eq!(err["code"], "ValidationFailed");
    assert_eq!(err["details"]["field:volumes_roles_mapping[0].id"], "UnknownVolumeId");
}

#[test]
fn assigned_role_is_protected_and_backfilled_into_tags() {
    let ws = Workspace::new();
    let release = seeded(&ws);
    let (cluster_id, node_id) = {
        let mut store = RoleStore::open(&ws.db(), StoreConfig::default()).expect("open");
        let cluster = store
            .create_cluster(ReleaseId(release), "env", "multinode")
            .expect("cluster");
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
        (cluster.id.get(), node.id.get())
    };
    let release = release.to_string();

    let err = ws.fails(&["role", "delete", "--release", &release, "my_role"], 3);
    assert_eq!(err["code"], "RoleInUse");
    assert_eq!(err["details"]["node_ids"], node_id.to_string());

    let backfill = ws.ok(&["tag", "backfill", "--release", &release]);
    assert_eq!(backfill["reports"][0]["tags_created"], 1);
    assert_eq!(backfill["reports"][0]["assignments_created"], 1);

    let tags = ws.ok(&["tag", "node", &node_id.to_string()]);
    assert_eq!(tags["tags"][0]["tag"]["tag"], "my_role");
    assert_eq!(tags["tags"][0]["is_primary"], false);

    let limits = ws.ok(&[
        "role",
        "limits",
        "--release",
        &release,
        "--cluster",
        &cluster_id.to_string(),
        "my_role",
    ]);
    assert_eq!(limits["limits"]["max"], 1);
    assert_eq!(limits["limits"]["min"], 1);
    assert_eq!(
        limits["limits"]["messages"][0],
        "Multi-node environment can not have more."
    );
}

#[test]
fn downgrade_and_migrate_round_trip() {
    let ws = Workspace::new();
    seeded(&ws);

    assert_eq!(ws.ok(&["db", "version"])["schema_version"], 2);
    let down = ws.ok(&["db", "downgrade", "--to", "1"]);
    assert_eq!(down["from_version"], 2);
    assert_eq!(ws.ok(&["db", "version"])["schema_version"], 1);

    let up = ws.ok(&["db", "migrate"]);
    assert_eq!(up["report"]["from_version"], 1);
    assert_eq!(up["report"]["to_version"], 2);
    assert_eq!(up["report"]["backfills"].as_array().expect("backfills").len(), 1);

    let err = ws.fails(&["db", "downgrade", "--to", "0"], 2);
    assert_eq!(err["code"], "UsageError");
}

#[test]
fn condition_eval_uses_typed_facts() {
    let ws = Workspace::new();
    let hit = ws.ok(&[
        "condition",
        "eval",
        "cluster:mode == 'multinode' and settings:count == 3",
        "--fact",
        "cluster:mode=multinode",
        "--fact",
        "settings:count=3",
    ]);
    assert_eq!(hit["result"], true);

    let miss = ws.ok(&["condition", "eval", "cluster:mode == 'multinode'"]);
    assert_eq!(miss["result"], false);

    let err = ws.fails(&["condition", "eval", "cluster:mode =="], 3);
    assert_eq!(err["code"], "ValidationFailed");
    assert_eq!(err["details"]["kind"], "ConditionSyntaxError");
}

#[test]
fn database_path_comes_from_the_config_file() {
    let ws = Workspace::new();
    let db = ws.dir.path().join("from-config.sqlite");
    std::fs::write(
        ws.dir.path().join("config.toml"),
        format!(
            "database_path = {:?}\n\n[store]\nbusy_timeout_ms = 2000\n",
            db.display().to_string()
        ),
    )
    .expect("write config");

    let output = ws
        .command()
        .args(["--json", "db", "migrate"])
        .output()
        .expect("run migrate");
    assert!(output.status.success());
    assert!(db.exists());
}

#[test]
fn openapi_generate_writes_the_error_contract() {
    let ws = Workspace::new();
    let out = ws.dir.path().join("openapi/rolemesh.json");
    let payload = ws.ok(&["openapi", "generate", "--out", &out.display().to_string()]);
    assert_eq!(payload["digest"].as_str().map(str::len), Some(64));

    let raw = std::fs::read(&out).expect("openapi file");
    let parsed: Value = serde_json::from_slice(&raw).expect("openapi json");
    assert_eq!(parsed["openapi"], "3.0.3");
    assert!(parsed["components"]["schemas"]["ApiErrorCode"]["enum"]
        .as_array()
        .expect("codes")
        .contains(&Value::from("RoleInUse")));
}
