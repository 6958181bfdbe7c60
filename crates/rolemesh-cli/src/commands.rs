// SPDX-License-Identifier: Apache-2.0

use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub(crate) enum DbCommand {
    /// Bring the schema to `--to` (default: latest), backfilling tags on the way.
    Migrate {
        #[arg(long)]
        to: Option<i64>,
    },
    Downgrade {
        #[arg(long)]
        to: i64,
    },
    Version,
}

#[derive(Subcommand)]
pub(crate) enum ReleaseCommand {
    Create {
        #[arg(long)]
        name: String,
        #[arg(long = "volume")]
        volumes: Vec<String>,
        /// YAML or JSON mapping of declared tag names.
        #[arg(long)]
        tags_metadata: Option<PathBuf>,
    },
    Delete {
        release: i64,
    },
}

#[derive(Subcommand)]
pub(crate) enum RoleCommand {
    Create {
        #[arg(long)]
        release: i64,
        file: PathBuf,
    },
    Update {
        #[arg(long)]
        release: i64,
        name: String,
        file: PathBuf,
    },
    Delete {
        #[arg(long)]
        release: i64,
        name: String,
    },
    Get {
        #[arg(long)]
        release: i64,
        name: String,
    },
    List {
        #[arg(long)]
        release: i64,
    },
    /// Effective limits and active restrictions of a role in one cluster.
    Limits {
        #[arg(long)]
        release: i64,
        #[arg(long)]
        cluster: i64,
        name: String,
    },
}

#[derive(Subcommand)]
pub(crate) enum TagCommand {
    Backfill {
        #[arg(long)]
        release: Option<i64>,
    },
    Node {
        node: i64,
    },
    Snapshot,
}

#[derive(Subcommand)]
pub(crate) enum ConditionCommand {
    Eval {
        expression: String,
        /// YAML or JSON document flattened into facts.
        #[arg(long)]
        facts: Option<PathBuf>,
        /// `name=value`; repeatable, applied after `--facts`.
        #[arg(long = "fact")]
        fact: Vec<String>,
    },
}

#[derive(Subcommand)]
pub(crate) enum OpenapiCommand {
    Generate {
        #[arg(long, default_value = "openapi/v1/rolemesh.json")]
        out: PathBuf,
    },
}
