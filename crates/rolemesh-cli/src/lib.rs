// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
//! `rolemesh` operator CLI: schema migrations, role registry, node tags and
//! condition evaluation. Every command prints one JSON payload on stdout;
//! failures print a [`MachineError`] on stderr and exit with its code.

mod actions;
mod commands;
mod helpers;
mod logging;

use clap::{error::ErrorKind, ArgAction, Parser, Subcommand};
use rolemesh_conditions::ConditionSyntaxError;
use rolemesh_core::{
    resolve_rolemesh_config_path, ConfigPathScope, ErrorCode, ExitCode, MachineError,
    ENV_ROLEMESH_DB,
};
use rolemesh_store::{RoleStore, RolemeshConfig, StoreConfig, StoreError};
use serde_json::{json, Value};
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode as ProcessExitCode;

use commands::{
    ConditionCommand, DbCommand, OpenapiCommand, ReleaseCommand, RoleCommand, TagCommand,
};

const ROLEMESH_HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{about-with-newline}
Usage: {usage}

Options:
{options}

Commands:
{subcommands}
{after-help}";

#[derive(Parser)]
#[command(name = "rolemesh", version)]
#[command(about = "Role registry and node tag operations")]
#[command(help_template = ROLEMESH_HELP_TEMPLATE)]
#[command(
    after_help = "Environment:\n  ROLEMESH_DB         Database path\n  ROLEMESH_CONFIG     Config file path\n  ROLEMESH_LOG_LEVEL  Log filter directive\n  ROLEMESH_LOG_JSON   Emit JSON logs on stderr"
)]
struct Cli {
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
    #[arg(long, global = true, default_value_t = false)]
    quiet: bool,
    #[arg(long, global = true, action = ArgAction::Count)]
    verbose: u8,
    #[arg(long, global = true, default_value_t = false)]
    trace: bool,
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long = "print-config-paths", default_value_t = false)]
    print_config_paths: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    Db {
        #[command(subcommand)]
        command: DbCommand,
    },
    Release {
        #[command(subcommand)]
        command: ReleaseCommand,
    },
    Role {
        #[command(subcommand)]
        command: RoleCommand,
    },
    Tag {
        #[command(subcommand)]
        command: TagCommand,
    },
    Condition {
        #[command(subcommand)]
        command: ConditionCommand,
    },
    Openapi {
        #[command(subcommand)]
        command: OpenapiCommand,
    },
}

#[derive(Clone, Copy, Debug)]
struct LogFlags {
    quiet: bool,
    verbose: u8,
    trace: bool,
}

#[derive(Clone, Copy)]
struct OutputMode {
    json: bool,
}

/// A failed command: the process exit code plus the structured error.
#[derive(Debug)]
pub struct CliError {
    pub exit_code: ExitCode,
    pub machine: MachineError,
}

impl CliError {
    fn from_code(code: ErrorCode, message: &str) -> Self {
        Self {
            exit_code: code.exit_code(),
            machine: MachineError::new(code, message),
        }
    }

    fn usage(message: String) -> Self {
        Self::from_code(ErrorCode::UsageError, &message)
    }

    fn invalid_document(message: String) -> Self {
        Self::from_code(ErrorCode::ValidationFailed, &message)
    }

    fn condition(err: ConditionSyntaxError) -> Self {
        let mut error = Self::from_code(ErrorCode::ValidationFailed, &err.to_string());
        error.machine = error
            .machine
            .with_detail("kind", "ConditionSyntaxError")
            .with_detail("span", &format!("{}..{}", err.start, err.end));
        error
    }

    fn internal(message: String) -> Self {
        Self::from_code(ErrorCode::Internal, &message)
    }

    fn dependency(message: String) -> Self {
        Self::from_code(ErrorCode::StorageFailure, &message)
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.machine)
    }
}

impl std::error::Error for CliError {}

impl From<StoreError> for CliError {
    fn from(err: StoreError) -> Self {
        let code = err.code().error_code();
        let mut machine = MachineError::new(code, &err.to_string())
            .with_detail("store_code", err.code().as_str());
        match &err {
            StoreError::Validation(errors) => {
                for field in errors.errors() {
                    machine = machine
                        .with_detail(&format!("field:{}", field.path), field.kind.as_str());
                }
            }
            StoreError::RoleInUse { node_ids, .. } => {
                let ids: Vec<String> = node_ids.iter().map(ToString::to_string).collect();
                machine = machine.with_detail("node_ids", &ids.join(","));
            }
            _ => {}
        }
        Self {
            exit_code: code.exit_code(),
            machine,
        }
    }
}

/// Where the database lives and how to open it.
struct StoreTarget {
    path: PathBuf,
    config: StoreConfig,
}

impl StoreTarget {
    /// `--db`, then `ROLEMESH_DB`, then `database_path` from the config
    /// file, then `.rolemesh/rolemesh.sqlite`.
    fn resolve(db: Option<PathBuf>, config_path: Option<PathBuf>) -> Result<Self, CliError> {
        let config_path =
            config_path.unwrap_or_else(|| resolve_rolemesh_config_path(ConfigPathScope::User));
        let file = RolemeshConfig::load(&config_path)?;
        let path = db
            .or_else(|| {
                std::env::var_os(ENV_ROLEMESH_DB)
                    .filter(|v| !v.is_empty())
                    .map(PathBuf::from)
            })
            .or(file.database_path)
            .unwrap_or_else(|| PathBuf::from(".rolemesh").join("rolemesh.sqlite"));
        Ok(Self {
            path,
            config: file.store.with_env_overrides()?,
        })
    }

    fn prepare_parent(&self) -> Result<(), CliError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| CliError::dependency(format!("{}: {e}", parent.display())))?;
        }
        Ok(())
    }

    fn open_raw(&self) -> Result<RoleStore, CliError> {
        self.prepare_parent()?;
        Ok(RoleStore::open_raw(&self.path, self.config.clone())?)
    }

    fn open(&self) -> Result<RoleStore, CliError> {
        self.prepare_parent()?;
        Ok(RoleStore::open(&self.path, self.config.clone())?)
    }
}

pub fn main_entry() -> ProcessExitCode {
    let wants_json = std::env::args().any(|arg| arg == "--json");
    match run() {
        Ok(()) => ProcessExitCode::from(ExitCode::Success.as_u8()),
        Err(err) => {
            emit_error(&err, wants_json);
            ProcessExitCode::from(err.exit_code.as_u8())
        }
    }
}

fn run() -> Result<(), CliError> {
    let Some(cli) = parse(std::env::args_os())? else {
        return Ok(());
    };
    logging::init_tracing(LogFlags {
        quiet: cli.quiet,
        verbose: cli.verbose,
        trace: cli.trace,
    });
    let output_mode = OutputMode { json: cli.json };
    let payload = dispatch(cli)?;
    helpers::emit_ok(output_mode, &payload)
}

/// Parses `args` and runs the command without printing, returning the
/// payload `rolemesh` would print. `None` when help or version was shown.
pub fn execute<I, T>(args: I) -> Result<Option<Value>, CliError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match parse(args)? {
        Some(cli) => dispatch(cli).map(Some),
        None => Ok(None),
    }
}

fn parse<I, T>(args: I) -> Result<Option<Cli>, CliError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Cli::try_parse_from(args) {
        Ok(cli) => Ok(Some(cli)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                print!("{err}");
                Ok(None)
            }
            _ => Err(CliError {
                exit_code: ExitCode::Usage,
                machine: MachineError::new(ErrorCode::UsageError, "invalid command line arguments")
                    .with_detail("error", &err.to_string()),
            }),
        },
    }
}

fn dispatch(cli: Cli) -> Result<Value, CliError> {
    if cli.print_config_paths {
        return Ok(config_paths_payload(cli.config.as_ref()));
    }
    let command = cli
        .command
        .ok_or_else(|| CliError::usage("missing command; see --help".to_string()))?;
    match command {
        Commands::Condition { command } => actions::run_condition(command),
        Commands::Openapi { command } => actions::run_openapi(command),
        Commands::Db { command } => {
            actions::run_db(command, &StoreTarget::resolve(cli.db, cli.config)?)
        }
        Commands::Release { command } => {
            actions::run_release(command, &StoreTarget::resolve(cli.db, cli.config)?)
        }
        Commands::Role { command } => {
            actions::run_role(command, &StoreTarget::resolve(cli.db, cli.config)?)
        }
        Commands::Tag { command } => {
            actions::run_tag(command, &StoreTarget::resolve(cli.db, cli.config)?)
        }
    }
}

fn config_paths_payload(explicit: Option<&PathBuf>) -> Value {
    json!({
        "explicit_config": explicit,
        "user_config": resolve_rolemesh_config_path(ConfigPathScope::User),
        "workspace_config": resolve_rolemesh_config_path(ConfigPathScope::Workspace),
    })
}

fn emit_error(error: &CliError, machine_json: bool) {
    if machine_json {
        match serde_json::to_string(&error.machine) {
            Ok(payload) => eprintln!("{payload}"),
            Err(_) => eprintln!(
                "{{\"code\":\"Internal\",\"message\":\"failed to encode structured error\",\"details\":{{}}}}"
            ),
        }
    } else {
        eprintln!("{}: {}", error.machine.code, error.machine.message);
    }
}
