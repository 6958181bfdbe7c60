// SPDX-License-Identifier: Apache-2.0

use rolemesh_core::{ENV_ROLEMESH_LOG_JSON, ENV_ROLEMESH_LOG_LEVEL};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::LogFlags;

pub(crate) fn env_bool(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(v) => match v.as_str() {
            "1" | "true" | "TRUE" | "yes" | "YES" => true,
            "0" | "false" | "FALSE" | "no" | "NO" => false,
            _ => default,
        },
        Err(_) => default,
    }
}

/// Command line flags beat `ROLEMESH_LOG_LEVEL`.
pub(crate) fn flag_directive(flags: LogFlags) -> Option<&'static str> {
    if flags.trace {
        Some("trace")
    } else if flags.verbose > 0 {
        Some("debug")
    } else if flags.quiet {
        Some("error")
    } else {
        None
    }
}

/// Logs go to stderr so stdout stays a single JSON payload.
pub(crate) fn init_tracing(flags: LogFlags) {
    let filter = match flag_directive(flags) {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::try_from_env(ENV_ROLEMESH_LOG_LEVEL)
            .unwrap_or_else(|_| EnvFilter::new("info")),
    };
    let registry = tracing_subscriber::registry().with(filter);
    let installed = if env_bool(ENV_ROLEMESH_LOG_JSON, false) {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };
    if let Err(err) = installed {
        eprintln!("tracing already initialized: {err}");
    }
}
