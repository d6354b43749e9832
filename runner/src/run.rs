//! Top-level Prisma CLI invocation.
//!
//! [`run_cli`] makes sure the binaries are cached, shims the schema if its
//! datasource lacks `url`, composes the child environment and runs the CLI
//! once. The temp schema, if any, is removed before `run_cli` returns on
//! every path.

use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;
use std::process::Command;

use anyhow::{Context, Result};
use tracing::{debug, instrument};

use crate::core::env::compose_env;
use crate::io::process::run_passthrough;
use crate::io::schema::shim_schema;
use crate::io::toolchain::Toolchain;

/// One CLI invocation.
#[derive(Debug, Clone)]
pub struct RunRequest {
    /// Arguments for the Prisma CLI, e.g. `["migrate", "dev"]`.
    pub args: Vec<String>,
    /// Connect the child's stdout and stderr to ours.
    pub forward_output: bool,
    /// Child working directory; relative schema paths resolve against it.
    pub workdir: PathBuf,
    /// Environment the child inherits before runner entries are applied.
    pub base_env: Vec<(OsString, OsString)>,
    /// Directory the patched schema copy is written to.
    pub temp_dir: PathBuf,
}

impl RunRequest {
    /// Request inheriting this process's working directory and environment.
    pub fn from_current_process(args: Vec<String>, forward_output: bool) -> Self {
        Self {
            args,
            forward_output,
            workdir: PathBuf::from("."),
            base_env: std::env::vars_os().collect(),
            temp_dir: std::env::temp_dir(),
        }
    }
}

/// Stage a [`run_cli`] failure happened in, attached as error context.
///
/// Retrieve it with `err.downcast_ref::<RunFailure>()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunFailure {
    Fetch,
    Shim,
    Execution { args: Vec<String> },
}

impl fmt::Display for RunFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunFailure::Fetch => write!(f, "could not fetch binaries"),
            RunFailure::Shim => write!(f, "failed to shim schema"),
            RunFailure::Execution { args } => write!(f, "could not run {args:?}"),
        }
    }
}

/// Run the Prisma CLI with `request.args`.
///
/// Nothing is retried. Errors carry a [`RunFailure`] naming the stage.
#[instrument(skip_all, fields(args = ?request.args))]
pub fn run_cli<T: Toolchain>(toolchain: &T, request: &RunRequest) -> Result<()> {
    debug!("running cli");

    let cache_dir = toolchain.cache_dir();
    toolchain
        .fetch_if_missing(&cache_dir)
        .context(RunFailure::Fetch)?;

    let cli_path = cache_dir.join(toolchain.cli_name());

    // Owns the temp schema; dropping it on any return removes the file.
    let shimmed = shim_schema(&request.args, &request.workdir, &request.temp_dir)
        .context(RunFailure::Shim)?;

    let env = compose_env(
        &request.base_env,
        toolchain.engines(),
        &cache_dir,
        toolchain.engine_version(),
        &toolchain.binary_platform_name(),
    );

    debug!(cli = %cli_path.display(), args = ?shimmed.args, "spawning prisma cli");
    let mut cmd = Command::new(&cli_path);
    cmd.args(&shimmed.args)
        .current_dir(&request.workdir)
        .env_clear()
        .envs(env.iter().map(|entry| (&entry.key, &entry.value)));

    run_passthrough(cmd, request.forward_output).with_context(|| RunFailure::Execution {
        args: request.args.clone(),
    })?;

    if let Some(temp_schema) = shimmed.temp_schema {
        temp_schema.dispose();
    }
    Ok(())
}
