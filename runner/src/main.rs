//! Prisma CLI runner.
//!
//! Runs the cached Prisma CLI with the engine binaries wired into its
//! environment, patching a schema whose datasource lacks `url` on the fly.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use prisma_runner::exit_codes;
use prisma_runner::io::config::load_config;
use prisma_runner::io::process::ChildExit;
use prisma_runner::io::toolchain::CachedToolchain;
use prisma_runner::logging;
use prisma_runner::run::{RunRequest, run_cli};

#[derive(Parser)]
#[command(
    name = "prisma-runner",
    version,
    about = "Run the Prisma CLI with cached engines and a schema compatibility shim"
)]
struct Cli {
    /// Runner config (TOML). Built-in defaults apply when the file is missing.
    #[arg(long, default_value = "prisma-runner.toml")]
    config: PathBuf,

    /// Discard the Prisma CLI's stdout and stderr.
    #[arg(short, long)]
    quiet: bool,

    /// Log runner decisions (schema shim, engine overrides) to stderr.
    #[arg(short, long)]
    verbose: bool,

    /// Directory to run the Prisma CLI in.
    #[arg(long)]
    workdir: Option<PathBuf>,

    /// Arguments for the Prisma CLI, e.g. `migrate dev --schema=db.prisma`.
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    if let Err(err) = run(cli) {
        eprintln!("{:#}", err);
        std::process::exit(exit_code_for(&err));
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli.config)?;
    let toolchain = CachedToolchain::new(config).context("resolve prisma toolchain")?;

    let mut request = RunRequest::from_current_process(cli.args, !cli.quiet);
    if let Some(workdir) = cli.workdir {
        request.workdir = workdir;
    }
    run_cli(&toolchain, &request)
}

/// The CLI's own exit code when it exited non-zero, otherwise `FAILURE`.
fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<ChildExit>())
        .and_then(|exit| exit.code)
        .unwrap_or(exit_codes::FAILURE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use prisma_runner::run::RunFailure;

    #[test]
    fn parse_passes_flags_through_to_prisma() {
        let cli = Cli::parse_from(["prisma-runner", "migrate", "dev", "--schema=a.prisma"]);
        assert_eq!(cli.args, vec!["migrate", "dev", "--schema=a.prisma"]);
        assert!(!cli.quiet);
    }

    #[test]
    fn parse_runner_flags_before_prisma_args() {
        let cli = Cli::parse_from([
            "prisma-runner",
            "--quiet",
            "--config",
            "custom.toml",
            "--",
            "db",
            "push",
            "--schema",
            "db.prisma",
        ]);
        assert!(cli.quiet);
        assert_eq!(cli.config, PathBuf::from("custom.toml"));
        assert_eq!(cli.args, vec!["db", "push", "--schema", "db.prisma"]);
    }

    #[test]
    fn child_exit_code_is_passed_through() {
        let err = anyhow::Error::new(ChildExit { code: Some(4) }).context(RunFailure::Execution {
            args: vec!["validate".to_string()],
        });
        assert_eq!(exit_code_for(&err), 4);
    }

    #[test]
    fn other_failures_use_generic_code() {
        let err = anyhow::anyhow!("boom").context(RunFailure::Fetch);
        assert_eq!(exit_code_for(&err), exit_codes::FAILURE);

        let signalled = anyhow::Error::new(ChildExit { code: None });
        assert_eq!(exit_code_for(&signalled), exit_codes::FAILURE);
    }
}
