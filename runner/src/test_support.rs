//! Test-only helpers: a scripted Prisma CLI and the toolchain pointing at it.
//!
//! The fake CLI is a shell script that records its arguments, environment,
//! working directory and a snapshot of the schema it was pointed at.

use std::ffi::OsString;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result, anyhow};

use crate::core::args::locate_schema;
use crate::core::engines::{EngineDescriptor, default_engines};
use crate::io::toolchain::Toolchain;

pub const FAKE_CLI_NAME: &str = "prisma-cli-fake";
pub const FAKE_ENGINE_VERSION: &str = "test-engine";
pub const FAKE_BINARY_PLATFORM: &str = "test-platform";

const FAKE_CLI_SCRIPT: &str = r#"#!/bin/sh
log="$FAKE_CLI_LOG"
: > "$log"
schema=""
prev=""
for arg in "$@"; do
  printf 'arg=%s\n' "$arg" >> "$log"
  if [ -z "$schema" ]; then
    case "$arg" in
      --schema=*) schema="${arg#--schema=}" ;;
    esac
    if [ "$prev" = "--schema" ]; then schema="$arg"; fi
  fi
  prev="$arg"
done
printf 'pwd=%s\n' "$(pwd)" >> "$log"
env > "$log.env"
if [ -n "$schema" ] && [ -f "$schema" ]; then cat "$schema" > "$log.schema"; fi
exit "${FAKE_CLI_EXIT:-0}"
"#;

static SPAWN_LOCK: Mutex<()> = Mutex::new(());

/// Serialize tests that write or spawn executables.
///
/// Executing a script while another thread's fork still holds it open for
/// writing fails with `ETXTBSY`.
pub fn spawn_lock() -> MutexGuard<'static, ()> {
    SPAWN_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Toolchain whose CLI is the recording script, rooted in a test directory.
pub struct FakeToolchain {
    cache_dir: PathBuf,
    log_path: PathBuf,
    fail_fetch: bool,
    engines: Vec<EngineDescriptor>,
}

impl FakeToolchain {
    /// Install the fake CLI under `<root>/cache`.
    pub fn new(root: &Path) -> Result<Self> {
        let cache_dir = root.join("cache");
        install_fake_cli(&cache_dir.join(FAKE_CLI_NAME))?;
        Ok(Self {
            cache_dir,
            log_path: log_path(root),
            fail_fetch: false,
            engines: default_engines(),
        })
    }

    pub fn failing_fetch(mut self) -> Self {
        self.fail_fetch = true;
        self
    }

    /// Minimal environment for running the fake CLI from `root`.
    pub fn base_env(root: &Path) -> Vec<(OsString, OsString)> {
        let mut env = vec![("FAKE_CLI_LOG".into(), log_path(root).into_os_string())];
        if let Some(path) = std::env::var_os("PATH") {
            env.push(("PATH".into(), path));
        }
        env
    }

    /// What the fake CLI recorded, if it ran.
    pub fn invocation(&self) -> Option<Invocation> {
        let log = fs::read_to_string(&self.log_path).ok()?;
        let mut args = Vec::new();
        let mut workdir = None;
        for line in log.lines() {
            if let Some(arg) = line.strip_prefix("arg=") {
                args.push(arg.to_string());
            } else if let Some(dir) = line.strip_prefix("pwd=") {
                workdir = Some(PathBuf::from(dir));
            }
        }

        let env = fs::read_to_string(sibling(&self.log_path, ".env"))
            .unwrap_or_default()
            .lines()
            .filter_map(|line| line.split_once('='))
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        let schema = fs::read_to_string(sibling(&self.log_path, ".schema")).ok();

        Some(Invocation {
            args,
            env,
            workdir,
            schema,
        })
    }
}

impl Toolchain for FakeToolchain {
    fn cache_dir(&self) -> PathBuf {
        self.cache_dir.clone()
    }

    fn fetch_if_missing(&self, cache_dir: &Path) -> Result<()> {
        if self.fail_fetch {
            return Err(anyhow!("download of {} failed", cache_dir.display()));
        }
        Ok(())
    }

    fn cli_name(&self) -> String {
        FAKE_CLI_NAME.to_string()
    }

    fn binary_platform_name(&self) -> String {
        FAKE_BINARY_PLATFORM.to_string()
    }

    fn engine_version(&self) -> &str {
        FAKE_ENGINE_VERSION
    }

    fn engines(&self) -> &[EngineDescriptor] {
        &self.engines
    }
}

/// One recorded run of the fake CLI.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
    pub workdir: Option<PathBuf>,
    /// Contents of the schema file the CLI was pointed at, read while it ran.
    pub schema: Option<String>,
}

impl Invocation {
    pub fn schema_path(&self) -> Option<&str> {
        locate_schema(&self.args)
    }

    pub fn env_var(&self, key: &str) -> Option<&str> {
        self.env
            .iter()
            .rev()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }
}

/// Write the recording script to `path` and mark it executable.
pub fn install_fake_cli(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create fake cli dir {}", parent.display()))?;
    }
    fs::write(path, FAKE_CLI_SCRIPT)
        .with_context(|| format!("write fake cli {}", path.display()))?;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
        .with_context(|| format!("chmod fake cli {}", path.display()))?;
    Ok(())
}

fn log_path(root: &Path) -> PathBuf {
    root.join("cli.log")
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}
