//! Prisma binaries: where they live and what they are called.
//!
//! The [`Toolchain`] trait decouples invocation from binary management.
//! Tests use a fake toolchain that points at a scripted CLI.

use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use tracing::debug;

use crate::core::engines::EngineDescriptor;
use crate::io::config::RunnerConfig;

/// Overrides the binaries cache directory.
pub const CACHE_DIR_ENV: &str = "PRISMA_RUNNER_CACHE_DIR";

/// Source of the Prisma CLI and engine binaries.
pub trait Toolchain {
    /// Directory holding the CLI binary and the engine version directories.
    fn cache_dir(&self) -> PathBuf;

    /// Make sure the native binaries are present in `cache_dir`.
    fn fetch_if_missing(&self, cache_dir: &Path) -> Result<()>;

    /// File name of the CLI binary inside the cache directory.
    fn cli_name(&self) -> String;

    /// Platform suffix of engine binary names, including any extension.
    fn binary_platform_name(&self) -> String;

    fn engine_version(&self) -> &str;

    fn engines(&self) -> &[EngineDescriptor];
}

/// Toolchain backed by a pre-populated cache directory.
///
/// Downloading is not supported; `fetch_if_missing` only checks that the
/// CLI binary is already in place.
#[derive(Debug, Clone)]
pub struct CachedToolchain {
    config: RunnerConfig,
    cache_dir: PathBuf,
}

impl CachedToolchain {
    pub fn new(config: RunnerConfig) -> Result<Self> {
        config.validate()?;
        let cache_dir = match &config.cache_dir {
            Some(dir) => dir.clone(),
            None => global_cache_dir(&config.cli_version)?,
        };
        Ok(Self { config, cache_dir })
    }
}

impl Toolchain for CachedToolchain {
    fn cache_dir(&self) -> PathBuf {
        self.cache_dir.clone()
    }

    fn fetch_if_missing(&self, cache_dir: &Path) -> Result<()> {
        let cli = cache_dir.join(self.cli_name());
        if cli.is_file() {
            debug!(path = %cli.display(), "prisma cli present in cache");
            return Ok(());
        }
        Err(anyhow!(
            "prisma cli binary not found at {}; populate the cache directory or set {}",
            cli.display(),
            CACHE_DIR_ENV
        ))
    }

    fn cli_name(&self) -> String {
        with_extension(format!("prisma-cli-{}", platform_name()))
    }

    fn binary_platform_name(&self) -> String {
        let platform = self
            .config
            .binary_platform
            .clone()
            .unwrap_or_else(|| platform_name().to_string());
        with_extension(platform)
    }

    fn engine_version(&self) -> &str {
        &self.config.engine_version
    }

    fn engines(&self) -> &[EngineDescriptor] {
        &self.config.engines
    }
}

/// Default cache directory: `<user cache>/prisma/binaries/cli/<cli_version>`.
///
/// `PRISMA_RUNNER_CACHE_DIR` replaces the whole path when set.
pub fn global_cache_dir(cli_version: &str) -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(CACHE_DIR_ENV).filter(|dir| !dir.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    let base = user_cache_dir().ok_or_else(|| {
        anyhow!(
            "could not determine a cache directory; set {} or XDG_CACHE_HOME",
            CACHE_DIR_ENV
        )
    })?;
    Ok(base
        .join("prisma")
        .join("binaries")
        .join("cli")
        .join(cli_version))
}

/// Operating system name as used in Prisma binary names.
pub fn platform_name() -> &'static str {
    match std::env::consts::OS {
        "macos" => "darwin",
        other => other,
    }
}

fn with_extension(name: String) -> String {
    if cfg!(windows) {
        format!("{name}.exe")
    } else {
        name
    }
}

fn user_cache_dir() -> Option<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|home| PathBuf::from(home).join("Library").join("Caches"))
    }

    #[cfg(target_os = "windows")]
    {
        std::env::var_os("LOCALAPPDATA").map(PathBuf::from)
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        non_empty_var("XDG_CACHE_HOME")
            .map(PathBuf::from)
            .or_else(|| non_empty_var("HOME").map(|home| PathBuf::from(home).join(".cache")))
    }
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn non_empty_var(key: &str) -> Option<std::ffi::OsString> {
    std::env::var_os(key).filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn toolchain_in(dir: &Path) -> CachedToolchain {
        CachedToolchain::new(RunnerConfig {
            cache_dir: Some(dir.to_path_buf()),
            binary_platform: Some("debian-openssl-3.0.x".to_string()),
            ..RunnerConfig::default()
        })
        .expect("toolchain")
    }

    #[test]
    fn configured_cache_dir_is_used_verbatim() {
        let temp = tempfile::tempdir().expect("tempdir");
        assert_eq!(toolchain_in(temp.path()).cache_dir(), temp.path());
    }

    #[test]
    fn fetch_fails_when_cli_missing() {
        let temp = tempfile::tempdir().expect("tempdir");
        let toolchain = toolchain_in(temp.path());

        let err = toolchain.fetch_if_missing(temp.path()).unwrap_err();
        assert!(err.to_string().contains("prisma cli binary not found"));
    }

    #[test]
    fn fetch_succeeds_when_cli_present() {
        let temp = tempfile::tempdir().expect("tempdir");
        let toolchain = toolchain_in(temp.path());
        fs::write(temp.path().join(toolchain.cli_name()), b"").expect("write cli");

        toolchain.fetch_if_missing(temp.path()).expect("fetch");
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn names_follow_prisma_conventions() {
        let temp = tempfile::tempdir().expect("tempdir");
        let toolchain = toolchain_in(temp.path());
        assert_eq!(toolchain.cli_name(), "prisma-cli-linux");
        assert_eq!(toolchain.binary_platform_name(), "debian-openssl-3.0.x");
    }

    #[test]
    fn binary_platform_defaults_to_os_name() {
        let temp = tempfile::tempdir().expect("tempdir");
        let toolchain = CachedToolchain::new(RunnerConfig {
            cache_dir: Some(temp.path().to_path_buf()),
            ..RunnerConfig::default()
        })
        .expect("toolchain");
        assert!(toolchain.binary_platform_name().starts_with(platform_name()));
    }
}
