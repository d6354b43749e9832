//! Runner configuration, optionally loaded from a TOML file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::core::engines::{EngineDescriptor, default_engines};

/// Prisma CLI release whose binaries the cache holds.
pub const DEFAULT_CLI_VERSION: &str = "5.22.0";
/// Engine commit hash matching [`DEFAULT_CLI_VERSION`].
pub const DEFAULT_ENGINE_VERSION: &str = "605197351a3c8bdd595af2d2a9bc3025bca48ea2";

/// Runner configuration (TOML).
///
/// Every field is optional in the file; missing fields take the defaults
/// below.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RunnerConfig {
    /// Binaries cache directory. Derived from the user cache dir when unset.
    pub cache_dir: Option<PathBuf>,

    pub cli_version: String,

    /// Directory under the cache holding the engine binaries.
    pub engine_version: String,

    /// Platform suffix for engine binary names, e.g. `debian-openssl-3.0.x`.
    /// Falls back to the OS name.
    pub binary_platform: Option<String>,

    pub engines: Vec<EngineDescriptor>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            cache_dir: None,
            cli_version: DEFAULT_CLI_VERSION.to_string(),
            engine_version: DEFAULT_ENGINE_VERSION.to_string(),
            binary_platform: None,
            engines: default_engines(),
        }
    }
}

impl RunnerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.cli_version.trim().is_empty() {
            return Err(anyhow!("cli_version must be non-empty"));
        }
        if self.engine_version.trim().is_empty() {
            return Err(anyhow!("engine_version must be non-empty"));
        }
        if let Some(platform) = &self.binary_platform
            && platform.trim().is_empty()
        {
            return Err(anyhow!("binary_platform must be non-empty when set"));
        }
        for engine in &self.engines {
            if engine.name.trim().is_empty() || engine.env.trim().is_empty() {
                return Err(anyhow!("engines entries need a non-empty name and env"));
            }
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `RunnerConfig::default()`.
pub fn load_config(path: &Path) -> Result<RunnerConfig> {
    if !path.exists() {
        let cfg = RunnerConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: RunnerConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}
