//! Environment composition for the Prisma CLI child process.
//!
//! The composed list is the base environment followed by appended entries.
//! Consumers apply it in order, so a later entry for the same key wins.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::Path;

use tracing::debug;

use crate::core::engines::EngineDescriptor;

/// Feature flags set on every invocation.
pub const FIXED_FLAGS: [(&str, &str); 2] = [
    ("PRISMA_HIDE_UPDATE_MESSAGE", "true"),
    ("PRISMA_CLI_QUERY_ENGINE_TYPE", "binary"),
];

/// One `KEY=VALUE` environment entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvEntry {
    pub key: OsString,
    pub value: OsString,
}

impl EnvEntry {
    pub fn new(key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for EnvEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}={}",
            self.key.to_string_lossy(),
            self.value.to_string_lossy()
        )
    }
}

/// Build the child environment.
///
/// `base` is copied verbatim. The fixed flags follow, then one path per
/// engine: a non-empty value for the engine's variable in `base` is kept as
/// an override, otherwise the path is
/// `<cache_dir>/<engine_version>/prisma-<name>-<binary_platform>`.
pub fn compose_env(
    base: &[(OsString, OsString)],
    engines: &[EngineDescriptor],
    cache_dir: &Path,
    engine_version: &str,
    binary_platform: &str,
) -> Vec<EnvEntry> {
    let mut entries: Vec<EnvEntry> = base
        .iter()
        .map(|(key, value)| EnvEntry::new(key.clone(), value.clone()))
        .collect();

    entries.extend(
        FIXED_FLAGS
            .iter()
            .map(|(key, value)| EnvEntry::new(*key, *value)),
    );

    for engine in engines {
        let value = match lookup(base, &engine.env) {
            Some(custom) if !custom.is_empty() => {
                debug!(engine = %engine.name, path = %custom.to_string_lossy(), "overriding engine path");
                custom.to_os_string()
            }
            _ => cache_dir
                .join(engine_version)
                .join(engine.binary_file_name(binary_platform))
                .into_os_string(),
        };
        entries.push(EnvEntry::new(engine.env.as_str(), value));
    }

    entries
}

/// Value `key` resolves to once `entries` are applied in order.
pub fn effective_env<'a>(entries: &'a [EnvEntry], key: &str) -> Option<&'a OsStr> {
    entries
        .iter()
        .rev()
        .find(|entry| entry.key == key)
        .map(|entry| entry.value.as_os_str())
}

fn lookup<'a>(base: &'a [(OsString, OsString)], key: &str) -> Option<&'a OsStr> {
    base.iter()
        .rev()
        .find(|(name, _)| name == key)
        .map(|(_, value)| value.as_os_str())
}
