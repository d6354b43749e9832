//! Schema resolution and the on-disk side of the url shim.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, instrument};

use crate::core::args::{locate_schema, rewrite_schema_arg};
use crate::core::shim::{ShimResult, evaluate};
use crate::io::temp_schema::{TempSchema, materialize_in};

/// Locations checked, in order, when no `--schema` flag is given.
pub const DEFAULT_SCHEMA_PATHS: [&str; 2] = ["schema.prisma", "prisma/schema.prisma"];

/// Arguments to run the CLI with, plus the temp schema they may point at.
///
/// The temp schema is removed when this value is dropped, so it must outlive
/// the child process.
#[derive(Debug)]
pub struct ShimmedArgs {
    pub args: Vec<String>,
    pub temp_schema: Option<TempSchema>,
}

impl ShimmedArgs {
    fn unchanged(args: &[String]) -> Self {
        Self {
            args: args.to_vec(),
            temp_schema: None,
        }
    }
}

/// Resolve the schema file the CLI will read.
///
/// A non-empty `--schema` value wins; otherwise the first existing default
/// location under `workdir` is used.
pub fn resolve_schema_path(args: &[String], workdir: &Path) -> Option<PathBuf> {
    if let Some(explicit) = locate_schema(args).filter(|path| !path.is_empty()) {
        return Some(workdir.join(explicit));
    }
    DEFAULT_SCHEMA_PATHS
        .iter()
        .map(|candidate| workdir.join(candidate))
        .find(|candidate| candidate.exists())
}

/// Apply the url shim for the schema referenced by `args`.
///
/// A missing or unreadable schema leaves the arguments unchanged. Only
/// failing to write the patched copy into `temp_dir` is an error.
#[instrument(skip_all, fields(workdir = %workdir.display()))]
pub fn shim_schema(args: &[String], workdir: &Path, temp_dir: &Path) -> Result<ShimmedArgs> {
    let Some(schema_path) = resolve_schema_path(args, workdir) else {
        debug!("no schema found, skipping shim");
        return Ok(ShimmedArgs::unchanged(args));
    };

    let contents = match fs::read(&schema_path) {
        Ok(contents) => contents,
        Err(err) => {
            debug!(path = %schema_path.display(), err = %err, "could not read schema, skipping shim");
            return Ok(ShimmedArgs::unchanged(args));
        }
    };

    let ShimResult::Patched { document, .. } = evaluate(&contents) else {
        return Ok(ShimmedArgs::unchanged(args));
    };

    let temp_schema =
        materialize_in(temp_dir, &document).context("could not materialize patched schema")?;
    let temp_path = temp_schema
        .path()
        .to_str()
        .with_context(|| {
            format!(
                "temp schema path is not valid UTF-8: {}",
                temp_schema.path().display()
            )
        })?
        .to_string();

    debug!(from = %schema_path.display(), to = %temp_path, "redirecting schema");
    Ok(ShimmedArgs {
        args: rewrite_schema_arg(args, &temp_path),
        temp_schema: Some(temp_schema),
    })
}
