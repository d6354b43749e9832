//! Temporary schema files holding a patched copy of the user's schema.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tempfile::{Builder, TempPath};
use tracing::debug;

const TEMP_PREFIX: &str = "schema-";
const TEMP_SUFFIX: &str = ".prisma";

/// A patched schema on disk, removed when the guard is disposed or dropped.
#[derive(Debug)]
pub struct TempSchema {
    path: TempPath,
}

impl TempSchema {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the file now. Removal errors are logged and ignored.
    pub fn dispose(self) {
        let shown = self.path.display().to_string();
        if let Err(err) = self.path.close() {
            debug!(path = %shown, err = %err, "could not remove temp schema");
        }
    }
}

/// Write `contents` to a uniquely named file inside `dir`.
///
/// The file is closed before returning. On failure nothing is left behind.
pub fn materialize_in(dir: &Path, contents: &[u8]) -> Result<TempSchema> {
    let mut file = Builder::new()
        .prefix(TEMP_PREFIX)
        .suffix(TEMP_SUFFIX)
        .tempfile_in(dir)
        .with_context(|| format!("could not create temp schema file in {}", dir.display()))?;

    // Dropping `file` on the error paths removes the partial artifact.
    file.write_all(contents)
        .and_then(|()| file.flush())
        .with_context(|| format!("could not write temp schema {}", file.path().display()))?;

    let path = file.into_temp_path();
    debug!(path = %path.display(), bytes = contents.len(), "materialized temp schema");
    Ok(TempSchema { path })
}
