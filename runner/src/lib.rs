//! Pass-through runner for the Prisma CLI.
//!
//! Runs the cached Prisma CLI binary with engine paths in its environment
//! and, when the schema's datasource block has no `url`, points the CLI at a
//! temporary patched copy of the schema instead. The architecture keeps a
//! strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (argument scanning, schema
//!   shim, environment composition). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (config, temp files, binaries,
//!   process execution).
//!
//! [`run`] coordinates the two to implement a single CLI invocation.

pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod run;
#[cfg(all(unix, any(test, feature = "test-support")))]
pub mod test_support;
