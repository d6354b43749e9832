//! Exit codes for the `prisma-runner` binary.
//!
//! When the Prisma CLI itself exits non-zero, its code is passed through
//! unchanged instead of these.

/// The Prisma CLI ran and exited successfully.
pub const OK: i32 = 0;
/// Config, cache, shim or spawn failure, or the CLI was killed by a signal.
pub const FAILURE: i32 = 1;
