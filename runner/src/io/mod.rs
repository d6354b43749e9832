//! I/O helpers for the runner: files, binaries and child processes.

pub mod config;
pub mod process;
pub mod schema;
pub mod temp_schema;
pub mod toolchain;
