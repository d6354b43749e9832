//! Deterministic, pure logic shared by the runner.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! arguments, documents and environment snapshots and return deterministic
//! outputs suitable for tests.

pub mod args;
pub mod engines;
pub mod env;
pub mod shim;
