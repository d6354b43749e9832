//! Running the Prisma CLI as a pass-through child process.

use std::fmt;
use std::process::{Command, ExitStatus, Stdio};

use anyhow::{Context, Result};
use tracing::{debug, error, instrument};

/// A child process that ran to completion with a non-zero status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildExit {
    /// Exit code, or `None` when the child was killed by a signal.
    pub code: Option<i32>,
}

impl fmt::Display for ChildExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "exit status: {code}"),
            None => write!(f, "terminated by signal"),
        }
    }
}

impl std::error::Error for ChildExit {}

/// Spawn `cmd` and block until it exits.
///
/// Stdin is always inherited. Stdout and stderr are inherited when
/// `forward_output` is set and discarded otherwise. A non-zero exit is
/// returned as a [`ChildExit`] error.
#[instrument(skip_all, fields(forward_output = forward_output))]
pub fn run_passthrough(mut cmd: Command, forward_output: bool) -> Result<ExitStatus> {
    cmd.stdin(Stdio::inherit());
    if forward_output {
        cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
    } else {
        cmd.stdout(Stdio::null()).stderr(Stdio::null());
    }

    debug!("spawning child process");
    let mut child = match cmd.spawn() {
        Ok(c) => c,
        Err(e) => {
            error!(err = %e, "failed to spawn command");
            return Err(e).context("spawn command");
        }
    };

    let status = child.wait().context("wait for command")?;
    debug!(exit_code = ?status.code(), "command finished");

    if !status.success() {
        return Err(ChildExit {
            code: status.code(),
        }
        .into());
    }
    Ok(status)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::test_support::spawn_lock;

    #[test]
    fn zero_exit_is_success() {
        let _lock = spawn_lock();
        let mut cmd = Command::new("/bin/sh");
        cmd.args(["-c", "exit 0"]);
        let status = run_passthrough(cmd, false).expect("run");
        assert!(status.success());
    }

    #[test]
    fn non_zero_exit_carries_code() {
        let _lock = spawn_lock();
        let mut cmd = Command::new("/bin/sh");
        cmd.args(["-c", "exit 7"]);
        let err = run_passthrough(cmd, false).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ChildExit>(),
            Some(&ChildExit { code: Some(7) })
        );
    }

    #[test]
    fn missing_binary_fails_to_spawn() {
        let cmd = Command::new("/definitely/not/a/prisma-cli");
        let err = run_passthrough(cmd, false).unwrap_err();
        assert!(err.to_string().contains("spawn command"));
    }
}
