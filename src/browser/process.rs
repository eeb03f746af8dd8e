//! Chrome child process ownership.
//!
//! [`ProcessGuard`] owns the spawned browser. Termination is graceful
//! first (SIGTERM on Unix), escalating to a forced kill only if the process
//! is still alive after the grace period. Dropping an unterminated guard
//! sends the forced kill.

// ============================================================================
// Imports
// ============================================================================

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::{Child, Command};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Default delay between the graceful signal and the forced kill.
pub const DEFAULT_KILL_GRACE: Duration = Duration::from_millis(2_000);

// ============================================================================
// ProcessGuard
// ============================================================================

/// Guards a child process and ensures it is killed when dropped.
#[derive(Debug)]
pub struct ProcessGuard {
    /// The child process handle, `None` once terminated.
    child: Option<Child>,
    /// Process ID for logging.
    pid: u32,
}

impl ProcessGuard {
    /// Spawns `binary` with `args`, stdio detached.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProcessLaunchFailed`] if the spawn fails.
    pub fn spawn(binary: &Path, args: &[String]) -> Result<Self> {
        let child = Command::new(binary)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(Error::process_launch_failed)?;

        let guard = Self::new(child);
        info!(pid = guard.pid, binary = %binary.display(), "Chrome process spawned");
        Ok(guard)
    }

    /// Wraps an already spawned child.
    #[must_use]
    pub fn new(child: Child) -> Self {
        let pid = child.id().unwrap_or(0);
        debug!(pid, "Process guard created");
        Self {
            child: Some(child),
            pid,
        }
    }

    /// Returns the process ID.
    #[inline]
    #[must_use]
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Returns `true` if the process has been terminated through this guard.
    #[inline]
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.child.is_none()
    }

    /// Terminates the process: graceful signal, then a forced kill if it is
    /// still running after `grace`.
    ///
    /// Calling this again after it returned is a no-op, as is terminating
    /// a process that already exited on its own.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if signalling or reaping the process fails.
    pub async fn terminate(&mut self, grace: Duration) -> Result<()> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };

        if let Some(status) = child.try_wait()? {
            debug!(pid = self.pid, %status, "Process already exited");
            return Ok(());
        }

        debug!(pid = self.pid, "Sending terminate signal");
        send_terminate(&mut child)?;

        match timeout(grace, child.wait()).await {
            Ok(status) => {
                let status = status?;
                info!(pid = self.pid, %status, "Process terminated");
            }
            Err(_) => {
                warn!(pid = self.pid, grace_ms = grace.as_millis() as u64, "Process ignored terminate signal, killing");
                child.kill().await?;
                info!(pid = self.pid, "Process killed");
            }
        }
        Ok(())
    }
}

impl Drop for ProcessGuard {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take()
            && let Err(e) = child.start_kill()
        {
            debug!(pid = self.pid, error = %e, "Failed to send kill signal in Drop");
        }
    }
}

// ============================================================================
// Signals
// ============================================================================

#[cfg(unix)]
fn send_terminate(child: &mut Child) -> Result<()> {
    use nix::sys::signal::{Signal, kill};
    use nix::unistd::Pid;

    let Some(pid) = child.id() else {
        return Ok(());
    };
    let pid = i32::try_from(pid).map_err(|_| Error::config(format!("pid {pid} out of range")))?;
    kill(Pid::from_raw(pid), Signal::SIGTERM).map_err(std::io::Error::from)?;
    Ok(())
}

#[cfg(not(unix))]
fn send_terminate(child: &mut Child) -> Result<()> {
    child.start_kill()?;
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> ProcessGuard {
        ProcessGuard::spawn(Path::new("/bin/sh"), &["-c".to_string(), script.to_string()])
            .expect("spawn sh")
    }

    #[test]
    fn test_default_grace() {
        assert_eq!(DEFAULT_KILL_GRACE.as_millis(), 2_000);
    }

    #[tokio::test]
    async fn test_spawn_missing_binary() {
        let err = ProcessGuard::spawn(Path::new("/nonexistent/chrome"), &[]).expect_err("missing");
        assert!(matches!(err, Error::ProcessLaunchFailed { .. }));
    }

    #[tokio::test]
    async fn test_terminate_graceful() {
        let mut guard = sh("exec sleep 30");
        assert!(guard.pid() > 0);

        guard.terminate(DEFAULT_KILL_GRACE).await.expect("terminate");
        assert!(guard.is_terminated());
    }

    #[tokio::test]
    async fn test_terminate_escalates_to_kill() {
        let mut guard = sh("trap '' TERM; exec sleep 30");
        // Let the shell install the trap before signalling.
        tokio::time::sleep(Duration::from_millis(200)).await;

        let start = std::time::Instant::now();
        guard
            .terminate(Duration::from_millis(300))
            .await
            .expect("terminate");
        assert!(start.elapsed() >= Duration::from_millis(300));
        assert!(guard.is_terminated());
    }

    #[tokio::test]
    async fn test_terminate_twice_is_noop() {
        let mut guard = sh("exec sleep 30");
        guard.terminate(DEFAULT_KILL_GRACE).await.expect("first");
        guard.terminate(DEFAULT_KILL_GRACE).await.expect("second");
    }

    #[tokio::test]
    async fn test_terminate_after_exit() {
        let mut guard = sh("exit 0");
        tokio::time::sleep(Duration::from_millis(200)).await;
        guard.terminate(DEFAULT_KILL_GRACE).await.expect("already exited");
        assert!(guard.is_terminated());
    }
}
