// src/exec/process.rs

//! A launched child with an explicit, idempotent release step.

use std::io;
use std::time::{Duration, Instant};

use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::exec::backend::ChildHandle;
use crate::supervisor::ChildSpec;

/// Upper bound for reaping a process after it was force-killed.
const KILL_REAP_TIMEOUT: Duration = Duration::from_secs(1);

/// How a [`ManagedProcess::release`] call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// `release` had already run for this handle.
    AlreadyReleased,
    /// The process was gone before we asked it to stop.
    AlreadyExited(i32),
    /// The process stopped within the grace period.
    Terminated(i32),
    /// The grace period ran out (or waiting failed) and the process was killed.
    Killed,
    /// Kill was attempted but the exit could not be confirmed.
    Unconfirmed,
}

/// Supervisor-owned handle for one launched process.
pub struct ManagedProcess<C: ChildHandle> {
    spec: ChildSpec,
    child: C,
    started_at: Instant,
    released: bool,
}

impl<C: ChildHandle> ManagedProcess<C> {
    pub fn new(spec: ChildSpec, child: C) -> Self {
        Self {
            spec,
            child,
            started_at: Instant::now(),
            released: false,
        }
    }

    pub fn name(&self) -> &str {
        self.spec.name()
    }

    pub fn pid(&self) -> Option<u32> {
        self.child.pid()
    }

    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Non-blocking check; `Some(code)` once the process has exited.
    pub fn poll_exit(&mut self) -> io::Result<Option<i32>> {
        self.child.try_wait()
    }

    /// Stop the process: graceful request, bounded wait, then force-kill.
    ///
    /// Never fails; problems are logged and the next step is tried. Calling
    /// it again is a no-op.
    pub async fn release(&mut self, grace: Duration) -> ReleaseOutcome {
        if self.released {
            return ReleaseOutcome::AlreadyReleased;
        }
        self.released = true;

        let name = self.spec.name().to_string();
        let pid = self.child.pid();

        match self.child.try_wait() {
            Ok(Some(code)) => {
                debug!(process = %name, ?pid, exit_code = code, "process already exited");
                return ReleaseOutcome::AlreadyExited(code);
            }
            Ok(None) => {}
            Err(e) => warn!(process = %name, ?pid, error = %e, "liveness check failed during release"),
        }

        info!(process = %name, ?pid, grace_ms = grace.as_millis() as u64, "stopping process");
        if let Err(e) = self.child.terminate() {
            warn!(process = %name, ?pid, error = %e, "failed to request graceful shutdown");
        }

        match timeout(grace, self.child.wait()).await {
            Ok(Ok(code)) => {
                debug!(process = %name, ?pid, exit_code = code, "process stopped");
                ReleaseOutcome::Terminated(code)
            }
            Ok(Err(e)) => {
                warn!(process = %name, ?pid, error = %e, "error waiting for process; killing");
                self.force_kill(&name).await
            }
            Err(_) => {
                warn!(process = %name, ?pid, "process ignored shutdown request; killing");
                self.force_kill(&name).await
            }
        }
    }

    async fn force_kill(&mut self, name: &str) -> ReleaseOutcome {
        let pid = self.child.pid();
        if let Err(e) = self.child.kill() {
            warn!(process = %name, ?pid, error = %e, "failed to kill process");
        }

        match timeout(KILL_REAP_TIMEOUT, self.child.wait()).await {
            Ok(Ok(_)) => ReleaseOutcome::Killed,
            Ok(Err(e)) => {
                warn!(process = %name, ?pid, error = %e, "could not reap killed process");
                ReleaseOutcome::Unconfirmed
            }
            Err(_) => {
                warn!(process = %name, ?pid, "killed process did not exit in time");
                ReleaseOutcome::Unconfirmed
            }
        }
    }
}
