// src/exec/backend.rs

//! Pluggable process backend.
//!
//! The supervisor talks to a `ProcessBackend` instead of `tokio::process`
//! directly, so tests can swap in a scripted fake while production uses
//! [`TokioBackend`].

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::process::{ExitStatus, Stdio};

use tokio::process::{Child, Command};
use tracing::debug;

use crate::supervisor::ChildSpec;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// One launched OS process, as seen by the supervisor.
///
/// Exit codes are plain integers; a process killed by a signal reports `-1`.
pub trait ChildHandle: Send {
    fn pid(&self) -> Option<u32>;

    /// Non-blocking liveness check: `Ok(Some(code))` once the process exited.
    fn try_wait(&mut self) -> io::Result<Option<i32>>;

    /// Ask the process to shut down gracefully.
    fn terminate(&mut self) -> io::Result<()>;

    /// Force-kill the process. Does not wait.
    fn kill(&mut self) -> io::Result<()>;

    /// Wait for the process to exit and reap it.
    fn wait(&mut self) -> BoxFuture<'_, io::Result<i32>>;
}

/// How executables are found and started.
pub trait ProcessBackend: Send {
    type Child: ChildHandle;

    /// Resolve `program` on the search path. `None` if it cannot be run.
    fn locate(&self, program: &str) -> Option<PathBuf>;

    /// Start `spec` using the already-located `program`, rooted at `cwd`.
    fn spawn(&mut self, program: &Path, spec: &ChildSpec, cwd: &Path) -> io::Result<Self::Child>;
}

/// Real backend: `which` for lookup, `tokio::process` for spawning.
///
/// Children inherit our stdout/stderr so their output stays visible. On Unix
/// each child leads its own process group, and signals go to the whole group
/// so that servers started by the launcher are stopped along with it. A
/// background group may not read the terminal, so stdin is closed there.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioBackend;

impl ProcessBackend for TokioBackend {
    type Child = TokioChild;

    fn locate(&self, program: &str) -> Option<PathBuf> {
        match which::which(program) {
            Ok(path) => Some(path),
            Err(e) => {
                debug!(program, error = %e, "executable lookup failed");
                None
            }
        }
    }

    fn spawn(&mut self, program: &Path, spec: &ChildSpec, cwd: &Path) -> io::Result<TokioChild> {
        let mut cmd = Command::new(program);
        cmd.args(spec.args())
            .current_dir(cwd)
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        #[cfg(unix)]
        cmd.stdin(Stdio::null()).process_group(0);
        #[cfg(not(unix))]
        cmd.stdin(Stdio::inherit());

        let child = cmd.spawn()?;
        Ok(TokioChild::new(child))
    }
}

pub struct TokioChild {
    child: Child,
    pid: Option<u32>,
}

impl TokioChild {
    fn new(child: Child) -> Self {
        let pid = child.id();
        Self { child, pid }
    }

    /// Signal every process in the child's group. The group id is the
    /// leader's pid, which stays valid after the leader itself has exited.
    #[cfg(unix)]
    fn signal_group(&self, signal: nix::sys::signal::Signal) -> io::Result<()> {
        use nix::errno::Errno;
        use nix::sys::signal::killpg;
        use nix::unistd::Pid;

        let Some(pgid) = self.pid else {
            return Ok(());
        };
        match killpg(Pid::from_raw(pgid as i32), signal) {
            Ok(()) => {
                debug!(pgid, ?signal, "signalled process group");
                Ok(())
            }
            // Nobody left in the group.
            Err(Errno::ESRCH) => Ok(()),
            Err(e) => Err(io::Error::from(e)),
        }
    }
}

impl ChildHandle for TokioChild {
    fn pid(&self) -> Option<u32> {
        self.pid
    }

    fn try_wait(&mut self) -> io::Result<Option<i32>> {
        Ok(self.child.try_wait()?.map(exit_code))
    }

    #[cfg(unix)]
    fn terminate(&mut self) -> io::Result<()> {
        self.signal_group(nix::sys::signal::Signal::SIGTERM)
    }

    #[cfg(not(unix))]
    fn terminate(&mut self) -> io::Result<()> {
        self.child.start_kill()
    }

    #[cfg(unix)]
    fn kill(&mut self) -> io::Result<()> {
        let group = self.signal_group(nix::sys::signal::Signal::SIGKILL);
        // The leader may already be reaped; that is not a failure here.
        match self.child.start_kill() {
            Err(e) if e.kind() != io::ErrorKind::InvalidInput => Err(e),
            _ => group,
        }
    }

    #[cfg(not(unix))]
    fn kill(&mut self) -> io::Result<()> {
        self.child.start_kill()
    }

    fn wait(&mut self) -> BoxFuture<'_, io::Result<i32>> {
        Box::pin(async move { self.child.wait().await.map(exit_code) })
    }
}

fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}
