// src/supervisor/runtime.rs

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::{pin, Pin};

use tracing::{debug, error, info, warn};

use crate::config::SupervisorSettings;
use crate::errors::{DevstackError, Result};
use crate::exec::{ManagedProcess, ProcessBackend, ProcessStack, TokioBackend};

use super::{ChildSpec, SupervisionResult};

/// Launches a fixed set of children, watches them, and always stops them
/// together.
///
/// One `run` call is one session:
/// 1. every executable must be found on `PATH` before anything starts;
/// 2. children start in order; a failed start stops those already running,
///    and an interrupt that is already pending stops launching altogether;
/// 3. children are polled every `poll_interval` until the interrupt future
///    resolves or one of them exits;
/// 4. all children are released in reverse order before `run` returns.
pub struct Supervisor<B: ProcessBackend> {
    backend: B,
    settings: SupervisorSettings,
}

impl Supervisor<TokioBackend> {
    pub fn with_settings(settings: SupervisorSettings) -> Self {
        Self::new(TokioBackend, settings)
    }
}

impl<B: ProcessBackend> Supervisor<B> {
    pub fn new(backend: B, settings: SupervisorSettings) -> Self {
        Self { backend, settings }
    }

    /// Run one supervision session rooted at `working_dir`.
    ///
    /// Returns `UserInterrupted` when `interrupt` resolves first, or
    /// `ChildExited` for the first child (in `specs` order) seen to exit.
    pub async fn run<I>(
        &mut self,
        working_dir: &Path,
        specs: &[ChildSpec],
        interrupt: I,
    ) -> Result<SupervisionResult>
    where
        I: Future<Output = ()>,
    {
        let programs = self.locate_programs(specs)?;
        let mut interrupt = pin!(interrupt);

        let mut stack = ProcessStack::new(self.settings.grace_period);
        let outcome = self
            .supervise(&mut stack, working_dir, specs, &programs, interrupt.as_mut())
            .await;

        stack.teardown().await;
        outcome
    }

    async fn supervise<I>(
        &mut self,
        stack: &mut ProcessStack<B::Child>,
        working_dir: &Path,
        specs: &[ChildSpec],
        programs: &[PathBuf],
        mut interrupt: Pin<&mut I>,
    ) -> Result<SupervisionResult>
    where
        I: Future<Output = ()>,
    {
        for (spec, program) in specs.iter().zip(programs) {
            if is_ready(interrupt.as_mut()).await {
                if stack.is_empty() {
                    info!("interrupt received before launch; nothing started");
                } else {
                    info!(started = ?stack.names(), "interrupt received during launch");
                }
                return Ok(SupervisionResult::UserInterrupted);
            }
            self.launch(stack, working_dir, spec, program)?;
        }

        info!(
            working_dir = %working_dir.display(),
            processes = ?stack.names(),
            "development stack running; press Ctrl+C to stop"
        );
        self.watch(stack, interrupt).await
    }

    /// Resolve `command[0]` of every spec before launching anything.
    fn locate_programs(&self, specs: &[ChildSpec]) -> Result<Vec<PathBuf>> {
        specs
            .iter()
            .map(|spec| {
                self.backend.locate(spec.program()).ok_or_else(|| {
                    error!(program = %spec.program(), "launcher not found on PATH");
                    DevstackError::MissingLauncher {
                        program: spec.program().to_string(),
                    }
                })
            })
            .collect()
    }

    fn launch(
        &mut self,
        stack: &mut ProcessStack<B::Child>,
        working_dir: &Path,
        spec: &ChildSpec,
        program: &Path,
    ) -> Result<()> {
        debug!(process = %spec.name(), program = %program.display(), "spawning");

        let child = self
            .backend
            .spawn(program, spec, working_dir)
            .map_err(|source| {
                error!(process = %spec.name(), error = %source, "launch failed");
                DevstackError::LaunchFailed {
                    name: spec.name().to_string(),
                    command: spec.to_string(),
                    source,
                }
            })?;

        let process = ManagedProcess::new(spec.clone(), child);
        info!(process = %spec.name(), pid = ?process.pid(), "started");
        stack.push(process);
        Ok(())
    }

    /// Poll loop. The interrupt wins if it is ready at the same time as a tick.
    async fn watch<I>(
        &self,
        stack: &mut ProcessStack<B::Child>,
        mut interrupt: Pin<&mut I>,
    ) -> Result<SupervisionResult>
    where
        I: Future<Output = ()>,
    {
        let mut ticks: u64 = 0;

        loop {
            tokio::select! {
                biased;
                () = interrupt.as_mut() => {
                    info!(ticks, "interrupt received; stopping development stack");
                    return Ok(SupervisionResult::UserInterrupted);
                }
                () = tokio::time::sleep(self.settings.poll_interval) => {}
            }
            ticks += 1;

            if let Some((name, exit_code)) = stack.first_exited()? {
                warn!(process = %name, exit_code, ticks, "process exited unexpectedly");
                return Ok(SupervisionResult::ChildExited { name, exit_code });
            }
        }
    }
}

/// Poll `interrupt` once without waiting.
async fn is_ready<I: Future<Output = ()>>(interrupt: Pin<&mut I>) -> bool {
    tokio::select! {
        biased;
        () = interrupt => true,
        () = std::future::ready(()) => false,
    }
}
