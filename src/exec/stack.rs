// src/exec/stack.rs

//! Cleanup stack of launched processes.
//!
//! Processes are pushed in launch order and released in reverse order, so a
//! proxy started after its server is stopped before it.

use std::io;
use std::time::Duration;

use tracing::debug;

use crate::exec::backend::ChildHandle;
use crate::exec::process::{ManagedProcess, ReleaseOutcome};

pub struct ProcessStack<C: ChildHandle> {
    processes: Vec<ManagedProcess<C>>,
    grace: Duration,
    torn_down: bool,
}

impl<C: ChildHandle> ProcessStack<C> {
    pub fn new(grace: Duration) -> Self {
        Self {
            processes: Vec::new(),
            grace,
            torn_down: false,
        }
    }

    pub fn push(&mut self, process: ManagedProcess<C>) {
        self.processes.push(process);
    }

    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.processes.iter().map(ManagedProcess::name).collect()
    }

    /// First process (in launch order) that has exited, with its exit code.
    pub fn first_exited(&mut self) -> io::Result<Option<(String, i32)>> {
        for process in self.processes.iter_mut() {
            if let Some(code) = process.poll_exit()? {
                debug!(
                    process = %process.name(),
                    exit_code = code,
                    uptime_ms = process.started_at().elapsed().as_millis() as u64,
                    "exit observed"
                );
                return Ok(Some((process.name().to_string(), code)));
            }
        }
        Ok(None)
    }

    /// Release every process, last-launched first.
    ///
    /// Only the first call does any work; later calls return an empty list.
    pub async fn teardown(&mut self) -> Vec<(String, ReleaseOutcome)> {
        if self.torn_down {
            return Vec::new();
        }
        self.torn_down = true;

        let mut outcomes = Vec::with_capacity(self.processes.len());
        for process in self.processes.iter_mut().rev() {
            let outcome = process.release(self.grace).await;
            debug!(process = %process.name(), ?outcome, "released");
            outcomes.push((process.name().to_string(), outcome));
        }
        outcomes
    }
}
