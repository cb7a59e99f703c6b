use std::collections::{BTreeSet, HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use devstack::exec::{BoxFuture, ChildHandle, ProcessBackend};
use devstack::supervisor::ChildSpec;

/// Exit code reported by fake children that were terminated or killed.
pub const SIGNALLED_EXIT_CODE: i32 = -1;

/// Something a fake child went through, in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeEvent {
    Spawned(String),
    Terminated(String),
    Killed(String),
}

/// Script for one fake child, keyed by `ChildSpec::name`.
#[derive(Debug, Clone, Default)]
pub struct FakeBehaviour {
    exit_on_poll: Option<(u32, i32)>,
    poll_error_on: Option<u32>,
    ignore_terminate: bool,
    spawn_error: Option<io::ErrorKind>,
}

impl FakeBehaviour {
    /// Runs until stopped.
    pub fn running() -> Self {
        Self::default()
    }

    /// The `n`-th liveness check (1-based) sees the process exited with `code`.
    pub fn exits_on_poll(mut self, n: u32, code: i32) -> Self {
        self.exit_on_poll = Some((n, code));
        self
    }

    /// The `n`-th liveness check fails with an I/O error.
    pub fn poll_error_on(mut self, n: u32) -> Self {
        self.poll_error_on = Some(n);
        self
    }

    /// Graceful termination requests are ignored; only a kill stops it.
    pub fn ignores_terminate(mut self) -> Self {
        self.ignore_terminate = true;
        self
    }

    /// Spawning this spec fails.
    pub fn fails_to_spawn(mut self, kind: io::ErrorKind) -> Self {
        self.spawn_error = Some(kind);
        self
    }
}

#[derive(Debug, Default)]
struct FakeState {
    events: Vec<FakeEvent>,
    polls: HashMap<String, u32>,
    alive: BTreeSet<String>,
}

/// Shared view of everything the fake children did, readable after the
/// supervisor has dropped them.
#[derive(Debug, Clone, Default)]
pub struct FakeLog {
    state: Arc<Mutex<FakeState>>,
}

impl FakeLog {
    pub fn events(&self) -> Vec<FakeEvent> {
        self.state.lock().unwrap().events.clone()
    }

    /// Number of liveness checks made against `name`.
    pub fn polls(&self, name: &str) -> u32 {
        self.state
            .lock()
            .unwrap()
            .polls
            .get(name)
            .copied()
            .unwrap_or(0)
    }

    /// Names of fake children still running.
    pub fn alive(&self) -> Vec<String> {
        self.state.lock().unwrap().alive.iter().cloned().collect()
    }

    fn push(&self, event: FakeEvent) {
        self.state.lock().unwrap().events.push(event);
    }
}

/// A `ProcessBackend` that never touches the OS.
#[derive(Debug, Default)]
pub struct FakeBackend {
    missing: HashSet<String>,
    behaviours: HashMap<String, FakeBehaviour>,
    log: FakeLog,
    next_pid: u32,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            next_pid: 4000,
            ..Self::default()
        }
    }

    /// Make `locate(program)` fail.
    pub fn missing_program(mut self, program: &str) -> Self {
        self.missing.insert(program.to_string());
        self
    }

    pub fn with(mut self, name: &str, behaviour: FakeBehaviour) -> Self {
        self.behaviours.insert(name.to_string(), behaviour);
        self
    }

    pub fn log(&self) -> FakeLog {
        self.log.clone()
    }
}

impl ProcessBackend for FakeBackend {
    type Child = FakeChild;

    fn locate(&self, program: &str) -> Option<PathBuf> {
        if self.missing.contains(program) {
            None
        } else {
            Some(Path::new("/fake/bin").join(program))
        }
    }

    fn spawn(&mut self, _program: &Path, spec: &ChildSpec, _cwd: &Path) -> io::Result<FakeChild> {
        let behaviour = self
            .behaviours
            .get(spec.name())
            .cloned()
            .unwrap_or_default();

        if let Some(kind) = behaviour.spawn_error {
            return Err(io::Error::new(kind, format!("fake spawn failure for {}", spec.name())));
        }

        self.next_pid += 1;
        let name = spec.name().to_string();
        {
            let mut state = self.log.state.lock().unwrap();
            state.events.push(FakeEvent::Spawned(name.clone()));
            state.alive.insert(name.clone());
        }

        Ok(FakeChild {
            name,
            pid: self.next_pid,
            behaviour,
            log: self.log.clone(),
            polls: 0,
            exit_code: None,
        })
    }
}

pub struct FakeChild {
    name: String,
    pid: u32,
    behaviour: FakeBehaviour,
    log: FakeLog,
    polls: u32,
    exit_code: Option<i32>,
}

impl FakeChild {
    fn exit(&mut self, code: i32) {
        if self.exit_code.is_none() {
            self.exit_code = Some(code);
            self.log.state.lock().unwrap().alive.remove(&self.name);
        }
    }
}

impl ChildHandle for FakeChild {
    fn pid(&self) -> Option<u32> {
        Some(self.pid)
    }

    fn try_wait(&mut self) -> io::Result<Option<i32>> {
        self.polls += 1;
        *self
            .log
            .state
            .lock()
            .unwrap()
            .polls
            .entry(self.name.clone())
            .or_insert(0) += 1;

        if self.behaviour.poll_error_on == Some(self.polls) {
            return Err(io::Error::other(format!("fake poll failure for {}", self.name)));
        }
        if let Some((n, code)) = self.behaviour.exit_on_poll {
            if self.polls >= n {
                self.exit(code);
            }
        }
        Ok(self.exit_code)
    }

    fn terminate(&mut self) -> io::Result<()> {
        self.log.push(FakeEvent::Terminated(self.name.clone()));
        if !self.behaviour.ignore_terminate {
            self.exit(SIGNALLED_EXIT_CODE);
        }
        Ok(())
    }

    fn kill(&mut self) -> io::Result<()> {
        self.log.push(FakeEvent::Killed(self.name.clone()));
        self.exit(SIGNALLED_EXIT_CODE);
        Ok(())
    }

    fn wait(&mut self) -> BoxFuture<'_, io::Result<i32>> {
        let exit_code = self.exit_code;
        Box::pin(async move {
            match exit_code {
                Some(code) => Ok(code),
                None => std::future::pending().await,
            }
        })
    }
}
