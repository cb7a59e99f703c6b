// src/supervisor/mod.rs

//! Supervision of the development stack.
//!
//! - [`ChildSpec`]: what to launch.
//! - [`SupervisionResult`]: how a supervision session ended.
//! - [`runtime::Supervisor`]: launch, watch, and tear down.

pub mod runtime;

use std::fmt;

use crate::errors::{DevstackError, Result};

pub use runtime::Supervisor;

/// A named command line. `command[0]` is the executable; the rest are
/// arguments passed verbatim (no shell involved).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildSpec {
    name: String,
    command: Vec<String>,
}

impl ChildSpec {
    /// # Panics
    ///
    /// Panics if `command` is empty.
    pub fn new(
        name: impl Into<String>,
        command: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        let command: Vec<String> = command.into_iter().map(Into::into).collect();
        assert!(!command.is_empty(), "ChildSpec command must name an executable");
        Self {
            name: name.into(),
            command,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn command(&self) -> &[String] {
        &self.command
    }

    pub fn program(&self) -> &str {
        &self.command[0]
    }

    pub fn args(&self) -> &[String] {
        &self.command[1..]
    }
}

impl fmt::Display for ChildSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command.join(" "))
    }
}

/// Terminal state of one [`Supervisor::run`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SupervisionResult {
    /// The user asked the stack to stop.
    UserInterrupted,
    /// A child exited on its own before any stop was requested.
    ChildExited { name: String, exit_code: i32 },
}

impl SupervisionResult {
    /// Any child exit is a failure of the session; only an interrupt is `Ok`.
    pub fn into_result(self) -> Result<()> {
        match self {
            SupervisionResult::UserInterrupted => Ok(()),
            SupervisionResult::ChildExited { name, exit_code } => {
                Err(DevstackError::ChildExited { name, exit_code })
            }
        }
    }
}
