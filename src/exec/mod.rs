// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`backend`] provides the `ProcessBackend` / `ChildHandle` traits and the
//!   `TokioBackend` used in production; tests replace it with a fake.
//! - [`process`] wraps one launched child with a graceful-then-forced
//!   release step.
//! - [`stack`] holds launched children and releases them in reverse order.

pub mod backend;
pub mod process;
pub mod stack;

pub use backend::{BoxFuture, ChildHandle, ProcessBackend, TokioBackend, TokioChild};
pub use process::{ManagedProcess, ReleaseOutcome};
pub use stack::ProcessStack;
