// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `devstack`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "devstack",
    version,
    about = "Start the API dev server and the browser proxy together, and stop them together.",
    long_about = None
)]
pub struct CliArgs {
    /// Directory (or file inside it) containing the `package.json` to run.
    ///
    /// If omitted, the current directory and the directory of this executable
    /// are searched.
    #[arg(long, value_name = "PATH")]
    pub project_root: Option<PathBuf>,

    /// Path to the config file (TOML).
    ///
    /// If omitted, `Devstack.toml` in the current directory is used when it
    /// exists; otherwise built-in defaults apply.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `DEVSTACK_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// How often to check whether the children are still alive (e.g. "500ms").
    #[arg(long, value_name = "DURATION")]
    pub poll_interval: Option<String>,

    /// How long to wait after asking a child to stop before killing it (e.g. "5s").
    #[arg(long, value_name = "DURATION")]
    pub grace_period: Option<String>,

    /// Resolve the project root and print the commands, but don't start anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
