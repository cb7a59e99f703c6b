// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod manifest;
pub mod supervisor;

use std::path::Path;

use tokio::sync::watch;
use tracing::{debug, error};

use crate::cli::CliArgs;
use crate::config::{apply_overrides, load_raw, ConfigFile};
use crate::errors::Result;
use crate::fs::RealFileSystem;
use crate::manifest::{ManifestRules, RootResolver};
use crate::supervisor::{ChildSpec, SupervisionResult, Supervisor};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - Ctrl-C handling
/// - config loading (file + CLI overrides)
/// - project root resolution
/// - the supervisor
pub async fn run(args: CliArgs) -> Result<()> {
    // Installed first so a Ctrl-C during the search is remembered; the
    // supervisor then declines to launch anything.
    let interrupted = spawn_interrupt_listener();

    let mut raw = load_raw(args.config.as_deref())?;
    apply_overrides(
        &mut raw,
        args.poll_interval.as_deref(),
        args.grace_period.as_deref(),
    );
    let cfg = ConfigFile::try_from(raw)?;

    let resolver = RootResolver::new(&RealFileSystem, ManifestRules::from_config(&cfg));
    let project_root = resolver.resolve(args.project_root.as_deref())?;
    let specs = cfg.child_specs();

    if args.dry_run {
        print_dry_run(&cfg, &project_root, &specs);
        return Ok(());
    }

    let mut supervisor = Supervisor::with_settings(cfg.supervisor);
    let result = supervisor
        .run(&project_root, &specs, wait_for_interrupt(interrupted))
        .await?;

    if result == SupervisionResult::UserInterrupted {
        debug!("development stack stopped");
    }
    result.into_result()
}

/// Ctrl-C → `true` on the returned channel.
fn spawn_interrupt_listener() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl+C");
            return;
        }
        let _ = tx.send(true);
    });
    rx
}

/// Resolves once Ctrl-C was seen, acknowledging it before teardown starts.
/// Never resolves if the listener failed.
async fn wait_for_interrupt(mut rx: watch::Receiver<bool>) {
    if rx.wait_for(|interrupted| *interrupted).await.is_err() {
        debug!("interrupt listener gone; only child exits can end the session");
        std::future::pending::<()>().await;
    }
    println!("\nStopping development stack…");
}

/// Print what would be launched, without starting anything.
fn print_dry_run(cfg: &ConfigFile, project_root: &Path, specs: &[ChildSpec]) {
    println!("devstack dry-run");
    println!("  project root = {}", project_root.display());
    println!("  supervisor.poll_interval = {:?}", cfg.supervisor.poll_interval);
    println!("  supervisor.grace_period = {:?}", cfg.supervisor.grace_period);
    println!();

    println!("processes ({}):", specs.len());
    for spec in specs {
        println!("  - {}", spec.name());
        println!("      cmd: {spec}");
    }

    debug!("dry-run complete (no execution)");
}
