pub mod fake_backend;

use std::sync::Once;
use std::time::Duration;

use devstack::config::SupervisorSettings;
use devstack::supervisor::ChildSpec;
use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// - Uses `with_test_writer()`, so logs are captured per-test.
/// - The Rust test harness only prints captured output for **failing** tests
///   (unless you run with `-- --nocapture`).
///
/// Enable levels with e.g.:
/// `RUST_LOG=debug cargo test`
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer() // print only for failing tests unless --nocapture
            .with_target(true)
            .init();
    });
}

/// Run a future with a 10-second timeout.
#[allow(dead_code)]
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(Duration::from_secs(10), f)
        .await
        .expect("Test timed out after 10 seconds")
}

/// Supervisor timings used by the tests: 1s polling, 5s grace.
pub fn settings() -> SupervisorSettings {
    SupervisorSettings {
        poll_interval: Duration::from_secs(1),
        grace_period: Duration::from_secs(5),
    }
}

/// The `api` + `ui` pair from the supervisor scenarios.
pub fn api_and_ui() -> Vec<ChildSpec> {
    vec![
        ChildSpec::new("api", ["tool", "run", "dev"]),
        ChildSpec::new("ui", ["tool", "run", "ui"]),
    ]
}
