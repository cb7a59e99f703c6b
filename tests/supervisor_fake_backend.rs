// tests/supervisor_fake_backend.rs

use std::error::Error;
use std::io;
use std::path::Path;
use std::task::Poll;
use std::time::Duration;

use tokio::time::{sleep, Instant};

use devstack::errors::DevstackError;
use devstack::supervisor::{ChildSpec, SupervisionResult, Supervisor};
use devstack_test_utils::fake_backend::{FakeBackend, FakeBehaviour, FakeEvent};
use devstack_test_utils::{api_and_ui, init_tracing, settings};

type TestResult = Result<(), Box<dyn Error>>;

fn spawned(name: &str) -> FakeEvent {
    FakeEvent::Spawned(name.to_string())
}

fn terminated(name: &str) -> FakeEvent {
    FakeEvent::Terminated(name.to_string())
}

fn killed(name: &str) -> FakeEvent {
    FakeEvent::Killed(name.to_string())
}

/// Both children start, the user interrupts after 3 poll cycles: the session
/// ends cleanly and both children are stopped, last-launched first.
#[tokio::test(start_paused = true)]
async fn interrupt_after_three_polls_stops_both_in_reverse_order() -> TestResult {
    init_tracing();

    let backend = FakeBackend::new();
    let log = backend.log();
    let mut supervisor = Supervisor::new(backend, settings());

    let result = supervisor
        .run(
            Path::new("/project"),
            &api_and_ui(),
            sleep(Duration::from_millis(3_500)),
        )
        .await?;

    assert_eq!(result, SupervisionResult::UserInterrupted);
    assert_eq!(
        log.events(),
        vec![spawned("api"), spawned("ui"), terminated("ui"), terminated("api")]
    );
    // Three poll cycles plus the liveness check made during release.
    assert_eq!(log.polls("api"), 4);
    assert_eq!(log.polls("ui"), 4);
    assert!(log.alive().is_empty(), "leaked: {:?}", log.alive());
    Ok(())
}

/// `api` exits with code 1 on the third check while `ui` keeps running:
/// the result names `api`, and `ui` is stopped as part of the same call.
#[tokio::test(start_paused = true)]
async fn child_exit_is_reported_and_sibling_is_stopped() -> TestResult {
    init_tracing();

    let backend = FakeBackend::new().with("api", FakeBehaviour::running().exits_on_poll(3, 1));
    let log = backend.log();
    let mut supervisor = Supervisor::new(backend, settings());

    let result = supervisor
        .run(Path::new("/project"), &api_and_ui(), std::future::pending())
        .await?;

    assert_eq!(
        result,
        SupervisionResult::ChildExited {
            name: "api".to_string(),
            exit_code: 1,
        }
    );
    assert_eq!(
        log.events(),
        vec![spawned("api"), spawned("ui"), terminated("ui")],
        "api had already exited, so only ui needs stopping"
    );
    assert!(log.alive().is_empty());

    match result.into_result() {
        Err(DevstackError::ChildExited { name, exit_code }) => {
            assert_eq!(name, "api");
            assert_eq!(exit_code, 1);
        }
        other => panic!("expected ChildExited error, got {other:?}"),
    }
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn zero_exit_code_is_still_an_unexpected_exit() -> TestResult {
    let backend = FakeBackend::new().with("ui", FakeBehaviour::running().exits_on_poll(1, 0));
    let mut supervisor = Supervisor::new(backend, settings());

    let result = supervisor
        .run(Path::new("/project"), &api_and_ui(), std::future::pending())
        .await?;

    assert_eq!(
        result,
        SupervisionResult::ChildExited {
            name: "ui".to_string(),
            exit_code: 0,
        }
    );
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn simultaneous_exits_report_the_first_in_spec_order() -> TestResult {
    let backend = FakeBackend::new()
        .with("api", FakeBehaviour::running().exits_on_poll(2, 7))
        .with("ui", FakeBehaviour::running().exits_on_poll(2, 9));
    let mut supervisor = Supervisor::new(backend, settings());

    let result = supervisor
        .run(Path::new("/project"), &api_and_ui(), std::future::pending())
        .await?;

    assert_eq!(
        result,
        SupervisionResult::ChildExited {
            name: "api".to_string(),
            exit_code: 7,
        }
    );
    Ok(())
}

/// The second child fails to start: the first is stopped before `run`
/// returns `LaunchFailed`.
#[tokio::test(start_paused = true)]
async fn launch_failure_rolls_back_started_children() -> TestResult {
    init_tracing();

    let backend = FakeBackend::new().with(
        "ui",
        FakeBehaviour::running().fails_to_spawn(io::ErrorKind::PermissionDenied),
    );
    let log = backend.log();
    let mut supervisor = Supervisor::new(backend, settings());

    let err = supervisor
        .run(Path::new("/project"), &api_and_ui(), std::future::pending())
        .await
        .unwrap_err();

    match err {
        DevstackError::LaunchFailed {
            name,
            command,
            source,
        } => {
            assert_eq!(name, "ui");
            assert_eq!(command, "tool run ui");
            assert_eq!(source.kind(), io::ErrorKind::PermissionDenied);
        }
        other => panic!("expected LaunchFailed, got {other:?}"),
    }

    assert_eq!(log.events(), vec![spawned("api"), terminated("api")]);
    assert!(log.alive().is_empty());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn missing_launcher_starts_nothing() -> TestResult {
    let backend = FakeBackend::new().missing_program("tool");
    let log = backend.log();
    let mut supervisor = Supervisor::new(backend, settings());

    let err = supervisor
        .run(Path::new("/project"), &api_and_ui(), std::future::pending())
        .await
        .unwrap_err();

    match err {
        DevstackError::MissingLauncher { program } => assert_eq!(program, "tool"),
        other => panic!("expected MissingLauncher, got {other:?}"),
    }
    assert!(log.events().is_empty(), "nothing may be spawned: {:?}", log.events());
    Ok(())
}

/// A stop request that is already pending when the session starts wins over
/// launching: nothing is spawned at all.
#[tokio::test(start_paused = true)]
async fn interrupt_before_launch_spawns_nothing() -> TestResult {
    let backend = FakeBackend::new();
    let log = backend.log();
    let mut supervisor = Supervisor::new(backend, settings());

    let result = supervisor
        .run(Path::new("/project"), &api_and_ui(), std::future::ready(()))
        .await?;

    assert_eq!(result, SupervisionResult::UserInterrupted);
    assert!(log.events().is_empty(), "nothing may be spawned: {:?}", log.events());
    Ok(())
}

/// An interrupt that lands between two launches stops the remaining launches
/// and releases what already started.
#[tokio::test(start_paused = true)]
async fn interrupt_during_launch_stops_what_was_started() -> TestResult {
    let backend = FakeBackend::new();
    let log = backend.log();
    let mut supervisor = Supervisor::new(backend, settings());

    let after_first_spawn = {
        let log = log.clone();
        std::future::poll_fn(move |_| {
            if log.events().is_empty() {
                Poll::Pending
            } else {
                Poll::Ready(())
            }
        })
    };

    let result = supervisor
        .run(Path::new("/project"), &api_and_ui(), after_first_spawn)
        .await?;

    assert_eq!(result, SupervisionResult::UserInterrupted);
    assert_eq!(log.events(), vec![spawned("api"), terminated("api")]);
    assert!(log.alive().is_empty());
    Ok(())
}

/// A child that ignores the graceful request is killed once the grace
/// period is over.
#[tokio::test(start_paused = true)]
async fn stubborn_child_is_killed_after_grace_period() -> TestResult {
    init_tracing();

    let backend = FakeBackend::new().with("api", FakeBehaviour::running().ignores_terminate());
    let log = backend.log();
    let cfg = settings();
    let mut supervisor = Supervisor::new(backend, cfg);

    let started = Instant::now();
    let result = supervisor
        .run(
            Path::new("/project"),
            &api_and_ui(),
            sleep(Duration::from_millis(1_500)),
        )
        .await?;
    let elapsed = started.elapsed();

    assert_eq!(result, SupervisionResult::UserInterrupted);
    assert_eq!(
        log.events(),
        vec![
            spawned("api"),
            spawned("ui"),
            terminated("ui"),
            terminated("api"),
            killed("api"),
        ]
    );
    assert!(elapsed >= Duration::from_millis(1_500) + cfg.grace_period);
    assert!(log.alive().is_empty());
    Ok(())
}

/// An error raised while polling still tears everything down.
#[tokio::test(start_paused = true)]
async fn poll_error_propagates_after_teardown() -> TestResult {
    let backend = FakeBackend::new().with("ui", FakeBehaviour::running().poll_error_on(2));
    let log = backend.log();
    let mut supervisor = Supervisor::new(backend, settings());

    let err = supervisor
        .run(Path::new("/project"), &api_and_ui(), std::future::pending())
        .await
        .unwrap_err();

    assert!(matches!(err, DevstackError::IoError(_)), "got {err:?}");
    assert_eq!(
        log.events(),
        vec![spawned("api"), spawned("ui"), terminated("ui"), terminated("api")]
    );
    Ok(())
}

/// Interrupts are noticed right away, not at the next poll tick.
#[tokio::test(start_paused = true)]
async fn interrupt_is_not_delayed_by_poll_interval() -> TestResult {
    let backend = FakeBackend::new();
    let mut cfg = settings();
    cfg.poll_interval = Duration::from_secs(60);
    let mut supervisor = Supervisor::new(backend, cfg);

    let started = Instant::now();
    let result = supervisor
        .run(
            Path::new("/project"),
            &api_and_ui(),
            sleep(Duration::from_millis(200)),
        )
        .await?;

    assert_eq!(result, SupervisionResult::UserInterrupted);
    assert!(started.elapsed() < Duration::from_secs(1));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn supervises_any_number_of_children() -> TestResult {
    let specs = vec![
        ChildSpec::new("db", ["tool", "run", "db"]),
        ChildSpec::new("api", ["tool", "run", "dev"]),
        ChildSpec::new("ui", ["tool", "run", "ui"]),
    ];
    let backend = FakeBackend::new();
    let log = backend.log();
    let mut supervisor = Supervisor::new(backend, settings());

    let result = supervisor
        .run(Path::new("/project"), &specs, sleep(Duration::from_secs(2)))
        .await?;

    assert_eq!(result, SupervisionResult::UserInterrupted);
    assert_eq!(
        log.events(),
        vec![
            spawned("db"),
            spawned("api"),
            spawned("ui"),
            terminated("ui"),
            terminated("api"),
            terminated("db"),
        ]
    );
    Ok(())
}
