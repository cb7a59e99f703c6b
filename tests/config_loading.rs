// tests/config_loading.rs

use std::io::Write;
use std::time::Duration;

use tempfile::NamedTempFile;

use devstack::config::{apply_overrides, load_and_validate, load_from_path, ConfigFile, RawConfigFile};
use devstack::errors::DevstackError;

#[test]
fn full_config_file_is_loaded() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[launcher]
program = "pnpm"
scripts = ["serve", "proxy"]

[manifest]
file_name = "package.json"
skip_dirs = ["node_modules", ".pnpm-store"]

[supervisor]
poll_interval = "250ms"
grace_period = "3s"
"#
    )
    .unwrap();

    let cfg = load_and_validate(file.path()).unwrap();

    assert_eq!(cfg.launcher.program, "pnpm");
    assert_eq!(cfg.manifest.skip_dirs, vec!["node_modules", ".pnpm-store"]);
    assert_eq!(cfg.supervisor.poll_interval, Duration::from_millis(250));
    assert_eq!(cfg.supervisor.grace_period, Duration::from_secs(3));

    let specs = cfg.child_specs();
    assert_eq!(specs[0].command(), ["pnpm", "run", "serve"]);
    assert_eq!(specs[1].command(), ["pnpm", "run", "proxy"]);
}

#[test]
fn invalid_duration_returns_config_error() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "[supervisor]\ngrace_period = \"soon\"\n").unwrap();

    match load_and_validate(file.path()) {
        Err(DevstackError::ConfigError(msg)) => {
            assert!(msg.contains("grace_period"), "{msg}");
        }
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn malformed_toml_returns_toml_error() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "[launcher\nprogram = ").unwrap();

    let result = load_and_validate(file.path());
    assert!(matches!(result, Err(DevstackError::TomlError(_))), "{result:?}");
}

#[test]
fn missing_explicit_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = load_from_path(dir.path().join("Devstack.toml"));
    assert!(matches!(result, Err(DevstackError::ConfigError(_))));
}

#[test]
fn cli_overrides_win_over_file_values() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "[supervisor]\npoll_interval = \"2s\"\ngrace_period = \"9s\"\n").unwrap();

    let mut raw = load_from_path(file.path()).unwrap();
    apply_overrides(&mut raw, Some("100ms"), None);
    let cfg = ConfigFile::try_from(raw).unwrap();

    assert_eq!(cfg.supervisor.poll_interval, Duration::from_millis(100));
    assert_eq!(cfg.supervisor.grace_period, Duration::from_secs(9));
}

#[test]
fn overflowing_override_is_a_config_error() {
    let mut raw = RawConfigFile::default();
    apply_overrides(&mut raw, None, Some("99999999999999999h"));

    match ConfigFile::try_from(raw) {
        Err(DevstackError::ConfigError(msg)) => {
            assert!(msg.contains("grace_period") && msg.contains("too large"), "{msg}");
        }
        Err(e) => panic!("expected ConfigError, got: {e:?}"),
        Ok(_) => panic!("expected error, got Ok"),
    }
}

