// src/config/validate.rs

use std::collections::HashSet;
use std::time::Duration;

use crate::config::duration::parse_duration;
use crate::config::model::{ConfigFile, RawConfigFile, SupervisorSettings};
use crate::errors::{DevstackError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = DevstackError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_launcher(&raw)?;
        validate_manifest(&raw)?;
        let supervisor = validate_supervisor(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.launcher, raw.manifest, supervisor))
    }
}

fn validate_launcher(cfg: &RawConfigFile) -> Result<()> {
    if cfg.launcher.program.trim().is_empty() {
        return Err(DevstackError::ConfigError(
            "[launcher].program must not be empty".to_string(),
        ));
    }

    if cfg.launcher.scripts.is_empty() {
        return Err(DevstackError::ConfigError(
            "[launcher].scripts must name at least one script".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for script in &cfg.launcher.scripts {
        if script.trim().is_empty() {
            return Err(DevstackError::ConfigError(
                "[launcher].scripts contains an empty script name".to_string(),
            ));
        }
        if !seen.insert(script.as_str()) {
            return Err(DevstackError::ConfigError(format!(
                "[launcher].scripts lists '{script}' more than once"
            )));
        }
    }

    Ok(())
}

fn validate_manifest(cfg: &RawConfigFile) -> Result<()> {
    if cfg.manifest.file_name.trim().is_empty() {
        return Err(DevstackError::ConfigError(
            "[manifest].file_name must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_supervisor(cfg: &RawConfigFile) -> Result<SupervisorSettings> {
    Ok(SupervisorSettings {
        poll_interval: non_zero_duration("poll_interval", &cfg.supervisor.poll_interval)?,
        grace_period: non_zero_duration("grace_period", &cfg.supervisor.grace_period)?,
    })
}

fn non_zero_duration(field: &str, value: &str) -> Result<Duration> {
    let duration = parse_duration(value)
        .map_err(|e| DevstackError::ConfigError(format!("[supervisor].{field}: {e}")))?;

    if duration.is_zero() {
        return Err(DevstackError::ConfigError(format!(
            "[supervisor].{field} must be greater than zero (got '{value}')"
        )));
    }

    Ok(duration)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(toml_src: &str) -> RawConfigFile {
        toml::from_str(toml_src).unwrap()
    }

    #[test]
    fn defaults_are_valid() {
        let cfg = ConfigFile::try_from(RawConfigFile::default()).unwrap();
        assert_eq!(cfg.supervisor, SupervisorSettings::default());
    }

    #[test]
    fn parses_custom_durations() {
        let cfg = ConfigFile::try_from(raw(
            r#"
[supervisor]
poll_interval = "200ms"
grace_period = "2s"
"#,
        ))
        .unwrap();

        assert_eq!(cfg.supervisor.poll_interval, Duration::from_millis(200));
        assert_eq!(cfg.supervisor.grace_period, Duration::from_secs(2));
    }

    #[test]
    fn rejects_zero_poll_interval() {
        let err = ConfigFile::try_from(raw("[supervisor]\npoll_interval = \"0s\"\n")).unwrap_err();
        match err {
            DevstackError::ConfigError(msg) => assert!(msg.contains("poll_interval")),
            other => panic!("expected ConfigError, got {other:?}"),
        }
    }

    #[test]
    fn rejects_duplicate_scripts() {
        let err = ConfigFile::try_from(raw("[launcher]\nscripts = [\"dev\", \"dev\"]\n")).unwrap_err();
        assert!(matches!(err, DevstackError::ConfigError(msg) if msg.contains("more than once")));
    }

    #[test]
    fn rejects_empty_program_and_scripts() {
        assert!(ConfigFile::try_from(raw("[launcher]\nprogram = \" \"\n")).is_err());
        assert!(ConfigFile::try_from(raw("[launcher]\nscripts = []\n")).is_err());
    }
}
