// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{DevstackError, Result};

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization. Use [`load_and_validate`] to get
/// a usable [`ConfigFile`].
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| {
        DevstackError::ConfigError(format!("reading config file {}: {e}", path.display()))
    })?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and run validation.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    ConfigFile::try_from(raw_config)
}

/// Load the raw config the CLI asked for.
///
/// - An explicit path must exist.
/// - Without one, [`default_config_path`] is used if present, otherwise the
///   built-in defaults.
pub fn load_raw(explicit: Option<&Path>) -> Result<RawConfigFile> {
    match explicit {
        Some(path) => load_from_path(path),
        None => {
            let path = default_config_path();
            if path.is_file() {
                debug!(path = %path.display(), "using default config file");
                load_from_path(&path)
            } else {
                debug!("no config file found; using built-in defaults");
                Ok(RawConfigFile::default())
            }
        }
    }
}

/// Apply `--poll-interval` / `--grace-period` on top of the file values.
pub fn apply_overrides(
    raw: &mut RawConfigFile,
    poll_interval: Option<&str>,
    grace_period: Option<&str>,
) {
    if let Some(poll) = poll_interval {
        raw.supervisor.poll_interval = poll.to_string();
    }
    if let Some(grace) = grace_period {
        raw.supervisor.grace_period = grace.to_string();
    }
}

/// `Devstack.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Devstack.toml")
}
