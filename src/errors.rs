// src/errors.rs

//! Crate-wide error type and result alias.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DevstackError {
    #[error(
        "{program} was not found on your PATH. Install it and make sure it is \
         available before launching the development stack."
    )]
    MissingLauncher { program: String },

    #[error("{reason}")]
    ManifestNotFound { reason: String },

    #[error("failed to launch '{name}' ({command}): {source}")]
    LaunchFailed {
        name: String,
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{name} exited with status {exit_code}. Check its logs for details.")]
    ChildExited { name: String, exit_code: i32 },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl DevstackError {
    pub(crate) fn not_found(reason: impl Into<String>) -> Self {
        DevstackError::ManifestNotFound {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DevstackError>;
