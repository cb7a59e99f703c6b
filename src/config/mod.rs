// src/config/mod.rs

//! Configuration loading and validation for devstack.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate it and parse durations (`validate.rs`, `duration.rs`).

pub mod duration;
pub mod loader;
pub mod model;
pub mod validate;

pub use duration::parse_duration;
pub use loader::{apply_overrides, load_and_validate, load_from_path, load_raw};
pub use model::{
    ConfigFile, LauncherSection, ManifestSection, RawConfigFile, SupervisorSection,
    SupervisorSettings,
};
