// src/manifest/mod.rs

//! Locating the project whose manifest declares the scripts we launch.
//!
//! - [`ManifestRules`] decides whether a single manifest file qualifies.
//! - [`resolver`] walks directories to find the first qualifying manifest.

pub mod resolver;

use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::config::ConfigFile;
use crate::fs::FileSystem;

pub use resolver::{default_search_roots, RootResolver};

/// What makes a manifest usable, and which directories are never searched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestRules {
    pub file_name: String,
    pub required_scripts: Vec<String>,
    pub skip_dirs: Vec<String>,
}

impl ManifestRules {
    pub fn new(
        file_name: impl Into<String>,
        required_scripts: impl IntoIterator<Item = impl Into<String>>,
        skip_dirs: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            required_scripts: required_scripts.into_iter().map(Into::into).collect(),
            skip_dirs: skip_dirs.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_config(cfg: &ConfigFile) -> Self {
        Self::new(
            cfg.manifest.file_name.clone(),
            cfg.launcher.scripts.iter().cloned(),
            cfg.manifest.skip_dirs.iter().cloned(),
        )
    }

    /// True if `dir_name` is a dependency cache that must not be entered.
    pub fn is_skipped_dir(&self, dir_name: &str) -> bool {
        self.skip_dirs.iter().any(|skip| skip == dir_name)
    }

    /// Read and inspect a candidate manifest.
    ///
    /// Unreadable or malformed files simply don't qualify.
    pub fn qualifies<F: FileSystem + ?Sized>(&self, fs: &F, manifest: &Path) -> bool {
        let contents = match fs.read_to_string(manifest) {
            Ok(contents) => contents,
            Err(e) => {
                debug!(path = %manifest.display(), error = %e, "skipping unreadable manifest");
                return false;
            }
        };

        match serde_json::from_str::<Value>(&contents) {
            Ok(doc) => self.declares_required_scripts(&doc),
            Err(e) => {
                debug!(path = %manifest.display(), error = %e, "skipping malformed manifest");
                false
            }
        }
    }

    /// The `scripts` member must be an object containing every required name.
    /// Script values are never inspected.
    pub fn declares_required_scripts(&self, doc: &Value) -> bool {
        match doc.get("scripts").and_then(Value::as_object) {
            Some(scripts) => self
                .required_scripts
                .iter()
                .all(|name| scripts.contains_key(name)),
            None => false,
        }
    }

    /// `'dev' and 'ui'`, `'a', 'b' and 'c'`.
    pub(crate) fn describe_scripts(&self) -> String {
        let quoted: Vec<String> = self
            .required_scripts
            .iter()
            .map(|s| format!("'{s}'"))
            .collect();
        match quoted.split_last() {
            None => String::new(),
            Some((last, [])) => last.clone(),
            Some((last, rest)) => format!("{} and {last}", rest.join(", ")),
        }
    }
}

impl Default for ManifestRules {
    fn default() -> Self {
        Self::from_config(&ConfigFile::defaults())
    }
}
