// src/config/model.rs

use std::time::Duration;

use serde::Deserialize;

use crate::supervisor::ChildSpec;

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [launcher]
/// program = "npm"
/// scripts = ["dev", "ui"]
///
/// [manifest]
/// file_name = "package.json"
/// skip_dirs = ["node_modules"]
///
/// [supervisor]
/// poll_interval = "1s"
/// grace_period = "5s"
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub launcher: LauncherSection,

    #[serde(default)]
    pub manifest: ManifestSection,

    #[serde(default)]
    pub supervisor: SupervisorSection,
}

/// `[launcher]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LauncherSection {
    /// Build-tool executable, looked up on `PATH`.
    #[serde(default = "default_program")]
    pub program: String,

    /// Scripts to run, in launch order. Each becomes `<program> run <script>`
    /// and must be declared in the manifest's `scripts` table.
    #[serde(default = "default_scripts")]
    pub scripts: Vec<String>,
}

fn default_program() -> String {
    "npm".to_string()
}

fn default_scripts() -> Vec<String> {
    vec!["dev".to_string(), "ui".to_string()]
}

impl Default for LauncherSection {
    fn default() -> Self {
        Self {
            program: default_program(),
            scripts: default_scripts(),
        }
    }
}

/// `[manifest]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ManifestSection {
    #[serde(default = "default_manifest_file_name")]
    pub file_name: String,

    /// Directory names that are never searched (dependency caches).
    #[serde(default = "default_skip_dirs")]
    pub skip_dirs: Vec<String>,
}

fn default_manifest_file_name() -> String {
    "package.json".to_string()
}

fn default_skip_dirs() -> Vec<String> {
    vec!["node_modules".to_string()]
}

impl Default for ManifestSection {
    fn default() -> Self {
        Self {
            file_name: default_manifest_file_name(),
            skip_dirs: default_skip_dirs(),
        }
    }
}

/// `[supervisor]` section. Durations are strings like `"500ms"` or `"5s"`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SupervisorSection {
    #[serde(default = "default_poll_interval")]
    pub poll_interval: String,

    #[serde(default = "default_grace_period")]
    pub grace_period: String,
}

fn default_poll_interval() -> String {
    "1s".to_string()
}

fn default_grace_period() -> String {
    "5s".to_string()
}

impl Default for SupervisorSection {
    fn default() -> Self {
        Self {
            poll_interval: default_poll_interval(),
            grace_period: default_grace_period(),
        }
    }
}

/// Timing knobs for the supervisor, already parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupervisorSettings {
    pub poll_interval: Duration,
    pub grace_period: Duration,
}

impl Default for SupervisorSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            grace_period: Duration::from_secs(5),
        }
    }
}

/// Validated configuration. Only obtainable through `TryFrom<RawConfigFile>`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub launcher: LauncherSection,
    pub manifest: ManifestSection,
    pub supervisor: SupervisorSettings,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        launcher: LauncherSection,
        manifest: ManifestSection,
        supervisor: SupervisorSettings,
    ) -> Self {
        Self {
            launcher,
            manifest,
            supervisor,
        }
    }

    /// Built-in defaults: `npm run dev` + `npm run ui`, 1s polling, 5s grace.
    pub fn defaults() -> Self {
        Self::new_unchecked(
            LauncherSection::default(),
            ManifestSection::default(),
            SupervisorSettings::default(),
        )
    }

    /// One `ChildSpec` per configured script, in launch order.
    pub fn child_specs(&self) -> Vec<ChildSpec> {
        let program = &self.launcher.program;
        self.launcher
            .scripts
            .iter()
            .map(|script| {
                ChildSpec::new(
                    format!("{program} run {script}"),
                    [program.as_str(), "run", script.as_str()],
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_specs_follow_script_order() {
        let cfg = ConfigFile::defaults();
        let specs = cfg.child_specs();

        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].name(), "npm run dev");
        assert_eq!(specs[0].command(), ["npm", "run", "dev"]);
        assert_eq!(specs[1].name(), "npm run ui");
        assert_eq!(specs[1].command(), ["npm", "run", "ui"]);
    }

    #[test]
    fn empty_toml_yields_defaults() {
        let raw: RawConfigFile = toml::from_str("").unwrap();
        assert_eq!(raw.launcher, LauncherSection::default());
        assert_eq!(raw.manifest, ManifestSection::default());
        assert_eq!(raw.supervisor, SupervisorSection::default());
    }
}
