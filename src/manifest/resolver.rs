// src/manifest/resolver.rs

//! Project root discovery.
//!
//! Given an optional starting path, find the directory holding the first
//! manifest that declares all required scripts. A manifest directly in the
//! search root always wins over anything deeper; below that the tree is
//! walked depth-first in name order, never entering dependency caches or
//! symlinked directories.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::ManifestRules;
use crate::errors::{DevstackError, Result};
use crate::fs::FileSystem;

pub struct RootResolver<'a, F: FileSystem + ?Sized> {
    fs: &'a F,
    rules: ManifestRules,
}

impl<'a, F: FileSystem + ?Sized> RootResolver<'a, F> {
    pub fn new(fs: &'a F, rules: ManifestRules) -> Self {
        Self { fs, rules }
    }

    /// Resolve from `start` if given, otherwise from [`default_search_roots`].
    pub fn resolve(&self, start: Option<&Path>) -> Result<PathBuf> {
        match start {
            Some(start) => {
                let absolute = absolutize(start)?;
                self.resolve_from(&absolute)
            }
            None => self.resolve_in_roots(&default_search_roots()),
        }
    }

    /// Resolve below an explicit, absolute starting path.
    pub fn resolve_from(&self, start: &Path) -> Result<PathBuf> {
        let mut candidate = self
            .fs
            .canonicalize(start)
            .map_err(|_| DevstackError::not_found(format!("{} does not exist", start.display())))?;

        if self.fs.is_file(&candidate) {
            if let Some(parent) = candidate.parent() {
                candidate = parent.to_path_buf();
            }
        }

        self.find_package_root(&candidate).ok_or_else(|| {
            DevstackError::not_found(format!(
                "Could not locate a {} with the required scripts under {}.",
                self.rules.file_name,
                candidate.display()
            ))
        })
    }

    /// Try each root in order, skipping roots that canonicalize to one
    /// already searched. The error lists every root.
    pub fn resolve_in_roots(&self, roots: &[PathBuf]) -> Result<PathBuf> {
        let mut seen: Vec<PathBuf> = Vec::new();

        for root in roots {
            let resolved = self.fs.canonicalize(root).unwrap_or_else(|_| root.clone());
            if seen.contains(&resolved) {
                debug!(root = %resolved.display(), "search root already visited");
                continue;
            }
            seen.push(resolved.clone());

            if let Some(found) = self.find_package_root(&resolved) {
                return Ok(found);
            }
        }

        let search_list = roots
            .iter()
            .map(|root| root.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");

        Err(DevstackError::not_found(format!(
            "Could not find a {} containing the {} scripts. Searched: {}. \
             Pass --project-root to specify the correct directory.",
            self.rules.file_name,
            self.rules.describe_scripts(),
            if search_list.is_empty() { "(nothing)" } else { search_list.as_str() },
        )))
    }

    /// Search `start` and its descendants. Returns the directory containing
    /// the first qualifying manifest.
    pub fn find_package_root(&self, start: &Path) -> Option<PathBuf> {
        let start = if self.fs.is_file(start) {
            start.parent()?
        } else {
            start
        };

        if !self.fs.is_dir(start) {
            debug!(path = %start.display(), "search root is not a directory");
            return None;
        }

        let found = self.search_dir(start);
        if let Some(ref dir) = found {
            info!(project_root = %dir.display(), "found project manifest");
        }
        found
    }

    fn search_dir(&self, dir: &Path) -> Option<PathBuf> {
        let manifest = dir.join(&self.rules.file_name);
        if self.fs.is_file(&manifest) && self.rules.qualifies(self.fs, &manifest) {
            return Some(dir.to_path_buf());
        }

        let entries = match self.fs.read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!(path = %dir.display(), error = %e, "skipping unreadable directory");
                return None;
            }
        };

        for entry in entries {
            if !self.should_descend(&entry) {
                continue;
            }
            if let Some(found) = self.search_dir(&entry) {
                return Some(found);
            }
        }

        None
    }

    fn should_descend(&self, entry: &Path) -> bool {
        if self.fs.is_symlink(entry) || !self.fs.is_dir(entry) {
            return false;
        }
        match entry.file_name().and_then(|n| n.to_str()) {
            Some(name) if self.rules.is_skipped_dir(name) => {
                debug!(path = %entry.display(), "not descending into dependency cache");
                false
            }
            _ => true,
        }
    }
}

/// The current working directory, then the directory of the running
/// executable. Roots that cannot be determined are left out.
pub fn default_search_roots() -> Vec<PathBuf> {
    let mut roots = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        roots.push(cwd);
    }
    if let Some(exe_dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        roots.push(exe_dir);
    }
    roots
}

/// Expand a leading `~` and make the path absolute against the current dir.
fn absolutize(path: &Path) -> Result<PathBuf> {
    let expanded = expand_home(path);
    if expanded.is_absolute() {
        Ok(expanded)
    } else {
        Ok(std::env::current_dir()?.join(expanded))
    }
}

fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE")) {
        Some(home) => PathBuf::from(home).join(rest),
        None => path.to_path_buf(),
    }
}
