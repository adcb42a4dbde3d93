use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::ProjectConfig;
use crate::error::LauncherError;

/// The on-disk layout of the Node project devrun operates on.
#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
    manifest: String,
    deps_dir: String,
    build_dir: String,
    lock_file: String,
}

impl Project {
    /// Resolves the layout under `root`. `default_lock_file` is used unless the
    /// config names one explicitly.
    pub fn new(root: impl Into<PathBuf>, cfg: &ProjectConfig, default_lock_file: &str) -> Self {
        Self {
            root: root.into(),
            manifest: cfg.manifest.clone(),
            deps_dir: cfg.deps_dir.clone(),
            build_dir: cfg.build_dir.clone(),
            lock_file: cfg
                .lock_file
                .clone()
                .unwrap_or_else(|| default_lock_file.to_string()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(&self.manifest)
    }

    pub fn deps_path(&self) -> PathBuf {
        self.root.join(&self.deps_dir)
    }

    pub fn deps_dir(&self) -> &str {
        &self.deps_dir
    }

    pub fn build_dir(&self) -> &str {
        &self.build_dir
    }

    /// Fails with `MissingManifest` unless the manifest exists in the root.
    pub fn ensure_manifest(&self) -> Result<(), LauncherError> {
        let path = self.manifest_path();
        if path.is_file() {
            return Ok(());
        }
        Err(LauncherError::MissingManifest { path })
    }

    pub fn has_dependencies(&self) -> bool {
        self.deps_path().is_dir()
    }

    /// Removes the dependency directory, the build output and the lock file.
    ///
    /// Targets that do not exist are skipped. Returns the names of the targets
    /// that were actually removed, in removal order.
    pub fn clean(&self) -> Result<Vec<String>, LauncherError> {
        let mut removed = Vec::new();

        for dir in [&self.deps_dir, &self.build_dir] {
            let path = self.root.join(dir);
            if path.exists() {
                fs::remove_dir_all(&path).map_err(|e| {
                    LauncherError::io(format!("failed to remove '{}'", path.display()), e)
                })?;
                info!(target: "devrun", "removed {}", path.display());
                removed.push(dir.clone());
            } else {
                debug!("clean: {} already absent", path.display());
            }
        }

        let lock = self.root.join(&self.lock_file);
        if lock.exists() {
            fs::remove_file(&lock).map_err(|e| {
                LauncherError::io(format!("failed to remove '{}'", lock.display()), e)
            })?;
            info!(target: "devrun", "removed {}", lock.display());
            removed.push(self.lock_file.clone());
        } else {
            debug!("clean: {} already absent", lock.display());
        }

        Ok(removed)
    }
}
