use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::constants::*;
use crate::error::LauncherError;

/// Settings read from `devrun.toml`. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DevrunConfig {
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub package_manager: PackageManagerConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub readiness: ReadinessConfig,
}

impl DevrunConfig {
    /// Loads and validates the config at `path`.
    pub fn load_from_file(path: &Path) -> Result<Self, LauncherError> {
        let text = std::fs::read_to_string(path).map_err(|e| LauncherError::Config {
            path: path.to_path_buf(),
            reason: format!("failed to read: {e}"),
        })?;
        Self::parse(path, &text)
    }

    /// Loads `path` if it exists, otherwise falls back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, LauncherError> {
        if path.is_file() {
            return Self::load_from_file(path);
        }
        debug!("no config at {}, using defaults", path.display());
        Ok(Self::default())
    }

    fn parse(path: &Path, text: &str) -> Result<Self, LauncherError> {
        let mut cfg = toml::from_str::<Self>(text).map_err(|e| LauncherError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        cfg.normalize(path)?;
        Ok(cfg)
    }

    fn normalize(&mut self, path: &Path) -> Result<(), LauncherError> {
        let markers = &mut self.readiness.markers;
        markers.retain(|m| !m.trim().is_empty());
        if markers.is_empty() {
            return Err(LauncherError::Config {
                path: path.to_path_buf(),
                reason: "readiness.markers must contain at least one non-empty marker".to_string(),
            });
        }
        for marker in markers.iter_mut() {
            *marker = marker.to_lowercase();
        }
        if self.package_manager.program.trim().is_empty() {
            return Err(LauncherError::Config {
                path: path.to_path_buf(),
                reason: "package_manager.program must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    pub manifest: String,
    pub deps_dir: String,
    pub build_dir: String,
    /// Overrides the lock file name the package manager would use.
    pub lock_file: Option<String>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            manifest: MANIFEST_NODE.to_string(),
            deps_dir: DEPS_DIR.to_string(),
            build_dir: BUILD_DIR.to_string(),
            lock_file: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PackageManagerConfig {
    pub program: String,
    pub env: HashMap<String, String>,
}

impl Default for PackageManagerConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_PACKAGE_MANAGER.to_string(),
            env: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SERVER_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BrowserConfig {
    pub open: bool,
    pub delay_secs: u64,
}

impl BrowserConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_secs)
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            open: true,
            delay_secs: DEFAULT_BROWSER_DELAY_SECS,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReadinessConfig {
    pub markers: Vec<String>,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            markers: DEFAULT_READINESS_MARKERS
                .iter()
                .map(|m| (*m).to_string())
                .collect(),
        }
    }
}
