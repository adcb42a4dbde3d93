//! Constants used across the devrun workspace.

/// The filename for devrun's optional configuration.
pub const CONFIG_FILE: &str = "devrun.toml";

/// The manifest whose presence marks a Node project root.
pub const MANIFEST_NODE: &str = "package.json";

/// Where the package manager installs dependencies.
pub const DEPS_DIR: &str = "node_modules";

/// Default build output directory.
pub const BUILD_DIR: &str = "dist";

pub const DEFAULT_PACKAGE_MANAGER: &str = "npm";
pub const DEFAULT_SERVER_URL: &str = "http://localhost:3000";
pub const DEFAULT_BROWSER_DELAY_SECS: u64 = 3;

/// Substrings (lower-case) that mark a dev server as ready to accept connections.
pub const DEFAULT_READINESS_MARKERS: &[&str] = &["ready in", "local:"];
