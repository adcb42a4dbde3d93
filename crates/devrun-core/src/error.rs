use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures that abort a devrun invocation.
///
/// None of these are retried: the CLI reports them and exits non-zero.
#[derive(Debug, Error)]
pub enum LauncherError {
    #[error("'{}' not found; run devrun from the project root directory", .path.display())]
    MissingManifest { path: PathBuf },

    #[error("'{program}' was not found on PATH; check that Node.js is installed (https://nodejs.org/)")]
    MissingExecutable { program: String },

    #[error("dependency install failed: {command} exited with {status}")]
    Install { command: String, status: String },

    #[error("command '{command}' failed: {reason}")]
    Spawn { command: String, reason: String },

    #[error("invalid configuration '{}': {reason}", .path.display())]
    Config { path: PathBuf, reason: String },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

impl LauncherError {
    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Maps a failure to start `command` to the matching error kind.
    pub(crate) fn from_start(program: &str, command: String, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            Self::MissingExecutable {
                program: program.to_string(),
            }
        } else {
            Self::Spawn {
                command,
                reason: format!("failed to start: {source}"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_missing_executable() {
        let err = LauncherError::from_start(
            "npm",
            "npm install".to_string(),
            io::Error::from(io::ErrorKind::NotFound),
        );
        assert!(matches!(err, LauncherError::MissingExecutable { ref program } if program == "npm"));
        assert!(err.to_string().contains("nodejs.org"));
    }

    #[test]
    fn other_start_failures_map_to_spawn() {
        let err = LauncherError::from_start(
            "npm",
            "npm run dev".to_string(),
            io::Error::from(io::ErrorKind::PermissionDenied),
        );
        assert!(matches!(err, LauncherError::Spawn { .. }));
        assert!(err.to_string().contains("npm run dev"));
    }
}
