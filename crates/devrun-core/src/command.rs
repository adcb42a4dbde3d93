use std::fmt::{Display, Formatter};
use std::str::FromStr;

use thiserror::Error;

/// The subcommands accepted by `devrun`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CommandKind {
    #[default]
    Dev,
    Build,
    Lint,
    Clean,
    Install,
    Help,
}

impl CommandKind {
    pub const ALL: [CommandKind; 6] = [
        Self::Dev,
        Self::Build,
        Self::Lint,
        Self::Clean,
        Self::Install,
        Self::Help,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dev => "dev",
            Self::Build => "build",
            Self::Lint => "lint",
            Self::Clean => "clean",
            Self::Install => "install",
            Self::Help => "help",
        }
    }

    /// Whether the command must run from a directory holding the project manifest.
    pub fn needs_project(self) -> bool {
        !matches!(self, Self::Help)
    }

    /// Whether missing dependencies are installed before the command runs.
    pub fn needs_dependencies(self) -> bool {
        matches!(self, Self::Dev | Self::Build | Self::Lint)
    }
}

impl Display for CommandKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum CommandParseError {
    #[error("unknown command '{0}' (expected one of: dev, build, lint, clean, install, help)")]
    Unknown(String),
}

impl FromStr for CommandKind {
    type Err = CommandParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "dev" => Ok(Self::Dev),
            "build" => Ok(Self::Build),
            "lint" => Ok(Self::Lint),
            "clean" => Ok(Self::Clean),
            "install" => Ok(Self::Install),
            "help" => Ok(Self::Help),
            other => Err(CommandParseError::Unknown(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_known_command() {
        for kind in CommandKind::ALL {
            let parsed = CommandKind::from_str(kind.as_str()).expect("known command should parse");
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn rejects_unknown_command() {
        let err = CommandKind::from_str("deploy").expect_err("must fail");
        assert!(matches!(err, CommandParseError::Unknown(ref name) if name == "deploy"));
    }

    #[test]
    fn dev_is_the_default() {
        assert_eq!(CommandKind::default(), CommandKind::Dev);
    }

    #[test]
    fn only_help_skips_the_project_check() {
        let exempt = CommandKind::ALL
            .iter()
            .filter(|kind| !kind.needs_project())
            .collect::<Vec<_>>();
        assert_eq!(exempt, vec![&CommandKind::Help]);
    }

    #[test]
    fn dependency_check_applies_to_script_commands() {
        assert!(CommandKind::Dev.needs_dependencies());
        assert!(CommandKind::Build.needs_dependencies());
        assert!(CommandKind::Lint.needs_dependencies());
        assert!(!CommandKind::Install.needs_dependencies());
        assert!(!CommandKind::Clean.needs_dependencies());
    }
}
