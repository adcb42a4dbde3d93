//! Node package-manager binding for devrun.

use std::collections::HashMap;
use std::path::Path;

use devrun_core::{CommandKind, ExecutionAction, PackageManager};

/// Drives a project through `npm`, `pnpm`, `yarn` or `bun`.
#[derive(Debug, Clone)]
pub struct NodeExtension {
    program: String,
    lock_file: &'static str,
    env: HashMap<String, String>,
}

impl NodeExtension {
    pub fn new(program: impl Into<String>) -> Self {
        let program = program.into();
        let lock_file = lock_file_for(&program);
        Self {
            program,
            lock_file,
            env: HashMap::new(),
        }
    }

    /// Adds environment variables passed to every invocation.
    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.env = env;
        self
    }
}

impl Default for NodeExtension {
    fn default() -> Self {
        Self::new(devrun_core::constants::DEFAULT_PACKAGE_MANAGER)
    }
}

impl PackageManager for NodeExtension {
    fn program(&self) -> &str {
        &self.program
    }

    fn build_action(&self, cmd: CommandKind) -> Option<ExecutionAction> {
        let args: &[&str] = match cmd {
            CommandKind::Install => &["install"],
            CommandKind::Dev => &["run", "dev"],
            CommandKind::Build => &["run", "build"],
            CommandKind::Lint => &["run", "lint"],
            CommandKind::Clean | CommandKind::Help => return None,
        };
        Some(ExecutionAction::new(self.program.as_str(), args))
    }

    fn lock_file(&self) -> &str {
        self.lock_file
    }

    fn env_vars(&self) -> HashMap<String, String> {
        self.env.clone()
    }
}

/// Lock file written by the package manager named by `program`.
///
/// `program` may be a path; only its file stem is considered. Unknown
/// managers are assumed to be npm-compatible.
pub fn lock_file_for(program: &str) -> &'static str {
    let name = Path::new(program)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(program);
    match name {
        "pnpm" => "pnpm-lock.yaml",
        "yarn" => "yarn.lock",
        "bun" => "bun.lockb",
        _ => "package-lock.json",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_script_commands_to_npm() {
        let npm = NodeExtension::default();
        let line = |cmd| npm.action_for(cmd).map(|a| a.to_string());
        assert_eq!(line(CommandKind::Install).as_deref(), Some("npm install"));
        assert_eq!(line(CommandKind::Dev).as_deref(), Some("npm run dev"));
        assert_eq!(line(CommandKind::Build).as_deref(), Some("npm run build"));
        assert_eq!(line(CommandKind::Lint).as_deref(), Some("npm run lint"));
    }

    #[test]
    fn clean_and_help_do_not_invoke_the_package_manager() {
        let npm = NodeExtension::default();
        assert!(npm.action_for(CommandKind::Clean).is_none());
        assert!(npm.action_for(CommandKind::Help).is_none());
    }

    #[test]
    fn lock_file_follows_the_package_manager() {
        assert_eq!(NodeExtension::new("npm").lock_file(), "package-lock.json");
        assert_eq!(NodeExtension::new("pnpm").lock_file(), "pnpm-lock.yaml");
        assert_eq!(NodeExtension::new("yarn").lock_file(), "yarn.lock");
        assert_eq!(NodeExtension::new("bun").lock_file(), "bun.lockb");
        assert_eq!(
            NodeExtension::new("/usr/local/bin/pnpm").lock_file(),
            "pnpm-lock.yaml"
        );
        assert_eq!(NodeExtension::new("npm.cmd").lock_file(), "package-lock.json");
    }

    #[test]
    fn configured_env_reaches_every_action() {
        let pm = NodeExtension::new("npm").with_env(HashMap::from([(
            "NODE_ENV".to_string(),
            "development".to_string(),
        )]));
        let action = pm.action_for(CommandKind::Dev).unwrap();
        assert_eq!(
            action.env.get("NODE_ENV").map(String::as_str),
            Some("development")
        );
    }
}
