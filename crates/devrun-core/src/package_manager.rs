use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::process::Command;

use crate::command::CommandKind;

/// A single package-manager invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionAction {
    /// The executable program (e.g., "npm", "pnpm").
    pub program: String,
    /// The arguments to pass to the program.
    pub args: Vec<String>,
    /// Extra environment variables for the invocation.
    pub env: HashMap<String, String>,
}

impl ExecutionAction {
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|s| (*s).to_string()).collect(),
            env: HashMap::new(),
        }
    }

    /// Builds the process command. Stdio is left for the caller to decide.
    pub fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args).envs(&self.env);
        command
    }
}

impl Display for ExecutionAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// A contract for the package manager that drives the project's scripts.
pub trait PackageManager: std::fmt::Debug {
    /// Name of the executable, as configured.
    fn program(&self) -> &str;

    /// Maps a devrun command to the invocation that performs it.
    ///
    /// Returns `None` for commands the package manager is not involved in
    /// (`clean`, `help`).
    fn build_action(&self, cmd: CommandKind) -> Option<ExecutionAction>;

    /// The lock file this package manager writes next to the manifest.
    fn lock_file(&self) -> &str;

    /// Environment variables applied to every invocation.
    fn env_vars(&self) -> HashMap<String, String> {
        HashMap::new()
    }

    /// Builds the action for `cmd` with the manager's environment merged in.
    fn action_for(&self, cmd: CommandKind) -> Option<ExecutionAction> {
        let mut action = self.build_action(cmd)?;
        let mut merged_env = self.env_vars();
        merged_env.extend(action.env);
        action.env = merged_env;
        Some(action)
    }
}
