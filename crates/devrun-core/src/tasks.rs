//! Synchronous package-manager tasks: install, build, lint.

use std::io;
use std::process::ExitStatus;

use tracing::{info, instrument};

use crate::command::CommandKind;
use crate::error::LauncherError;
use crate::package_manager::{ExecutionAction, PackageManager};
use crate::project::Project;

/// Runs an action to completion with inherited stdio.
pub trait CommandRunner {
    fn status(&self, action: &ExecutionAction) -> io::Result<ExitStatus>;
}

/// Runs actions as real child processes of this one.
#[derive(Debug, Default, Clone, Copy)]
pub struct HostRunner;

impl CommandRunner for HostRunner {
    fn status(&self, action: &ExecutionAction) -> io::Result<ExitStatus> {
        action.to_command().status()
    }
}

/// Installs dependencies when the dependency directory is absent.
///
/// Returns whether an install was performed.
#[instrument(skip_all)]
pub fn ensure_dependencies(
    project: &Project,
    pm: &dyn PackageManager,
    runner: &dyn CommandRunner,
) -> Result<bool, LauncherError> {
    if project.has_dependencies() {
        return Ok(false);
    }
    info!(target: "devrun", "{} not found, installing dependencies", project.deps_dir());
    install(pm, runner)?;
    Ok(true)
}

/// Runs the package manager's install command.
#[instrument(skip_all)]
pub fn install(pm: &dyn PackageManager, runner: &dyn CommandRunner) -> Result<(), LauncherError> {
    let action = action(pm, CommandKind::Install)?;
    info!(target: "devrun", "run {}", action);
    let status = runner
        .status(&action)
        .map_err(|e| LauncherError::from_start(&action.program, action.to_string(), e))?;
    if !status.success() {
        return Err(LauncherError::Install {
            command: action.to_string(),
            status: status.to_string(),
        });
    }
    Ok(())
}

/// Runs a project script (`build` or `lint`) to completion.
#[instrument(skip(pm, runner))]
pub fn run_script(
    cmd: CommandKind,
    pm: &dyn PackageManager,
    runner: &dyn CommandRunner,
) -> Result<(), LauncherError> {
    let action = action(pm, cmd)?;
    info!(target: "devrun", "run {}", action);
    let status = runner
        .status(&action)
        .map_err(|e| LauncherError::from_start(&action.program, action.to_string(), e))?;
    if !status.success() {
        return Err(LauncherError::Spawn {
            command: action.to_string(),
            reason: format!("exited with {status}"),
        });
    }
    Ok(())
}

pub(crate) fn action(
    pm: &dyn PackageManager,
    cmd: CommandKind,
) -> Result<ExecutionAction, LauncherError> {
    pm.action_for(cmd).ok_or_else(|| LauncherError::Spawn {
        command: format!("{} {}", pm.program(), cmd),
        reason: format!("'{cmd}' has no {} equivalent", pm.program()),
    })
}
