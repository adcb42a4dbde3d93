use std::io::{self, Write};
use std::process::{ExitCode, ExitStatus};

use anyhow::{Context, Result};
use tracing::{debug, info, instrument};

use devrun_core::launcher::write_log_header;
use devrun_core::{
    tasks, CommandKind, CommandRunner, DevServerLauncher, DevSession, DevrunConfig, LaunchOptions,
    LaunchOutcome, PackageManager, Project, SystemBrowser,
};

use crate::styles::{HEADER, SUCCESS};

/// Runs a devrun command against a project whose manifest has been checked.
///
/// Commands that need `node_modules` install it first when it is missing.
#[instrument(skip(cfg, project, pm, runner, session))]
pub fn run(
    command: CommandKind,
    no_browser: bool,
    cfg: &DevrunConfig,
    project: &Project,
    pm: &dyn PackageManager,
    runner: &dyn CommandRunner,
    session: &DevSession,
) -> Result<ExitCode> {
    if let Some(message) = start_message(command) {
        println!("{HEADER}{message}{HEADER:#}");
    }
    if command.needs_dependencies() {
        tasks::ensure_dependencies(project, pm, runner)?;
    }

    match command {
        CommandKind::Dev => {
            // Stdout is not locked for the whole stream: the interrupt thread prints too.
            let code = dev(cfg, pm, no_browser, session, &mut io::stdout())?;
            Ok(ExitCode::from(code))
        }
        CommandKind::Build => {
            tasks::run_script(CommandKind::Build, pm, runner)?;
            println!("{SUCCESS}build complete{SUCCESS:#}");
            println!("output directory: ./{}", project.build_dir());
            Ok(ExitCode::SUCCESS)
        }
        CommandKind::Lint => {
            tasks::run_script(CommandKind::Lint, pm, runner)?;
            println!("{SUCCESS}lint complete{SUCCESS:#}");
            Ok(ExitCode::SUCCESS)
        }
        CommandKind::Install => {
            tasks::install(pm, runner)?;
            println!("{SUCCESS}install complete{SUCCESS:#}");
            Ok(ExitCode::SUCCESS)
        }
        CommandKind::Clean => {
            for target in project.clean()? {
                println!("{SUCCESS}removed {target}{SUCCESS:#}");
            }
            println!("clean complete");
            Ok(ExitCode::SUCCESS)
        }
        CommandKind::Help => {
            debug!("help is handled before dispatch");
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn start_message(command: CommandKind) -> Option<&'static str> {
    match command {
        CommandKind::Dev => Some("starting dev server..."),
        CommandKind::Build => Some("starting production build..."),
        CommandKind::Lint => Some("running static analysis..."),
        CommandKind::Install => Some("reinstalling dependencies..."),
        CommandKind::Clean => Some("cleaning project..."),
        CommandKind::Help => None,
    }
}

/// Launches the dev server and returns the exit code devrun should end with.
fn dev<W: Write>(
    cfg: &DevrunConfig,
    pm: &dyn PackageManager,
    no_browser: bool,
    session: &DevSession,
    out: &mut W,
) -> Result<u8> {
    let options = LaunchOptions::from_config(cfg, no_browser);
    let launcher = DevServerLauncher::new(pm, options)?;

    write_log_header(out).context("failed to write the server log header")?;

    match launcher.run(out, &SystemBrowser, &session.cancel, &session.slot)? {
        LaunchOutcome::Exited(status) => {
            info!(target: "devrun", "dev server exited with {}", status);
            Ok(exit_code(status))
        }
        LaunchOutcome::Interrupted => Ok(0),
    }
}

/// Mirrors the child's exit code; a child killed by a signal maps to 1.
fn exit_code(status: ExitStatus) -> u8 {
    match status.code() {
        Some(code) => u8::try_from(code).unwrap_or(1),
        None => 1,
    }
}
