use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser};

use devrun_core::constants::CONFIG_FILE;
use devrun_core::launcher::interrupt;
use devrun_core::{
    CommandKind, CommandRunner, DevSession, DevrunConfig, HostRunner, LauncherError,
    PackageManager, Project,
};
use devrun_ext_node::NodeExtension;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod executor;
mod styles;

use styles as s;

/// The command-line interface for devrun.
#[derive(Debug, Parser)]
#[command(name = "devrun")]
#[command(version)]
#[command(styles = s::get_clap_styles())]
#[command(
    help_template = "{bin} {version}\n\n{about-with-newline}{usage-heading} {usage}\n\n{all-args}{after-help}"
)]
#[command(about = "Run a Node frontend project's dev server and scripts")]
#[command(
    after_help = "\x1b[1;32mExamples:\x1b[0m\n  \x1b[36mdevrun\x1b[0m                    \x1b[2m# Start the dev server and open a browser\x1b[0m\n  \x1b[36mdevrun dev --no-browser\x1b[0m   \x1b[2m# Start the dev server only\x1b[0m\n  \x1b[36mdevrun build\x1b[0m              \x1b[2m# Production build\x1b[0m\n  \x1b[36mdevrun clean\x1b[0m              \x1b[2m# Remove node_modules, dist and the lock file\x1b[0m"
)]
pub(crate) struct Cli {
    /// Command to run: dev (default), build, lint, clean, install, help
    command: Option<String>,
    /// Do not open a browser once the dev server is ready (dev only).
    #[arg(long, default_value_t = false)]
    no_browser: bool,
    /// Path to devrun config file. Defaults to `devrun.toml` when present.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let cli = Cli::parse();
    debug!("parsed cli arguments: {:?}", cli);

    let root = std::env::current_dir().context("unable to resolve the working directory")?;
    execute(&cli, &root, &HostRunner, &interrupt::install)
}

/// Starts interrupt delivery for a dev session.
type InterruptListener<'a> = &'a dyn Fn(&DevSession) -> Result<(), LauncherError>;

/// Resolves the command, loads config, checks the project root, then dispatches.
///
/// `listen` is only started for `dev`, once the project has been checked.
fn execute(
    cli: &Cli,
    root: &Path,
    runner: &dyn CommandRunner,
    listen: InterruptListener<'_>,
) -> Result<ExitCode> {
    let command = match &cli.command {
        Some(text) => CommandKind::from_str(text).map_err(|e| anyhow!(e))?,
        None => CommandKind::default(),
    };

    if command == CommandKind::Help {
        print!("{}", s::banner());
        println!();
        Cli::command().print_help()?;
        println!();
        return Ok(ExitCode::SUCCESS);
    }

    let cfg = load_config(cli, root)?;
    let pm = NodeExtension::new(cfg.package_manager.program.as_str())
        .with_env(cfg.package_manager.env.clone());
    let project = Project::new(root, &cfg.project, pm.lock_file());

    if command.needs_project() {
        project.ensure_manifest()?;
    }

    let session = DevSession::default();
    if command == CommandKind::Dev {
        listen(&session)?;
    }

    executor::run(command, cli.no_browser, &cfg, &project, &pm, runner, &session)
        .with_context(|| format!("{command} failed"))
}

fn load_config(cli: &Cli, root: &Path) -> Result<DevrunConfig> {
    let cfg = match &cli.config {
        Some(path) => DevrunConfig::load_from_file(&root.join(path)),
        None => DevrunConfig::load_or_default(&root.join(CONFIG_FILE)),
    };
    cfg.context("unable to load config")
}
