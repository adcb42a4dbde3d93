//! Core logic for devrun, a launcher for Node frontend projects.
//!
//! This crate defines the command model, configuration, project layout
//! checks, the package-manager seam, the synchronous tasks and the
//! dev-server launcher used by the `devrun` binary.

pub mod command;
pub mod config;
pub mod constants;
pub mod error;
pub mod launcher;
pub mod package_manager;
pub mod project;
pub mod tasks;

pub use command::{CommandKind, CommandParseError};
pub use config::DevrunConfig;
pub use error::LauncherError;
pub use launcher::{
    BrowserOpener, CancelToken, ChildSlot, DevServerLauncher, DevSession, LaunchOptions,
    LaunchOutcome, SystemBrowser,
};
pub use package_manager::{ExecutionAction, PackageManager};
pub use project::Project;
pub use tasks::{CommandRunner, HostRunner};
