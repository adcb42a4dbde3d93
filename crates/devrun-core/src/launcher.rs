//! The dev-server launcher.
//!
//! Spawns the package manager's `dev` script with stdout and stderr merged into
//! one pipe, echoes the output line by line, and reacts to the first line that
//! says the server is ready: a banner is printed and, if requested, a browser
//! tab is scheduled to open after a short delay. An interrupt flips the shared
//! [`CancelToken`] and terminates the child held in the [`ChildSlot`].

use std::io::{self, BufRead, BufReader, PipeReader, Write};
use std::process::{Child, ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use tracing::{debug, info, instrument};

use crate::command::CommandKind;
use crate::config::DevrunConfig;
use crate::error::LauncherError;
use crate::package_manager::{ExecutionAction, PackageManager};
use crate::tasks;

pub mod browser;
pub mod interrupt;

pub use browser::{BrowserOpener, SystemBrowser};

const RULE_WIDTH: usize = 50;
const WAIT_POLL: Duration = Duration::from_millis(50);

/// Recognizes the line a dev server prints once it accepts connections.
#[derive(Debug, Clone)]
pub struct ReadinessDetector {
    markers: Vec<String>,
}

impl ReadinessDetector {
    /// Markers are matched case-insensitively as substrings.
    pub fn new<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            markers: markers
                .into_iter()
                .map(|m| m.as_ref().to_lowercase())
                .filter(|m| !m.is_empty())
                .collect(),
        }
    }

    pub fn is_ready(&self, line: &str) -> bool {
        let line = line.to_lowercase();
        self.markers.iter().any(|m| line.contains(m.as_str()))
    }
}

/// How a launch behaves once the server reports readiness.
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    pub server_url: String,
    pub open_browser: bool,
    pub browser_delay: Duration,
    pub readiness: ReadinessDetector,
}

impl LaunchOptions {
    pub fn from_config(cfg: &DevrunConfig, no_browser: bool) -> Self {
        Self {
            server_url: cfg.server.url.clone(),
            open_browser: cfg.browser.open && !no_browser,
            browser_delay: cfg.browser.delay(),
            readiness: ReadinessDetector::new(&cfg.readiness.markers),
        }
    }
}

/// Per-launch state owned by the streaming loop.
#[derive(Debug)]
pub struct LaunchState {
    server_url: String,
    browser_opened: bool,
}

impl LaunchState {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            browser_opened: false,
        }
    }

    /// Set once the readiness line has been seen, whether or not a browser was opened.
    pub fn browser_opened(&self) -> bool {
        self.browser_opened
    }
}

/// Cancellation flag shared between the interrupt listener and the streaming loop.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Returns `true` only for the call that flipped the flag.
    pub fn cancel(&self) -> bool {
        !self.0.swap(true, Ordering::SeqCst)
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Default)]
struct SlotState {
    child: Option<Child>,
    terminated: bool,
}

/// Shared ownership of the running dev-server child.
///
/// The child stays parked here until it has been reaped, so an interrupt can
/// reach it at any point between spawn and exit.
#[derive(Debug, Clone, Default)]
pub struct ChildSlot(Arc<Mutex<SlotState>>);

impl ChildSlot {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SlotState> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn put(&self, child: Child) {
        self.lock().child = Some(child);
    }

    pub fn is_empty(&self) -> bool {
        self.lock().child.is_none()
    }

    /// Whether termination has been requested for the parked child.
    pub fn is_terminated(&self) -> bool {
        self.lock().terminated
    }

    /// Asks the child to stop without waiting for it.
    ///
    /// Only the first call signals the child; later calls are no-ops. Returns
    /// whether this call sent the request.
    pub fn terminate(&self) -> bool {
        let mut guard = self.lock();
        if guard.terminated {
            return false;
        }
        let Some(child) = guard.child.as_mut() else {
            return false;
        };
        if let Err(e) = request_termination(child) {
            debug!("terminate of pid {} failed: {}", child.id(), e);
        }
        guard.terminated = true;
        true
    }

    /// Waits for the parked child to exit and reaps it.
    ///
    /// The lock is released between polls so [`ChildSlot::terminate`] stays
    /// reachable. Returns `None` if the slot is empty.
    pub fn wait(&self) -> io::Result<Option<ExitStatus>> {
        loop {
            {
                let mut guard = self.lock();
                let Some(child) = guard.child.as_mut() else {
                    return Ok(None);
                };
                if let Some(status) = child.try_wait()? {
                    guard.child = None;
                    return Ok(Some(status));
                }
            }
            thread::sleep(WAIT_POLL);
        }
    }
}

/// Sends SIGTERM so the package manager can stop the server it started.
#[cfg(unix)]
fn request_termination(child: &mut Child) -> io::Result<()> {
    let output = std::process::Command::new("kill")
        .args(["-TERM", &child.id().to_string()])
        .output()?;
    if !output.status.success() {
        return Err(io::Error::other(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }
    Ok(())
}

#[cfg(not(unix))]
fn request_termination(child: &mut Child) -> io::Result<()> {
    child.kill()
}

/// The token and slot one dev-server launch shares with its interrupt listener.
#[derive(Debug, Clone, Default)]
pub struct DevSession {
    pub cancel: CancelToken,
    pub slot: ChildSlot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamOutcome {
    /// The child closed its output.
    Exhausted,
    /// Cancellation was requested before the output ended.
    Interrupted,
}

#[derive(Debug)]
pub enum LaunchOutcome {
    Exited(ExitStatus),
    Interrupted,
}

/// Runs the `dev` script of a project and relays its output.
#[derive(Debug)]
pub struct DevServerLauncher {
    action: ExecutionAction,
    options: LaunchOptions,
}

impl DevServerLauncher {
    pub fn new(pm: &dyn PackageManager, options: LaunchOptions) -> Result<Self, LauncherError> {
        let action = tasks::action(pm, CommandKind::Dev)?;
        Ok(Self::with_action(action, options))
    }

    pub fn with_action(action: ExecutionAction, options: LaunchOptions) -> Self {
        Self { action, options }
    }

    pub fn options(&self) -> &LaunchOptions {
        &self.options
    }

    /// Spawns the dev server, streams its output to `out` and waits for it to exit.
    ///
    /// The child is parked in `slot` for the lifetime of the stream so an
    /// interrupt can terminate it.
    #[instrument(skip_all, fields(command = %self.action))]
    pub fn run<W: Write>(
        &self,
        out: &mut W,
        browser: &dyn BrowserOpener,
        cancel: &CancelToken,
        slot: &ChildSlot,
    ) -> Result<LaunchOutcome, LauncherError> {
        let (child, reader) = self.spawn()?;
        info!(target: "devrun", "started {} (pid {})", self.action, child.id());
        slot.put(child);

        if cancel.is_cancelled() {
            slot.terminate();
            return Ok(LaunchOutcome::Interrupted);
        }

        let mut state = LaunchState::new(self.options.server_url.clone());
        let outcome = match self.stream(BufReader::new(reader), out, &mut state, browser, cancel) {
            Ok(outcome) => outcome,
            Err(e) => {
                slot.terminate();
                return Err(LauncherError::io("failed to read dev server output", e));
            }
        };

        if outcome == StreamOutcome::Interrupted {
            slot.terminate();
            return Ok(LaunchOutcome::Interrupted);
        }

        let status = slot
            .wait()
            .map_err(|e| LauncherError::io("failed to wait for dev server", e))?;
        match status {
            Some(status) if !cancel.is_cancelled() => {
                debug!("dev server exited with {}", status);
                Ok(LaunchOutcome::Exited(status))
            }
            _ => Ok(LaunchOutcome::Interrupted),
        }
    }

    fn spawn(&self) -> Result<(Child, PipeReader), LauncherError> {
        let (reader, writer) =
            io::pipe().map_err(|e| LauncherError::io("failed to create output pipe", e))?;
        let stderr = writer
            .try_clone()
            .map_err(|e| LauncherError::io("failed to create output pipe", e))?;

        // The command owns both write ends; it must be dropped before reading
        // so the pipe reports EOF once the child exits.
        let mut command = self.action.to_command();
        command
            .stdin(Stdio::null())
            .stdout(writer)
            .stderr(stderr);
        let child = command.spawn().map_err(|e| {
            LauncherError::from_start(&self.action.program, self.action.to_string(), e)
        })?;
        drop(command);

        Ok((child, reader))
    }

    /// Echoes `reader` to `out` line by line until it ends or `cancel` is set.
    pub fn stream<R: BufRead, W: Write>(
        &self,
        mut reader: R,
        out: &mut W,
        state: &mut LaunchState,
        browser: &dyn BrowserOpener,
        cancel: &CancelToken,
    ) -> io::Result<StreamOutcome> {
        let mut buf = Vec::new();
        loop {
            if cancel.is_cancelled() {
                return Ok(StreamOutcome::Interrupted);
            }
            buf.clear();
            let read = reader.read_until(b'\n', &mut buf)?;
            if cancel.is_cancelled() {
                return Ok(StreamOutcome::Interrupted);
            }
            if read == 0 {
                return Ok(StreamOutcome::Exhausted);
            }

            let text = String::from_utf8_lossy(&buf);
            let line = text.trim_end_matches(['\r', '\n']);
            writeln!(out, "{line}")?;

            if !state.browser_opened && self.options.readiness.is_ready(line) {
                self.announce_ready(out, state, browser)?;
            }
            out.flush()?;
        }
    }

    fn announce_ready<W: Write>(
        &self,
        out: &mut W,
        state: &mut LaunchState,
        browser: &dyn BrowserOpener,
    ) -> io::Result<()> {
        writeln!(out)?;
        writeln!(out, "dev server is up")?;
        writeln!(out, "URL: {}", state.server_url)?;
        writeln!(out, "press Ctrl+C to stop")?;
        writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;

        if self.options.open_browser {
            browser.schedule(&state.server_url, self.options.browser_delay);
        } else {
            debug!("browser auto-open disabled");
        }
        state.browser_opened = true;
        Ok(())
    }
}

/// Prints the header shown above the streamed server log.
pub fn write_log_header<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "server log:")?;
    writeln!(out, "{}", "-".repeat(RULE_WIDTH))
}
