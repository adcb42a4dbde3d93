//! Interrupt delivery for the dev flow.
//!
//! The signal is registered on the calling thread, before anything is spawned,
//! and awaited on a dedicated thread with its own current-thread runtime. The
//! main thread stays free for blocking reads.

use std::io::{self, Write};
use std::thread;

use tracing::{debug, warn};

use super::{CancelToken, ChildSlot, DevSession};
use crate::error::LauncherError;

#[cfg(unix)]
type InterruptStream = tokio::signal::unix::Signal;
#[cfg(windows)]
type InterruptStream = tokio::signal::windows::CtrlC;

#[cfg(unix)]
fn listen() -> io::Result<InterruptStream> {
    use tokio::signal::unix::{signal, SignalKind};
    signal(SignalKind::interrupt())
}

#[cfg(windows)]
fn listen() -> io::Result<InterruptStream> {
    tokio::signal::windows::ctrl_c()
}

/// Installs the interrupt listener.
///
/// On delivery the shutdown message is printed, the child parked in the
/// session is asked to terminate and the process exits with status 0.
pub fn install(session: &DevSession) -> Result<(), LauncherError> {
    let DevSession { cancel, slot } = session.clone();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| LauncherError::io("failed to start interrupt listener", e))?;

    let mut stream = {
        let _guard = runtime.enter();
        listen().map_err(|e| LauncherError::io("failed to register interrupt handler", e))?
    };

    thread::Builder::new()
        .name("devrun-interrupt".to_string())
        .spawn(move || {
            if runtime.block_on(stream.recv()).is_none() {
                warn!("interrupt listener closed");
                return;
            }
            handle_interrupt(&cancel, &slot, &mut io::stdout());
            std::process::exit(0);
        })
        .map_err(|e| LauncherError::io("failed to start interrupt listener", e))?;

    debug!("interrupt listener installed");
    Ok(())
}

/// Performs the shutdown side effects of an interrupt.
///
/// Returns `false` if cancellation had already been requested, in which case
/// nothing is printed and the child is left alone.
pub fn handle_interrupt<W: Write>(cancel: &CancelToken, slot: &ChildSlot, out: &mut W) -> bool {
    if !cancel.cancel() {
        return false;
    }
    let _ = writeln!(out, "\n\nstopping dev server...");
    let _ = out.flush();
    if slot.terminate() {
        debug!("termination requested for dev server");
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command;

    #[test]
    fn first_interrupt_terminates_the_child() {
        let cancel = CancelToken::new();
        let slot = ChildSlot::new();
        slot.put(Command::new("sleep").arg("30").spawn().unwrap());
        let mut out = Vec::new();

        assert!(handle_interrupt(&cancel, &slot, &mut out));
        assert!(cancel.is_cancelled());
        assert!(String::from_utf8(out).unwrap().contains("stopping dev server"));

        let mut second = Vec::new();
        assert!(!handle_interrupt(&cancel, &slot, &mut second));
        assert!(second.is_empty());

        let status = slot.wait().unwrap().expect("child parked in slot");
        assert!(!status.success());
    }

    #[test]
    fn interrupt_without_child_still_cancels() {
        let cancel = CancelToken::new();
        let slot = ChildSlot::new();
        assert!(handle_interrupt(&cancel, &slot, &mut io::sink()));
        assert!(cancel.is_cancelled());
        assert!(slot.is_empty());
    }
}
