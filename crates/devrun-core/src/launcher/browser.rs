use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

/// Opens the dev server in a browser once it is ready.
pub trait BrowserOpener {
    /// Schedules `url` to open after `delay`. Must not block the caller.
    fn schedule(&self, url: &str, delay: Duration);
}

/// Opens URLs with the system's default browser from a detached thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemBrowser;

impl BrowserOpener for SystemBrowser {
    fn schedule(&self, url: &str, delay: Duration) {
        let url = url.to_string();
        let spawned = thread::Builder::new()
            .name("devrun-browser".to_string())
            .spawn(move || {
                thread::sleep(delay);
                info!(target: "devrun", "opening {} in browser", url);
                if let Err(e) = open::that_detached(&url) {
                    warn!("failed to open {} in browser: {}", url, e);
                }
            });

        // Detached; nothing joins the timer.
        match spawned {
            Ok(_) => debug!("browser open scheduled in {:?}", delay),
            Err(e) => warn!("failed to start browser timer: {}", e),
        }
    }
}
