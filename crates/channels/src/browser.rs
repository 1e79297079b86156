//! Best-effort launching of the reviewer's browser.

use std::process::Stdio;

use tracing::{debug, info, warn};

/// Opens a URL for the reviewer. Fire-and-forget: failures are logged,
/// never returned.
pub trait BrowserLauncher: Send + Sync {
    fn open(&self, url: &str);
}

/// Opens URLs with the operating system's default browser.
pub struct SystemBrowser;

impl BrowserLauncher for SystemBrowser {
    fn open(&self, url: &str) {
        // stdout is the protocol channel; the opener must never write to it.
        let spawned = system_open_command(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        match spawned {
            Ok(_) => debug!(%url, "Browser launch requested"),
            Err(e) => warn!(%url, error = %e, "Failed to launch browser, open the URL manually"),
        }
    }
}

/// Does not launch anything; logs the URL so an operator can open it.
pub struct NoBrowser;

impl BrowserLauncher for NoBrowser {
    fn open(&self, url: &str) {
        info!(%url, "Browser launch disabled, open the feedback page manually");
    }
}

#[cfg(target_os = "macos")]
fn system_open_command(url: &str) -> tokio::process::Command {
    let mut cmd = tokio::process::Command::new("open");
    cmd.arg(url);
    cmd
}

#[cfg(target_os = "windows")]
fn system_open_command(url: &str) -> tokio::process::Command {
    let mut cmd = tokio::process::Command::new("cmd");
    cmd.args(["/C", "start", "", url]);
    cmd
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn system_open_command(url: &str) -> tokio::process::Command {
    let mut cmd = tokio::process::Command::new("xdg-open");
    cmd.arg(url);
    cmd
}
