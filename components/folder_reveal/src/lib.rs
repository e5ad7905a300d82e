// components/folder_reveal/src/lib.rs
//! Open a directory in the platform's file browser.
//!
//! Fire-and-forget: a browser that fails to launch is logged and otherwise
//! ignored, it never affects the download outcome.

use std::path::Path;
use std::process::Command;
use tracing::warn;

#[cfg(target_os = "windows")]
const OPENER: &str = "explorer";
#[cfg(target_os = "macos")]
const OPENER: &str = "open";
#[cfg(not(any(target_os = "windows", target_os = "macos")))]
const OPENER: &str = "xdg-open";

/// Reveal `path` in the file browser. Never fails.
pub fn reveal(path: &Path) {
    if let Err(error) = Command::new(OPENER).arg(path).spawn() {
        warn!(%error, path = %path.display(), "could not open folder in file browser");
    }
}
