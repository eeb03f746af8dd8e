//! Chrome discovery and launch prerequisites.
//!
//! - [`find_chrome`] - locate an installed Chrome/Chromium/Edge
//! - [`free_port`] - pick an unused local port for `--remote-debugging-port`
//! - [`default_profile_dir`] - persistent profile so the X login survives runs

// ============================================================================
// Imports
// ============================================================================

use std::env;
use std::ffi::OsString;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};

use tokio::net::TcpListener;
use tracing::debug;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Environment variable overriding Chrome discovery.
pub const CHROME_PATH_ENV: &str = "X_BROWSER_CHROME_PATH";

/// Directory name of the default profile under the data dir.
const PROFILE_DIR_NAME: &str = "x-browser-profile";

#[cfg(target_os = "macos")]
const CANDIDATES: &[&str] = &[
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Google Chrome Canary.app/Contents/MacOS/Google Chrome Canary",
    "/Applications/Google Chrome Beta.app/Contents/MacOS/Google Chrome Beta",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
    "/Applications/Microsoft Edge.app/Contents/MacOS/Microsoft Edge",
];

#[cfg(target_os = "windows")]
const CANDIDATES: &[&str] = &[
    r"C:\Program Files\Google\Chrome\Application\chrome.exe",
    r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
    r"C:\Program Files\Microsoft\Edge\Application\msedge.exe",
    r"C:\Program Files (x86)\Microsoft\Edge\Application\msedge.exe",
];

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const CANDIDATES: &[&str] = &[
    "/usr/bin/google-chrome",
    "/usr/bin/google-chrome-stable",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/snap/bin/chromium",
    "/usr/bin/microsoft-edge",
];

// ============================================================================
// Chrome Discovery
// ============================================================================

/// Locates a Chrome executable.
///
/// Checks [`CHROME_PATH_ENV`] first (ignored if the path does not exist),
/// then the platform's usual install locations.
#[must_use]
pub fn find_chrome() -> Option<PathBuf> {
    let override_path = env::var_os(CHROME_PATH_ENV);
    let found = resolve_chrome(override_path.as_deref().map(Path::new), CANDIDATES);
    debug!(found = ?found, "Chrome discovery finished");
    found
}

/// Picks the override if usable, else the first existing candidate.
fn resolve_chrome(override_path: Option<&Path>, candidates: &[&str]) -> Option<PathBuf> {
    let override_path = override_path
        .and_then(|p| p.to_str())
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(PathBuf::from);

    if let Some(path) = override_path
        && path.exists()
    {
        return Some(path);
    }

    candidates
        .iter()
        .map(PathBuf::from)
        .find(|candidate| candidate.exists())
}

// ============================================================================
// Profile Directory
// ============================================================================

/// Default persistent profile location.
///
/// `$XDG_DATA_HOME/x-browser-profile`, falling back to
/// `~/.local/share/x-browser-profile`.
///
/// # Errors
///
/// Returns [`Error::Config`] if neither `XDG_DATA_HOME` nor a home
/// directory is available.
pub fn default_profile_dir() -> Result<PathBuf> {
    profile_dir_from(env::var_os("XDG_DATA_HOME"), dirs::home_dir())
}

fn profile_dir_from(xdg_data_home: Option<OsString>, home: Option<PathBuf>) -> Result<PathBuf> {
    let base = match xdg_data_home.filter(|v| !v.is_empty()) {
        Some(dir) => PathBuf::from(dir),
        None => home
            .ok_or_else(|| Error::config("Cannot determine home directory; pass --profile"))?
            .join(".local")
            .join("share"),
    };
    Ok(base.join(PROFILE_DIR_NAME))
}

// ============================================================================
// Port Allocation
// ============================================================================

/// Returns a local TCP port that was free a moment ago.
///
/// # Errors
///
/// Returns [`Error::Io`] if binding fails.
pub async fn free_port() -> Result<u16> {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await?;
    let port = listener.local_addr()?.port();
    debug!(port, "Allocated debug port");
    Ok(port)
}

// ============================================================================
// Tests
// ============================================================================
