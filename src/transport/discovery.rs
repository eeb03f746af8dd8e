//! Control-port discovery.
//!
//! Chrome started with `--remote-debugging-port=N` serves
//! `GET http://127.0.0.1:N/json/version`, whose `webSocketDebuggerUrl` is
//! the browser-level endpoint [`Connection`](super::Connection) connects
//! to. The port only starts answering some time after launch, so discovery
//! polls it.

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::poll::wait_until;
use crate::protocol::VersionInfo;

// ============================================================================
// Constants
// ============================================================================

/// Default deadline for the control port to come up.
pub const DEFAULT_LAUNCH_TIMEOUT: Duration = Duration::from_millis(30_000);

/// Default spacing between discovery attempts.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Per-request cap so one hung request cannot eat the whole deadline.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

// ============================================================================
// Functions
// ============================================================================

/// Returns the discovery URL for a local control port.
#[inline]
#[must_use]
pub fn version_url(port: u16) -> String {
    format!("http://127.0.0.1:{port}/json/version")
}

/// Fetches the debugger WebSocket URL once.
///
/// # Errors
///
/// - [`Error::Http`] if the request fails or returns a non-success status
/// - [`Error::Protocol`] if the document lacks `webSocketDebuggerUrl`
pub async fn fetch_debugger_url(client: &reqwest::Client, port: u16) -> Result<String> {
    let info: VersionInfo = client
        .get(version_url(port))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    trace!(port, browser = %info.browser, "Control port answered");

    info.web_socket_debugger_url
        .filter(|url| !url.is_empty())
        .ok_or_else(|| Error::protocol("Missing webSocketDebuggerUrl"))
}

/// Polls the control port until it yields a debugger URL.
///
/// # Errors
///
/// - [`Error::LaunchTimeout`] carrying the last failure if `timeout` elapses
/// - [`Error::Http`] if the HTTP client cannot be built
pub async fn wait_for_debugger_url(port: u16, timeout: Duration, interval: Duration) -> Result<String> {
    let client = reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .no_proxy()
        .build()?;

    let found: Mutex<Option<String>> = Mutex::new(None);
    let last_error = Mutex::new(String::from("no attempt made"));

    let client = &client;
    let found_ref = &found;
    let last_error_ref = &last_error;

    debug!(port, timeout_ms = timeout.as_millis() as u64, "Waiting for Chrome debug port");

    let ready = wait_until(
        move || async move {
            match fetch_debugger_url(client, port).await {
                Ok(url) => {
                    *found_ref.lock() = Some(url);
                    true
                }
                Err(e) => {
                    trace!(port, error = %e, "Debug port not ready");
                    *last_error_ref.lock() = e.to_string();
                    false
                }
            }
        },
        timeout,
        interval,
    )
    .await;

    match found.into_inner() {
        Some(url) if ready => {
            debug!(port, %url, "Debug port ready");
            Ok(url)
        }
        _ => Err(Error::launch_timeout(
            timeout.as_millis() as u64,
            last_error.into_inner(),
        )),
    }
}

// ============================================================================
// Tests
// ============================================================================
