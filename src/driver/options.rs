//! Chrome launch flags and workflow timeouts.
//!
//! # Example
//!
//! ```
//! use x_quote::driver::ChromeArgs;
//!
//! let args = ChromeArgs::new(9222, "/tmp/profile", "https://x.com/a/status/1").to_args();
//! assert_eq!(args[0], "--remote-debugging-port=9222");
//! assert_eq!(args.last().map(String::as_str), Some("https://x.com/a/status/1"));
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};

// ============================================================================
// ChromeArgs
// ============================================================================

/// The fixed Chrome command line.
///
/// Only the port, profile and start URL vary between runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChromeArgs {
    /// Remote debugging port.
    pub port: u16,
    /// Isolated user data directory.
    pub profile_dir: PathBuf,
    /// Page opened at startup.
    pub url: String,
}

impl ChromeArgs {
    /// Creates the argument set.
    #[inline]
    #[must_use]
    pub fn new(port: u16, profile_dir: impl Into<PathBuf>, url: impl Into<String>) -> Self {
        Self {
            port,
            profile_dir: profile_dir.into(),
            url: url.into(),
        }
    }

    /// Converts to command-line arguments.
    #[must_use]
    pub fn to_args(&self) -> Vec<String> {
        vec![
            format!("--remote-debugging-port={}", self.port),
            format!("--user-data-dir={}", self.profile_dir.display()),
            "--no-first-run".to_string(),
            "--no-default-browser-check".to_string(),
            "--disable-blink-features=AutomationControlled".to_string(),
            "--start-maximized".to_string(),
            self.url.clone(),
        ]
    }
}

// ============================================================================
// Timeouts
// ============================================================================

/// Every deadline, interval and settle delay of the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Control-port discovery deadline.
    pub launch: Duration,
    /// Control-port poll interval.
    pub launch_poll: Duration,
    /// WebSocket connect deadline.
    pub connect: Duration,
    /// Per-command reply deadline.
    pub command: Duration,
    /// Fixed delay before the first page-readiness poll.
    pub page_grace: Duration,
    /// Deadline of each login-wait phase.
    pub page_load: Duration,
    /// Login-wait poll interval.
    pub page_poll: Duration,
    /// Deadline of each UI step's element poll.
    pub element: Duration,
    /// UI step poll interval.
    pub element_poll: Duration,
    /// Settle delay after clicking retweet.
    pub retweet_settle: Duration,
    /// Settle delay after choosing "Quote".
    pub quote_settle: Duration,
    /// Settle delay after typing the comment.
    pub type_settle: Duration,
    /// Delay after clicking post, before teardown.
    pub submit_settle: Duration,
    /// How long a preview stays open.
    pub preview_hold: Duration,
    /// Deadline of the best-effort `Browser.close`.
    pub browser_close: Duration,
    /// Delay between SIGTERM and the forced kill.
    pub kill_grace: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            launch: Duration::from_millis(30_000),
            launch_poll: Duration::from_millis(200),
            connect: Duration::from_millis(30_000),
            command: Duration::from_millis(15_000),
            page_grace: Duration::from_millis(3_000),
            page_load: Duration::from_millis(120_000),
            page_poll: Duration::from_millis(1_000),
            element: Duration::from_millis(10_000),
            element_poll: Duration::from_millis(200),
            retweet_settle: Duration::from_millis(1_000),
            quote_settle: Duration::from_millis(2_000),
            type_settle: Duration::from_millis(500),
            submit_settle: Duration::from_millis(2_000),
            preview_hold: Duration::from_millis(30_000),
            browser_close: Duration::from_millis(5_000),
            kill_grace: Duration::from_millis(2_000),
        }
    }
}

impl Timeouts {
    /// Checks that every poll interval is non-zero.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the offending field.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("launch_poll", self.launch_poll),
            ("page_poll", self.page_poll),
            ("element_poll", self.element_poll),
        ] {
            if value.is_zero() {
                return Err(Error::config(format!("Timeouts::{name} must be greater than zero")));
            }
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
