//! Error types for the quote-post automation.
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use x_quote::{Result, QuotePoster};
//!
//! async fn example(poster: QuotePoster) -> Result<()> {
//!     let outcome = poster.run().await?;
//!     println!("finished in stage {}", outcome.stage);
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`], [`Error::ChromeNotFound`], [`Error::InvalidTweetUrl`] |
//! | Launch | [`Error::ProcessLaunchFailed`], [`Error::LaunchTimeout`] |
//! | Connection | [`Error::Connection`], [`Error::ConnectionTimeout`], [`Error::ConnectionClosed`] |
//! | Protocol | [`Error::Protocol`], [`Error::RequestTimeout`], [`Error::ScriptError`] |
//! | Workflow | [`Error::NotLoggedIn`], [`Error::ElementNotFound`] |
//! | External | [`Error::Io`], [`Error::Json`], [`Error::WebSocket`], [`Error::Http`] |

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::path::PathBuf;
use std::result::Result as StdResult;

use thiserror::Error;
use tokio_tungstenite::tungstenite::Error as WsError;

use crate::identifiers::RequestId;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when the workflow configuration is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// No usable Chrome executable.
    ///
    /// `path` is `None` when auto-discovery found nothing.
    #[error("Chrome not found{}. Set X_BROWSER_CHROME_PATH env var.", location(.path))]
    ChromeNotFound {
        /// Path where Chrome was expected, if one was given.
        path: Option<PathBuf>,
    },

    /// The argument does not look like a tweet URL.
    #[error("Invalid tweet URL: {input}")]
    InvalidTweetUrl {
        /// The rejected input.
        input: String,
    },

    // ========================================================================
    // Launch Errors
    // ========================================================================
    /// Failed to launch the Chrome process.
    #[error("Failed to launch Chrome: {message}")]
    ProcessLaunchFailed {
        /// Description of the launch failure.
        message: String,
    },

    /// The control port never produced a debugger URL.
    #[error("Chrome debug port not ready after {timeout_ms}ms: {last_error}")]
    LaunchTimeout {
        /// Milliseconds waited before giving up.
        timeout_ms: u64,
        /// Last failure observed while polling.
        last_error: String,
    },

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// WebSocket connection failed.
    #[error("Connection failed: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
    },

    /// WebSocket connection was not established in time.
    #[error("Connection timeout after {timeout_ms}ms")]
    ConnectionTimeout {
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    /// The connection closed while a command was outstanding.
    #[error("CDP connection closed")]
    ConnectionClosed,

    // ========================================================================
    // Protocol Errors
    // ========================================================================
    /// The remote end answered a command with an error payload.
    ///
    /// `message` is the remote message, verbatim.
    #[error("Protocol error: {message}")]
    Protocol {
        /// Error message from the remote end.
        message: String,
    },

    /// No reply arrived for a command within its deadline.
    #[error("CDP timeout: {method} (request {request_id}, {timeout_ms}ms)")]
    RequestTimeout {
        /// Correlation id of the command.
        request_id: RequestId,
        /// Method name of the command.
        method: String,
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    /// A page script threw.
    #[error("Script error: {message}")]
    ScriptError {
        /// Exception text reported by the page.
        message: String,
    },

    // ========================================================================
    // Workflow Errors
    // ========================================================================
    /// The tweet's action bar never appeared, even after the login wait.
    #[error("Timed out waiting for tweet. Please log in first or check the tweet URL.")]
    NotLoggedIn,

    /// A UI element a workflow step depends on never appeared.
    #[error("Element not found while {step}: {selector}")]
    ElementNotFound {
        /// The workflow step that was waiting.
        step: String,
        /// CSS selector that was polled for.
        selector: String,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] WsError),

    /// HTTP error while talking to the control port.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Formats the optional " at: <path>" suffix of [`Error::ChromeNotFound`].
fn location(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!(" at: {}", p.display()))
        .unwrap_or_default()
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a Chrome not found error for an explicit path.
    #[inline]
    pub fn chrome_not_found(path: impl Into<PathBuf>) -> Self {
        Self::ChromeNotFound {
            path: Some(path.into()),
        }
    }

    /// Creates an invalid tweet URL error.
    #[inline]
    pub fn invalid_tweet_url(input: impl Into<String>) -> Self {
        Self::InvalidTweetUrl {
            input: input.into(),
        }
    }

    /// Creates a process launch failed error.
    #[inline]
    pub fn process_launch_failed(err: IoError) -> Self {
        Self::ProcessLaunchFailed {
            message: err.to_string(),
        }
    }

    /// Creates a launch timeout error.
    #[inline]
    pub fn launch_timeout(timeout_ms: u64, last_error: impl Into<String>) -> Self {
        Self::LaunchTimeout {
            timeout_ms,
            last_error: last_error.into(),
        }
    }

    /// Creates a connection error.
    #[inline]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a connection timeout error.
    #[inline]
    pub fn connection_timeout(timeout_ms: u64) -> Self {
        Self::ConnectionTimeout { timeout_ms }
    }

    /// Creates a protocol error.
    #[inline]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Creates a request timeout error.
    #[inline]
    pub fn request_timeout(request_id: RequestId, method: impl Into<String>, timeout_ms: u64) -> Self {
        Self::RequestTimeout {
            request_id,
            method: method.into(),
            timeout_ms,
        }
    }

    /// Creates a script error.
    #[inline]
    pub fn script_error(message: impl Into<String>) -> Self {
        Self::ScriptError {
            message: message.into(),
        }
    }

    /// Creates an element not found error.
    #[inline]
    pub fn element_not_found(step: impl Into<String>, selector: impl Into<String>) -> Self {
        Self::ElementNotFound {
            step: step.into(),
            selector: selector.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a timeout error.
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::ConnectionTimeout { .. } | Self::RequestTimeout { .. } | Self::LaunchTimeout { .. }
        )
    }

    /// Returns `true` if this is an element error.
    #[inline]
    #[must_use]
    pub fn is_element_error(&self) -> bool {
        matches!(self, Self::ElementNotFound { .. } | Self::NotLoggedIn)
    }

    /// Returns `true` if this is a connection error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. }
                | Self::ConnectionTimeout { .. }
                | Self::ConnectionClosed
                | Self::WebSocket(_)
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::ErrorKind;

    #[test]
    fn test_error_display() {
        let err = Error::connection("failed to connect");
        assert_eq!(err.to_string(), "Connection failed: failed to connect");
    }

    #[test]
    fn test_protocol_message_is_verbatim() {
        let err = Error::protocol("No target with given id found");
        assert_eq!(
            err.to_string(),
            "Protocol error: No target with given id found"
        );
    }

    #[test]
    fn test_chrome_not_found_display() {
        let err = Error::ChromeNotFound { path: None };
        assert_eq!(
            err.to_string(),
            "Chrome not found. Set X_BROWSER_CHROME_PATH env var."
        );

        let err = Error::chrome_not_found("/opt/chrome");
        assert!(err.to_string().contains("at: /opt/chrome"));
    }

    #[test]
    fn test_request_timeout_display() {
        let err = Error::request_timeout(RequestId::new(7), "Runtime.evaluate", 15_000);
        assert_eq!(
            err.to_string(),
            "CDP timeout: Runtime.evaluate (request 7, 15000ms)"
        );
    }

    #[test]
    fn test_is_timeout() {
        assert!(Error::connection_timeout(5000).is_timeout());
        assert!(Error::launch_timeout(30_000, "refused").is_timeout());
        assert!(!Error::connection("test").is_timeout());
        assert!(!Error::NotLoggedIn.is_timeout());
    }

    #[test]
    fn test_is_connection_error() {
        assert!(Error::connection("test").is_connection_error());
        assert!(Error::connection_timeout(1000).is_connection_error());
        assert!(Error::ConnectionClosed.is_connection_error());
        assert!(!Error::config("test").is_connection_error());
    }

    #[test]
    fn test_is_element_error() {
        assert!(Error::element_not_found("opening quote menu", "[role=menuitem]").is_element_error());
        assert!(Error::NotLoggedIn.is_element_error());
        assert!(!Error::ConnectionClosed.is_element_error());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = IoError::new(ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<String>("invalid").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }
}
