//! Command definitions organized by domain.
//!
//! Only the surface the quote workflow drives is modelled; anything else
//! can still be sent untyped through
//! [`Connection::call`](crate::transport::Connection::call).
//!
//! # Command Domains
//!
//! | Domain | Commands |
//! |--------|----------|
//! | `Target` | `getTargets`, `createTarget`, `attachToTarget` |
//! | `Page` | `enable` |
//! | `Runtime` | `enable`, `evaluate` |
//! | `Browser` | `close` |

// ============================================================================
// Imports
// ============================================================================

use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::identifiers::TargetId;

// ============================================================================
// Command Wrapper
// ============================================================================

/// All typed commands organized by domain.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Command {
    /// Target domain commands.
    Target(TargetCommand),
    /// Page domain commands.
    Page(PageCommand),
    /// Runtime domain commands.
    Runtime(RuntimeCommand),
    /// Browser domain commands.
    Browser(BrowserCommand),
}

impl Command {
    /// Splits the command into its wire `method` and `params`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if serialization fails.
    pub fn into_parts(self) -> Result<(String, Option<Value>)> {
        let mut value = serde_json::to_value(&self)?;

        let method = value
            .get("method")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| Error::protocol("Command serialized without a method"))?;
        let params = value.get_mut("params").map(Value::take);

        Ok((method, params))
    }
}

// ============================================================================
// Target Commands
// ============================================================================

/// Target domain commands for page discovery and attachment.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "method", content = "params")]
pub enum TargetCommand {
    /// List every known target.
    #[serde(rename = "Target.getTargets")]
    GetTargets,

    /// Open a new page.
    #[serde(rename = "Target.createTarget")]
    CreateTarget {
        /// Initial URL.
        url: String,
    },

    /// Attach to a target and obtain a session.
    #[serde(rename = "Target.attachToTarget")]
    AttachToTarget {
        /// Target to attach to.
        #[serde(rename = "targetId")]
        target_id: TargetId,
        /// Use flat session mode (sessionId on the browser connection).
        flatten: bool,
    },
}

// ============================================================================
// Page Commands
// ============================================================================

/// Page domain commands.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "method", content = "params")]
pub enum PageCommand {
    /// Start emitting page lifecycle events.
    #[serde(rename = "Page.enable")]
    Enable,
}

// ============================================================================
// Runtime Commands
// ============================================================================

/// Runtime domain commands for script evaluation.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "method", content = "params")]
pub enum RuntimeCommand {
    /// Start emitting runtime events.
    #[serde(rename = "Runtime.enable")]
    Enable,

    /// Evaluate an expression in the page's main world.
    #[serde(rename = "Runtime.evaluate")]
    Evaluate {
        /// JavaScript expression.
        expression: String,
        /// Return the result by value instead of as a remote reference.
        #[serde(rename = "returnByValue")]
        return_by_value: bool,
    },
}

// ============================================================================
// Browser Commands
// ============================================================================

/// Browser domain commands.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "method", content = "params")]
pub enum BrowserCommand {
    /// Close the browser gracefully.
    #[serde(rename = "Browser.close")]
    Close,
}

// ============================================================================
// Conversions
// ============================================================================

impl From<TargetCommand> for Command {
    fn from(command: TargetCommand) -> Self {
        Self::Target(command)
    }
}

impl From<PageCommand> for Command {
    fn from(command: PageCommand) -> Self {
        Self::Page(command)
    }
}

impl From<RuntimeCommand> for Command {
    fn from(command: RuntimeCommand) -> Self {
        Self::Runtime(command)
    }
}

impl From<BrowserCommand> for Command {
    fn from(command: BrowserCommand) -> Self {
        Self::Browser(command)
    }
}

// ============================================================================
// Tests
// ============================================================================
