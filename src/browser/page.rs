//! Attached page session.
//!
//! A [`Page`] is one CDP session obtained with `Target.attachToTarget` in
//! flat mode. All commands for the page travel over the browser
//! [`Connection`] tagged with the session id.
//!
//! DOM interaction is done by evaluating small expressions with
//! `Runtime.evaluate`; selectors and text are embedded as JSON string
//! literals so no input can break out of the expression.
//!
//! | Method | Expression |
//! |--------|------------|
//! | [`Page::exists`] | `!!document.querySelector(sel)` |
//! | [`Page::click`] | `document.querySelector(sel)?.click()` |
//! | [`Page::insert_text`] | focus, then `execCommand('insertText')` |

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::identifiers::{SessionId, TargetId};
use crate::poll::wait_until;
use crate::protocol::{
    AttachToTargetResult, EvaluateResult, PageCommand, RuntimeCommand, TargetCommand,
};
use crate::transport::{CallOptions, Connection};

// ============================================================================
// Page
// ============================================================================

/// A page target the workflow drives.
#[derive(Debug, Clone)]
pub struct Page {
    connection: Connection,
    target_id: TargetId,
    session_id: SessionId,
    command_timeout: Duration,
}

impl Page {
    /// Attaches to `target_id` in flat session mode.
    ///
    /// # Errors
    ///
    /// Propagates command failures; [`Error::Json`] if the reply lacks a
    /// `sessionId`.
    pub async fn attach(connection: &Connection, target_id: TargetId, command_timeout: Duration) -> Result<Self> {
        let reply = connection
            .send(
                TargetCommand::AttachToTarget {
                    target_id: target_id.clone(),
                    flatten: true,
                },
                CallOptions::new().timeout(command_timeout),
            )
            .await?;

        let AttachToTargetResult { session_id } = serde_json::from_value(reply)?;
        debug!(%target_id, %session_id, "Attached to page");

        Ok(Self {
            connection: connection.clone(),
            target_id,
            session_id,
            command_timeout,
        })
    }

    /// Returns the target id.
    #[inline]
    #[must_use]
    pub fn target_id(&self) -> &TargetId {
        &self.target_id
    }

    /// Returns the session id.
    #[inline]
    #[must_use]
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    fn options(&self) -> CallOptions {
        CallOptions::new()
            .session(self.session_id.clone())
            .timeout(self.command_timeout)
    }

    /// Enables the `Page` and `Runtime` domains for this session.
    ///
    /// # Errors
    ///
    /// Propagates command failures.
    pub async fn enable_domains(&self) -> Result<()> {
        self.connection.send(PageCommand::Enable, self.options()).await?;
        self.connection.send(RuntimeCommand::Enable, self.options()).await?;
        debug!(session_id = %self.session_id, "Page and Runtime domains enabled");
        Ok(())
    }

    /// Evaluates `expression` and returns its value.
    ///
    /// `undefined` and non-serializable results come back as `Null`.
    ///
    /// # Errors
    ///
    /// - [`Error::ScriptError`] if the expression threw
    /// - command failures from the connection
    pub async fn evaluate(&self, expression: &str) -> Result<Value> {
        trace!(session_id = %self.session_id, expression_len = expression.len(), "Evaluating");

        let reply = self
            .connection
            .send(
                RuntimeCommand::Evaluate {
                    expression: expression.to_string(),
                    return_by_value: true,
                },
                self.options(),
            )
            .await?;

        let result: EvaluateResult = serde_json::from_value(reply)?;
        if let Some(details) = result.exception_details {
            return Err(Error::script_error(details.message()));
        }
        Ok(result.result.value.unwrap_or(Value::Null))
    }

    /// Returns `true` if `selector` matches an element.
    ///
    /// # Errors
    ///
    /// Same as [`evaluate`](Self::evaluate).
    pub async fn exists(&self, selector: &str) -> Result<bool> {
        let expression = format!("!!document.querySelector({})", json_string(selector));
        Ok(self.evaluate(&expression).await?.as_bool().unwrap_or(false))
    }

    /// Clicks the first element matching `selector`, if any.
    ///
    /// # Errors
    ///
    /// Same as [`evaluate`](Self::evaluate).
    pub async fn click(&self, selector: &str) -> Result<()> {
        debug!(selector, "Click");
        let expression = format!("document.querySelector({})?.click()", json_string(selector));
        self.evaluate(&expression).await?;
        Ok(())
    }

    /// Focuses `selector` and inserts `text` as if typed.
    ///
    /// # Errors
    ///
    /// Same as [`evaluate`](Self::evaluate).
    pub async fn insert_text(&self, selector: &str, text: &str) -> Result<()> {
        debug!(selector, text_len = text.len(), "Insert text");
        let expression = format!(
            "(() => {{ const el = document.querySelector({}); if (!el) return false; \
             el.focus(); return document.execCommand('insertText', false, {}); }})()",
            json_string(selector),
            json_string(text),
        );
        self.evaluate(&expression).await?;
        Ok(())
    }

    /// Polls until `selector` matches or `timeout` elapses.
    ///
    /// Evaluation errors during the wait count as "not yet".
    pub async fn wait_for(&self, selector: &str, timeout: Duration, interval: Duration) -> bool {
        wait_until(
            || async move {
                match self.exists(selector).await {
                    Ok(found) => found,
                    Err(e) => {
                        debug!(selector, error = %e, "Selector check failed");
                        false
                    }
                }
            },
            timeout,
            interval,
        )
        .await
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Encodes a string as a JavaScript string literal.
pub(crate) fn json_string(s: &str) -> String {
    Value::String(s.to_string()).to_string()
}

// ============================================================================
// Tests
// ============================================================================
