//! Typed command results.

// ============================================================================
// Imports
// ============================================================================

use serde::Deserialize;
use serde_json::Value;

use crate::identifiers::{SessionId, TargetId};

// ============================================================================
// Discovery
// ============================================================================

/// Body of `GET /json/version` on the control port.
#[derive(Debug, Clone, Deserialize)]
pub struct VersionInfo {
    /// Browser product string, e.g. `Chrome/131.0.6778.85`.
    #[serde(rename = "Browser", default)]
    pub browser: String,

    /// Browser-level debugger WebSocket URL.
    #[serde(rename = "webSocketDebuggerUrl", default)]
    pub web_socket_debugger_url: Option<String>,
}

// ============================================================================
// Target Domain
// ============================================================================

/// One entry of `Target.getTargets`.
#[derive(Debug, Clone, Deserialize)]
pub struct TargetInfo {
    /// Target id.
    #[serde(rename = "targetId")]
    pub target_id: TargetId,

    /// Target type (`page`, `iframe`, `service_worker`, ...).
    #[serde(rename = "type")]
    pub target_type: String,

    /// Current title.
    #[serde(default)]
    pub title: String,

    /// Current URL.
    #[serde(default)]
    pub url: String,

    /// Whether some client is already attached.
    #[serde(default)]
    pub attached: bool,
}

impl TargetInfo {
    /// Returns `true` for top-level pages.
    #[inline]
    #[must_use]
    pub fn is_page(&self) -> bool {
        self.target_type == "page"
    }
}

/// Result of `Target.getTargets`.
#[derive(Debug, Clone, Deserialize)]
pub struct GetTargetsResult {
    /// All targets.
    #[serde(rename = "targetInfos", default)]
    pub target_infos: Vec<TargetInfo>,
}

/// Result of `Target.createTarget`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTargetResult {
    /// Id of the new page.
    #[serde(rename = "targetId")]
    pub target_id: TargetId,
}

/// Result of `Target.attachToTarget`.
#[derive(Debug, Clone, Deserialize)]
pub struct AttachToTargetResult {
    /// Session bound to the attached page.
    #[serde(rename = "sessionId")]
    pub session_id: SessionId,
}

// ============================================================================
// Runtime Domain
// ============================================================================

/// Mirror of a JavaScript value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemoteObject {
    /// Value type (`boolean`, `undefined`, `object`, ...).
    #[serde(rename = "type", default)]
    pub object_type: String,

    /// The value itself, when returned by value.
    #[serde(default)]
    pub value: Option<Value>,

    /// String representation.
    #[serde(default)]
    pub description: Option<String>,
}

/// Details of an exception thrown during evaluation.
#[derive(Debug, Clone, Deserialize)]
pub struct ExceptionDetails {
    /// Short exception text.
    #[serde(default)]
    pub text: String,

    /// The thrown value.
    #[serde(default)]
    pub exception: Option<RemoteObject>,
}

impl ExceptionDetails {
    /// Best available description of the exception.
    #[must_use]
    pub fn message(&self) -> String {
        self.exception
            .as_ref()
            .and_then(|e| e.description.clone())
            .unwrap_or_else(|| self.text.clone())
    }
}

/// Result of `Runtime.evaluate`.
#[derive(Debug, Clone, Deserialize)]
pub struct EvaluateResult {
    /// Evaluation result.
    #[serde(default)]
    pub result: RemoteObject,

    /// Present if the expression threw.
    #[serde(rename = "exceptionDetails", default)]
    pub exception_details: Option<ExceptionDetails>,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_info() {
        let info: VersionInfo = serde_json::from_str(
            r#"{"Browser": "Chrome/131.0", "webSocketDebuggerUrl": "ws://127.0.0.1:9222/devtools/browser/abc"}"#,
        )
        .expect("parse");
        assert_eq!(info.browser, "Chrome/131.0");
        assert_eq!(
            info.web_socket_debugger_url.as_deref(),
            Some("ws://127.0.0.1:9222/devtools/browser/abc")
        );
    }

    #[test]
    fn test_get_targets_result() {
        let result: GetTargetsResult = serde_json::from_str(
            r#"{"targetInfos": [
                {"targetId": "A", "type": "page", "title": "X", "url": "https://x.com/a/status/1", "attached": false},
                {"targetId": "B", "type": "service_worker", "title": "", "url": "", "attached": false}
            ]}"#,
        )
        .expect("parse");
        assert_eq!(result.target_infos.len(), 2);
        assert!(result.target_infos[0].is_page());
        assert!(!result.target_infos[1].is_page());
    }

    #[test]
    fn test_evaluate_result_with_exception() {
        let result: EvaluateResult = serde_json::from_str(
            r#"{"result": {"type": "object"},
                "exceptionDetails": {"text": "Uncaught", "exception": {"type": "object", "description": "ReferenceError: foo is not defined"}}}"#,
        )
        .expect("parse");
        let details = result.exception_details.expect("exception");
        assert_eq!(details.message(), "ReferenceError: foo is not defined");
    }

    #[test]
    fn test_evaluate_result_boolean() {
        let result: EvaluateResult =
            serde_json::from_str(r#"{"result": {"type": "boolean", "value": true}}"#).expect("parse");
        assert_eq!(result.result.value, Some(Value::Bool(true)));
        assert!(result.exception_details.is_none());
    }
}
