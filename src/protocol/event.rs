//! Event message types and inbound classification.
//!
//! Events are unsolicited notifications Chrome pushes once a domain is
//! enabled, e.g. `Page.loadEventFired` after `Page.enable`.
//!
//! # Events used by the workflow
//!
//! | Method | Meaning |
//! |--------|---------|
//! | `Page.loadEventFired` | The attached page fired `load` |
//! | `Target.detachedFromTarget` | A session was detached (page closed or crashed) |

// ============================================================================
// Imports
// ============================================================================

use serde::Deserialize;
use serde_json::Value;

use crate::error::Result;
use crate::identifiers::{RequestId, SessionId};

use super::request::{Response, ResponseError};

// ============================================================================
// Event
// ============================================================================

/// An event notification from Chrome.
///
/// # Format
///
/// ```json
/// {
///   "method": "Page.loadEventFired",
///   "params": { "timestamp": 1234.5 },
///   "sessionId": "8E1C..."
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Event name in `Domain.eventName` format.
    pub method: String,

    /// Event-specific data (`Value::Null` when absent).
    pub params: Value,

    /// Session the event was raised in, if page-scoped.
    pub session_id: Option<SessionId>,
}

// ============================================================================
// Incoming
// ============================================================================

/// Every field any inbound frame may carry.
#[derive(Debug, Deserialize)]
struct RawMessage {
    #[serde(default)]
    id: Option<RequestId>,
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    params: Option<Value>,
    #[serde(rename = "sessionId", default)]
    session_id: Option<SessionId>,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<ResponseError>,
}

/// A classified inbound frame.
///
/// Replies go to the pending-request table, events go to the event bus.
/// The two routes never overlap.
#[derive(Debug, Clone)]
pub enum Incoming {
    /// Has an `id` and no `method`.
    Reply(Response),
    /// Has a `method` and no `id`.
    Event(Event),
    /// Anything else (both or neither).
    Unrecognized,
}

impl Incoming {
    /// Parses and classifies one text frame.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`](crate::Error::Json) if the frame is not a
    /// JSON object.
    pub fn parse(text: &str) -> Result<Self> {
        let raw: RawMessage = serde_json::from_str(text)?;

        Ok(match (raw.id, raw.method) {
            (Some(id), None) => Self::Reply(Response {
                id,
                result: raw.result,
                error: raw.error,
            }),
            (None, Some(method)) => Self::Event(Event {
                method,
                params: raw.params.unwrap_or(Value::Null),
                session_id: raw.session_id,
            }),
            _ => Self::Unrecognized,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_reply() {
        let incoming = Incoming::parse(r#"{"id": 5, "result": {}}"#).expect("parse");
        match incoming {
            Incoming::Reply(response) => assert_eq!(response.id, RequestId::new(5)),
            other => panic!("expected reply, got {other:?}"),
        }
    }

    #[test]
    fn test_classify_error_reply() {
        let incoming =
            Incoming::parse(r#"{"id": 5, "error": {"code": -1, "message": "boom"}}"#).expect("parse");
        let Incoming::Reply(response) = incoming else {
            panic!("expected reply");
        };
        assert_eq!(response.error.map(|e| e.message), Some("boom".to_string()));
    }

    #[test]
    fn test_classify_event() {
        let incoming = Incoming::parse(
            r#"{"method": "Page.loadEventFired", "params": {"timestamp": 1.5}, "sessionId": "S"}"#,
        )
        .expect("parse");
        let Incoming::Event(event) = incoming else {
            panic!("expected event");
        };
        assert_eq!(event.method, "Page.loadEventFired");
        assert_eq!(event.session_id, Some(SessionId::new("S")));
        assert_eq!(event.params["timestamp"], 1.5);
    }

    #[test]
    fn test_event_without_params() {
        let incoming = Incoming::parse(r#"{"method": "Inspector.detached"}"#).expect("parse");
        let Incoming::Event(event) = incoming else {
            panic!("expected event");
        };
        assert_eq!(event.params, Value::Null);
    }

    #[test]
    fn test_classify_ambiguous_frames() {
        assert!(matches!(
            Incoming::parse(r#"{"id": 1, "method": "X.y"}"#).expect("parse"),
            Incoming::Unrecognized
        ));
        assert!(matches!(
            Incoming::parse(r#"{"result": {}}"#).expect("parse"),
            Incoming::Unrecognized
        ));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Incoming::parse("not json").is_err());
    }
}
