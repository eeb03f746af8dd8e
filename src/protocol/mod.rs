//! Chrome DevTools Protocol message types.
//!
//! This module defines the wire format spoken over the debugger WebSocket.
//!
//! # Protocol Overview
//!
//! | Message Type | Direction | Shape |
//! |--------------|-----------|-------|
//! | [`Request`] | Local → Chrome | `{id, method, params?, sessionId?}` |
//! | [`Response`] | Chrome → Local | `{id, result?}` or `{id, error: {message}}` |
//! | [`Event`] | Chrome → Local | `{method, params?, sessionId?}` |
//!
//! A message with an `id` and no `method` is a reply; a message with a
//! `method` and no `id` is an event. [`Incoming::parse`] is the single
//! classifier every inbound frame goes through.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `command` | Typed commands for the domains the workflow uses |
//! | `event` | Events and the inbound classifier |
//! | `request` | Request and Response types |
//! | `types` | Typed command results |

// ============================================================================
// Submodules
// ============================================================================

/// Typed commands organized by domain.
pub mod command;

/// Event message types and inbound classification.
pub mod event;

/// Request and Response message types.
pub mod request;

/// Typed command results.
pub mod types;

// ============================================================================
// Re-exports
// ============================================================================

pub use command::{BrowserCommand, Command, PageCommand, RuntimeCommand, TargetCommand};
pub use event::{Event, Incoming};
pub use request::{Request, Response, ResponseError};
pub use types::{
    AttachToTargetResult, CreateTargetResult, EvaluateResult, ExceptionDetails,
    GetTargetsResult, RemoteObject, TargetInfo, VersionInfo,
};
