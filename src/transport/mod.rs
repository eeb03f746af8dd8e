//! DevTools transport layer.
//!
//! This module handles communication between the local end (Rust) and
//! Chrome's remote-debugging endpoint.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐                              ┌─────────────────┐
//! │  QuotePoster     │   GET /json/version (HTTP)   │  Chrome         │
//! │                  │─────────────────────────────►│  control port   │
//! │  Connection      │                              │                 │
//! │  ├ PendingTable  │◄────────────────────────────►│  /devtools/     │
//! │  └ EventBus      │     WebSocket (JSON frames)  │  browser/<id>   │
//! └──────────────────┘                              └─────────────────┘
//! ```
//!
//! # Connection Lifecycle
//!
//! 1. `discovery::wait_for_debugger_url` - Poll the control port
//! 2. `Connection::connect` - Open the WebSocket, spawn the event loop
//! 3. `Connection::call` / `Connection::on` - Commands and events
//! 4. `Connection::shutdown` - Close; outstanding calls fail
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `connection` | WebSocket connection and event loop |
//! | `discovery` | Control-port polling |
//! | `events` | Event listener registry |
//! | `pending` | Correlation table |

// ============================================================================
// Submodules
// ============================================================================

/// WebSocket connection and event loop.
pub mod connection;

/// Control-port discovery.
pub mod discovery;

/// Event listener registry.
pub mod events;

/// Pending-request correlation table.
pub mod pending;

// ============================================================================
// Re-exports
// ============================================================================

pub use connection::{CallOptions, Connection, DEFAULT_COMMAND_TIMEOUT, DEFAULT_CONNECT_TIMEOUT};
pub use discovery::wait_for_debugger_url;
pub use events::{EventBus, EventHandler};
pub use pending::PendingTable;
