//! Pending-request table.
//!
//! Maps each outstanding correlation id to the channel its caller is
//! awaiting. An entry leaves the table exactly once, through whichever of
//! these paths gets there first:
//!
//! | Path | Caller | Outcome |
//! |------|--------|---------|
//! | [`PendingTable::resolve`] | event loop, on a matching reply | result or [`Error::Protocol`] |
//! | [`PendingTable::remove`] | `call`, on deadline or cancellation | caller reports timeout |
//! | [`PendingTable::reject`] | event loop, on a failed write | caller sees the write error |
//! | [`PendingTable::fail_all`] | event loop, on close | [`Error::ConnectionClosed`] |
//!
//! Presence in the table is the only arbiter between these paths; every
//! operation runs under the same lock.

// ============================================================================
// Imports
// ============================================================================

use rustc_hash::FxHashMap;
use serde_json::Value;
use tokio::sync::oneshot;
use tracing::trace;

use crate::error::{Error, Result};
use crate::identifiers::RequestId;
use crate::protocol::Response;

// ============================================================================
// Types
// ============================================================================

/// Receiving half handed back to the caller of `register`.
pub type ReplyReceiver = oneshot::Receiver<Result<Value>>;

/// One outstanding command.
#[derive(Debug)]
struct PendingEntry {
    /// Method name, kept for diagnostics.
    method: String,
    /// Where the outcome goes.
    reply: oneshot::Sender<Result<Value>>,
}

// ============================================================================
// PendingTable
// ============================================================================

/// Correlation table for one connection.
///
/// Once [`fail_all`](Self::fail_all) has run the table is closed and refuses
/// new registrations, so nothing can be left behind by a call racing the
/// connection's shutdown.
#[derive(Debug, Default)]
pub struct PendingTable {
    entries: FxHashMap<RequestId, PendingEntry>,
    closed: bool,
}

impl PendingTable {
    /// Creates an empty, open table.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an outstanding command.
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionClosed`] if the table was already closed
    /// - [`Error::Protocol`] if `id` is already outstanding
    pub fn register(&mut self, id: RequestId, method: &str) -> Result<ReplyReceiver> {
        if self.closed {
            return Err(Error::ConnectionClosed);
        }
        if self.entries.contains_key(&id) {
            return Err(Error::protocol(format!("Duplicate request id {id}")));
        }

        let (reply, receiver) = oneshot::channel();
        self.entries.insert(
            id,
            PendingEntry {
                method: method.to_string(),
                reply,
            },
        );
        Ok(receiver)
    }

    /// Delivers a reply to its caller.
    ///
    /// Returns `false` when no entry matches, e.g. the caller already timed
    /// out. Such replies are dropped.
    pub fn resolve(&mut self, response: Response) -> bool {
        let Some(entry) = self.entries.remove(&response.id) else {
            return false;
        };
        trace!(id = %response.id, method = %entry.method, "Reply delivered");
        let _ = entry.reply.send(response.into_result());
        true
    }

    /// Fails one entry with `error`.
    ///
    /// Returns `false` if the entry was already gone.
    pub fn reject(&mut self, id: RequestId, error: Error) -> bool {
        let Some(entry) = self.entries.remove(&id) else {
            return false;
        };
        let _ = entry.reply.send(Err(error));
        true
    }

    /// Removes an entry without notifying its caller.
    ///
    /// Returns `true` if the entry was still present, meaning the caller
    /// won the race against any reply.
    pub fn remove(&mut self, id: RequestId) -> bool {
        self.entries.remove(&id).is_some()
    }

    /// Closes the table and fails every outstanding entry with
    /// [`Error::ConnectionClosed`].
    ///
    /// Returns the number of entries failed. Only the first call does any
    /// work.
    pub fn fail_all(&mut self) -> usize {
        if self.closed {
            return 0;
        }
        self.closed = true;

        let count = self.entries.len();
        for (id, entry) in self.entries.drain() {
            trace!(%id, method = %entry.method, "Failing request on close");
            let _ = entry.reply.send(Err(Error::ConnectionClosed));
        }
        count
    }

    /// Number of outstanding entries.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is outstanding.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================
