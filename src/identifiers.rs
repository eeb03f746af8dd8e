//! Type-safe identifiers for protocol entities.
//!
//! Newtype wrappers prevent mixing incompatible IDs at compile time.
//!
//! | Type | Scope | Origin |
//! |------|-------|--------|
//! | [`RequestId`] | One connection | Allocated locally, monotonic |
//! | [`TargetId`] | One browser | Assigned by Chrome |
//! | [`SessionId`] | One attached page | Assigned by Chrome on attach |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

// ============================================================================
// RequestId
// ============================================================================

/// Correlation id of one outgoing command.
///
/// Unique for the lifetime of the connection that allocated it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(u64);

impl RequestId {
    /// Wraps a raw id.
    #[inline]
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw id.
    #[inline]
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// RequestIdAllocator
// ============================================================================

/// Monotonic id source owned by one connection.
///
/// The first id handed out is 1; ids are never reused.
#[derive(Debug, Default)]
pub struct RequestIdAllocator {
    last: AtomicU64,
}

impl RequestIdAllocator {
    /// Creates an allocator that starts at 1.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last: AtomicU64::new(0),
        }
    }

    /// Allocates the next id.
    #[inline]
    pub fn next(&self) -> RequestId {
        RequestId(self.last.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

// ============================================================================
// TargetId
// ============================================================================

/// Opaque id of a browser target (page, worker, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetId(String);

impl TargetId {
    /// Wraps a raw target id.
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// SessionId
// ============================================================================

/// Opaque token binding commands to one attached page.
///
/// Commands sent without a session address the browser itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Wraps a raw session id.
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocator_starts_at_one() {
        let ids = RequestIdAllocator::new();
        assert_eq!(ids.next(), RequestId::new(1));
        assert_eq!(ids.next(), RequestId::new(2));
    }

    #[test]
    fn test_allocator_never_repeats() {
        let ids = RequestIdAllocator::new();
        let mut seen: Vec<u64> = (0..1000).map(|_| ids.next().as_u64()).collect();
        seen.dedup();
        assert_eq!(seen.len(), 1000);
    }

    #[test]
    fn test_session_id_serializes_as_string() {
        let session = SessionId::new("ABC123");
        let json = serde_json::to_string(&session).expect("serialize");
        assert_eq!(json, "\"ABC123\"");
    }

    #[test]
    fn test_target_id_display() {
        let target = TargetId::new("E3F1");
        assert_eq!(target.to_string(), "E3F1");
        assert_eq!(target.as_str(), "E3F1");
    }
}
