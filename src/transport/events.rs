//! Event listener registry.
//!
//! Routes events (frames with a `method` and no `id`) to every handler
//! registered for that method, in registration order. A handler that
//! returns an error or panics is logged and skipped; the remaining
//! handlers still run.

// ============================================================================
// Imports
// ============================================================================

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::{trace, warn};

use crate::error::Result;
use crate::protocol::Event;

// ============================================================================
// Types
// ============================================================================

/// Event handler callback type.
///
/// Called synchronously on the connection's event loop, so it must not
/// block.
pub type EventHandler = Arc<dyn Fn(&Event) -> Result<()> + Send + Sync>;

// ============================================================================
// EventBus
// ============================================================================

/// Method name → ordered handler list.
#[derive(Default)]
pub struct EventBus {
    handlers: RwLock<FxHashMap<String, Vec<EventHandler>>>,
}

impl EventBus {
    /// Creates an empty bus.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for `method`.
    pub fn on<F>(&self, method: impl Into<String>, handler: F)
    where
        F: Fn(&Event) -> Result<()> + Send + Sync + 'static,
    {
        let method = method.into();
        trace!(%method, "Registering event handler");
        self.handlers
            .write()
            .entry(method)
            .or_default()
            .push(Arc::new(handler));
    }

    /// Delivers `event` to its handlers.
    ///
    /// Returns how many handlers completed successfully.
    pub fn emit(&self, event: &Event) -> usize {
        // Snapshot so handlers may register further handlers.
        let handlers: Vec<EventHandler> = match self.handlers.read().get(&event.method) {
            Some(list) => list.clone(),
            None => return 0,
        };

        let mut delivered = 0;
        for handler in handlers {
            match catch_unwind(AssertUnwindSafe(|| handler(event))) {
                Ok(Ok(())) => delivered += 1,
                Ok(Err(e)) => {
                    warn!(method = %event.method, error = %e, "Event handler failed");
                }
                Err(_) => {
                    warn!(method = %event.method, "Event handler panicked");
                }
            }
        }
        delivered
    }

    /// Number of handlers registered for `method`.
    #[must_use]
    pub fn handler_count(&self, method: &str) -> usize {
        self.handlers.read().get(method).map_or(0, Vec::len)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use parking_lot::Mutex;
    use serde_json::{Value, json};

    use crate::error::Error;

    fn event(method: &str) -> Event {
        Event {
            method: method.to_string(),
            params: json!({ "n": 1 }),
            session_id: None,
        }
    }

    #[test]
    fn test_emit_without_handlers() {
        let bus = EventBus::new();
        assert_eq!(bus.emit(&event("Page.loadEventFired")), 0);
    }

    #[test]
    fn test_handlers_run_in_registration_order() {
        let bus = EventBus::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let order = Arc::clone(&order);
            bus.on("Page.loadEventFired", move |_| {
                order.lock().push(tag);
                Ok(())
            });
        }

        assert_eq!(bus.emit(&event("Page.loadEventFired")), 3);
        assert_eq!(*order.lock(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_handlers_only_see_their_method() {
        let bus = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::<Value>::new()));
        let sink = Arc::clone(&seen);
        bus.on("Runtime.consoleAPICalled", move |event| {
            sink.lock().push(event.params.clone());
            Ok(())
        });

        bus.emit(&event("Page.loadEventFired"));
        assert!(seen.lock().is_empty());

        bus.emit(&event("Runtime.consoleAPICalled"));
        assert_eq!(*seen.lock(), vec![json!({ "n": 1 })]);
    }

    #[test]
    fn test_failing_handler_does_not_block_others() {
        let bus = EventBus::new();
        let reached = Arc::new(Mutex::new(0));

        bus.on("Target.detachedFromTarget", |_| Err(Error::protocol("bad payload")));
        bus.on("Target.detachedFromTarget", |_| panic!("handler bug"));
        let counter = Arc::clone(&reached);
        bus.on("Target.detachedFromTarget", move |_| {
            *counter.lock() += 1;
            Ok(())
        });

        assert_eq!(bus.emit(&event("Target.detachedFromTarget")), 1);
        assert_eq!(*reached.lock(), 1);
        assert_eq!(bus.handler_count("Target.detachedFromTarget"), 3);
    }
}
