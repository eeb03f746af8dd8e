//! DevTools WebSocket connection and event loop.
//!
//! This module handles the WebSocket connection to Chrome's browser-level
//! debugger endpoint, including request/response correlation and event
//! routing.
//!
//! # Event Loop
//!
//! The connection spawns a tokio task that handles:
//!
//! - Incoming frames, classified into replies and events
//! - Outgoing commands from the Rust API
//! - Request/response correlation by integer id
//! - Event handler callbacks
//!
//! When the socket closes (either side) the loop fails every outstanding
//! request with [`Error::ConnectionClosed`] and then flips the `closed`
//! signal. No frame is dispatched after that.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{mpsc, watch};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{WebSocketStream, connect_async};
use tracing::{debug, error, trace, warn};

use crate::error::{Error, Result};
use crate::identifiers::{RequestId, RequestIdAllocator, SessionId};
use crate::protocol::{Command, Event, Incoming, Request};

use super::events::EventBus;
use super::pending::PendingTable;

// ============================================================================
// Constants
// ============================================================================

/// Default timeout for command execution.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_millis(15_000);

/// Default timeout for establishing the WebSocket.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(30_000);

// ============================================================================
// CallOptions
// ============================================================================

/// Per-command options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallOptions {
    /// Session of the page the command targets. `None` targets the browser.
    pub session_id: Option<SessionId>,
    /// Reply deadline. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for CallOptions {
    fn default() -> Self {
        Self {
            session_id: None,
            timeout: Some(DEFAULT_COMMAND_TIMEOUT),
        }
    }
}

impl CallOptions {
    /// Browser-scoped options with the default deadline.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Addresses the command to an attached page.
    #[inline]
    #[must_use]
    pub fn session(mut self, session_id: SessionId) -> Self {
        self.session_id = Some(session_id);
        self
    }

    /// Sets the reply deadline. A zero duration disables it.
    #[inline]
    #[must_use]
    pub fn timeout(mut self, limit: Duration) -> Self {
        self.timeout = (!limit.is_zero()).then_some(limit);
        self
    }

    /// Waits for the reply without a deadline.
    #[inline]
    #[must_use]
    pub fn no_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }
}

// ============================================================================
// LoopCommand
// ============================================================================

/// Internal commands for the event loop.
enum LoopCommand {
    /// Write a serialized request.
    Send { id: RequestId, text: String },
    /// Close the socket.
    Shutdown,
}

// ============================================================================
// PendingSlot
// ============================================================================

/// Removes a pending entry when the awaiting call goes away.
///
/// Covers callers that drop a `call` future mid-flight. After a normal
/// completion the entry is already gone and this is a no-op.
struct PendingSlot<'a> {
    table: &'a Mutex<PendingTable>,
    id: RequestId,
}

impl Drop for PendingSlot<'_> {
    fn drop(&mut self) {
        self.table.lock().remove(self.id);
    }
}

// ============================================================================
// Connection
// ============================================================================

/// Shared state behind every [`Connection`] handle.
struct ConnectionInner {
    /// Channel for sending commands to the event loop.
    command_tx: mpsc::UnboundedSender<LoopCommand>,
    /// Correlation id source.
    ids: RequestIdAllocator,
    /// Outstanding commands (shared with event loop).
    pending: Arc<Mutex<PendingTable>>,
    /// Event listeners (shared with event loop).
    events: Arc<EventBus>,
    /// Flips to `true` exactly once, after the loop has stopped.
    closed_rx: watch::Receiver<bool>,
}

/// WebSocket connection to Chrome.
///
/// Handles request/response correlation and event routing. Cloning yields
/// another handle to the same connection.
///
/// # Example
///
/// ```no_run
/// use serde_json::json;
/// use x_quote::transport::{CallOptions, Connection};
///
/// # async fn example(ws_url: &str) -> x_quote::Result<()> {
/// let connection = Connection::connect(ws_url, std::time::Duration::from_secs(30)).await?;
/// let targets = connection
///     .call("Target.getTargets", None, CallOptions::new())
///     .await?;
/// println!("{targets}");
/// connection.shutdown();
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Connection {
    inner: Arc<ConnectionInner>,
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("pending", &self.pending_count())
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

impl Connection {
    /// Connects to a debugger WebSocket URL.
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionTimeout`] if the handshake does not finish in time
    /// - [`Error::WebSocket`] if the handshake fails
    pub async fn connect(url: &str, connect_timeout: Duration) -> Result<Self> {
        debug!(%url, "Connecting to DevTools WebSocket");

        let (ws_stream, _) = match timeout(connect_timeout, connect_async(url)).await {
            Ok(Ok(connected)) => connected,
            Ok(Err(e)) => {
                debug!(%url, error = %e, "WebSocket handshake failed");
                return Err(e.into());
            }
            Err(_) => {
                return Err(Error::connection_timeout(
                    connect_timeout.as_millis() as u64,
                ));
            }
        };

        debug!(%url, "DevTools WebSocket connected");
        Ok(Self::new(ws_stream))
    }

    /// Creates a connection from an established WebSocket stream.
    ///
    /// Spawns the event loop task internally.
    pub fn new<S>(ws_stream: WebSocketStream<S>) -> Self
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (closed_tx, closed_rx) = watch::channel(false);
        let pending = Arc::new(Mutex::new(PendingTable::new()));
        let events = Arc::new(EventBus::new());

        tokio::spawn(Self::run_event_loop(
            ws_stream,
            command_rx,
            Arc::clone(&pending),
            Arc::clone(&events),
            closed_tx,
        ));

        Self {
            inner: Arc::new(ConnectionInner {
                command_tx,
                ids: RequestIdAllocator::new(),
                pending,
                events,
                closed_rx,
            }),
        }
    }

    /// Sends a command and waits for its reply.
    ///
    /// # Arguments
    ///
    /// * `method` - Method in `Domain.method` format
    /// * `params` - Method parameters, omitted from the frame when `None`
    /// * `options` - Session and deadline
    ///
    /// # Errors
    ///
    /// - [`Error::Protocol`] if the reply carries an error payload
    /// - [`Error::RequestTimeout`] if no reply arrives within the deadline
    /// - [`Error::ConnectionClosed`] if the connection closes first
    /// - [`Error::Connection`] if the event loop is gone
    /// - [`Error::WebSocket`] if the frame cannot be written
    pub async fn call(
        &self,
        method: &str,
        params: Option<Value>,
        options: CallOptions,
    ) -> Result<Value> {
        let id = self.inner.ids.next();
        let request = Request::new(id, method, params, options.session_id);
        let text = serde_json::to_string(&request)?;

        let mut reply_rx = self.inner.pending.lock().register(id, method)?;
        let _slot = PendingSlot {
            table: &self.inner.pending,
            id,
        };

        self.inner
            .command_tx
            .send(LoopCommand::Send { id, text })
            .map_err(|_| Error::connection("WebSocket is not open"))?;

        trace!(%id, method, "Request queued");

        let received = match options.timeout {
            None => (&mut reply_rx).await,
            Some(limit) => match timeout(limit, &mut reply_rx).await {
                Ok(received) => received,
                Err(_) => {
                    if self.inner.pending.lock().remove(id) {
                        debug!(%id, method, timeout_ms = limit.as_millis() as u64, "Request timed out");
                        return Err(Error::request_timeout(
                            id,
                            method,
                            limit.as_millis() as u64,
                        ));
                    }
                    // The reply won the race and is already in the channel.
                    (&mut reply_rx).await
                }
            },
        };

        received.unwrap_or(Err(Error::ConnectionClosed))
    }

    /// Sends a typed command and waits for its reply.
    ///
    /// # Errors
    ///
    /// Same as [`call`](Self::call).
    pub async fn send(&self, command: impl Into<Command>, options: CallOptions) -> Result<Value> {
        let (method, params) = command.into().into_parts()?;
        self.call(&method, params, options).await
    }

    /// Registers an event handler for `method`.
    ///
    /// Handlers run on the event loop in registration order.
    pub fn on<F>(&self, method: impl Into<String>, handler: F)
    where
        F: Fn(&Event) -> Result<()> + Send + Sync + 'static,
    {
        self.inner.events.on(method, handler);
    }

    /// Returns the number of pending requests.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.inner.pending.lock().len()
    }

    /// Returns `true` once the event loop has stopped.
    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        *self.inner.closed_rx.borrow()
    }

    /// Waits until the event loop has stopped.
    pub async fn closed(&self) {
        let mut closed_rx = self.inner.closed_rx.clone();
        let _ = closed_rx.wait_for(|closed| *closed).await;
    }

    /// Closes the WebSocket.
    ///
    /// Outstanding requests fail with [`Error::ConnectionClosed`]. Calling
    /// this on a closed connection does nothing.
    pub fn shutdown(&self) {
        let _ = self.inner.command_tx.send(LoopCommand::Shutdown);
    }

    /// Event loop that handles WebSocket I/O.
    async fn run_event_loop<S>(
        ws_stream: WebSocketStream<S>,
        mut command_rx: mpsc::UnboundedReceiver<LoopCommand>,
        pending: Arc<Mutex<PendingTable>>,
        events: Arc<EventBus>,
        closed_tx: watch::Sender<bool>,
    ) where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let (mut ws_write, mut ws_read) = ws_stream.split();

        loop {
            tokio::select! {
                // Incoming frames from Chrome
                message = ws_read.next() => {
                    match message {
                        Some(Ok(Message::Text(text))) => {
                            Self::handle_incoming_message(text.as_str(), &pending, &events);
                        }

                        Some(Ok(Message::Binary(bytes))) => match std::str::from_utf8(&bytes) {
                            Ok(text) => Self::handle_incoming_message(text, &pending, &events),
                            Err(_) => warn!(len = bytes.len(), "Ignoring non-UTF-8 binary frame"),
                        },

                        Some(Ok(Message::Close(frame))) => {
                            debug!(?frame, "WebSocket closed by remote");
                            break;
                        }

                        Some(Err(e)) => {
                            error!(error = %e, "WebSocket error");
                            break;
                        }

                        None => {
                            debug!("WebSocket stream ended");
                            break;
                        }

                        // Ignore Ping, Pong, raw frames
                        _ => {}
                    }
                }

                // Commands from Rust API
                command = command_rx.recv() => {
                    match command {
                        Some(LoopCommand::Send { id, text }) => {
                            if let Err(e) = ws_write.send(Message::Text(text.into())).await {
                                warn!(%id, error = %e, "Failed to write request");
                                pending.lock().reject(id, Error::from(e));
                            } else {
                                trace!(%id, "Request sent");
                            }
                        }

                        Some(LoopCommand::Shutdown) => {
                            debug!("Shutdown command received");
                            let _ = ws_write.close().await;
                            break;
                        }

                        None => {
                            debug!("All connection handles dropped");
                            let _ = ws_write.close().await;
                            break;
                        }
                    }
                }
            }
        }

        let failed = pending.lock().fail_all();
        if failed > 0 {
            debug!(count = failed, "Failed pending requests on close");
        }

        closed_tx.send_replace(true);
        debug!("Event loop terminated");
    }

    /// Routes one inbound frame to the pending table or the event bus.
    fn handle_incoming_message(text: &str, pending: &Mutex<PendingTable>, events: &EventBus) {
        match Incoming::parse(text) {
            Ok(Incoming::Reply(response)) => {
                let id = response.id;
                if !pending.lock().resolve(response) {
                    // Late reply for a request that already timed out.
                    trace!(%id, "Dropping reply for unknown request");
                }
            }

            Ok(Incoming::Event(event)) => {
                let delivered = events.emit(&event);
                trace!(method = %event.method, delivered, "Event dispatched");
            }

            Ok(Incoming::Unrecognized) => {
                debug!(len = text.len(), "Ignoring frame that is neither reply nor event");
            }

            Err(e) => {
                warn!(error = %e, "Failed to parse incoming message");
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
