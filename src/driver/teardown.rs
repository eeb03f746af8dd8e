//! Unconditional cleanup of a run.
//!
//! [`Teardown`] collects the resources a run acquires (the child process
//! first, the connection once it exists) and releases them in order:
//!
//! 1. `Browser.close` with a bounded wait
//! 2. WebSocket close
//! 3. SIGTERM, then SIGKILL after the grace period
//!
//! Each step goes through [`best_effort`], so a failing step never skips
//! the ones after it. Running teardown twice is a no-op.

// ============================================================================
// Imports
// ============================================================================

use std::future::Future;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, warn};

use crate::browser::ProcessGuard;
use crate::error::Result;
use crate::protocol::BrowserCommand;
use crate::transport::{CallOptions, Connection};

// ============================================================================
// Functions
// ============================================================================

/// Awaits `operation`, logging and swallowing its error.
pub async fn best_effort<T, F>(label: &str, operation: F) -> Option<T>
where
    F: Future<Output = Result<T>>,
{
    match operation.await {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(step = label, error = %e, "Cleanup step failed, continuing");
            None
        }
    }
}

// ============================================================================
// Teardown
// ============================================================================

/// Resources to release at the end of a run.
#[derive(Debug)]
pub struct Teardown {
    connection: Option<Connection>,
    process: Option<ProcessGuard>,
    browser_close: Duration,
    kill_grace: Duration,
    done: bool,
}

impl Teardown {
    /// Creates a teardown owning `process`.
    #[must_use]
    pub fn new(process: Option<ProcessGuard>, browser_close: Duration, kill_grace: Duration) -> Self {
        Self {
            connection: None,
            process,
            browser_close,
            kill_grace,
            done: false,
        }
    }

    /// Registers the connection to close.
    pub fn attach_connection(&mut self, connection: Connection) {
        self.connection = Some(connection);
    }

    /// Returns `true` once [`run`](Self::run) has completed.
    #[inline]
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Releases everything. Never fails; later calls do nothing.
    pub async fn run(&mut self) {
        if self.done {
            debug!("Teardown already ran");
            return;
        }

        if let Some(connection) = self.connection.take() {
            if !connection.is_closed() {
                best_effort(
                    "Browser.close",
                    connection.send(
                        BrowserCommand::Close,
                        CallOptions::new().timeout(self.browser_close),
                    ),
                )
                .await;
            }
            connection.shutdown();
            if timeout(self.browser_close, connection.closed()).await.is_err() {
                warn!(
                    wait_ms = self.browser_close.as_millis() as u64,
                    "Connection did not close in time, continuing"
                );
            }
        }

        if let Some(mut process) = self.process.take() {
            let pid = process.pid();
            best_effort("terminate", process.terminate(self.kill_grace)).await;
            debug!(pid, "Browser process released");
        }

        self.done = true;
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use futures_util::{SinkExt, StreamExt};
    use serde_json::{Value, json};
    use tokio_tungstenite::WebSocketStream;
    use tokio_tungstenite::tungstenite::Message;
    use tokio_tungstenite::tungstenite::protocol::Role;

    use crate::error::Error;

    #[tokio::test]
    async fn test_best_effort() {
        assert_eq!(best_effort("ok", async { Ok(5) }).await, Some(5));
        let failed: Option<()> = best_effort("fail", async { Err(Error::ConnectionClosed) }).await;
        assert!(failed.is_none());
    }

    #[tokio::test]
    async fn test_empty_teardown_twice() {
        let mut teardown = Teardown::new(None, Duration::from_millis(100), Duration::from_millis(100));
        teardown.run().await;
        assert!(teardown.is_done());
        teardown.run().await;
    }

    #[tokio::test]
    async fn test_sends_browser_close_then_closes() {
        let (client_io, server_io) = tokio::io::duplex(64 * 1024);
        let client = WebSocketStream::from_raw_socket(client_io, Role::Client, None).await;
        let mut server = WebSocketStream::from_raw_socket(server_io, Role::Server, None).await;

        let server_task = tokio::spawn(async move {
            let mut methods = Vec::new();
            while let Some(Ok(message)) = server.next().await {
                let Message::Text(text) = message else { continue };
                let request: Value = serde_json::from_str(text.as_str()).expect("json");
                methods.push(request["method"].as_str().unwrap_or_default().to_string());
                let reply = json!({ "id": request["id"], "result": {} });
                let _ = server.send(Message::Text(reply.to_string().into())).await;
            }
            methods
        });

        let connection = Connection::new(client);
        let mut teardown = Teardown::new(None, Duration::from_secs(1), Duration::from_secs(1));
        teardown.attach_connection(connection.clone());
        teardown.run().await;

        assert!(connection.is_closed());
        assert_eq!(server_task.await.expect("server"), vec!["Browser.close".to_string()]);
    }

    #[tokio::test]
    async fn test_stuck_connection_does_not_block_teardown() {
        // The peer never reads, so the first write fills the pipe and the
        // event loop can no longer act on shutdown.
        let (client_io, _server_io) = tokio::io::duplex(16);
        let client = WebSocketStream::from_raw_socket(client_io, Role::Client, None).await;
        let connection = Connection::new(client);

        let mut teardown = Teardown::new(None, Duration::from_millis(200), Duration::from_millis(100));
        teardown.attach_connection(connection);

        tokio::time::timeout(Duration::from_secs(5), teardown.run())
            .await
            .expect("teardown finished despite the stuck socket");
        assert!(teardown.is_done());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_terminates_process_once() {
        use tokio_test::assert_ok;

        let process = assert_ok!(ProcessGuard::spawn(
            std::path::Path::new("/bin/sh"),
            &["-c".to_string(), "exec sleep 30".to_string()],
        ));

        let mut teardown = Teardown::new(Some(process), Duration::from_millis(100), Duration::from_secs(2));
        teardown.run().await;
        teardown.run().await;
        assert!(teardown.is_done());
    }
}
