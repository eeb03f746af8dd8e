//! `Connection` over a real WebSocket handshake.

mod common;

use std::time::Duration;

use common::{MockDevTools, PageBehavior};
use x_quote::transport::wait_for_debugger_url;
use x_quote::{CallOptions, Connection, Error};

#[tokio::test]
async fn test_discover_connect_and_call() -> anyhow::Result<()> {
    let mock = MockDevTools::start(PageBehavior::default()).await;

    let url = wait_for_debugger_url(mock.port(), Duration::from_secs(2), Duration::from_millis(50)).await?;
    assert!(url.ends_with("/devtools/browser/mock"));

    let connection = Connection::connect(&url, Duration::from_secs(2)).await?;

    let (targets, created) = tokio::join!(
        connection.call("Target.getTargets", None, CallOptions::new()),
        connection.call(
            "Target.createTarget",
            Some(serde_json::json!({ "url": "about:blank" })),
            CallOptions::new(),
        ),
    );
    assert!(targets?["targetInfos"].is_array());
    assert_eq!(created?["targetId"], "NEW1");
    assert_eq!(connection.pending_count(), 0);

    connection.shutdown();
    tokio::time::timeout(Duration::from_secs(2), connection.closed()).await?;

    let err = connection
        .call("Target.getTargets", None, CallOptions::new())
        .await
        .expect_err("closed");
    assert!(err.is_connection_error(), "{err:?}");
    Ok(())
}

#[tokio::test]
async fn test_connect_refused() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("addr").port()
    };

    let err = Connection::connect(&format!("ws://127.0.0.1:{port}/devtools/browser/x"), Duration::from_secs(2))
        .await
        .expect_err("refused");
    assert!(matches!(err, Error::WebSocket(_)), "{err:?}");
    assert!(err.is_connection_error());
}

#[tokio::test]
async fn test_connect_times_out_on_silent_peer() {
    // Accepts TCP but never answers the WebSocket upgrade.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let port = listener.local_addr().expect("addr").port();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    let start = std::time::Instant::now();
    let err = Connection::connect(&format!("ws://127.0.0.1:{port}/devtools/browser/x"), Duration::from_millis(300))
        .await
        .expect_err("handshake never completes");

    assert!(matches!(err, Error::ConnectionTimeout { timeout_ms: 300 }), "{err:?}");
    assert!(err.is_connection_error());
    assert!(start.elapsed() >= Duration::from_millis(300));
}

#[tokio::test]
async fn test_browser_close_ends_the_connection() {
    let mock = MockDevTools::start(PageBehavior::default()).await;
    let url = format!("ws://127.0.0.1:{}/devtools/browser/mock", mock.port());
    let connection = Connection::connect(&url, Duration::from_secs(2))
        .await
        .expect("connect");

    connection
        .call("Browser.close", None, CallOptions::new().no_timeout())
        .await
        .expect("close acknowledged");

    tokio::time::timeout(Duration::from_secs(2), connection.closed())
        .await
        .expect("server closed the socket");
    assert!(connection.is_closed());
}
