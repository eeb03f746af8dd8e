//! Shared fixtures: a mock DevTools endpoint and a stand-in Chrome.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::net::TcpListener;

use x_quote::Timeouts;

// ============================================================================
// Mock DevTools
// ============================================================================

/// How the mock page behaves.
#[derive(Debug, Clone, Copy)]
pub struct PageBehavior {
    /// An x.com page is already open.
    pub existing_page: bool,
    /// The retweet button renders (the viewer is logged in).
    pub retweet_present: bool,
    /// The quote menu item renders after clicking retweet.
    pub quote_menu_present: bool,
    /// The compose textarea renders after choosing quote.
    pub compose_present: bool,
}

impl Default for PageBehavior {
    fn default() -> Self {
        Self {
            existing_page: true,
            retweet_present: true,
            quote_menu_present: true,
            compose_present: true,
        }
    }
}

struct MockState {
    port: u16,
    behavior: PageBehavior,
    requests: Mutex<Vec<Value>>,
}

/// In-process stand-in for Chrome's control port.
///
/// Serves `/json/version` and the browser WebSocket on one port, records
/// every request and answers the commands the workflow sends.
pub struct MockDevTools {
    state: Arc<MockState>,
}

impl MockDevTools {
    pub async fn start(behavior: PageBehavior) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind mock");
        let addr: SocketAddr = listener.local_addr().expect("mock addr");

        let state = Arc::new(MockState {
            port: addr.port(),
            behavior,
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/json/version", get(version))
            .route("/devtools/browser/mock", get(upgrade))
            .with_state(Arc::clone(&state));

        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { state }
    }

    pub fn port(&self) -> u16 {
        self.state.port
    }

    /// Every request received, in order.
    pub fn requests(&self) -> Vec<Value> {
        self.state.requests.lock().clone()
    }

    /// Methods of every request received, in order.
    pub fn methods(&self) -> Vec<String> {
        self.requests()
            .iter()
            .filter_map(|r| r["method"].as_str().map(str::to_string))
            .collect()
    }

    /// Expressions of every `Runtime.evaluate`, in order.
    pub fn expressions(&self) -> Vec<String> {
        self.requests()
            .iter()
            .filter(|r| r["method"] == "Runtime.evaluate")
            .filter_map(|r| r["params"]["expression"].as_str().map(str::to_string))
            .collect()
    }
}

async fn version(State(state): State<Arc<MockState>>) -> Json<Value> {
    Json(json!({
        "Browser": "HeadlessChrome/131.0.0.0",
        "Protocol-Version": "1.3",
        "webSocketDebuggerUrl": format!("ws://127.0.0.1:{}/devtools/browser/mock", state.port),
    }))
}

async fn upgrade(ws: WebSocketUpgrade, State(state): State<Arc<MockState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| serve_socket(socket, state))
}

async fn serve_socket(mut socket: WebSocket, state: Arc<MockState>) {
    while let Some(Ok(message)) = socket.recv().await {
        let Message::Text(text) = message else { continue };
        let request: Value = match serde_json::from_str(&text) {
            Ok(request) => request,
            Err(_) => continue,
        };
        state.requests.lock().push(request.clone());

        let method = request["method"].as_str().unwrap_or_default().to_string();
        let session = request["sessionId"].clone();

        if method == "Page.enable" {
            let event = json!({
                "method": "Page.loadEventFired",
                "params": { "timestamp": 1.0 },
                "sessionId": session,
            });
            let _ = socket.send(Message::Text(event.to_string())).await;
        }

        let result = answer(&method, &request, state.behavior);
        let reply = json!({ "id": request["id"], "result": result });
        if socket.send(Message::Text(reply.to_string())).await.is_err() {
            break;
        }

        if method == "Browser.close" {
            let _ = socket.send(Message::Close(None)).await;
            break;
        }
    }
}

fn answer(method: &str, request: &Value, behavior: PageBehavior) -> Value {
    match method {
        "Target.getTargets" => {
            let mut targets = vec![json!({
                "targetId": "SW1",
                "type": "service_worker",
                "title": "",
                "url": "https://x.com/sw.js",
                "attached": false,
            })];
            if behavior.existing_page {
                targets.push(json!({
                    "targetId": "PAGE1",
                    "type": "page",
                    "title": "X",
                    "url": "https://x.com/jack/status/20",
                    "attached": false,
                }));
            }
            json!({ "targetInfos": targets })
        }
        "Target.createTarget" => json!({ "targetId": "NEW1" }),
        "Target.attachToTarget" => json!({ "sessionId": "SESSION1" }),
        "Runtime.evaluate" => {
            let expression = request["params"]["expression"].as_str().unwrap_or_default();
            if expression.starts_with("!!document.querySelector(") {
                let present = if expression.contains("retweet") {
                    behavior.retweet_present
                } else if expression.contains("menuitem") {
                    behavior.quote_menu_present
                } else if expression.contains("tweetTextarea") {
                    behavior.compose_present
                } else {
                    true
                };
                json!({ "result": { "type": "boolean", "value": present } })
            } else {
                json!({ "result": { "type": "undefined" } })
            }
        }
        _ => json!({}),
    }
}

// ============================================================================
// Stand-in Chrome
// ============================================================================

const CHROME_SCRIPT: &str = r#"#!/bin/sh
for arg in "$@"; do
  case "$arg" in
    --user-data-dir=*) dir="${arg#--user-data-dir=}" ;;
  esac
done
echo $$ > "$dir/chrome.pid"
exec sleep 30
"#;

/// Path of a script that records its pid in the profile dir and sleeps.
#[cfg(unix)]
pub fn fake_chrome() -> &'static Path {
    static CHROME: OnceLock<PathBuf> = OnceLock::new();
    CHROME.get_or_init(|| {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::Builder::new()
            .prefix("x-quote-chrome")
            .tempdir()
            .expect("chrome dir")
            .keep();
        let path = dir.join("chrome");
        std::fs::write(&path, CHROME_SCRIPT).expect("write chrome script");
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).expect("chmod");
        path
    })
}

/// Reads the pid the stand-in Chrome wrote, waiting briefly for it.
pub async fn chrome_pid(profile: &Path) -> Option<u32> {
    let file = profile.join("chrome.pid");
    for _ in 0..50 {
        if let Ok(text) = tokio::fs::read_to_string(&file).await
            && let Ok(pid) = text.trim().parse()
        {
            return Some(pid);
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    None
}

/// Returns `true` while `pid` exists.
#[cfg(target_os = "linux")]
pub fn process_alive(pid: u32) -> bool {
    Path::new(&format!("/proc/{pid}")).exists()
}

/// Short deadlines so scenarios finish quickly.
pub fn fast_timeouts() -> Timeouts {
    Timeouts {
        launch: Duration::from_millis(2_000),
        launch_poll: Duration::from_millis(50),
        connect: Duration::from_millis(2_000),
        command: Duration::from_millis(2_000),
        page_grace: Duration::ZERO,
        page_load: Duration::from_millis(300),
        page_poll: Duration::from_millis(50),
        element: Duration::from_millis(300),
        element_poll: Duration::from_millis(50),
        retweet_settle: Duration::ZERO,
        quote_settle: Duration::ZERO,
        type_settle: Duration::ZERO,
        submit_settle: Duration::ZERO,
        preview_hold: Duration::from_millis(50),
        browser_close: Duration::from_millis(500),
        kill_grace: Duration::from_millis(500),
    }
}
