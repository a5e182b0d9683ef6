//! X Eyes host bridge: JSON-RPC over stdin/stdout.
//!
//! Protocol: one JSON object per line (newline-delimited JSON).
//! Request:  {"id":1, "method":"navigation.before", "params":{"url":"...","tabId":3,"frameKind":"main"}}
//! Response: {"id":1, "result":{"cancel":true}} or {"id":1, "error":"..."}
//! Event:    {"event":"navigate", "tabId":3, "url":"moz-extension://...", "redirect":7}
//!
//! The host answers a `navigate` event by moving the tab and calling
//! `navigation.settled` with `{"tabId":3, "redirect":7}` once it has
//! landed or failed.

use std::future::{ready, Future};
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Instant;

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

use xeyes::app::App;
use xeyes::host::TabNavigator;
use xeyes::managers::redirect_guard::Generation;
use xeyes::rpc_handler::handle_method;
use xeyes::tracing_setup::init_tracing;
use xeyes::types::errors::NavigationError;

/// Simple rate limiter: max requests per second.
struct RateLimiter {
    window_start: Instant,
    request_count: u32,
    max_per_second: u32,
}

impl RateLimiter {
    fn new(max_per_second: u32) -> Self {
        Self { window_start: Instant::now(), request_count: 0, max_per_second }
    }

    /// Returns true if the request is allowed, false if rate-limited.
    fn check(&mut self) -> bool {
        if self.window_start.elapsed().as_secs() >= 1 {
            self.window_start = Instant::now();
            self.request_count = 0;
        }
        self.request_count += 1;
        self.request_count <= self.max_per_second
    }
}

fn emit(line: &Value) {
    let mut out = io::stdout().lock();
    if writeln!(out, "{}", line).and_then(|_| out.flush()).is_err() {
        error!("stdout closed");
    }
}

/// Hands replacement navigations to the host as `navigate` events.
struct StdoutNavigator;

impl TabNavigator for StdoutNavigator {
    fn navigate_tab(
        &self,
        tab_id: i64,
        url: &str,
        redirect: Generation,
    ) -> impl Future<Output = Result<(), NavigationError>> + Send {
        emit(&json!({"event": "navigate", "tabId": tab_id, "url": url, "redirect": redirect}));
        ready(Ok(()))
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_tracing();

    let mut app = match App::open(Arc::new(StdoutNavigator)) {
        Ok(app) => app,
        Err(e) => {
            error!(error = %e, "failed to start");
            std::process::exit(1);
        }
    };

    emit(&json!({"event": "ready", "version": env!("CARGO_PKG_VERSION")}));
    info!("host bridge ready");

    let mut rate_limiter = RateLimiter::new(200);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "stdin read failed");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: Value = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                emit(&json!({"id": null, "error": format!("parse error: {}", e)}));
                continue;
            }
        };

        let id = req.get("id").cloned().unwrap_or(Value::Null);

        if !rate_limiter.check() {
            emit(&json!({"id": id, "error": "rate limit exceeded"}));
            continue;
        }

        let method = req.get("method").and_then(|v| v.as_str()).unwrap_or("");
        let params = req.get("params").cloned().unwrap_or(json!({}));

        let response = match handle_method(&mut app, method, &params).await {
            Ok(val) => json!({"id": id, "result": val}),
            Err(err) => json!({"id": id, "error": err}),
        };
        emit(&response);
    }

    app.shutdown();
}
