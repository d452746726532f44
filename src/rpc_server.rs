//! Shelfmark RPC server: JSON-RPC over stdin/stdout for a front-end shell.
//!
//! Protocol: one JSON object per line (newline-delimited JSON).
//! Request:  {"id":1, "method":"bookmark.add", "params":{"url":"...","title":"..."}}
//! Response: {"id":1, "result":{...}} or {"id":1, "error":"..."}
//!
//! Logs go to stderr; stdout carries only protocol lines.

use std::io::{self, BufRead, Write};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use log::{error, info, warn};
use serde_json::{json, Value};

use shelfmark::app::App;
use shelfmark::platform;
use shelfmark::rpc_handler::{handle_method, run_sync};
use shelfmark::types::sync::SyncMode;

/// How often the timers (debounced save, periodic backup, auto-sync) are polled.
const TICK_INTERVAL: Duration = Duration::from_millis(250);

/// Maximum requests accepted per one-second window.
const MAX_REQUESTS_PER_SECOND: u32 = 200;

/// Simple fixed-window rate limiter.
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
        if self.window_start.elapsed() >= Duration::from_secs(1) {
            self.window_start = Instant::now();
            self.request_count = 0;
        }
        self.request_count += 1;
        self.request_count <= self.max_per_second
    }
}

fn send(line: &Value) {
    let mut out = io::stdout().lock();
    if writeln!(out, "{}", line).and_then(|_| out.flush()).is_err() {
        error!("stdout closed");
    }
}

/// Polls the app timers and runs auto-sync when a flush requested it.
async fn run_ticker(app: Arc<Mutex<App>>) {
    let mut interval = tokio::time::interval(TICK_INTERVAL);
    loop {
        interval.tick().await;
        let sync_wanted = {
            let mut a = match app.lock() {
                Ok(a) => a,
                Err(e) => {
                    error!("app lock poisoned: {}", e);
                    return;
                }
            };
            if let Err(e) = a.tick(Instant::now()) {
                warn!("background save failed: {}", e);
            }
            a.take_sync_request()
        };
        if sync_wanted {
            match run_sync(&app, SyncMode::Upload).await {
                Ok(report) if report.upload_skipped => info!("auto-sync: remote already current"),
                Ok(report) => info!("auto-sync: uploaded {} bookmark(s)", report.uploaded),
                Err(e) => warn!("auto-sync failed: {}", e),
            }
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let db_path = platform::database_path();
    let runtime = tokio::runtime::Runtime::new()?;
    let app = Arc::new(Mutex::new(App::new(&db_path.to_string_lossy(), None)?));
    info!("library database at {}", db_path.display());

    let ticker = runtime.spawn(run_ticker(app.clone()));

    send(&json!({"event": "ready", "version": env!("CARGO_PKG_VERSION")}));

    let mut rate_limiter = RateLimiter::new(MAX_REQUESTS_PER_SECOND);

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: Value = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                send(&json!({"id": null, "error": format!("parse error: {}", e)}));
                continue;
            }
        };

        let id = req.get("id").cloned().unwrap_or(Value::Null);

        if !rate_limiter.check() {
            send(&json!({"id": id, "error": "rate limit exceeded"}));
            continue;
        }

        let method = req.get("method").and_then(|v| v.as_str()).unwrap_or("");
        let params = req.get("params").cloned().unwrap_or(json!({}));

        let response = match handle_method(&app, runtime.handle(), method, &params) {
            Ok(val) => json!({"id": id, "result": val}),
            Err(err) => json!({"id": id, "error": err}),
        };
        send(&response);
    }

    ticker.abort();
    let mut a = app.lock().map_err(|e| e.to_string())?;
    a.shutdown()?;
    Ok(())
}
