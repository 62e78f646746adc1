//! Realtime status channel with auto-reconnect.
//!
//! Opens a WebSocket to the resolved backend origin (`http` rewritten to
//! `ws`, `https` to `wss`) and keeps it alive. Inbound frames carry either
//! log events or a status heartbeat. Connection state, the status label and
//! the log list are observable through `watch`/`broadcast` channels.
//!
//! # Example
//!
//! ```rust,ignore
//! use printdesk_api::{BaseUrlResolver, ReconnectConfig, StatusChannel};
//!
//! let channel = StatusChannel::new(
//!     BaseUrlResolver::fixed("http://localhost:4000"),
//!     ReconnectConfig::default(),
//! );
//! let mut logs = channel.subscribe_logs();
//! channel.connect();
//!
//! while let Ok(entry) = logs.recv().await {
//!     println!("[{}] {}: {}", entry.level, entry.service, entry.message);
//! }
//!
//! channel.shutdown();
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::{self, ClientRequestBuilder};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::Error;
use crate::resolver::BaseUrlResolver;

// ── Broadcast channel capacity ───────────────────────────────────────

const LOG_CHANNEL_CAPACITY: usize = 1024;

// ── ConnectionState / ServerStatus ───────────────────────────────────

/// Socket lifecycle as observed by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    /// Socket closed; the next attempt fires after `delay`.
    Reconnecting { delay: Duration },
}

/// Status label shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ServerStatus {
    #[serde(rename = "Conectado")]
    Connected,
    #[default]
    #[serde(rename = "Detenido")]
    Stopped,
}

impl ServerStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Connected => "Conectado",
            Self::Stopped => "Detenido",
        }
    }
}

impl std::fmt::Display for ServerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ── LogEntry ─────────────────────────────────────────────────────────

/// A normalized log event received from the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// Receive time (the backend timestamp is not trusted).
    pub created_at: DateTime<Utc>,
    pub level: String,
    pub service: String,
    pub message: String,
    pub details: Option<LogDetails>,
}

/// Connection details attached to a log event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogDetails {
    pub ip: Option<String>,
    pub connection: Option<String>,
}

impl LogEntry {
    /// Normalize a raw log payload.
    ///
    /// Missing `level` becomes `INFO` (present levels are uppercased),
    /// missing `service` becomes `system`. `metadata.direccion` and
    /// `metadata.tipo` map onto `details.ip` and `details.connection`;
    /// without `metadata` there are no details.
    pub fn from_raw(raw: &Value) -> Self {
        let text = |key: &str| raw.get(key).and_then(Value::as_str);

        let details = match raw.get("metadata") {
            None | Some(Value::Null) => None,
            Some(meta) => Some(LogDetails {
                ip: meta.get("direccion").and_then(Value::as_str).map(String::from),
                connection: meta.get("tipo").and_then(Value::as_str).map(String::from),
            }),
        };

        Self {
            created_at: Utc::now(),
            level: text("level").map_or_else(|| "INFO".to_owned(), str::to_uppercase),
            service: text("service").unwrap_or("system").to_owned(),
            message: text("message").unwrap_or_default().to_owned(),
            details,
        }
    }
}

// ── ReconnectConfig / Backoff ────────────────────────────────────────

/// Exponential backoff configuration for socket reconnection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectConfig {
    /// Delay before the first reconnection attempt. Default: 2s.
    pub initial_delay: Duration,

    /// Upper bound on backoff delay. Default: 10s.
    pub max_delay: Duration,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(2000),
            max_delay: Duration::from_millis(10_000),
        }
    }
}

/// Doubling backoff without jitter. Retries forever.
///
/// Each close takes the current delay and doubles it for the next one,
/// capped at `max_delay`. Only a successful open resets it.
#[derive(Debug, Clone)]
pub struct Backoff {
    config: ReconnectConfig,
    current: Duration,
}

impl Backoff {
    pub fn new(config: ReconnectConfig) -> Self {
        Self {
            current: config.initial_delay,
            config,
        }
    }

    /// The delay the next close will schedule.
    pub fn current(&self) -> Duration {
        self.current.min(self.config.max_delay)
    }

    /// Delay to wait before the next attempt; advances the schedule.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current();
        self.current = self.current.saturating_mul(2).min(self.config.max_delay);
        delay
    }

    pub fn reset(&mut self) {
        self.current = self.config.initial_delay;
    }
}

// ── URL scheme mapping ───────────────────────────────────────────────

/// Map an HTTP origin onto its WebSocket endpoint.
///
/// `http` becomes `ws`, `https` becomes `wss`; `ws`/`wss` pass through.
/// Only the scheme changes, so hosts or paths containing "http" survive.
pub fn websocket_url(base: &str) -> Result<Url, Error> {
    let mut url = Url::parse(base).map_err(|source| Error::InvalidUrl {
        url: base.to_owned(),
        source,
    })?;

    let scheme = match url.scheme() {
        "http" => "ws",
        "https" => "wss",
        "ws" | "wss" => return Ok(url),
        other => return Err(Error::UnsupportedScheme(other.to_owned())),
    };
    url.set_scheme(scheme)
        .map_err(|()| Error::UnsupportedScheme(scheme.to_owned()))?;
    Ok(url)
}

// ── Shared observable state ──────────────────────────────────────────

struct Shared {
    state: watch::Sender<ConnectionState>,
    status: watch::Sender<ServerStatus>,
    logs: Mutex<VecDeque<Arc<LogEntry>>>,
    log_tx: broadcast::Sender<Arc<LogEntry>>,
}

impl Shared {
    fn new() -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        let (status, _) = watch::channel(ServerStatus::Stopped);
        let (log_tx, _) = broadcast::channel(LOG_CHANNEL_CAPACITY);
        Self {
            state,
            status,
            logs: Mutex::new(VecDeque::new()),
            log_tx,
        }
    }

    fn mark_connected(&self) {
        self.status.send_replace(ServerStatus::Connected);
        self.state.send_replace(ConnectionState::Connected);
    }

    fn mark_stopped(&self, state: ConnectionState) {
        self.status.send_replace(ServerStatus::Stopped);
        self.state.send_replace(state);
    }

    /// Parse one text frame. Unknown shapes are ignored, invalid JSON is
    /// logged and dropped.
    fn handle_frame(&self, text: &str) {
        let frame: Value = match serde_json::from_str(text) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, frame = text, "invalid status frame");
                return;
            }
        };

        if frame.get("type").and_then(Value::as_str) == Some("log") {
            let entry = Arc::new(LogEntry::from_raw(frame.get("data").unwrap_or(&Value::Null)));
            self.logs
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push_front(Arc::clone(&entry));
            // No subscribers is fine; the list above is the source of truth
            let _ = self.log_tx.send(entry);
            return;
        }

        if frame.get("status").and_then(Value::as_str) == Some(ServerStatus::Connected.label()) {
            self.status.send_replace(ServerStatus::Connected);
        }
    }
}

// ── StatusChannel ────────────────────────────────────────────────────

/// Owns one live socket to the backend plus its reconnect timer.
///
/// Dropping the channel (or calling [`shutdown`](Self::shutdown)) closes the
/// socket and cancels any pending reconnect. A shut-down channel stays down.
pub struct StatusChannel {
    resolver: BaseUrlResolver,
    reconnect: ReconnectConfig,
    shared: Arc<Shared>,
    cancel: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl StatusChannel {
    pub fn new(resolver: BaseUrlResolver, reconnect: ReconnectConfig) -> Self {
        Self {
            resolver,
            reconnect,
            shared: Arc::new(Shared::new()),
            cancel: CancellationToken::new(),
            task: Mutex::new(None),
        }
    }

    /// Start the connection loop. No-op while a socket task is live or
    /// after shutdown. Must be called inside a tokio runtime.
    pub fn connect(&self) {
        if self.cancel.is_cancelled() {
            debug!("status channel already shut down, ignoring connect");
            return;
        }

        let mut task = self.task.lock().unwrap_or_else(PoisonError::into_inner);
        if task.as_ref().is_some_and(|handle| !handle.is_finished()) {
            debug!("status channel already running");
            return;
        }

        let worker = Worker {
            resolver: self.resolver.clone(),
            backoff: Backoff::new(self.reconnect),
            shared: Arc::clone(&self.shared),
            cancel: self.cancel.clone(),
        };
        *task = Some(tokio::spawn(worker.run()));
    }

    /// Close the socket and cancel any pending reconnect. Idempotent.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn state(&self) -> ConnectionState {
        *self.shared.state.borrow()
    }

    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.shared.state.subscribe()
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    pub fn status(&self) -> ServerStatus {
        *self.shared.status.borrow()
    }

    pub fn watch_status(&self) -> watch::Receiver<ServerStatus> {
        self.shared.status.subscribe()
    }

    /// Snapshot of received log entries, newest first.
    pub fn logs(&self) -> Vec<Arc<LogEntry>> {
        self.shared
            .logs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    /// Receive log entries as they arrive.
    pub fn subscribe_logs(&self) -> broadcast::Receiver<Arc<LogEntry>> {
        self.shared.log_tx.subscribe()
    }
}

impl Drop for StatusChannel {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

// ── Background reconnection loop ─────────────────────────────────────

struct Worker {
    resolver: BaseUrlResolver,
    backoff: Backoff,
    shared: Arc<Shared>,
    cancel: CancellationToken,
}

impl Worker {
    /// Main loop: connect → read → on close, backoff → reconnect.
    async fn run(mut self) {
        loop {
            // Re-resolve each attempt; the override may have changed.
            let base = self.resolver.resolve();
            self.shared.state.send_replace(ConnectionState::Connecting);

            let result = tokio::select! {
                biased;
                () = self.cancel.cancelled() => break,
                result = session(&base, &self.shared, &mut self.backoff) => result,
            };

            if let Err(e) = result {
                warn!(error = %e, "status socket error");
                self.shared.mark_stopped(ConnectionState::Disconnected);
            }

            let delay = self.backoff.next_delay();
            info!(
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                "status socket closed, waiting before reconnect"
            );
            self.shared
                .mark_stopped(ConnectionState::Reconnecting { delay });

            tokio::select! {
                biased;
                () = self.cancel.cancelled() => break,
                () = tokio::time::sleep(delay) => {}
            }
        }

        self.shared.mark_stopped(ConnectionState::Disconnected);
        debug!("status channel loop exiting");
    }
}

// ── Single connection lifecycle ──────────────────────────────────────

/// Open one socket and read frames until it closes.
async fn session(base: &str, shared: &Shared, backoff: &mut Backoff) -> Result<(), Error> {
    let url = websocket_url(base)?;
    info!(url = %url, "connecting status socket");

    let uri: tungstenite::http::Uri = url
        .as_str()
        .parse()
        .map_err(|e: tungstenite::http::uri::InvalidUri| Error::WebSocketConnect(e.to_string()))?;

    let (ws_stream, _response) = tokio_tungstenite::connect_async(ClientRequestBuilder::new(uri))
        .await
        .map_err(|e| Error::WebSocketConnect(e.to_string()))?;

    info!("status socket connected");
    backoff.reset();
    shared.mark_connected();

    let (_write, mut read) = ws_stream.split();

    while let Some(frame) = read.next().await {
        match frame {
            Ok(tungstenite::Message::Text(text)) => shared.handle_frame(text.as_str()),
            Ok(tungstenite::Message::Close(frame)) => {
                if let Some(ref cf) = frame {
                    info!(code = %cf.code, reason = %cf.reason, "status socket close frame");
                } else {
                    info!("status socket close frame (no payload)");
                }
                return Ok(());
            }
            Ok(_) => {
                // Binary, Ping, Pong, Frame -- ignore
            }
            Err(e) => return Err(Error::WebSocketConnect(e.to_string())),
        }
    }

    info!("status socket stream ended");
    Ok(())
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn default_reconnect_config() {
        let config = ReconnectConfig::default();
        assert_eq!(config.initial_delay, Duration::from_millis(2000));
        assert_eq!(config.max_delay, Duration::from_millis(10_000));
    }

    #[test]
    fn backoff_doubles_up_to_ceiling() {
        let mut backoff = Backoff::new(ReconnectConfig::default());
        let delays: Vec<u128> = (0..6).map(|_| backoff.next_delay().as_millis()).collect();
        assert_eq!(delays, vec![2000, 4000, 8000, 10_000, 10_000, 10_000]);
    }

    #[test]
    fn backoff_matches_closed_form() {
        let mut backoff = Backoff::new(ReconnectConfig::default());
        for n in 0..8u32 {
            let expected = (2000u64 * 2u64.pow(n)).min(10_000);
            assert_eq!(backoff.next_delay(), Duration::from_millis(expected), "attempt {n}");
        }
    }

    #[test]
    fn backoff_resets_after_open() {
        let mut backoff = Backoff::new(ReconnectConfig::default());
        backoff.next_delay();
        backoff.next_delay();
        assert_eq!(backoff.current(), Duration::from_millis(8000));
        backoff.reset();
        assert_eq!(backoff.next_delay(), Duration::from_millis(2000));
    }

    #[test]
    fn websocket_url_rewrites_scheme_only() {
        assert_eq!(
            websocket_url("http://localhost:4000").unwrap().as_str(),
            "ws://localhost:4000/"
        );
        assert_eq!(
            websocket_url("https://print.example.com").unwrap().as_str(),
            "wss://print.example.com/"
        );
        assert_eq!(
            websocket_url("http://http-gateway:8080/http").unwrap().as_str(),
            "ws://http-gateway:8080/http"
        );
        assert_eq!(
            websocket_url("wss://already:1").unwrap().as_str(),
            "wss://already:1/"
        );
    }

    #[test]
    fn websocket_url_rejects_other_schemes() {
        assert!(matches!(
            websocket_url("ftp://files.local"),
            Err(Error::UnsupportedScheme(s)) if s == "ftp"
        ));
        assert!(matches!(websocket_url("nope"), Err(Error::InvalidUrl { .. })));
    }

    #[test]
    fn log_defaults_applied() {
        let entry = LogEntry::from_raw(&json!({ "message": "spooler started" }));
        assert_eq!(entry.level, "INFO");
        assert_eq!(entry.service, "system");
        assert_eq!(entry.message, "spooler started");
        assert_eq!(entry.details, None);
    }

    #[test]
    fn log_metadata_mapped_to_details() {
        let entry = LogEntry::from_raw(&json!({
            "level": "warn",
            "service": "printer",
            "message": "client joined",
            "metadata": { "direccion": "192.168.1.20", "tipo": "websocket" }
        }));
        assert_eq!(entry.level, "WARN");
        assert_eq!(entry.service, "printer");
        assert_eq!(
            entry.details,
            Some(LogDetails {
                ip: Some("192.168.1.20".into()),
                connection: Some("websocket".into()),
            })
        );
    }

    #[test]
    fn log_from_null_payload() {
        let entry = LogEntry::from_raw(&Value::Null);
        assert_eq!(entry.level, "INFO");
        assert_eq!(entry.message, "");
        assert!(entry.details.is_none());
    }

    #[test]
    fn log_frames_are_prepended() {
        let shared = Shared::new();
        let mut rx = shared.log_tx.subscribe();

        shared.handle_frame(&json!({ "type": "log", "data": { "message": "first" } }).to_string());
        shared.handle_frame(&json!({ "type": "log", "data": { "message": "second" } }).to_string());

        let logs = shared.logs.lock().unwrap();
        let messages: Vec<&str> = logs.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["second", "first"]);
        assert_eq!(rx.try_recv().unwrap().message, "first");
    }

    #[test]
    fn status_frame_sets_label_only() {
        let shared = Shared::new();
        shared.handle_frame(r#"{"status":"Conectado"}"#);
        assert_eq!(*shared.status.borrow(), ServerStatus::Connected);
        assert_eq!(*shared.state.borrow(), ConnectionState::Disconnected);
    }

    #[test]
    fn malformed_and_unknown_frames_are_ignored() {
        let shared = Shared::new();
        shared.handle_frame("not json at all");
        shared.handle_frame(r#"{"type":"metrics","data":{}}"#);
        shared.handle_frame(r#"{"status":"Detenido"}"#);
        shared.handle_frame("42");

        assert!(shared.logs.lock().unwrap().is_empty());
        assert_eq!(*shared.status.borrow(), ServerStatus::Stopped);
    }

    #[test]
    fn status_labels() {
        assert_eq!(ServerStatus::Connected.to_string(), "Conectado");
        assert_eq!(ServerStatus::Stopped.label(), "Detenido");
    }
}
