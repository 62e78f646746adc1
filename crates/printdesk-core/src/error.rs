// ── Core error types ──
//
// User-facing errors from printdesk-core. Consumers see a failed request
// as "not found", "connection failed" or a backend message, never as a raw
// transport error. The `From<printdesk_api::Error>` impl does the mapping.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach backend at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Not found: {message}")]
    NotFound { message: String },

    // ── Backend errors ───────────────────────────────────────────────
    #[error("Backend error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if the backend answered).
        status: Option<u16>,
        /// The JSON error body, when there was one.
        raw: Option<serde_json::Value>,
    },

    // ── Service control ──────────────────────────────────────────────
    #[error("A service name is required")]
    MissingServiceName,

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Failed to persist base URL override: {0}")]
    Persist(#[from] std::io::Error),

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// HTTP status attached to the failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::NotFound { .. } => Some(404),
            Self::Api { status, .. } => *status,
            _ => None,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<printdesk_api::Error> for CoreError {
    fn from(err: printdesk_api::Error) -> Self {
        match err {
            printdesk_api::Error::RequestFailed { status: 404, error } => CoreError::NotFound {
                message: error.message,
            },
            printdesk_api::Error::RequestFailed { status, error } => CoreError::Api {
                message: error.message,
                status: Some(status),
                raw: error.raw,
            },
            printdesk_api::Error::Transport(ref e) if e.is_connect() || e.is_timeout() => {
                CoreError::ConnectionFailed {
                    url: e.url().map_or_else(|| "<unknown>".into(), ToString::to_string),
                    reason: e.to_string(),
                }
            }
            printdesk_api::Error::Transport(e) => CoreError::Api {
                message: e.to_string(),
                status: e.status().map(|s| s.as_u16()),
                raw: None,
            },
            printdesk_api::Error::InvalidUrl { url, source } => CoreError::Config {
                message: format!("Invalid URL '{url}': {source}"),
            },
            printdesk_api::Error::UnsupportedScheme(scheme) => CoreError::Config {
                message: format!("Unsupported URL scheme '{scheme}'"),
            },
            printdesk_api::Error::ClientBuild(reason) => CoreError::Config {
                message: format!("HTTP client: {reason}"),
            },
            printdesk_api::Error::WebSocketConnect(reason) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("WebSocket connection failed: {reason}"),
            },
            printdesk_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
