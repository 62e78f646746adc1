use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Normalized error body for a failed request.
///
/// Built either from the JSON body the backend returned (its `message`
/// field, with the whole body kept in `raw`) or synthesized from the
/// status line when the body is not JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<serde_json::Value>,
}

impl ApiError {
    /// Synthesize an error from the HTTP status line.
    pub fn from_status(status: reqwest::StatusCode) -> Self {
        Self {
            message: format!(
                "HTTP Error: {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("")
            )
            .trim_end()
            .to_owned(),
            raw: None,
        }
    }

    /// Normalize a failed response body.
    ///
    /// A parseable JSON body is kept as `raw`; its `message` string wins
    /// over the synthesized status line when present.
    pub fn from_body(status: reqwest::StatusCode, body: &str) -> Self {
        match serde_json::from_str::<serde_json::Value>(body) {
            Ok(raw) => {
                let message = raw
                    .get("message")
                    .and_then(serde_json::Value::as_str)
                    .map_or_else(|| Self::from_status(status).message, String::from);
                Self {
                    message,
                    raw: Some(raw),
                }
            }
            Err(_) => Self::from_status(status),
        }
    }
}

/// Top-level error type for the `printdesk-api` crate.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The resolved base URL plus path did not form a valid URL.
    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// Base URL scheme cannot be mapped onto a WebSocket scheme.
    #[error("Unsupported URL scheme '{0}' (expected http or https)")]
    UnsupportedScheme(String),

    /// HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    // ── Backend ─────────────────────────────────────────────────────
    /// Non-2xx response, normalized into an [`ApiError`].
    #[error("Request failed (HTTP {status}): {}", error.message)]
    RequestFailed { status: u16, error: ApiError },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    // ── WebSocket ───────────────────────────────────────────────────
    /// WebSocket connection failed or dropped with an error.
    #[error("WebSocket connection failed: {0}")]
    WebSocketConnect(String),
}

impl Error {
    /// Message suitable for a user-facing notification.
    pub fn user_message(&self) -> String {
        match self {
            Self::RequestFailed { error, .. } => error.message.clone(),
            other => other.to_string(),
        }
    }

    /// HTTP status of a failed request, if the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RequestFailed { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Returns `true` if the backend could not be reached at all.
    pub fn is_network(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            Self::WebSocketConnect(_) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn json_body_message_is_used() {
        let err = ApiError::from_body(StatusCode::NOT_FOUND, r#"{"message":"not found"}"#);
        assert_eq!(err.message, "not found");
        assert_eq!(err.raw.unwrap()["message"], "not found");
    }

    #[test]
    fn json_body_without_message_falls_back_to_status_line() {
        let err = ApiError::from_body(StatusCode::BAD_REQUEST, r#"{"code":17}"#);
        assert_eq!(err.message, "HTTP Error: 400 Bad Request");
        assert!(err.raw.is_some());
    }

    #[test]
    fn non_json_body_is_synthesized() {
        let err = ApiError::from_body(StatusCode::INTERNAL_SERVER_ERROR, "<html>boom</html>");
        assert_eq!(err.message, "HTTP Error: 500 Internal Server Error");
        assert!(err.raw.is_none());
    }

    #[test]
    fn user_message_prefers_backend_text() {
        let err = Error::RequestFailed {
            status: 409,
            error: ApiError {
                message: "duplicate printer".into(),
                raw: None,
            },
        };
        assert_eq!(err.user_message(), "duplicate printer");
        assert_eq!(err.status(), Some(409));
        assert!(!err.is_not_found());
    }
}
