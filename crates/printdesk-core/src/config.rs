// ── Runtime backend configuration ──
//
// These types describe *where* the backend lives and how to talk to it.
// They never touch disk. The config crate (or a test) builds a
// `BackendConfig` and hands it to `Backend::new`.

use std::time::Duration;

use printdesk_api::{ReconnectConfig, TransportConfig};

/// Configuration for one backend plus its print service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    /// Fallback base URL for the main API (e.g., `http://localhost:4000`).
    /// A persisted override takes precedence at request time.
    pub api_base: String,
    /// Fixed base URL of the print service. Never overridden.
    pub print_api_base: String,
    /// Optional request timeout; `None` waits on the network layer.
    pub timeout: Option<Duration>,
    /// Accept self-signed TLS certificates.
    pub accept_invalid_certs: bool,
    /// Status channel reconnect schedule.
    pub reconnect: ReconnectConfig,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            api_base: "http://localhost:4000".into(),
            print_api_base: "http://localhost:4001".into(),
            timeout: None,
            accept_invalid_certs: false,
            reconnect: ReconnectConfig::default(),
        }
    }
}

impl BackendConfig {
    pub(crate) fn transport(&self) -> TransportConfig {
        TransportConfig {
            timeout: self.timeout,
            accept_invalid_certs: self.accept_invalid_certs,
        }
    }
}
