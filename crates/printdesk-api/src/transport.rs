// Shared transport configuration for building reqwest::Client instances.
//
// The main backend client and the print-service client share the same
// builder logic through this module.

use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};

use crate::error::Error;

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone, Default)]
pub struct TransportConfig {
    /// Overall request timeout. `None` leaves failures to the network layer.
    pub timeout: Option<Duration>,
    /// Accept self-signed certificates.
    pub accept_invalid_certs: bool,
}

impl TransportConfig {
    /// Build a `reqwest::Client` that sends `Content-Type: application/json`
    /// on every request.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("printdesk/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers);

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if self.accept_invalid_certs {
            builder = builder.danger_accept_invalid_certs(true);
        }

        builder
            .build()
            .map_err(|e| Error::ClientBuild(e.to_string()))
    }
}
