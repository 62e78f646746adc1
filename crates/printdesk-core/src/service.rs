// ── OS service control through the privileged bridge ──
//
// The desktop shell (or any host with elevated rights) exposes a bridge
// that can report where the backend server listens and start/stop/restart
// named OS services. `ServiceManager` wraps it so that every failure mode
// comes back as a `ServiceOutcome` with `success: false`; nothing here
// returns an error to the caller once constructed.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;
use tracing::{info, warn};

use crate::error::CoreError;

/// Message returned when no bridge is attached.
pub const BRIDGE_UNAVAILABLE_MESSAGE: &str =
    "Service control is not available outside the desktop shell.";

// ── Bridge contract ──────────────────────────────────────────────────

/// Operations supported on a named service.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ServiceOperation {
    Start,
    Stop,
    Restart,
}

/// Where the backend server listens, as reported by the bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub url: String,
    pub port: u16,
}

impl ServerConfig {
    /// Base URL in the form `http://<url>:<port>`.
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.url, self.port)
    }
}

/// Raw reply from the bridge for a service operation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BridgeReply {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Error)]
pub enum BridgeError {
    /// The host has no privileged bridge (e.g. not running in the shell).
    #[error("privileged bridge unavailable")]
    Unavailable,

    /// The bridge call itself failed.
    #[error("{0}")]
    Failed(String),
}

/// Host-provided channel for privileged operations.
#[async_trait]
pub trait PrivilegedBridge: Send + Sync {
    /// Report the backend server's host and port.
    async fn server_config(&self) -> Result<ServerConfig, BridgeError>;

    /// Run `operation` against the OS service `name`.
    async fn manage_service(
        &self,
        name: &str,
        operation: ServiceOperation,
    ) -> Result<BridgeReply, BridgeError>;
}

// ── ServiceManager ───────────────────────────────────────────────────

/// Final result of a service operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceOutcome {
    pub success: bool,
    pub message: String,
}

impl ServiceOutcome {
    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Start/stop/restart one named service through the bridge.
#[derive(Clone)]
pub struct ServiceManager {
    name: String,
    bridge: Option<Arc<dyn PrivilegedBridge>>,
}

impl ServiceManager {
    /// A manager for `name`. `bridge` is `None` when the host has none.
    pub fn new(
        name: impl Into<String>,
        bridge: Option<Arc<dyn PrivilegedBridge>>,
    ) -> Result<Self, CoreError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CoreError::MissingServiceName);
        }
        Ok(Self { name, bridge })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn start_service(&self) -> ServiceOutcome {
        self.manage_service(ServiceOperation::Start).await
    }

    pub async fn stop_service(&self) -> ServiceOutcome {
        self.manage_service(ServiceOperation::Stop).await
    }

    pub async fn restart_service(&self) -> ServiceOutcome {
        self.manage_service(ServiceOperation::Restart).await
    }

    /// Forward `operation` to the bridge. Never fails; inspect `success`.
    pub async fn manage_service(&self, operation: ServiceOperation) -> ServiceOutcome {
        let Some(bridge) = self.bridge.as_ref() else {
            warn!(service = %self.name, "service bridge not available");
            return ServiceOutcome::failed(BRIDGE_UNAVAILABLE_MESSAGE);
        };

        match bridge.manage_service(&self.name, operation).await {
            Ok(reply) if reply.success => {
                info!(service = %self.name, %operation, "service operation succeeded");
                ServiceOutcome {
                    success: true,
                    message: reply
                        .message
                        .filter(|m| !m.is_empty())
                        .unwrap_or_else(|| format!("Service '{}' {operation} completed.", self.name)),
                }
            }
            Ok(reply) => ServiceOutcome::failed(
                reply
                    .message
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| "Unknown error while operating the service.".into()),
            ),
            Err(BridgeError::Unavailable) => {
                warn!(service = %self.name, "service bridge not available");
                ServiceOutcome::failed(BRIDGE_UNAVAILABLE_MESSAGE)
            }
            Err(BridgeError::Failed(reason)) => {
                warn!(service = %self.name, %operation, %reason, "service operation failed");
                ServiceOutcome::failed(format!(
                    "System error (administrator permissions?): {reason}"
                ))
            }
        }
    }
}

impl std::fmt::Debug for ServiceManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceManager")
            .field("name", &self.name)
            .field("has_bridge", &self.bridge.is_some())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;
    use std::sync::Mutex;

    use super::*;

    struct FakeBridge {
        reply: Result<BridgeReply, String>,
        calls: Mutex<Vec<(String, ServiceOperation)>>,
    }

    impl FakeBridge {
        fn new(reply: Result<BridgeReply, String>) -> Arc<Self> {
            Arc::new(Self {
                reply,
                calls: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl PrivilegedBridge for FakeBridge {
        async fn server_config(&self) -> Result<ServerConfig, BridgeError> {
            Err(BridgeError::Unavailable)
        }

        async fn manage_service(
            &self,
            name: &str,
            operation: ServiceOperation,
        ) -> Result<BridgeReply, BridgeError> {
            self.calls.lock().unwrap().push((name.to_owned(), operation));
            self.reply.clone().map_err(BridgeError::Failed)
        }
    }

    #[test]
    fn empty_name_is_rejected() {
        assert!(matches!(
            ServiceManager::new("  ", None),
            Err(CoreError::MissingServiceName)
        ));
    }

    #[test]
    fn operation_names() {
        assert_eq!(ServiceOperation::Restart.to_string(), "restart");
        assert_eq!(ServiceOperation::from_str("stop").unwrap(), ServiceOperation::Stop);
        assert!(ServiceOperation::from_str("reload").is_err());
    }

    #[test]
    fn server_config_base_url() {
        let config = ServerConfig {
            url: "192.168.1.5".into(),
            port: 5000,
        };
        assert_eq!(config.base_url(), "http://192.168.1.5:5000");
    }

    #[tokio::test]
    async fn missing_bridge_reports_unavailable() {
        let manager = ServiceManager::new("PrintSpooler", None).unwrap();
        let outcome = manager.start_service().await;
        assert!(!outcome.success);
        assert_eq!(outcome.message, BRIDGE_UNAVAILABLE_MESSAGE);
    }

    #[tokio::test]
    async fn success_without_message_gets_default() {
        let bridge = FakeBridge::new(Ok(BridgeReply {
            success: true,
            message: None,
        }));
        let manager = ServiceManager::new("PrintSpooler", Some(bridge.clone())).unwrap();

        let outcome = manager.restart_service().await;

        assert!(outcome.success);
        assert_eq!(outcome.message, "Service 'PrintSpooler' restart completed.");
        assert_eq!(
            bridge.calls.lock().unwrap().as_slice(),
            &[("PrintSpooler".to_owned(), ServiceOperation::Restart)]
        );
    }

    #[tokio::test]
    async fn bridge_failure_reply_is_passed_through() {
        let bridge = FakeBridge::new(Ok(BridgeReply {
            success: false,
            message: Some("service is disabled".into()),
        }));
        let manager = ServiceManager::new("PrintSpooler", Some(bridge)).unwrap();

        let outcome = manager.stop_service().await;
        assert!(!outcome.success);
        assert_eq!(outcome.message, "service is disabled");
    }

    #[tokio::test]
    async fn bridge_error_is_absorbed() {
        let bridge = FakeBridge::new(Err("access denied".into()));
        let manager = ServiceManager::new("PrintSpooler", Some(bridge)).unwrap();

        let outcome = manager.start_service().await;
        assert!(!outcome.success);
        assert_eq!(
            outcome.message,
            "System error (administrator permissions?): access denied"
        );
    }
}
