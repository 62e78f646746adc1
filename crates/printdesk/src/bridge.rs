//! Privileged bridge for the CLI host.
//!
//! Server location comes from the `[server]` config table. Service control
//! shells out to `sc.exe` on Windows and is unavailable everywhere else.

use async_trait::async_trait;

use printdesk_config::ServerSection;
use printdesk_core::{BridgeError, BridgeReply, PrivilegedBridge, ServerConfig, ServiceOperation};

#[derive(Debug, Clone)]
pub struct LocalBridge {
    server: Option<ServerSection>,
}

impl LocalBridge {
    pub fn new(server: Option<ServerSection>) -> Self {
        Self { server }
    }
}

#[async_trait]
impl PrivilegedBridge for LocalBridge {
    async fn server_config(&self) -> Result<ServerConfig, BridgeError> {
        self.server
            .as_ref()
            .map(ServerConfig::from)
            .ok_or_else(|| BridgeError::Failed("no [server] table configured".into()))
    }

    async fn manage_service(
        &self,
        name: &str,
        operation: ServiceOperation,
    ) -> Result<BridgeReply, BridgeError> {
        platform::manage_service(name, operation).await
    }
}

#[cfg(windows)]
mod platform {
    use tokio::process::Command;
    use tracing::debug;

    use super::{BridgeError, BridgeReply, ServiceOperation};

    async fn sc(verb: &str, name: &str) -> Result<BridgeReply, BridgeError> {
        debug!(verb, name, "running sc.exe");
        let output = Command::new("sc.exe")
            .args([verb, name])
            .output()
            .await
            .map_err(|e| BridgeError::Failed(e.to_string()))?;

        let text = String::from_utf8_lossy(&output.stdout).trim().to_owned();
        Ok(BridgeReply {
            success: output.status.success(),
            message: (!output.status.success() && !text.is_empty()).then_some(text),
        })
    }

    pub async fn manage_service(
        name: &str,
        operation: ServiceOperation,
    ) -> Result<BridgeReply, BridgeError> {
        match operation {
            ServiceOperation::Start => sc("start", name).await,
            ServiceOperation::Stop => sc("stop", name).await,
            ServiceOperation::Restart => {
                // A stopped service makes `sc stop` fail; start it anyway.
                sc("stop", name).await?;
                sc("start", name).await
            }
        }
    }
}

#[cfg(not(windows))]
mod platform {
    use super::{BridgeError, BridgeReply, ServiceOperation};

    #[allow(clippy::unused_async)]
    pub async fn manage_service(
        _name: &str,
        _operation: ServiceOperation,
    ) -> Result<BridgeReply, BridgeError> {
        Err(BridgeError::Unavailable)
    }
}
