// Server discovery: ask the privileged bridge where the backend listens
// and persist the answer as the base URL override.

use printdesk_api::BaseUrlResolver;
use tracing::{info, warn};

use crate::service::{PrivilegedBridge, ServerConfig};

/// Query the bridge and persist `http://<url>:<port>` as the override.
///
/// Returns the reported config, or `None` when the bridge is missing,
/// fails, or the override cannot be written. Never errors.
pub async fn discover_server(
    bridge: Option<&dyn PrivilegedBridge>,
    resolver: &BaseUrlResolver,
) -> Option<ServerConfig> {
    let Some(bridge) = bridge else {
        warn!("no service bridge; keeping configured base URL");
        return None;
    };

    let config = match bridge.server_config().await {
        Ok(config) => config,
        Err(e) => {
            warn!(error = %e, "server discovery failed");
            return None;
        }
    };

    let base = config.base_url();
    if let Err(e) = resolver.set_override(&base) {
        warn!(error = %e, url = %base, "failed to persist discovered base URL");
        return None;
    }
    info!(url = %base, "discovered backend server");
    Some(config)
}
