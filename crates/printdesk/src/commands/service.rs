//! `printdesk service <name> start|stop|restart`.

use std::sync::Arc;

use printdesk_core::{PrivilegedBridge, ServiceManager, ServiceOperation};

use crate::bridge::LocalBridge;
use crate::cli::{ServiceAction, ServiceArgs};
use crate::config::Settings;
use crate::error::CliError;

impl From<ServiceAction> for ServiceOperation {
    fn from(action: ServiceAction) -> Self {
        match action {
            ServiceAction::Start => ServiceOperation::Start,
            ServiceAction::Stop => ServiceOperation::Stop,
            ServiceAction::Restart => ServiceOperation::Restart,
        }
    }
}

pub async fn handle(settings: &Settings, args: ServiceArgs) -> Result<(), CliError> {
    let bridge: Arc<dyn PrivilegedBridge> =
        Arc::new(LocalBridge::new(settings.config.server.clone()));
    let manager = ServiceManager::new(args.name, Some(bridge))?;

    let outcome = manager.manage_service(args.action.into()).await;
    if outcome.success {
        println!("{}", outcome.message);
        Ok(())
    } else {
        Err(CliError::ServiceFailed {
            name: manager.name().to_owned(),
            message: outcome.message,
        })
    }
}
