//! `printdesk url`: inspect and change the backend base URL.

use printdesk_config::check_base_url;
use printdesk_core::{Backend, discover_server};

use crate::bridge::LocalBridge;
use crate::cli::{UrlArgs, UrlCommand};
use crate::config::Settings;
use crate::error::CliError;

pub async fn handle(backend: &Backend, settings: &Settings, args: UrlArgs) -> Result<(), CliError> {
    let resolver = backend.resolver();

    match args.command {
        UrlCommand::Show => {
            let source = if resolver.current_override().is_some_and(|u| !u.trim().is_empty()) {
                "override"
            } else {
                "fallback"
            };
            println!("{} ({source})", resolver.resolve());
            println!("print service: {}", backend.print_base());
        }
        UrlCommand::Set { url } => {
            check_base_url("url", &url)?;
            backend.set_base_url(&url)?;
            println!("{url}");
        }
        UrlCommand::Clear => {
            backend.clear_base_url()?;
            println!("{}", resolver.resolve());
        }
        UrlCommand::Discover => {
            let bridge = LocalBridge::new(settings.config.server.clone());
            let found = discover_server(Some(&bridge), resolver).await.ok_or_else(|| {
                CliError::DiscoveryFailed {
                    path: settings.paths.config_file().display().to_string(),
                }
            })?;
            println!("{}", found.base_url());
        }
    }
    Ok(())
}
