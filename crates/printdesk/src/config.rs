//! CLI-side configuration: `--config-dir` / `--api-base` layered on top of
//! the shared `printdesk-config` loader.

use std::sync::Arc;

use printdesk_config::{Config, ConfigPaths, FileOverrideStore, check_base_url, load_config};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Loaded settings plus where they came from.
#[derive(Debug)]
pub struct Settings {
    pub paths: ConfigPaths,
    pub config: Config,
}

impl Settings {
    pub fn override_store(&self) -> Arc<FileOverrideStore> {
        Arc::new(FileOverrideStore::from_paths(&self.paths))
    }
}

pub fn resolve_paths(global: &GlobalOpts) -> ConfigPaths {
    global
        .config_dir
        .as_ref()
        .map_or_else(ConfigPaths::platform, ConfigPaths::at)
}

/// Load config file + env, then apply command-line overrides.
pub fn load(global: &GlobalOpts) -> Result<Settings, CliError> {
    let paths = resolve_paths(global);
    let mut config = load_config(&paths)?;

    if let Some(ref base) = global.api_base {
        check_base_url("api-base", base)?;
        config.api_base.clone_from(base);
    }

    tracing::debug!(api_base = %config.api_base, "configuration loaded");
    Ok(Settings { paths, config })
}
