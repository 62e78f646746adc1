//! Shared configuration for the printdesk tools.
//!
//! Layered TOML + environment loading, the on-disk base URL override,
//! and translation to `printdesk_core::BackendConfig`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use printdesk_api::{OverrideStore, ReconnectConfig};
use printdesk_core::{BackendConfig, ServerConfig};

/// Environment variable prefix. Nested keys use `__`
/// (e.g. `PRINTDESK_SERVER__PORT`).
pub const ENV_PREFIX: &str = "PRINTDESK_";

const CONFIG_FILE: &str = "config.toml";
const OVERRIDE_FILE: &str = "api_url";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Fallback base URL of the main API. A persisted override wins.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Fixed base URL of the print service.
    #[serde(default = "default_print_api_base")]
    pub print_api_base: String,

    /// Request timeout in seconds. Unset waits on the network.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default)]
    pub reconnect: ReconnectSection,

    /// Where the backend server listens, for local discovery.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<ServerSection>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            print_api_base: default_print_api_base(),
            timeout_secs: None,
            insecure: false,
            reconnect: ReconnectSection::default(),
            server: None,
        }
    }
}

fn default_api_base() -> String {
    "http://localhost:4000".into()
}
fn default_print_api_base() -> String {
    "http://localhost:4001".into()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct ReconnectSection {
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl Default for ReconnectSection {
    fn default() -> Self {
        Self {
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

fn default_initial_delay_ms() -> u64 {
    2000
}
fn default_max_delay_ms() -> u64 {
    10_000
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ServerSection {
    pub host: String,
    pub port: u16,
}

impl From<&ServerSection> for ServerConfig {
    fn from(section: &ServerSection) -> Self {
        ServerConfig {
            url: section.host.clone(),
            port: section.port,
        }
    }
}

// ── Paths ───────────────────────────────────────────────────────────

/// Locations of the config file and the persisted override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    config_dir: PathBuf,
    data_dir: PathBuf,
}

impl ConfigPaths {
    /// Platform conventions (XDG on Linux, AppData on Windows, ...).
    pub fn platform() -> Self {
        ProjectDirs::from("com", "printdesk", "printdesk").map_or_else(
            || Self::at(dirs_fallback()),
            |dirs| Self {
                config_dir: dirs.config_dir().to_path_buf(),
                data_dir: dirs.data_dir().to_path_buf(),
            },
        )
    }

    /// Keep everything under one directory.
    pub fn at(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            config_dir: dir.clone(),
            data_dir: dir,
        }
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE)
    }

    pub fn override_file(&self) -> PathBuf {
        self.data_dir.join(OVERRIDE_FILE)
    }
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("printdesk");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load defaults, then the TOML file, then `PRINTDESK_*` variables.
pub fn load_config(paths: &ConfigPaths) -> Result<Config, ConfigError> {
    let path = paths.config_file();
    debug!(path = %path.display(), "loading config");

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    for (field, value) in [
        ("api_base", &config.api_base),
        ("print_api_base", &config.print_api_base),
    ] {
        check_base_url(field, value)?;
    }
    if config.reconnect.initial_delay_ms == 0 {
        return Err(ConfigError::Validation {
            field: "reconnect.initial_delay_ms".into(),
            reason: "must be greater than zero".into(),
        });
    }
    Ok(())
}

/// Reject anything that is not an absolute http(s) URL.
pub fn check_base_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let url: url::Url = value.parse().map_err(|_| ConfigError::Validation {
        field: field.into(),
        reason: format!("invalid URL: {value}"),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::Validation {
            field: field.into(),
            reason: format!("expected http or https, got '{other}'"),
        }),
    }
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to the config file.
pub fn save_config(paths: &ConfigPaths, cfg: &Config) -> Result<(), ConfigError> {
    let path = paths.config_file();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(&path, toml_str)?;
    Ok(())
}

// ── Persisted override ──────────────────────────────────────────────

/// Base URL override kept in a single UTF-8 file.
#[derive(Debug, Clone)]
pub struct FileOverrideStore {
    path: PathBuf,
}

impl FileOverrideStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_paths(paths: &ConfigPaths) -> Self {
        Self::new(paths.override_file())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl OverrideStore for FileOverrideStore {
    fn load(&self) -> Option<String> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => {
                let value = raw.trim();
                (!value.is_empty()).then(|| value.to_owned())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "unreadable override file");
                None
            }
        }
    }

    fn store(&self, url: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, url)
    }

    fn clear(&self) -> std::io::Result<()> {
        match std::fs::remove_file(&self.path) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

// ── Translation ─────────────────────────────────────────────────────

/// Build the core `BackendConfig` from loaded settings.
pub fn to_backend_config(cfg: &Config) -> BackendConfig {
    BackendConfig {
        api_base: cfg.api_base.clone(),
        print_api_base: cfg.print_api_base.clone(),
        timeout: cfg.timeout_secs.map(Duration::from_secs),
        accept_invalid_certs: cfg.insecure,
        reconnect: ReconnectConfig {
            initial_delay: Duration::from_millis(cfg.reconnect.initial_delay_ms),
            max_delay: Duration::from_millis(
                cfg.reconnect.max_delay_ms.max(cfg.reconnect.initial_delay_ms),
            ),
        },
    }
}
