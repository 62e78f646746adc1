//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with help text.

use miette::Diagnostic;
use thiserror::Error;

use printdesk_config::ConfigError;
use printdesk_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const SERVICE: i32 = 5;
    pub const REJECTED: i32 = 6;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the backend at {url}: {reason}")]
    #[diagnostic(
        code(printdesk::connection_failed),
        help(
            "Check that the backend is running.\n\
             Try: printdesk url show   (or: printdesk url discover)"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("Not found: {message}")]
    #[diagnostic(code(printdesk::not_found))]
    NotFound { message: String },

    #[error("Request to {path} was rejected")]
    #[diagnostic(
        code(printdesk::rejected),
        help("The backend refused the request; run with -v for details.")
    )]
    Rejected { path: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error(
        "API error ({}): {message}",
        .status.map_or_else(|| "no status".to_owned(), |s| s.to_string())
    )]
    #[diagnostic(code(printdesk::api_error))]
    ApiError { status: Option<u16>, message: String },

    // ── Service control ──────────────────────────────────────────────
    #[error("Service '{name}': {message}")]
    #[diagnostic(
        code(printdesk::service),
        help("Service control needs administrator rights on the backend host.")
    )]
    ServiceFailed { name: String, message: String },

    #[error("Server discovery failed")]
    #[diagnostic(
        code(printdesk::discovery),
        help(
            "Add a [server] table (host, port) to {path}\n\
             or persist the address with: printdesk url set <url>"
        )
    )]
    DiscoveryFailed { path: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(printdesk::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(
        code(printdesk::config),
        help("Check the config file and PRINTDESK_* environment variables.")
    )]
    Config(#[from] ConfigError),

    #[error("Internal error: {0}")]
    #[diagnostic(code(printdesk::internal))]
    Internal(String),

    // ── IO / Serialization ────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(printdesk::json), help("Check the JSON body and try again."))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Rejected { .. } => exit_code::REJECTED,
            Self::ServiceFailed { .. } | Self::DiscoveryFailed { .. } => exit_code::SERVICE,
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed { url, reason },
            CoreError::NotFound { message } => CliError::NotFound { message },
            CoreError::Api {
                message,
                status,
                raw: _,
            } => CliError::ApiError { status, message },
            CoreError::MissingServiceName => CliError::Validation {
                field: "name".into(),
                reason: "a service name is required".into(),
            },
            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
            CoreError::Persist(e) => CliError::Io(e),
            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}
