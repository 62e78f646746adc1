// printdesk-core: Backend wiring, observable resource stores and service control.

pub mod backend;
pub mod config;
pub mod discovery;
pub mod error;
pub mod format;
pub mod service;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use backend::Backend;
pub use config::BackendConfig;
pub use discovery::discover_server;
pub use error::CoreError;
pub use format::{format_datetime, format_timestamp};
pub use service::{
    BRIDGE_UNAVAILABLE_MESSAGE, BridgeError, BridgeReply, PrivilegedBridge, ServerConfig,
    ServiceManager, ServiceOperation, ServiceOutcome,
};
pub use store::{ResourceState, ResourceStore};

// Transport types consumers need alongside the core API.
pub use printdesk_api::{
    BaseUrlResolver, ConnectionState, LogDetails, LogEntry, MemoryOverrideStore, Notification,
    Notifier, OverrideStore, Query, ReconnectConfig, ServerStatus, StatusChannel,
    TracingNotifier,
};
