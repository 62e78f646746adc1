// printdesk-api: Async transport for the printdesk backend (REST + realtime feed)

pub mod error;
pub mod notify;
pub mod resolver;
pub mod rest;
pub mod transport;
pub mod websocket;

pub use error::{ApiError, Error};
pub use notify::{ErrorPolicy, Notification, Notifier, TracingNotifier, NOTIFICATION_CAP};
pub use resolver::{BaseUrlResolver, MemoryOverrideStore, OverrideStore};
pub use rest::{OneOrMany, Query, RestClient};
pub use transport::TransportConfig;
pub use websocket::{
    ConnectionState, LogDetails, LogEntry, ReconnectConfig, ServerStatus, StatusChannel,
};
