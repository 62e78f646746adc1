// ── Backend facade ──
//
// Owns the shared HTTP client, the base URL resolver and the error policy,
// and hands out endpoint clients, resource stores and the status channel.
// Cheaply cloneable via `Arc<BackendInner>`.

use std::sync::Arc;

use printdesk_api::{
    BaseUrlResolver, ErrorPolicy, Notifier, OverrideStore, RestClient, StatusChannel,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::BackendConfig;
use crate::error::CoreError;
use crate::store::ResourceStore;

#[derive(Clone)]
pub struct Backend {
    inner: Arc<BackendInner>,
}

struct BackendInner {
    config: BackendConfig,
    http: reqwest::Client,
    resolver: BaseUrlResolver,
    print_resolver: BaseUrlResolver,
    policy: ErrorPolicy,
}

impl Backend {
    /// Build the facade. Failures are notified through `notifier`, with the
    /// process-wide notification cap.
    pub fn new(
        config: BackendConfig,
        overrides: Arc<dyn OverrideStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, CoreError> {
        Self::with_policy(config, overrides, ErrorPolicy::process_wide(notifier))
    }

    /// Same as [`new`](Self::new) with an explicit error policy.
    pub fn with_policy(
        config: BackendConfig,
        overrides: Arc<dyn OverrideStore>,
        policy: ErrorPolicy,
    ) -> Result<Self, CoreError> {
        let http = config.transport().build_client()?;
        let resolver = BaseUrlResolver::new(config.api_base.clone(), overrides);
        let print_resolver = BaseUrlResolver::fixed(config.print_api_base.clone());
        debug!(api = %config.api_base, print = %config.print_api_base, "backend configured");

        Ok(Self {
            inner: Arc::new(BackendInner {
                config,
                http,
                resolver,
                print_resolver,
                policy,
            }),
        })
    }

    pub fn config(&self) -> &BackendConfig {
        &self.inner.config
    }

    /// Resolver for the main API (override first, then the fallback).
    pub fn resolver(&self) -> &BaseUrlResolver {
        &self.inner.resolver
    }

    /// Persist a base URL override for the main API.
    pub fn set_base_url(&self, url: &str) -> Result<(), CoreError> {
        self.inner.resolver.set_override(url)?;
        Ok(())
    }

    /// Drop the override so the configured fallback applies again.
    pub fn clear_base_url(&self) -> Result<(), CoreError> {
        self.inner.resolver.clear_override()?;
        Ok(())
    }

    /// Fixed base URL of the print service.
    pub fn print_base(&self) -> &str {
        self.inner.print_resolver.fallback()
    }

    pub fn error_policy(&self) -> &ErrorPolicy {
        &self.inner.policy
    }

    /// REST client for `path` on the main API.
    pub fn client(&self, path: &str) -> RestClient {
        RestClient::new(
            self.inner.http.clone(),
            self.inner.resolver.clone(),
            path,
            self.inner.policy.clone(),
        )
    }

    /// REST client for `path` on the print service.
    pub fn print_client(&self, path: &str) -> RestClient {
        RestClient::new(
            self.inner.http.clone(),
            self.inner.print_resolver.clone(),
            path,
            self.inner.policy.clone(),
        )
    }

    pub fn resource<T>(&self, path: &str) -> ResourceStore<T>
    where
        T: Clone + Serialize + DeserializeOwned + Send + Sync,
    {
        ResourceStore::new(self.client(path))
    }

    pub fn print_resource<T>(&self, path: &str) -> ResourceStore<T>
    where
        T: Clone + Serialize + DeserializeOwned + Send + Sync,
    {
        ResourceStore::new(self.print_client(path))
    }

    /// A new, not yet connected status channel against the main API.
    pub fn status_channel(&self) -> StatusChannel {
        StatusChannel::new(self.inner.resolver.clone(), self.inner.config.reconnect)
    }
}

impl std::fmt::Debug for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backend")
            .field("resolver", &self.inner.resolver)
            .field("print_base", &self.print_base())
            .finish_non_exhaustive()
    }
}
