// Base URL resolution.
//
// Every request and every socket attempt asks the resolver for the current
// backend origin. A persisted override (written at runtime, e.g. after the
// desktop shell reports where the server lives) beats the configured
// fallback. Nothing here is cached: the override can change between calls.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

/// Persistent storage for the base URL override.
///
/// Implementations must not panic; a failed read is reported as `None`.
pub trait OverrideStore: Send + Sync {
    /// Current override value, if any.
    fn load(&self) -> Option<String>;

    /// Persist a new override.
    fn store(&self, url: &str) -> std::io::Result<()>;

    /// Remove the override.
    fn clear(&self) -> std::io::Result<()>;
}

/// In-memory override store. Survives for the lifetime of the value only.
#[derive(Debug, Default)]
pub struct MemoryOverrideStore {
    value: RwLock<Option<String>>,
}

impl MemoryOverrideStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OverrideStore for MemoryOverrideStore {
    fn load(&self) -> Option<String> {
        self.value
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn store(&self, url: &str) -> std::io::Result<()> {
        *self.value.write().unwrap_or_else(PoisonError::into_inner) = Some(url.to_owned());
        Ok(())
    }

    fn clear(&self) -> std::io::Result<()> {
        *self.value.write().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// Resolves the backend origin on every call.
///
/// Cheaply cloneable; clones share the same override store.
#[derive(Clone)]
pub struct BaseUrlResolver {
    fallback: String,
    store: Option<Arc<dyn OverrideStore>>,
}

impl BaseUrlResolver {
    /// Resolver that prefers `store`'s override over `fallback`.
    pub fn new(fallback: impl Into<String>, store: Arc<dyn OverrideStore>) -> Self {
        Self {
            fallback: fallback.into(),
            store: Some(store),
        }
    }

    /// Resolver without persisted storage. Always yields `base`.
    pub fn fixed(base: impl Into<String>) -> Self {
        Self {
            fallback: base.into(),
            store: None,
        }
    }

    /// The current base URL: a non-empty override, else the fallback.
    pub fn resolve(&self) -> String {
        if let Some(url) = self
            .store
            .as_ref()
            .and_then(|store| store.load())
            .filter(|url| !url.trim().is_empty())
        {
            return url;
        }
        self.fallback.clone()
    }

    /// The configured fallback, ignoring any override.
    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// The raw override value, if one is stored.
    pub fn current_override(&self) -> Option<String> {
        self.store.as_ref().and_then(|store| store.load())
    }

    /// Persist a new override. A fixed resolver has nowhere to write.
    pub fn set_override(&self, url: &str) -> std::io::Result<()> {
        let store = self.writable_store()?;
        debug!(url, "persisting base URL override");
        store.store(url)
    }

    /// Remove the override so the fallback applies again.
    pub fn clear_override(&self) -> std::io::Result<()> {
        let store = self.writable_store()?;
        debug!("clearing base URL override");
        store.clear()
    }

    fn writable_store(&self) -> std::io::Result<&Arc<dyn OverrideStore>> {
        self.store.as_ref().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::Unsupported,
                "resolver has no override store",
            )
        })
    }
}

impl std::fmt::Debug for BaseUrlResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BaseUrlResolver")
            .field("fallback", &self.fallback)
            .field("has_store", &self.store.is_some())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn resolver() -> (BaseUrlResolver, Arc<MemoryOverrideStore>) {
        let store = Arc::new(MemoryOverrideStore::new());
        let resolver = BaseUrlResolver::new("http://localhost:4000", store.clone());
        (resolver, store)
    }

    #[test]
    fn fallback_without_override() {
        let (resolver, _) = resolver();
        assert_eq!(resolver.resolve(), "http://localhost:4000");
    }

    #[test]
    fn override_wins_and_is_reread_each_call() {
        let (resolver, store) = resolver();
        assert_eq!(resolver.resolve(), "http://localhost:4000");

        store.store("http://192.168.1.5:5000").unwrap();
        assert_eq!(resolver.resolve(), "http://192.168.1.5:5000");

        store.store("http://10.0.0.2:5000").unwrap();
        assert_eq!(resolver.resolve(), "http://10.0.0.2:5000");
    }

    #[test]
    fn empty_override_is_ignored() {
        let (resolver, store) = resolver();
        store.store("").unwrap();
        assert_eq!(resolver.resolve(), "http://localhost:4000");
        store.store("   ").unwrap();
        assert_eq!(resolver.resolve(), "http://localhost:4000");
    }

    #[test]
    fn clear_restores_fallback() {
        let (resolver, _) = resolver();
        resolver.set_override("http://192.168.1.5:5000").unwrap();
        assert_eq!(resolver.resolve(), "http://192.168.1.5:5000");
        resolver.clear_override().unwrap();
        assert_eq!(resolver.resolve(), "http://localhost:4000");
        assert!(resolver.current_override().is_none());
    }

    #[test]
    fn fixed_resolver_rejects_writes() {
        let resolver = BaseUrlResolver::fixed("http://localhost:4001");
        assert_eq!(resolver.resolve(), "http://localhost:4001");
        let err = resolver.set_override("http://x:1").unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::Unsupported);
    }

    #[test]
    fn clones_share_the_store() {
        let (resolver, _) = resolver();
        let other = resolver.clone();
        other.set_override("http://printer-host:9000").unwrap();
        assert_eq!(resolver.resolve(), "http://printer-host:9000");
    }
}
