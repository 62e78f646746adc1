// ── Observable CRUD state for one endpoint ──
//
// Wraps a `RestClient` and mirrors every operation into `watch` channels
// (`loading`, `item`, `items`, `is_error`). Overlapping calls are not
// serialized: whichever finishes last owns `item`/`items`.

use printdesk_api::{OneOrMany, Query, RestClient};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tracing::error;

use crate::error::CoreError;

/// Point-in-time copy of a store's observable state.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceState<T> {
    pub loading: bool,
    pub item: Option<T>,
    pub items: Vec<T>,
    pub is_error: bool,
}

/// CRUD state holder for a single entity type.
pub struct ResourceStore<T> {
    client: RestClient,
    loading: watch::Sender<bool>,
    item: watch::Sender<Option<T>>,
    items: watch::Sender<Vec<T>>,
    is_error: watch::Sender<bool>,
}

/// Holds `loading` high until dropped, including on early return or
/// cancellation of the owning future.
struct LoadingGuard<'a>(&'a watch::Sender<bool>);

impl<'a> LoadingGuard<'a> {
    fn start(flag: &'a watch::Sender<bool>) -> Self {
        flag.send_replace(true);
        Self(flag)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.send_replace(false);
    }
}

impl<T> ResourceStore<T>
where
    T: Clone + Serialize + DeserializeOwned + Send + Sync,
{
    pub fn new(client: RestClient) -> Self {
        Self {
            client,
            loading: watch::Sender::new(false),
            item: watch::Sender::new(None),
            items: watch::Sender::new(Vec::new()),
            is_error: watch::Sender::new(false),
        }
    }

    /// The endpoint path backing this store.
    pub fn path(&self) -> &str {
        self.client.path()
    }

    // ── Operations ───────────────────────────────────────────────────

    /// POST a new entity. On success the created entity becomes `item`.
    /// On failure `is_error` is raised and `None` is returned; the failure
    /// has already been notified by the client. Callers observe failure
    /// through [`is_error`](Self::is_error); there is no `Err` to match on.
    pub async fn create(&self, data: &T) -> Option<T> {
        let _loading = LoadingGuard::start(&self.loading);
        self.is_error.send_replace(false);

        let result: Result<Option<T>, _> = self.client.try_post(data).await;
        self.settle_item("create", result)
    }

    /// PUT an entity. Same as [`create`](Self::create) but leaves a
    /// previously raised `is_error` in place.
    pub async fn update(&self, data: &T) -> Option<T> {
        let _loading = LoadingGuard::start(&self.loading);

        let result: Result<Option<T>, _> = self.client.try_put(data).await;
        self.settle_item("update", result)
    }

    /// DELETE, returning whether the backend accepted it.
    pub async fn remove(&self, query: Option<&Query>) -> bool {
        let _loading = LoadingGuard::start(&self.loading);
        self.client.delete(query).await
    }

    /// GET the collection.
    ///
    /// A list replaces `items`; a single object becomes a one-element list;
    /// an empty (non-JSON or `null`) response leaves `items` untouched.
    /// Failures propagate.
    pub async fn get_all(&self, query: Option<&Query>) -> Result<Vec<T>, CoreError> {
        let _loading = LoadingGuard::start(&self.loading);

        match self.client.get::<OneOrMany<T>>(query).await {
            Ok(Some(payload)) => {
                self.items.send_replace(payload.into_vec());
            }
            Ok(None) => {}
            Err(e) => {
                error!(path = self.client.path(), error = %e, "get_all failed");
                return Err(e.into());
            }
        }
        Ok(self.items())
    }

    fn settle_item(
        &self,
        operation: &str,
        result: Result<Option<T>, printdesk_api::Error>,
    ) -> Option<T> {
        match result {
            Ok(item) => {
                self.item.send_replace(item.clone());
                item
            }
            Err(e) => {
                error!(path = self.client.path(), operation, error = %e, "mutation failed");
                self.is_error.send_replace(true);
                self.item.send_replace(None);
                None
            }
        }
    }

    // ── Snapshot accessors ───────────────────────────────────────────

    pub fn is_loading(&self) -> bool {
        *self.loading.borrow()
    }

    pub fn item(&self) -> Option<T> {
        self.item.borrow().clone()
    }

    pub fn items(&self) -> Vec<T> {
        self.items.borrow().clone()
    }

    pub fn is_error(&self) -> bool {
        *self.is_error.borrow()
    }

    pub fn state(&self) -> ResourceState<T> {
        ResourceState {
            loading: self.is_loading(),
            item: self.item(),
            items: self.items(),
            is_error: self.is_error(),
        }
    }

    // ── Subscriptions ────────────────────────────────────────────────

    pub fn subscribe_loading(&self) -> watch::Receiver<bool> {
        self.loading.subscribe()
    }

    pub fn subscribe_item(&self) -> watch::Receiver<Option<T>> {
        self.item.subscribe()
    }

    pub fn subscribe_items(&self) -> watch::Receiver<Vec<T>> {
        self.items.subscribe()
    }

    pub fn subscribe_is_error(&self) -> watch::Receiver<bool> {
        self.is_error.subscribe()
    }

    /// `items` as a `Stream`: the current list first, then every change.
    pub fn items_stream(&self) -> WatchStream<Vec<T>>
    where
        T: 'static,
    {
        WatchStream::new(self.items.subscribe())
    }
}
