// Generic REST client bound to one endpoint path.
//
// Each call re-resolves the base URL, sends JSON, normalizes failures into
// `Error::RequestFailed`, and runs the error-notification policy. GET hands
// failures back to the caller; POST/PUT/DELETE swallow them after notifying.

use reqwest::Method;
use reqwest::header::CONTENT_TYPE;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::error::{ApiError, Error};
use crate::notify::ErrorPolicy;
use crate::resolver::BaseUrlResolver;

// ── Query ────────────────────────────────────────────────────────────

/// Ordered query parameters, rendered as `?key=value&...`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query(Vec<(String, String)>);

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parameter. Values are rendered with `Display`.
    pub fn param(mut self, key: impl Into<String>, value: impl std::fmt::Display) -> Self {
        self.0.push((key.into(), value.to_string()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: std::fmt::Display> FromIterator<(K, V)> for Query {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |query, (k, v)| query.param(k, v))
    }
}

// ── OneOrMany ────────────────────────────────────────────────────────

/// A collection endpoint may answer with a list or a single object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    /// Flatten into a sequence; a single object becomes a one-element vec.
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::Many(items) => items,
            Self::One(item) => vec![item],
        }
    }
}

// ── RestClient ───────────────────────────────────────────────────────

/// JSON REST client for a single endpoint path (e.g. `/api/printers`).
#[derive(Debug, Clone)]
pub struct RestClient {
    http: reqwest::Client,
    resolver: BaseUrlResolver,
    path: String,
    policy: ErrorPolicy,
}

impl RestClient {
    pub fn new(
        http: reqwest::Client,
        resolver: BaseUrlResolver,
        path: impl Into<String>,
        policy: ErrorPolicy,
    ) -> Self {
        Self {
            http,
            resolver,
            path: path.into(),
            policy,
        }
    }

    /// The endpoint path this client is bound to.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn resolver(&self) -> &BaseUrlResolver {
        &self.resolver
    }

    // ── Public operations ────────────────────────────────────────────

    /// GET the endpoint. Failures are logged (never notified) and returned.
    pub async fn get<R: DeserializeOwned>(&self, query: Option<&Query>) -> Result<Option<R>, Error> {
        self.fetch::<R, ()>(Method::GET, query, None)
            .await
            .inspect_err(|e| {
                self.policy.report(&self.path, e, false);
            })
    }

    /// POST `body`. Failures are notified and swallowed into `None`.
    pub async fn post<R: DeserializeOwned>(&self, body: &(impl Serialize + ?Sized)) -> Option<R> {
        self.try_post(body).await.ok().flatten()
    }

    /// PUT `body`. Failures are notified and swallowed into `None`.
    pub async fn put<R: DeserializeOwned>(&self, body: &(impl Serialize + ?Sized)) -> Option<R> {
        self.try_put(body).await.ok().flatten()
    }

    /// DELETE the endpoint. Returns `false` on any failure, after notifying.
    pub async fn delete(&self, query: Option<&Query>) -> bool {
        self.try_delete(query).await.unwrap_or(false)
    }

    /// POST, notifying on failure but still returning the error.
    pub async fn try_post<R: DeserializeOwned>(
        &self,
        body: &(impl Serialize + ?Sized),
    ) -> Result<Option<R>, Error> {
        self.fetch(Method::POST, None, Some(body))
            .await
            .inspect_err(|e| {
                self.policy.report(&self.path, e, true);
            })
    }

    /// PUT, notifying on failure but still returning the error.
    pub async fn try_put<R: DeserializeOwned>(
        &self,
        body: &(impl Serialize + ?Sized),
    ) -> Result<Option<R>, Error> {
        self.fetch(Method::PUT, None, Some(body))
            .await
            .inspect_err(|e| {
                self.policy.report(&self.path, e, true);
            })
    }

    /// DELETE, notifying on failure but still returning the error.
    pub async fn try_delete(&self, query: Option<&Query>) -> Result<bool, Error> {
        self.fetch::<IgnoredAny, ()>(Method::DELETE, query, None)
            .await
            .map(|_| true)
            .inspect_err(|e| {
                self.policy.report(&self.path, e, true);
            })
    }

    // ── Request plumbing ─────────────────────────────────────────────

    /// `resolve() + path`, with `query` appended when non-empty.
    pub fn url(&self, query: Option<&Query>) -> Result<Url, Error> {
        let raw = format!("{}{}", self.resolver.resolve(), self.path);
        let mut url = Url::parse(&raw).map_err(|source| Error::InvalidUrl {
            url: raw.clone(),
            source,
        })?;
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            url.query_pairs_mut().extend_pairs(query.iter());
        }
        Ok(url)
    }

    async fn fetch<R, B>(
        &self,
        method: Method,
        query: Option<&Query>,
        body: Option<&B>,
    ) -> Result<Option<R>, Error>
    where
        R: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.url(query)?;
        debug!("{method} {url}");

        let mut request = self
            .http
            .request(method, url)
            .header(CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }
        let resp = request.send().await?;

        parse_response(resp).await
    }
}

/// Turn a response into a typed payload.
///
/// Non-2xx becomes `RequestFailed`. A 2xx without a JSON content type (or
/// with a JSON `null` body) yields `None`.
async fn parse_response<R: DeserializeOwned>(resp: reqwest::Response) -> Result<Option<R>, Error> {
    let status = resp.status();

    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(Error::RequestFailed {
            status: status.as_u16(),
            error: ApiError::from_body(status, &body),
        });
    }

    let is_json = resp
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("application/json"));
    if !is_json {
        return Ok(None);
    }

    let body = resp.text().await?;
    serde_json::from_str::<Option<R>>(&body).map_err(|e| Error::Deserialization {
        message: e.to_string(),
        body,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str, path: &str) -> RestClient {
        RestClient::new(
            reqwest::Client::new(),
            BaseUrlResolver::fixed(base),
            path,
            ErrorPolicy::default(),
        )
    }

    #[test]
    fn url_joins_base_and_path() {
        let client = client("http://localhost:4000", "/api/printers");
        assert_eq!(
            client.url(None).unwrap().as_str(),
            "http://localhost:4000/api/printers"
        );
    }

    #[test]
    fn url_encodes_query() {
        let client = client("http://localhost:4000", "/api/jobs");
        let query = Query::new().param("id", 1).param("name", "a b&c");
        assert_eq!(
            client.url(Some(&query)).unwrap().as_str(),
            "http://localhost:4000/api/jobs?id=1&name=a+b%26c"
        );
    }

    #[test]
    fn empty_query_adds_nothing() {
        let client = client("http://localhost:4000", "/api/jobs");
        assert_eq!(
            client.url(Some(&Query::new())).unwrap().as_str(),
            "http://localhost:4000/api/jobs"
        );
    }

    #[test]
    fn invalid_base_is_reported() {
        let client = client("not a url", "/api/jobs");
        assert!(matches!(client.url(None), Err(Error::InvalidUrl { .. })));
    }

    #[test]
    fn query_from_iterator() {
        let query: Query = [("page", 2), ("limit", 50)].into_iter().collect();
        let pairs: Vec<_> = query.iter().collect();
        assert_eq!(pairs, vec![("page", "2"), ("limit", "50")]);
    }

    #[test]
    fn one_or_many_flattens() {
        let one: OneOrMany<u32> = serde_json::from_str("7").unwrap();
        assert_eq!(one.into_vec(), vec![7]);
        let many: OneOrMany<u32> = serde_json::from_str("[1,2]").unwrap();
        assert_eq!(many.into_vec(), vec![1, 2]);
    }
}
