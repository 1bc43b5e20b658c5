//! Classifier-keyed client cache.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use dashmap::DashMap;
use dbaas_sdk::Classifier;
use tokio::sync::OnceCell;

/// Identity of a cached client: database type plus the canonical encoding of
/// the classifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    db_type: String,
    classifier: String,
}

impl CacheKey {
    #[must_use]
    pub fn new(db_type: &str, classifier: &Classifier) -> Self {
        Self {
            db_type: db_type.to_owned(),
            classifier: classifier.canonical_form(),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.db_type, self.classifier)
    }
}

/// Process-wide cache of long-lived clients.
///
/// Each key owns a `OnceCell`, so at most one build per key runs at a time
/// and concurrent callers await the in-flight build. Map guards are released
/// before any `.await`: builds of different keys never wait on each other.
///
/// A failed or abandoned build leaves the key unpopulated; the next caller
/// builds again. Successful entries are kept for the lifetime of the cache.
pub struct ClientCache<V> {
    entries: DashMap<CacheKey, Arc<OnceCell<Arc<V>>>>,
}

impl<V> Default for ClientCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> ClientCache<V> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Return the cached value for `key`, running `build` on a miss.
    ///
    /// # Errors
    ///
    /// Returns the error of `build`; nothing is cached in that case.
    pub async fn get_or_build<F, Fut, E>(&self, key: &CacheKey, build: F) -> Result<Arc<V>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        // Fast path: no cell allocation on hits
        if let Some(value) = self.get(key) {
            return Ok(value);
        }

        let cell = Arc::clone(self.entries.entry(key.clone()).or_default().value());

        cell.get_or_try_init(|| async move { build().await.map(Arc::new) })
            .await
            .cloned()
    }

    /// Cached value for `key`, if its build has completed.
    #[must_use]
    pub fn get(&self, key: &CacheKey) -> Option<Arc<V>> {
        self.entries
            .get(key)
            .and_then(|cell| cell.value().get().cloned())
    }

    #[must_use]
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries
            .get(key)
            .is_some_and(|cell| cell.value().initialized())
    }

    /// Number of populated entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.value().initialized())
            .count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<V> fmt::Debug for ClientCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCache")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}
