//! Cache-then-remote reads.
//!
//! Every read first replays the locally cached copy, then asks the remote
//! store and replays the fresh copy only when it differs. The cache is a
//! best-effort mirror: cache errors are logged and behave like misses.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_stream::stream;
use serde::de::DeserializeOwned;
use serde::Serialize;

use recipebox_core::cache::{decode, encode, list_key, Cache};
use recipebox_core::resource::{Resource, ResourceStream};
use recipebox_core::storage::{failure_message, Result};

/// Message used when a failed read carries no text of its own.
pub const LOAD_FAILED: &str = "Failed to load data";

/// Read-through access to a [`Cache`].
///
/// Cloning is cheap and clones share the same cache.
pub struct ReadThrough<C> {
    cache: Arc<C>,
    ttl: Duration,
}

impl<C> Clone for ReadThrough<C> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
            ttl: self.ttl,
        }
    }
}

impl<C: Cache + 'static> ReadThrough<C> {
    /// Creates a read-through layer writing entries with the given TTL.
    pub fn new(cache: Arc<C>, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    /// Streams the cached value for `key` followed by the remote value.
    ///
    /// Emits `Loading`, then `Success(cached)` when the cache holds a
    /// decodable value, then `Success(fresh)` unless it equals the cached
    /// one. A remote failure is only reported when nothing was cached; a
    /// `NotFound` behind a cached value evicts the stale entry.
    pub fn fetch<V, F>(&self, key: String, remote: F) -> ResourceStream<V>
    where
        V: Serialize + DeserializeOwned + PartialEq + Clone + Send + Sync + 'static,
        F: Future<Output = Result<V>> + Send + 'static,
    {
        let layer = self.clone();
        Box::pin(stream! {
            yield Resource::Loading;

            let cached: Option<V> = layer.read(&key).await;
            if let Some(value) = &cached {
                tracing::trace!(key = %key, "Cache hit");
                yield Resource::Success(value.clone());
            }

            match remote.await {
                Ok(fresh) => {
                    layer.store(&key, &fresh).await;
                    if cached.as_ref() != Some(&fresh) {
                        yield Resource::Success(fresh);
                    }
                }
                Err(err) if cached.is_some() => {
                    tracing::warn!(key = %key, error = %err, "Remote read failed, keeping cached value");
                    if err.is_not_found() {
                        layer.evict(&key).await;
                    }
                }
                Err(err) => {
                    tracing::debug!(key = %key, error = %err, "Remote read failed");
                    yield Resource::Failure(failure_message(&err, LOAD_FAILED));
                }
            }
        })
    }

    /// Streams one page of a list query.
    ///
    /// The first page (no cursor) is read through the cache under
    /// `{scope}_{limit}_first`. Later pages go straight to the remote store
    /// and are never cached.
    pub fn fetch_page<V, F>(
        &self,
        scope: &str,
        limit: usize,
        cursor: Option<&str>,
        remote: F,
    ) -> ResourceStream<Vec<V>>
    where
        V: Serialize + DeserializeOwned + PartialEq + Clone + Send + Sync + 'static,
        F: Future<Output = Result<Vec<V>>> + Send + 'static,
    {
        let Some(cursor) = cursor else {
            return self.fetch(list_key(scope, limit, None), remote);
        };

        tracing::trace!(scope, cursor, "Fetching uncached page");
        Box::pin(stream! {
            yield Resource::Loading;
            match remote.await {
                Ok(page) => {
                    yield Resource::Success(page);
                }
                Err(err) => {
                    yield Resource::Failure(failure_message(&err, LOAD_FAILED));
                }
            }
        })
    }

    /// Reads and decodes a cached value. Errors and undecodable bytes are misses.
    pub async fn read<V: DeserializeOwned>(&self, key: &str) -> Option<V> {
        let bytes = match self.cache.get(key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(err) => {
                tracing::warn!(key, error = %err, "Cache read failed");
                return None;
            }
        };
        match decode(&bytes) {
            Ok(value) => Some(value),
            Err(err) => {
                // Deserialization failed - treat as cache miss
                tracing::warn!(key, error = %err, "Cache entry could not be decoded");
                None
            }
        }
    }

    /// Writes a value to the cache.
    pub async fn store<V: Serialize + ?Sized>(&self, key: &str, value: &V) {
        match encode(value) {
            Ok(bytes) => self.put_raw(key, &bytes).await,
            Err(err) => tracing::warn!(key, error = %err, "Failed to encode cache entry"),
        }
    }

    pub async fn evict(&self, key: &str) {
        if let Err(err) = self.cache.delete(key).await {
            tracing::warn!(key, error = %err, "Failed to invalidate cache entry");
        }
    }

    /// Evicts every entry whose key matches a glob pattern.
    pub async fn evict_pattern(&self, pattern: &str) {
        if let Err(err) = self.cache.delete_pattern(pattern).await {
            tracing::warn!(pattern, error = %err, "Failed to invalidate cache pattern");
        }
    }

    /// Raw bytes currently cached under `key`.
    pub async fn snapshot(&self, key: &str) -> Option<Vec<u8>> {
        match self.cache.get(key).await {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::warn!(key, error = %err, "Cache read failed");
                None
            }
        }
    }

    /// Puts back bytes taken by [`snapshot`](Self::snapshot), or removes the key
    /// if there were none.
    pub async fn restore(&self, key: &str, snapshot: Option<Vec<u8>>) {
        match snapshot {
            Some(bytes) => self.put_raw(key, &bytes).await,
            None => self.evict(key).await,
        }
    }

    pub async fn contains(&self, key: &str) -> bool {
        match self.cache.exists(key).await {
            Ok(exists) => exists,
            Err(err) => {
                tracing::warn!(key, error = %err, "Cache read failed");
                false
            }
        }
    }

    async fn put_raw(&self, key: &str, bytes: &[u8]) {
        if let Err(err) = self.cache.set(key, bytes, Some(self.ttl)).await {
            tracing::warn!(key, error = %err, "Failed to write cache entry");
        }
    }
}
