//! Test doubles shared by the repository tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio_stream::StreamExt;

use recipebox_core::cache::{Cache, CacheError, Result as CacheResult};
use recipebox_core::resource::{Resource, ResourceStream};
use recipebox_core::storage::{Document, DocumentStore, Query, RepositoryError, Result};

use crate::cache::MemoryCache;

#[derive(Debug, Default)]
struct Faults {
    reads: Option<String>,
    writes: Option<String>,
    increments: Option<String>,
}

/// Document store wrapper that fails selected calls on demand and counts reads.
pub struct FlakyStore<S> {
    inner: S,
    faults: Mutex<Faults>,
    gets: AtomicUsize,
    queries: AtomicUsize,
}

impl<S: DocumentStore> FlakyStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            faults: Mutex::new(Faults::default()),
            gets: AtomicUsize::new(0),
            queries: AtomicUsize::new(0),
        }
    }

    /// Fails `get` and `query`.
    pub fn fail_reads(&self, message: &str) {
        self.faults.lock().unwrap().reads = Some(message.to_string());
    }

    /// Fails `set`, `update` and `delete`.
    pub fn fail_writes(&self, message: &str) {
        self.faults.lock().unwrap().writes = Some(message.to_string());
    }

    pub fn fail_increments(&self, message: &str) {
        self.faults.lock().unwrap().increments = Some(message.to_string());
    }

    pub fn fail_all(&self, message: &str) {
        self.fail_reads(message);
        self.fail_writes(message);
        self.fail_increments(message);
    }

    pub fn heal(&self) {
        *self.faults.lock().unwrap() = Faults::default();
    }

    pub fn get_calls(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn query_calls(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    fn check(&self, pick: fn(&Faults) -> &Option<String>) -> Result<()> {
        match pick(&self.faults.lock().unwrap()) {
            Some(message) => Err(RepositoryError::Transport(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl<S: DocumentStore> DocumentStore for FlakyStore<S> {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.check(|f| &f.reads)?;
        self.inner.get(collection, id).await
    }

    async fn set(&self, collection: &str, id: &str, data: Value) -> Result<()> {
        self.check(|f| &f.writes)?;
        self.inner.set(collection, id, data).await
    }

    async fn update(&self, collection: &str, id: &str, fields: Map<String, Value>) -> Result<()> {
        self.check(|f| &f.writes)?;
        self.inner.update(collection, id, fields).await
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        self.check(|f| &f.writes)?;
        self.inner.delete(collection, id).await
    }

    async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.check(|f| &f.reads)?;
        self.inner.query(collection, query).await
    }

    async fn increment(&self, collection: &str, id: &str, field: &str, delta: i64) -> Result<()> {
        self.check(|f| &f.increments)?;
        self.inner.increment(collection, id, field, delta).await
    }
}

/// Memory cache that counts reads and can be switched off.
pub struct CountingCache {
    inner: MemoryCache,
    gets: AtomicUsize,
    broken: Mutex<bool>,
}

impl CountingCache {
    pub fn new() -> Self {
        Self {
            inner: MemoryCache::new(1000),
            gets: AtomicUsize::new(0),
            broken: Mutex::new(false),
        }
    }

    pub fn get_calls(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    /// Makes every call fail with `CacheError::Unavailable`.
    pub fn break_down(&self) {
        *self.broken.lock().unwrap() = true;
    }

    fn check(&self) -> CacheResult<()> {
        if *self.broken.lock().unwrap() {
            return Err(CacheError::Unavailable("cache offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl Cache for CountingCache {
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> CacheResult<()> {
        self.check()?;
        self.inner.set(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        self.check()?;
        self.inner.delete(key).await
    }

    async fn delete_pattern(&self, pattern: &str) -> CacheResult<()> {
        self.check()?;
        self.inner.delete_pattern(pattern).await
    }

    async fn exists(&self, key: &str) -> CacheResult<bool> {
        self.check()?;
        self.inner.exists(key).await
    }
}

/// Drains a stream into a vector.
pub async fn collect<T>(stream: ResourceStream<T>) -> Vec<Resource<T>> {
    stream.collect().await
}

/// Drains a stream and returns its last non-`Loading` item.
pub async fn settle<T>(mut stream: ResourceStream<T>) -> Option<Resource<T>> {
    let mut last = None;
    while let Some(item) = stream.next().await {
        if !item.is_loading() {
            last = Some(item);
        }
    }
    last
}
