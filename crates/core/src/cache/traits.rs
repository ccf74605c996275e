use std::time::Duration;

use async_trait::async_trait;

use super::Result;

/// Key-indexed local store mirroring a subset of remote entities.
///
/// Values are opaque bytes; see [`super::encode`] and [`super::decode`] for
/// the JSON encoding used by the repositories.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Gets a value from the cache by key.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Sets a value in the cache with an optional TTL.
    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()>;

    /// Deletes a value from the cache by key. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Deletes all values whose key matches a glob pattern (e.g. `"public_*"`).
    async fn delete_pattern(&self, pattern: &str) -> Result<()>;

    /// Returns true if a live (non-expired) entry exists for the key.
    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.get(key).await?.is_some())
    }
}
