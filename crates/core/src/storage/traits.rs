use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::social::AuthSession;

use super::{Document, Query, Result};

/// A hosted document store: collections of JSON documents addressed by id.
///
/// Implementations return `Ok(None)` for absent documents and
/// `Err(RepositoryError::Transport)` (or `PermissionDenied`) when the backend
/// cannot be reached or refuses the call.
///
/// [`RepositoryError::Transport`]: super::RepositoryError::Transport
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Gets a document by id.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>>;

    /// Creates or overwrites a document.
    async fn set(&self, collection: &str, id: &str, data: Value) -> Result<()>;

    /// Merges fields into an existing document. Fails with `NotFound` when absent.
    async fn update(&self, collection: &str, id: &str, fields: Map<String, Value>) -> Result<()>;

    /// Deletes a document. Deleting an absent document is not an error.
    async fn delete(&self, collection: &str, id: &str) -> Result<()>;

    /// Runs a filtered, ordered, paginated query over a collection.
    async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>>;

    /// Atomically adds `delta` to a numeric field. Fails with `NotFound` when absent.
    async fn increment(&self, collection: &str, id: &str, field: &str, delta: i64) -> Result<()>;
}

/// Object storage for uploaded media.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Uploads bytes under a path and returns their public URL.
    async fn upload(&self, path: &str, bytes: Vec<u8>) -> Result<String>;

    /// Deletes the object behind a URL previously returned by `upload`.
    async fn delete(&self, url: &str) -> Result<()>;
}

/// Source of the signed-in identity.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Returns the current session, or `None` when signed out.
    async fn current_session(&self) -> Option<AuthSession>;
}
