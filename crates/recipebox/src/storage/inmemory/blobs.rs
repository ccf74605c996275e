//! In-memory blob store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use recipebox_core::storage::{BlobStore, RepositoryError, Result};

const URL_SCHEME: &str = "memory://";

/// In-memory object storage. URLs have the form `memory://{path}`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBlobStore {
    objects: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the bytes behind a URL, if present.
    pub async fn fetch(&self, url: &str) -> Option<Vec<u8>> {
        let path = url.strip_prefix(URL_SCHEME)?;
        self.objects.read().await.get(path).cloned()
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn upload(&self, path: &str, bytes: Vec<u8>) -> Result<String> {
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            return Err(RepositoryError::Validation(
                "Upload path cannot be empty".to_string(),
            ));
        }
        self.objects.write().await.insert(path.to_string(), bytes);
        Ok(format!("{}{}", URL_SCHEME, path))
    }

    async fn delete(&self, url: &str) -> Result<()> {
        let path = url
            .strip_prefix(URL_SCHEME)
            .ok_or_else(|| RepositoryError::Validation(format!("Unsupported URL: {}", url)))?;
        match self.objects.write().await.remove(path) {
            Some(_) => Ok(()),
            None => Err(RepositoryError::not_found("Blob", url)),
        }
    }
}
