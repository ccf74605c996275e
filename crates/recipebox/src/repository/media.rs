//! Image uploads.

use std::sync::Arc;

use recipebox_core::repository::MediaRepository;
use recipebox_core::resource::ResourceStream;
use recipebox_core::storage::{BlobStore, RepositoryError};

use super::once;

/// Pass-through to the blob store. Uploads are neither cached nor retried.
pub struct BlobMediaRepository<B> {
    blobs: Arc<B>,
}

impl<B: BlobStore + 'static> BlobMediaRepository<B> {
    pub fn new(blobs: Arc<B>) -> Self {
        Self { blobs }
    }
}

impl<B: BlobStore + 'static> MediaRepository for BlobMediaRepository<B> {
    fn upload_image(&self, path: &str, bytes: Vec<u8>) -> ResourceStream<String> {
        let blobs = Arc::clone(&self.blobs);
        let path = path.to_string();
        once("Failed to upload image", async move {
            if bytes.is_empty() {
                return Err(RepositoryError::Validation("Image is empty".to_string()));
            }
            let size = bytes.len();
            let url = blobs.upload(&path, bytes).await?;
            tracing::debug!(%path, size, %url, "Image uploaded");
            Ok(url)
        })
    }

    fn delete_image(&self, url: &str) -> ResourceStream<()> {
        let blobs = Arc::clone(&self.blobs);
        let url = url.to_string();
        once("Failed to delete image", async move { blobs.delete(&url).await })
    }
}
