//! Fire-and-forget view tracking.

use std::sync::Arc;

use async_stream::stream;

use recipebox_core::repository::AnalyticsRepository;
use recipebox_core::resource::{Resource, ResourceStream};
use recipebox_core::social::Post;
use recipebox_core::storage::DocumentStore;

use crate::remote::EntitySource;

/// Records post views by bumping `view_count`.
///
/// Tracking must never disturb the screen that triggered it: there is no
/// `Loading` state and failures are logged and reported as success.
pub struct CachedAnalyticsRepository<S> {
    posts: EntitySource<S, Post>,
}

impl<S: DocumentStore + 'static> CachedAnalyticsRepository<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            posts: EntitySource::new(store),
        }
    }
}

impl<S: DocumentStore + 'static> AnalyticsRepository for CachedAnalyticsRepository<S> {
    fn record_post_view(&self, post_id: &str, viewer_id: Option<&str>) -> ResourceStream<()> {
        let posts = self.posts.clone();
        let post_id = post_id.to_string();
        let viewer_id = viewer_id.map(str::to_string);
        Box::pin(stream! {
            match posts.increment(&post_id, "view_count", 1).await {
                Ok(()) => tracing::trace!(%post_id, ?viewer_id, "Post view recorded"),
                Err(err) => tracing::warn!(%post_id, ?viewer_id, error = %err, "Failed to record post view"),
            }
            yield Resource::Success(());
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryDocumentStore;
    use crate::testing::{collect, FlakyStore};

    #[tokio::test]
    async fn test_view_counted() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let posts = EntitySource::<_, Post>::new(Arc::clone(&store));
        posts.create(&Post::new("u1", "Tacos").with_id("p1")).await.unwrap();
        let repo = CachedAnalyticsRepository::new(store);

        let items = collect(repo.record_post_view("p1", Some("u2"))).await;
        collect(repo.record_post_view("p1", None)).await;

        assert_eq!(items, vec![Resource::Success(())]);
        assert_eq!(posts.require("p1").await.unwrap().view_count, 2);
    }

    #[tokio::test]
    async fn test_failures_are_swallowed() {
        let store = Arc::new(FlakyStore::new(InMemoryDocumentStore::new()));
        store.fail_all("UNAVAILABLE");
        let repo = CachedAnalyticsRepository::new(store);

        let items = collect(repo.record_post_view("p1", Some("u2"))).await;

        assert_eq!(items, vec![Resource::Success(())]);
    }
}
