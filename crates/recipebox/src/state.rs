//! Application state wiring repositories to their collaborators.

use std::sync::Arc;

use recipebox_core::repository::{
    AdminRepository, CookbookRepository, MediaRepository, RecipeRepository, SearchRepository,
    UserRepository,
};
use recipebox_core::storage::Result;

use crate::auth::StaticAuthProvider;
use crate::cache::MemoryCache;
use crate::config::Config;
use crate::feed::FeedFacade;
use crate::mock_data;
use crate::repository::{
    BlobMediaRepository, CachedAdminRepository, CachedAggregationRepository,
    CachedAnalyticsRepository, CachedCommentRepository, CachedCookbookRepository,
    CachedInteractionRepository, CachedPostRepository, CachedRecipeRepository,
    CachedReferenceRepository, CachedSearchRepository, CachedUserRepository, ReadThrough,
};
use crate::storage::{InMemoryBlobStore, InMemoryDocumentStore};

/// Shared application state.
///
/// Cloning is cheap; every repository is behind an `Arc` and all of them
/// share one document store and one cache.
#[derive(Clone)]
pub struct AppState {
    /// The social feed (posts, comments, interactions, analytics, references, listings).
    pub feed: FeedFacade,
    pub cookbooks: Arc<dyn CookbookRepository>,
    pub recipes: Arc<dyn RecipeRepository>,
    pub search: Arc<dyn SearchRepository>,
    pub users: Arc<dyn UserRepository>,
    pub admin: Arc<dyn AdminRepository>,
    pub media: Arc<dyn MediaRepository>,

    pub store: Arc<InMemoryDocumentStore>,
    pub cache: Arc<MemoryCache>,
    pub auth: StaticAuthProvider,
    pub page_size: usize,
}

impl AppState {
    /// Builds state backed by the in-memory store and LRU cache.
    pub fn in_memory(config: &Config) -> Self {
        let store = Arc::new(InMemoryDocumentStore::new());
        let blobs = Arc::new(InMemoryBlobStore::new());
        let cache = Arc::new(MemoryCache::new(config.cache_max_entries));
        let auth = StaticAuthProvider::signed_out();
        let layer = ReadThrough::new(Arc::clone(&cache), config.cache_ttl());

        let feed = FeedFacade::new(
            Arc::new(CachedPostRepository::new(Arc::clone(&store), layer.clone())),
            Arc::new(CachedCommentRepository::new(Arc::clone(&store), layer.clone())),
            Arc::new(CachedInteractionRepository::new(Arc::clone(&store), layer.clone())),
            Arc::new(CachedAnalyticsRepository::new(Arc::clone(&store))),
            Arc::new(CachedReferenceRepository::new(Arc::clone(&store), layer.clone())),
            Arc::new(CachedAggregationRepository::new(Arc::clone(&store), layer.clone())),
        );

        tracing::debug!(
            cache_ttl_seconds = config.cache_ttl_seconds,
            cache_max_entries = config.cache_max_entries,
            "Initialized in-memory storage and cache"
        );

        Self {
            feed,
            cookbooks: Arc::new(CachedCookbookRepository::new(Arc::clone(&store), layer.clone())),
            recipes: Arc::new(CachedRecipeRepository::new(Arc::clone(&store), layer.clone())),
            search: Arc::new(CachedSearchRepository::new(Arc::clone(&store), layer.clone())),
            users: Arc::new(CachedUserRepository::new(
                Arc::clone(&store),
                layer.clone(),
                Arc::new(auth.clone()),
            )),
            admin: Arc::new(CachedAdminRepository::new(
                Arc::clone(&store),
                layer,
                Arc::new(auth.clone()),
            )),
            media: Arc::new(BlobMediaRepository::new(blobs)),
            store,
            cache,
            auth,
            page_size: config.default_page_size,
        }
    }

    /// Seeds demo content into the remote store when the config asks for it.
    pub async fn with_demo_data(self, config: &Config) -> Result<Self> {
        if config.seed_demo_data {
            mock_data::seed(&self.store).await?;
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::settle;
    use recipebox_core::repository::PostRepository;
    use recipebox_core::resource::Resource;

    fn config(seed_demo_data: bool) -> Config {
        Config {
            cache_ttl_seconds: 60,
            cache_max_entries: 1000,
            default_page_size: 5,
            seed_demo_data,
        }
    }

    #[tokio::test]
    async fn test_empty_state() {
        let state = AppState::in_memory(&config(false))
            .with_demo_data(&config(false))
            .await
            .unwrap();

        let page = settle(state.feed.get_public_posts(state.page_size, None)).await;

        assert_eq!(page, Some(Resource::Success(Vec::new())));
        assert_eq!(state.page_size, 5);
    }

    #[tokio::test]
    async fn test_repositories_share_cache() {
        let state = AppState::in_memory(&config(true))
            .with_demo_data(&config(true))
            .await
            .unwrap();

        let page = settle(state.feed.get_public_posts(state.page_size, None)).await;

        assert!(!page.unwrap().value().unwrap().is_empty());
        assert!(!state.cache.is_empty().await);
    }
}
