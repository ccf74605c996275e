//! Cached post repository.

use std::sync::Arc;

use recipebox_core::cache::{list_pattern, post_key, Cache};
use recipebox_core::repository::PostRepository;
use recipebox_core::resource::ResourceStream;
use recipebox_core::social::{now, validate_post, Post, PostListItem, User, Visibility};
use recipebox_core::storage::{DocumentStore, Filter, Query, Result};

use super::read_through::ReadThrough;
use super::{listed, once};
use crate::remote::EntitySource;

/// Cache scope of the public post listing.
pub const PUBLIC_SCOPE: &str = "public";

/// Cache scope of one author's post listing.
pub fn user_posts_scope(user_id: &str) -> String {
    format!("user_posts_{}", user_id)
}

/// Post repository with read-through caching.
///
/// Writes persist to the remote store first, then mirror the post into the
/// cache and evict the listings it appears in.
pub struct CachedPostRepository<S, C> {
    posts: EntitySource<S, Post>,
    users: EntitySource<S, User>,
    layer: ReadThrough<C>,
}

impl<S, C> CachedPostRepository<S, C>
where
    S: DocumentStore + 'static,
    C: Cache + 'static,
{
    pub fn new(store: Arc<S>, layer: ReadThrough<C>) -> Self {
        Self {
            posts: EntitySource::new(Arc::clone(&store)),
            users: EntitySource::new(store),
            layer,
        }
    }
}

/// Evicts every cached listing a post of `author_id` can appear in.
pub(crate) async fn evict_post_listings<C: Cache + 'static>(layer: &ReadThrough<C>, author_id: &str) {
    layer.evict_pattern(&list_pattern(&user_posts_scope(author_id))).await;
    layer.evict_pattern(&list_pattern(PUBLIC_SCOPE)).await;
    layer.evict_pattern(&list_pattern("home")).await;
}

/// Adjusts an author's post counter. The post write already succeeded, so a
/// failure here is only logged.
async fn bump_post_count<S: DocumentStore>(users: &EntitySource<S, User>, author_id: &str, delta: i64) {
    if let Err(err) = users.increment(author_id, "post_count", delta).await {
        tracing::warn!(%author_id, error = %err, "Failed to update post count");
    }
}

async fn list_items<S: DocumentStore>(posts: &EntitySource<S, Post>, query: Query) -> Result<Vec<PostListItem>> {
    let posts = posts.list(&query).await?;
    Ok(posts.iter().map(PostListItem::from).collect())
}

impl<S, C> PostRepository for CachedPostRepository<S, C>
where
    S: DocumentStore + 'static,
    C: Cache + 'static,
{
    fn create_post(&self, post: Post) -> ResourceStream<Post> {
        let posts = self.posts.clone();
        let users = self.users.clone();
        let layer = self.layer.clone();
        once("Failed to create post", async move {
            validate_post(&post)?;
            posts.create(&post).await?;
            bump_post_count(&users, &post.author_id, 1).await;

            layer.store(&post_key(&post.id), &post).await;
            evict_post_listings(&layer, &post.author_id).await;

            tracing::debug!(post_id = %post.id, author_id = %post.author_id, "Post created");
            Ok(post)
        })
    }

    fn get_post(&self, post_id: &str) -> ResourceStream<Post> {
        let posts = self.posts.clone();
        let id = post_id.to_string();
        self.layer
            .fetch(post_key(post_id), async move { posts.require(&id).await })
    }

    fn update_post(&self, mut post: Post) -> ResourceStream<Post> {
        let posts = self.posts.clone();
        let layer = self.layer.clone();
        once("Failed to update post", async move {
            validate_post(&post)?;
            post.updated_at = now();
            posts.replace(&post).await?;

            layer.store(&post_key(&post.id), &post).await;
            evict_post_listings(&layer, &post.author_id).await;

            tracing::debug!(post_id = %post.id, "Post updated");
            Ok(post)
        })
    }

    fn delete_post(&self, post_id: &str) -> ResourceStream<()> {
        let posts = self.posts.clone();
        let users = self.users.clone();
        let layer = self.layer.clone();
        let id = post_id.to_string();
        once("Failed to delete post", async move {
            let post = posts.require(&id).await?;
            posts.delete(&id).await?;
            bump_post_count(&users, &post.author_id, -1).await;

            layer.evict(&post_key(&id)).await;
            evict_post_listings(&layer, &post.author_id).await;

            tracing::debug!(post_id = %id, "Post deleted");
            Ok(())
        })
    }

    fn get_user_posts(
        &self,
        user_id: &str,
        limit: usize,
        cursor: Option<&str>,
    ) -> ResourceStream<Vec<PostListItem>> {
        let posts = self.posts.clone();
        let query = Query::newest_first(limit, cursor)
            .filter(Filter::eq("author_id", user_id))
            .filter(listed());
        self.layer
            .fetch_page(&user_posts_scope(user_id), limit, cursor, async move {
                list_items(&posts, query).await
            })
    }

    fn get_public_posts(
        &self,
        limit: usize,
        cursor: Option<&str>,
    ) -> ResourceStream<Vec<PostListItem>> {
        let posts = self.posts.clone();
        let query = Query::newest_first(limit, cursor)
            .filter(Filter::eq("visibility", Visibility::Public.as_str()))
            .filter(listed());
        self.layer
            .fetch_page(PUBLIC_SCOPE, limit, cursor, async move {
                list_items(&posts, query).await
            })
    }
}
