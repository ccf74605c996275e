//! Listings assembled from edges and posts.

use std::sync::Arc;

use serde_json::Value;

use recipebox_core::cache::Cache;
use recipebox_core::repository::AggregationRepository;
use recipebox_core::resource::ResourceStream;
use recipebox_core::social::{
    edge_document_id, EdgeKind, Post, PostListItem, TargetKind, Visibility,
};
use recipebox_core::storage::{DocumentStore, Filter, Query, Result};

use super::listed;
use super::read_through::ReadThrough;
use crate::remote::{EdgeSource, EntitySource};

pub fn home_scope(user_id: &str) -> String {
    format!("home_{}", user_id)
}

pub fn saved_scope(user_id: &str) -> String {
    format!("saved_{}", user_id)
}

/// Home feed and saved-post listings.
pub struct CachedAggregationRepository<S, C> {
    edges: EdgeSource<S>,
    posts: EntitySource<S, Post>,
    layer: ReadThrough<C>,
}

impl<S, C> CachedAggregationRepository<S, C>
where
    S: DocumentStore + 'static,
    C: Cache + 'static,
{
    pub fn new(store: Arc<S>, layer: ReadThrough<C>) -> Self {
        Self {
            edges: EdgeSource::new(Arc::clone(&store)),
            posts: EntitySource::new(store),
            layer,
        }
    }
}

async fn home_feed<S: DocumentStore>(
    edges: &EdgeSource<S>,
    posts: &EntitySource<S, Post>,
    user_id: &str,
    limit: usize,
    cursor: Option<&str>,
) -> Result<Vec<PostListItem>> {
    let followed: Vec<Value> = edges
        .by_actor(EdgeKind::Follow, TargetKind::User, user_id, None, None)
        .await?
        .into_iter()
        .map(|edge| Value::String(edge.target_id))
        .collect();
    if followed.is_empty() {
        return Ok(Vec::new());
    }

    let query = Query::newest_first(limit, cursor)
        .filter(Filter::is_in("author_id", followed))
        .filter(Filter::is_in(
            "visibility",
            vec![
                Value::from(Visibility::Public.as_str()),
                Value::from(Visibility::Followers.as_str()),
            ],
        ))
        .filter(listed());
    let page = posts.list(&query).await?;
    Ok(page.iter().map(PostListItem::from).collect())
}

/// Saved posts, most recently saved first. The cursor is the id of the last
/// post of the previous page.
async fn saved_posts<S: DocumentStore>(
    edges: &EdgeSource<S>,
    posts: &EntitySource<S, Post>,
    user_id: &str,
    limit: usize,
    cursor: Option<&str>,
) -> Result<Vec<PostListItem>> {
    let after = cursor.map(|post_id| edge_document_id(user_id, TargetKind::Post, post_id));
    let saves = edges
        .by_actor(
            EdgeKind::Save,
            TargetKind::Post,
            user_id,
            Some(limit),
            after.as_deref(),
        )
        .await?;

    let mut items = Vec::with_capacity(saves.len());
    for save in saves {
        match posts.get(&save.target_id).await? {
            Some(post) if post.moderation.is_listed() => items.push(PostListItem::from(&post)),
            Some(_) => {}
            None => tracing::debug!(post_id = %save.target_id, "Saved post no longer exists"),
        }
    }
    Ok(items)
}

impl<S, C> AggregationRepository for CachedAggregationRepository<S, C>
where
    S: DocumentStore + 'static,
    C: Cache + 'static,
{
    fn get_home_feed(
        &self,
        user_id: &str,
        limit: usize,
        cursor: Option<&str>,
    ) -> ResourceStream<Vec<PostListItem>> {
        let edges = self.edges.clone();
        let posts = self.posts.clone();
        let user = user_id.to_string();
        let after = cursor.map(str::to_string);
        self.layer
            .fetch_page(&home_scope(user_id), limit, cursor, async move {
                home_feed(&edges, &posts, &user, limit, after.as_deref()).await
            })
    }

    fn get_saved_posts(
        &self,
        user_id: &str,
        limit: usize,
        cursor: Option<&str>,
    ) -> ResourceStream<Vec<PostListItem>> {
        let edges = self.edges.clone();
        let posts = self.posts.clone();
        let user = user_id.to_string();
        let after = cursor.map(str::to_string);
        self.layer
            .fetch_page(&saved_scope(user_id), limit, cursor, async move {
                saved_posts(&edges, &posts, &user, limit, after.as_deref()).await
            })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::storage::InMemoryDocumentStore;
    use crate::testing::{collect, CountingCache};
    use chrono::Duration as ChronoDuration;
    use recipebox_core::resource::Resource;
    use recipebox_core::social::{now, Edge, Recipe, User};

    async fn setup() -> (
        Arc<InMemoryDocumentStore>,
        EdgeSource<InMemoryDocumentStore>,
        EntitySource<InMemoryDocumentStore, Post>,
        CachedAggregationRepository<InMemoryDocumentStore, CountingCache>,
    ) {
        let store = Arc::new(InMemoryDocumentStore::new());
        let users = EntitySource::<_, User>::new(Arc::clone(&store));
        for id in ["me", "a", "b", "c"] {
            users
                .create(&User::new(format!("{}@example.com", id), id).with_id(id))
                .await
                .unwrap();
        }
        let posts = EntitySource::new(Arc::clone(&store));
        let base = now();
        for (i, author) in ["a", "b", "c", "a"].into_iter().enumerate() {
            posts
                .create(
                    &Post::new(author, format!("{} cooks #{}", author, i))
                        .with_id(format!("p{}", i))
                        .with_created_at(base + ChronoDuration::seconds(i as i64)),
                )
                .await
                .unwrap();
        }
        let layer = ReadThrough::new(Arc::new(CountingCache::new()), Duration::from_secs(60));
        (
            Arc::clone(&store),
            EdgeSource::new(Arc::clone(&store)),
            posts,
            CachedAggregationRepository::new(store, layer),
        )
    }

    fn ids(items: &[Resource<Vec<PostListItem>>]) -> Vec<String> {
        items
            .last()
            .and_then(Resource::value)
            .map(|page| page.iter().map(|p| p.id.clone()).collect())
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn test_home_feed_only_followed_authors() {
        let (_, edges, _, repo) = setup().await;
        edges
            .create(&Edge::new(EdgeKind::Follow, TargetKind::User, "me", "a"))
            .await
            .unwrap();

        let first = collect(repo.get_home_feed("me", 1, None)).await;
        assert_eq!(ids(&first), vec!["p3"]);

        let next = collect(repo.get_home_feed("me", 5, Some("p3"))).await;
        assert_eq!(ids(&next), vec!["p0"]);
    }

    #[tokio::test]
    async fn test_home_feed_without_follows_is_empty() {
        let (_, _, _, repo) = setup().await;

        let items = collect(repo.get_home_feed("loner", 10, None)).await;

        assert_eq!(items, vec![Resource::Loading, Resource::Success(Vec::new())]);
    }

    #[tokio::test]
    async fn test_saved_posts_paging() {
        let (_, edges, posts, repo) = setup().await;
        let base = now();
        for (i, post_id) in ["p1", "p2", "p0"].into_iter().enumerate() {
            let mut save = Edge::new(EdgeKind::Save, TargetKind::Post, "me", post_id);
            save.created_at = base + ChronoDuration::seconds(i as i64);
            edges.create(&save).await.unwrap();
        }
        posts.delete("p2").await.unwrap();

        let first = collect(repo.get_saved_posts("me", 2, None)).await;
        assert_eq!(ids(&first), vec!["p0"]);

        let next = collect(repo.get_saved_posts("me", 2, Some("p2"))).await;
        assert_eq!(ids(&next), vec!["p1"]);
    }

    #[tokio::test]
    async fn test_saved_posts_ignore_other_saves() {
        let (store, edges, _, repo) = setup().await;
        let recipes = EntitySource::<_, Recipe>::new(Arc::clone(&store));
        let base = now();

        let mut post_save = Edge::new(EdgeKind::Save, TargetKind::Post, "me", "p1");
        post_save.created_at = base;
        edges.create(&post_save).await.unwrap();
        for i in 0..3 {
            let recipe_id = format!("r{}", i);
            recipes
                .create(&Recipe::new("a", "Stew").with_id(recipe_id.clone()))
                .await
                .unwrap();
            let mut save = Edge::new(EdgeKind::Save, TargetKind::Recipe, "me", recipe_id);
            save.created_at = base + ChronoDuration::seconds(i + 1);
            edges.create(&save).await.unwrap();
        }

        let page = collect(repo.get_saved_posts("me", 3, None)).await;

        assert_eq!(ids(&page), vec!["p1"]);
    }
}
