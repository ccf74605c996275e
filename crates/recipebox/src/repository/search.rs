//! Case-insensitive text search over recipes, users and posts.

use std::sync::Arc;

use async_stream::stream;

use recipebox_core::cache::{search_key, Cache};
use recipebox_core::repository::SearchRepository;
use recipebox_core::resource::{Resource, ResourceStream};
use recipebox_core::social::{
    normalize_query, post_matches, recipe_matches, user_matches, AccountStatus, Post,
    PostListItem, Recipe, User, Visibility,
};
use recipebox_core::storage::{Direction, DocumentStore, Query};

use super::read_through::ReadThrough;
use crate::remote::EntitySource;

/// Search repository.
///
/// Matching is a substring scan of each collection; results are cached per
/// normalized query and limit. Blank queries fail before any I/O.
pub struct CachedSearchRepository<S, C> {
    recipes: EntitySource<S, Recipe>,
    users: EntitySource<S, User>,
    posts: EntitySource<S, Post>,
    layer: ReadThrough<C>,
}

impl<S, C> CachedSearchRepository<S, C>
where
    S: DocumentStore + 'static,
    C: Cache + 'static,
{
    pub fn new(store: Arc<S>, layer: ReadThrough<C>) -> Self {
        Self {
            recipes: EntitySource::new(Arc::clone(&store)),
            users: EntitySource::new(Arc::clone(&store)),
            posts: EntitySource::new(store),
            layer,
        }
    }
}

/// Validates the query, then hands the normalized text to `search`.
fn validated<V, F>(query: &str, search: F) -> ResourceStream<V>
where
    V: Send + 'static,
    F: FnOnce(String) -> ResourceStream<V>,
{
    match normalize_query(query) {
        Ok(normalized) => search(normalized),
        Err(err) => {
            let message = err.to_string();
            Box::pin(stream! {
                yield Resource::Loading;
                yield Resource::Failure(message);
            })
        }
    }
}

/// Newest-first query over a whole collection.
fn everything() -> Query {
    Query::new().order_by("created_at", Direction::Descending)
}

impl<S, C> SearchRepository for CachedSearchRepository<S, C>
where
    S: DocumentStore + 'static,
    C: Cache + 'static,
{
    fn search_recipes(&self, query: &str, limit: usize) -> ResourceStream<Vec<Recipe>> {
        validated(query, |needle| {
            let recipes = self.recipes.clone();
            self.layer
                .fetch(search_key("recipes", &needle, limit), async move {
                    let all = recipes.list(&everything()).await?;
                    Ok(all
                        .into_iter()
                        .filter(|recipe| {
                            recipe.visibility == Visibility::Public && recipe_matches(recipe, &needle)
                        })
                        .take(limit)
                        .collect())
                })
        })
    }

    fn search_users(&self, query: &str, limit: usize) -> ResourceStream<Vec<User>> {
        validated(query, |needle| {
            let users = self.users.clone();
            self.layer
                .fetch(search_key("users", &needle, limit), async move {
                    let all = users.list(&everything()).await?;
                    Ok(all
                        .into_iter()
                        .filter(|user| {
                            user.status != AccountStatus::Banned && user_matches(user, &needle)
                        })
                        .take(limit)
                        .collect())
                })
        })
    }

    fn search_posts(&self, query: &str, limit: usize) -> ResourceStream<Vec<PostListItem>> {
        validated(query, |needle| {
            let posts = self.posts.clone();
            self.layer
                .fetch(search_key("posts", &needle, limit), async move {
                    let all = posts.list(&everything()).await?;
                    Ok(all
                        .iter()
                        .filter(|post| {
                            post.visibility == Visibility::Public && post_matches(post, &needle)
                        })
                        .take(limit)
                        .map(PostListItem::from)
                        .collect())
                })
        })
    }
}
