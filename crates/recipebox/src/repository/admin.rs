//! Moderation and account administration.

use std::sync::Arc;

use async_stream::stream;
use serde_json::Map;
use tokio_stream::StreamExt;

use recipebox_core::cache::{list_pattern, post_key, recipe_key, user_key, Cache, DASHBOARD_KEY};
use recipebox_core::repository::AdminRepository;
use recipebox_core::resource::{Resource, ResourceStream};
use recipebox_core::social::{
    AccountStatus, Cookbook, DashboardStats, ModerationStatus, Post, Recipe, SocialError, User,
};
use recipebox_core::storage::{
    failure_message, AuthProvider, DocumentStore, Filter, Query, Result,
};

use super::post::evict_post_listings;
use super::read_through::ReadThrough;
use super::recipe::user_recipes_scope;
use super::{field_value, once};
use crate::remote::{EntitySource, StoredEntity};

const FLAGGED_SCOPE: &str = "flagged_posts";

/// Admin repository.
///
/// Moderation is a direct write of the status field; there is no review
/// workflow. Every read and write checks that the signed-in user has the
/// admin role.
pub struct CachedAdminRepository<S, C> {
    users: EntitySource<S, User>,
    posts: EntitySource<S, Post>,
    recipes: EntitySource<S, Recipe>,
    cookbooks: EntitySource<S, Cookbook>,
    layer: ReadThrough<C>,
    auth: Arc<dyn AuthProvider>,
}

impl<S, C> CachedAdminRepository<S, C>
where
    S: DocumentStore + 'static,
    C: Cache + 'static,
{
    pub fn new(store: Arc<S>, layer: ReadThrough<C>, auth: Arc<dyn AuthProvider>) -> Self {
        Self {
            users: EntitySource::new(Arc::clone(&store)),
            posts: EntitySource::new(Arc::clone(&store)),
            recipes: EntitySource::new(Arc::clone(&store)),
            cookbooks: EntitySource::new(store),
            layer,
            auth,
        }
    }
}

/// Fails unless the current session belongs to an admin.
async fn require_admin<S: DocumentStore>(
    auth: &dyn AuthProvider,
    users: &EntitySource<S, User>,
) -> Result<User> {
    let session = auth.current_session().await.ok_or(SocialError::NotSignedIn)?;
    let user = users.require(&session.user_id).await?;
    if !user.is_admin() {
        tracing::warn!(user_id = %user.id, "Admin operation refused");
        return Err(SocialError::AdminRequired.into());
    }
    Ok(user)
}

/// Runs `inner` only after the admin check passes.
///
/// The check happens before the cache is consulted so a cached dashboard
/// never reaches a non-admin.
fn admin_only<S, T>(
    auth: Arc<dyn AuthProvider>,
    users: EntitySource<S, User>,
    mut inner: ResourceStream<T>,
) -> ResourceStream<T>
where
    S: DocumentStore + 'static,
    T: Send + 'static,
{
    Box::pin(stream! {
        yield Resource::Loading;

        match require_admin(auth.as_ref(), &users).await {
            Err(err) => {
                yield Resource::Failure(failure_message(&err, "Failed to load admin data"));
            }
            Ok(_) => {
                while let Some(item) = inner.next().await {
                    if !item.is_loading() {
                        yield item;
                    }
                }
            }
        }
    })
}

async fn count<S, T>(source: &EntitySource<S, T>, query: Query) -> Result<usize>
where
    S: DocumentStore,
    T: StoredEntity,
{
    Ok(source.list(&query).await?.len())
}

impl<S, C> AdminRepository for CachedAdminRepository<S, C>
where
    S: DocumentStore + 'static,
    C: Cache + 'static,
{
    fn get_dashboard_stats(&self) -> ResourceStream<DashboardStats> {
        let users = self.users.clone();
        let posts = self.posts.clone();
        let recipes = self.recipes.clone();
        let cookbooks = self.cookbooks.clone();
        let stats = self.layer.fetch(DASHBOARD_KEY.to_string(), async move {
            Ok(DashboardStats {
                total_users: count(&users, Query::new()).await?,
                total_posts: count(&posts, Query::new()).await?,
                total_recipes: count(&recipes, Query::new()).await?,
                total_cookbooks: count(&cookbooks, Query::new()).await?,
                flagged_posts: count(
                    &posts,
                    Query::new().filter(Filter::eq("moderation", ModerationStatus::Flagged.as_str())),
                )
                .await?,
                suspended_users: count(
                    &users,
                    Query::new().filter(Filter::eq("status", AccountStatus::Suspended.as_str())),
                )
                .await?,
            })
        });
        admin_only(Arc::clone(&self.auth), self.users.clone(), stats)
    }

    fn get_flagged_posts(&self, limit: usize, cursor: Option<&str>) -> ResourceStream<Vec<Post>> {
        let posts = self.posts.clone();
        let query = Query::newest_first(limit, cursor)
            .filter(Filter::eq("moderation", ModerationStatus::Flagged.as_str()));
        let page = self
            .layer
            .fetch_page(FLAGGED_SCOPE, limit, cursor, async move { posts.list(&query).await });
        admin_only(Arc::clone(&self.auth), self.users.clone(), page)
    }

    fn moderate_post(&self, post_id: &str, status: ModerationStatus) -> ResourceStream<()> {
        let auth = Arc::clone(&self.auth);
        let users = self.users.clone();
        let posts = self.posts.clone();
        let layer = self.layer.clone();
        let id = post_id.to_string();
        once("Failed to moderate post", async move {
            let admin = require_admin(auth.as_ref(), &users).await?;

            let mut fields = Map::new();
            fields.insert("moderation".to_string(), field_value(&status)?);
            posts.update_fields(&id, fields).await?;

            let post = posts.require(&id).await?;
            layer.store(&post_key(&id), &post).await;
            evict_post_listings(&layer, &post.author_id).await;
            layer.evict_pattern(&list_pattern(FLAGGED_SCOPE)).await;
            layer.evict_pattern("search_posts_*").await;
            layer.evict(DASHBOARD_KEY).await;

            tracing::info!(post_id = %id, status = status.as_str(), admin_id = %admin.id, "Post moderated");
            Ok(())
        })
    }

    fn moderate_recipe(&self, recipe_id: &str, status: ModerationStatus) -> ResourceStream<()> {
        let auth = Arc::clone(&self.auth);
        let users = self.users.clone();
        let recipes = self.recipes.clone();
        let layer = self.layer.clone();
        let id = recipe_id.to_string();
        once("Failed to moderate recipe", async move {
            let admin = require_admin(auth.as_ref(), &users).await?;

            let mut fields = Map::new();
            fields.insert("moderation".to_string(), field_value(&status)?);
            recipes.update_fields(&id, fields).await?;

            let recipe = recipes.require(&id).await?;
            layer.store(&recipe_key(&id), &recipe).await;
            layer
                .evict_pattern(&list_pattern(&user_recipes_scope(&recipe.author_id)))
                .await;
            layer.evict_pattern("search_recipes_*").await;

            tracing::info!(recipe_id = %id, status = status.as_str(), admin_id = %admin.id, "Recipe moderated");
            Ok(())
        })
    }

    fn set_user_status(&self, user_id: &str, status: AccountStatus) -> ResourceStream<()> {
        let auth = Arc::clone(&self.auth);
        let users = self.users.clone();
        let layer = self.layer.clone();
        let id = user_id.to_string();
        once("Failed to update account status", async move {
            let admin = require_admin(auth.as_ref(), &users).await?;

            let mut fields = Map::new();
            fields.insert("status".to_string(), field_value(&status)?);
            users.update_fields(&id, fields).await?;

            let user = users.require(&id).await?;
            layer.store(&user_key(&id), &user).await;
            layer.evict_pattern("search_users_*").await;
            layer.evict(DASHBOARD_KEY).await;

            tracing::info!(user_id = %id, status = status.as_str(), admin_id = %admin.id, "Account status changed");
            Ok(())
        })
    }
}
