//! Profiles and the follow graph.

use std::sync::Arc;

use async_stream::stream;
use serde_json::Map;
use tokio_stream::StreamExt;

use recipebox_core::cache::{list_pattern, user_key, Cache};
use recipebox_core::repository::UserRepository;
use recipebox_core::resource::{Resource, ResourceStream};
use recipebox_core::social::{
    validate_follow, validate_user, Edge, EdgeKind, SocialError, TargetKind, User,
};
use recipebox_core::storage::{AuthProvider, DocumentStore};

use super::aggregation::home_scope;
use super::optimistic::{EdgeState, OptimisticEdges};
use super::read_through::ReadThrough;
use super::{field_value, once};
use crate::remote::{EdgeSource, EntitySource};

/// User repository with read-through caching and optimistic follows.
pub struct CachedUserRepository<S, C> {
    users: EntitySource<S, User>,
    edges: OptimisticEdges<S, C>,
    layer: ReadThrough<C>,
    auth: Arc<dyn AuthProvider>,
}

impl<S, C> CachedUserRepository<S, C>
where
    S: DocumentStore + 'static,
    C: Cache + 'static,
{
    pub fn new(store: Arc<S>, layer: ReadThrough<C>, auth: Arc<dyn AuthProvider>) -> Self {
        Self {
            users: EntitySource::new(Arc::clone(&store)),
            edges: OptimisticEdges::new(EdgeSource::new(store), layer.clone()),
            layer,
            auth,
        }
    }

    /// Applies a follow change and drops the actor's cached home feed once
    /// it is confirmed.
    fn follow_edge(
        &self,
        actor_id: &str,
        target_id: &str,
        desired: EdgeState,
        fallback: &'static str,
    ) -> ResourceStream<()> {
        if let Err(err) = validate_follow(actor_id, target_id) {
            return rejected(err);
        }

        let edge = Edge::new(EdgeKind::Follow, TargetKind::User, actor_id, target_id);
        let mut inner = self.edges.apply(edge, desired, fallback);
        let layer = self.layer.clone();
        let home = list_pattern(&home_scope(actor_id));
        Box::pin(stream! {
            while let Some(item) = inner.next().await {
                if item.is_success() {
                    layer.evict_pattern(&home).await;
                }
                yield item;
            }
        })
    }
}

fn rejected<T: Send + 'static>(err: SocialError) -> ResourceStream<T> {
    let message = err.to_string();
    Box::pin(stream! {
        yield Resource::Loading;
        yield Resource::Failure(message);
    })
}

impl<S, C> UserRepository for CachedUserRepository<S, C>
where
    S: DocumentStore + 'static,
    C: Cache + 'static,
{
    fn current_user(&self) -> ResourceStream<User> {
        let auth = Arc::clone(&self.auth);
        let users = self.users.clone();
        let layer = self.layer.clone();
        Box::pin(stream! {
            yield Resource::Loading;

            match auth.current_session().await {
                None => {
                    yield Resource::Failure(SocialError::NotSignedIn.to_string());
                }
                Some(session) => {
                    let id = session.user_id.clone();
                    let mut profile = layer.fetch(user_key(&session.user_id), async move {
                        users.require(&id).await
                    });
                    while let Some(item) = profile.next().await {
                        if !item.is_loading() {
                            yield item;
                        }
                    }
                }
            }
        })
    }

    fn get_user(&self, user_id: &str) -> ResourceStream<User> {
        let users = self.users.clone();
        let id = user_id.to_string();
        self.layer
            .fetch(user_key(user_id), async move { users.require(&id).await })
    }

    fn create_user(&self, user: User) -> ResourceStream<User> {
        let users = self.users.clone();
        let layer = self.layer.clone();
        once("Failed to create user", async move {
            validate_user(&user)?;
            users.create(&user).await?;
            layer.store(&user_key(&user.id), &user).await;

            tracing::debug!(user_id = %user.id, "User created");
            Ok(user)
        })
    }

    fn update_profile(&self, user: User) -> ResourceStream<User> {
        let users = self.users.clone();
        let layer = self.layer.clone();
        once("Failed to update profile", async move {
            validate_user(&user)?;

            // Only profile fields; counters and role are owned elsewhere.
            let mut fields = Map::new();
            fields.insert("display_name".to_string(), field_value(&user.display_name)?);
            fields.insert("bio".to_string(), field_value(&user.bio)?);
            fields.insert("avatar_url".to_string(), field_value(&user.avatar_url)?);
            users.update_fields(&user.id, fields).await?;

            let fresh = users.require(&user.id).await?;
            layer.store(&user_key(&fresh.id), &fresh).await;
            layer.evict_pattern("search_users_*").await;
            Ok(fresh)
        })
    }

    fn follow_user(&self, actor_id: &str, target_id: &str) -> ResourceStream<()> {
        self.follow_edge(actor_id, target_id, EdgeState::Present, "Failed to follow user")
    }

    fn unfollow_user(&self, actor_id: &str, target_id: &str) -> ResourceStream<()> {
        self.follow_edge(actor_id, target_id, EdgeState::Absent, "Failed to unfollow user")
    }

    fn is_following(&self, actor_id: &str, target_id: &str) -> ResourceStream<bool> {
        self.edges
            .exists(EdgeKind::Follow, TargetKind::User, actor_id, target_id)
    }

    fn get_followers(
        &self,
        user_id: &str,
        limit: usize,
        cursor: Option<&str>,
    ) -> ResourceStream<Vec<Edge>> {
        self.edges
            .by_target(EdgeKind::Follow, TargetKind::User, user_id, limit, cursor)
    }

    fn get_following(
        &self,
        user_id: &str,
        limit: usize,
        cursor: Option<&str>,
    ) -> ResourceStream<Vec<Edge>> {
        self.edges
            .by_actor(EdgeKind::Follow, TargetKind::User, user_id, limit, cursor)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::auth::{password_session, StaticAuthProvider};
    use crate::storage::InMemoryDocumentStore;
    use crate::testing::{collect, CountingCache, FlakyStore};

    type Store = FlakyStore<InMemoryDocumentStore>;

    async fn setup(
        auth: StaticAuthProvider,
    ) -> (Arc<Store>, CachedUserRepository<Store, CountingCache>) {
        let store = Arc::new(FlakyStore::new(InMemoryDocumentStore::new()));
        let layer = ReadThrough::new(Arc::new(CountingCache::new()), Duration::from_secs(60));
        let repo = CachedUserRepository::new(Arc::clone(&store), layer, Arc::new(auth));
        for (id, name) in [("ana", "Ana"), ("ben", "Ben")] {
            collect(repo.create_user(User::new(format!("{}@example.com", id), name).with_id(id))).await;
        }
        (store, repo)
    }

    async fn stored(store: &Arc<Store>, id: &str) -> User {
        EntitySource::<_, User>::new(Arc::clone(store))
            .require(id)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_current_user_signed_out() {
        let (_, repo) = setup(StaticAuthProvider::signed_out()).await;

        let items = collect(repo.current_user()).await;

        assert_eq!(items, vec![Resource::Loading, Resource::failure("Not signed in")]);
    }

    #[tokio::test]
    async fn test_current_user_signed_in() {
        let auth = StaticAuthProvider::signed_in(password_session("ana", "ana@example.com"));
        let (store, repo) = setup(auth).await;

        let items = collect(repo.current_user()).await;

        assert_eq!(
            items,
            vec![Resource::Loading, Resource::Success(stored(&store, "ana").await)]
        );
    }

    #[tokio::test]
    async fn test_follow_and_unfollow() {
        let (store, repo) = setup(StaticAuthProvider::signed_out()).await;

        let items = collect(repo.follow_user("ana", "ben")).await;
        assert_eq!(items, vec![Resource::Loading, Resource::Success(())]);
        assert_eq!(stored(&store, "ben").await.follower_count, 1);
        assert_eq!(stored(&store, "ana").await.following_count, 1);

        let following = collect(repo.get_following("ana", 10, None)).await;
        assert_eq!(following[1].value().unwrap()[0].target_id, "ben");
        let followers = collect(repo.get_followers("ben", 10, None)).await;
        assert_eq!(followers[1].value().unwrap()[0].actor_id, "ana");

        collect(repo.unfollow_user("ana", "ben")).await;
        let is = collect(repo.is_following("ana", "ben")).await;
        assert_eq!(is, vec![Resource::Loading, Resource::Success(false)]);
        assert_eq!(stored(&store, "ben").await.follower_count, 0);
    }

    #[tokio::test]
    async fn test_self_follow_rejected() {
        let (store, repo) = setup(StaticAuthProvider::signed_out()).await;
        let gets = store.get_calls();

        let items = collect(repo.follow_user("ana", "ana")).await;

        assert_eq!(
            items,
            vec![Resource::Loading, Resource::failure("Users cannot follow themselves")]
        );
        assert_eq!(store.get_calls(), gets);
    }

    #[tokio::test]
    async fn test_update_profile_keeps_counters() {
        let (store, repo) = setup(StaticAuthProvider::signed_out()).await;
        collect(repo.follow_user("ben", "ana")).await;

        let mut edited = User::new("ignored@example.com", "Ana B.").with_id("ana");
        edited.bio = Some("Bakes on Sundays".to_string());
        let items = collect(repo.update_profile(edited)).await;

        let fresh = items[1].value().unwrap();
        assert_eq!(fresh.display_name, "Ana B.");
        assert_eq!(fresh.email, "ana@example.com");
        assert_eq!(fresh.follower_count, 1);
        assert_eq!(&stored(&store, "ana").await, fresh);
    }

    #[tokio::test]
    async fn test_get_user_cached_when_offline() {
        let (store, repo) = setup(StaticAuthProvider::signed_out()).await;
        let ana = stored(&store, "ana").await;
        store.fail_reads("UNAVAILABLE");

        let items = collect(repo.get_user("ana")).await;

        assert_eq!(items, vec![Resource::Loading, Resource::Success(ana)]);
    }
}
