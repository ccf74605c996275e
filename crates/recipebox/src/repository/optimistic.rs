//! Optimistic edge writes.
//!
//! Toggling a relationship updates the local cache first so readers see the
//! new state immediately, then writes the remote edge and its counters. A
//! failed remote write puts the cache back exactly as it was.

use async_stream::stream;

use recipebox_core::cache::{edge_key, Cache};
use recipebox_core::resource::{Resource, ResourceStream};
use recipebox_core::social::{Edge, EdgeKind, TargetKind};
use recipebox_core::storage::{failure_message, DocumentStore};

use super::read_through::ReadThrough;
use crate::remote::EdgeSource;

/// The relationship state an optimistic write moves towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeState {
    Present,
    Absent,
}

/// Optimistic create/delete of [`Edge`]s backed by a read-through cache.
pub struct OptimisticEdges<S, C> {
    edges: EdgeSource<S>,
    layer: ReadThrough<C>,
}

impl<S, C> Clone for OptimisticEdges<S, C> {
    fn clone(&self) -> Self {
        Self {
            edges: self.edges.clone(),
            layer: self.layer.clone(),
        }
    }
}

impl<S, C> OptimisticEdges<S, C>
where
    S: DocumentStore + 'static,
    C: Cache + 'static,
{
    pub fn new(edges: EdgeSource<S>, layer: ReadThrough<C>) -> Self {
        Self { edges, layer }
    }

    /// Moves the edge to `desired`, locally first and then remotely.
    ///
    /// Emits `Loading` then either `Success(())` or a single
    /// `Failure(message)`, using `fallback` when the error has no text. On
    /// failure the cached edge state is restored byte for byte.
    pub fn apply(&self, edge: Edge, desired: EdgeState, fallback: &'static str) -> ResourceStream<()> {
        let this = self.clone();
        Box::pin(stream! {
            yield Resource::Loading;

            let key = edge_key(edge.kind, edge.target_kind, &edge.actor_id, &edge.target_id);
            let snapshot = this.layer.snapshot(&key).await;
            match desired {
                EdgeState::Present => this.layer.store(&key, &edge).await,
                EdgeState::Absent => this.layer.evict(&key).await,
            }

            let result = match desired {
                EdgeState::Present => this.edges.create(&edge).await,
                EdgeState::Absent => {
                    this.edges
                        .remove(edge.kind, edge.target_kind, &edge.actor_id, &edge.target_id)
                        .await
                }
            };

            match result {
                Ok(changed) => {
                    tracing::debug!(
                        kind = %edge.kind,
                        actor_id = %edge.actor_id,
                        target_id = %edge.target_id,
                        ?desired,
                        changed,
                        "Edge write confirmed"
                    );
                    yield Resource::Success(());
                }
                Err(err) => {
                    this.layer.restore(&key, snapshot).await;
                    tracing::warn!(
                        kind = %edge.kind,
                        actor_id = %edge.actor_id,
                        target_id = %edge.target_id,
                        error = %err,
                        "Edge write failed, local state reverted"
                    );
                    yield Resource::Failure(failure_message(&err, fallback));
                }
            }
        })
    }

    /// Streams whether an edge exists.
    ///
    /// The cached state is emitted first as a provisional answer, followed by
    /// the remote answer when it differs. Remote failures keep the
    /// provisional answer.
    pub fn exists(
        &self,
        kind: EdgeKind,
        target_kind: TargetKind,
        actor_id: &str,
        target_id: &str,
    ) -> ResourceStream<bool> {
        let this = self.clone();
        let actor_id = actor_id.to_string();
        let target_id = target_id.to_string();
        Box::pin(stream! {
            yield Resource::Loading;

            let key = edge_key(kind, target_kind, &actor_id, &target_id);
            let provisional = this.layer.contains(&key).await;
            yield Resource::Success(provisional);

            match this.edges.get(kind, target_kind, &actor_id, &target_id).await {
                Ok(Some(edge)) => {
                    this.layer.store(&key, &edge).await;
                    if !provisional {
                        yield Resource::Success(true);
                    }
                }
                Ok(None) => {
                    if provisional {
                        this.layer.evict(&key).await;
                        yield Resource::Success(false);
                    }
                }
                Err(err) => {
                    tracing::warn!(%kind, %actor_id, %target_id, error = %err, "Edge lookup failed, keeping cached state");
                }
            }
        })
    }

    /// Newest-first edges of a kind pointing at a target.
    pub fn by_target(
        &self,
        kind: EdgeKind,
        target_kind: TargetKind,
        target_id: &str,
        limit: usize,
        cursor: Option<&str>,
    ) -> ResourceStream<Vec<Edge>> {
        let edges = self.edges.clone();
        let target = target_id.to_string();
        let after = cursor.map(str::to_string);
        self.layer.fetch_page(
            &format!("{}_of_{}_{}", kind.collection(), target_kind, target_id),
            limit,
            cursor,
            async move {
                edges
                    .by_target(kind, target_kind, &target, Some(limit), after.as_deref())
                    .await
            },
        )
    }

    /// Newest-first edges of a kind created by an actor.
    pub fn by_actor(
        &self,
        kind: EdgeKind,
        target_kind: TargetKind,
        actor_id: &str,
        limit: usize,
        cursor: Option<&str>,
    ) -> ResourceStream<Vec<Edge>> {
        let edges = self.edges.clone();
        let actor = actor_id.to_string();
        let after = cursor.map(str::to_string);
        self.layer.fetch_page(
            &format!("{}_{}_by_{}", kind.collection(), target_kind, actor_id),
            limit,
            cursor,
            async move {
                edges
                    .by_actor(kind, target_kind, &actor, Some(limit), after.as_deref())
                    .await
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::remote::EntitySource;
    use crate::storage::InMemoryDocumentStore;
    use crate::testing::{collect, CountingCache, FlakyStore};
    use recipebox_core::social::Post;

    type Store = FlakyStore<InMemoryDocumentStore>;

    async fn setup() -> (Arc<Store>, ReadThrough<CountingCache>, OptimisticEdges<Store, CountingCache>) {
        let store = Arc::new(FlakyStore::new(InMemoryDocumentStore::new()));
        EntitySource::<_, Post>::new(Arc::clone(&store))
            .create(&Post::new("author", "Ramen night").with_id("p1"))
            .await
            .unwrap();
        let layer = ReadThrough::new(Arc::new(CountingCache::new()), Duration::from_secs(60));
        let edges = OptimisticEdges::new(EdgeSource::new(Arc::clone(&store)), layer.clone());
        (store, layer, edges)
    }

    fn like(actor: &str) -> Edge {
        Edge::new(EdgeKind::Like, TargetKind::Post, actor, "p1")
    }

    #[tokio::test]
    async fn test_apply_success() {
        let (store, layer, edges) = setup().await;

        let items = collect(edges.apply(like("u1"), EdgeState::Present, "Failed to like post")).await;

        assert_eq!(items, vec![Resource::Loading, Resource::Success(())]);
        assert!(layer.contains(&edge_key(EdgeKind::Like, TargetKind::Post, "u1", "p1")).await);
        let post = EntitySource::<_, Post>::new(store).require("p1").await.unwrap();
        assert_eq!(post.like_count, 1);
    }

    #[tokio::test]
    async fn test_failed_create_reverts_to_absent() {
        let (store, layer, edges) = setup().await;
        store.fail_writes("PERMISSION_DENIED");

        let items = collect(edges.apply(like("u1"), EdgeState::Present, "Failed to like post")).await;

        assert_eq!(
            items,
            vec![Resource::Loading, Resource::failure("PERMISSION_DENIED")]
        );
        assert!(!layer.contains(&edge_key(EdgeKind::Like, TargetKind::Post, "u1", "p1")).await);
    }

    #[tokio::test]
    async fn test_failed_delete_restores_prior_bytes() {
        let (store, layer, edges) = setup().await;
        collect(edges.apply(like("u1"), EdgeState::Present, "Failed to like post")).await;
        let key = edge_key(EdgeKind::Like, TargetKind::Post, "u1", "p1");
        let before = layer.snapshot(&key).await;
        store.fail_writes("");

        let items = collect(edges.apply(like("u1"), EdgeState::Absent, "Failed to unlike post")).await;

        assert_eq!(
            items,
            vec![Resource::Loading, Resource::failure("Failed to unlike post")]
        );
        assert_eq!(layer.snapshot(&key).await, before);
    }

    #[tokio::test]
    async fn test_exists_corrects_provisional_answer() {
        let (_, layer, edges) = setup().await;
        // Remote has the edge but the cache does not know yet.
        collect(edges.apply(like("u1"), EdgeState::Present, "x")).await;
        layer.evict(&edge_key(EdgeKind::Like, TargetKind::Post, "u1", "p1")).await;

        let items = collect(edges.exists(EdgeKind::Like, TargetKind::Post, "u1", "p1")).await;

        assert_eq!(
            items,
            vec![
                Resource::Loading,
                Resource::Success(false),
                Resource::Success(true),
            ]
        );
        assert!(layer.contains(&edge_key(EdgeKind::Like, TargetKind::Post, "u1", "p1")).await);
    }

    #[tokio::test]
    async fn test_exists_keeps_provisional_on_failure() {
        let (store, layer, edges) = setup().await;
        layer
            .store(&edge_key(EdgeKind::Like, TargetKind::Post, "u1", "p1"), &like("u1"))
            .await;
        store.fail_reads("offline");

        let items = collect(edges.exists(EdgeKind::Like, TargetKind::Post, "u1", "p1")).await;

        assert_eq!(items, vec![Resource::Loading, Resource::Success(true)]);
    }

    #[tokio::test]
    async fn test_by_target_lists_edges() {
        let (_, _, edges) = setup().await;
        for actor in ["u1", "u2"] {
            collect(edges.apply(like(actor), EdgeState::Present, "x")).await;
        }

        let items = collect(edges.by_target(EdgeKind::Like, TargetKind::Post, "p1", 10, None)).await;

        let page = items.last().and_then(Resource::value).unwrap();
        assert_eq!(page.len(), 2);
    }
}
