//! Remote data source for relationship edges and their counters.

use std::sync::Arc;

use recipebox_core::social::{edge_document_id, Edge, EdgeKind, TargetKind};
use recipebox_core::storage::{DocumentStore, Filter, Query, RepositoryError, Result};

use super::conversions::{from_document, from_documents, to_data};

/// Remote data source for [`Edge`] documents.
///
/// Creating an edge writes the edge document and then adjusts the counters
/// returned by [`Edge::counters`]. The two steps are separate remote calls:
/// when a counter update fails after the edge write the error is reported as
/// [`RepositoryError::PartialFailure`] and the counter is left as it is.
///
/// One collection holds every edge of a kind, whatever it points at, so
/// lookups and listings always name the target kind.
pub struct EdgeSource<S> {
    store: Arc<S>,
}

impl<S> Clone for EdgeSource<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: DocumentStore> EdgeSource<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Gets the edge between an actor and a target, if present.
    pub async fn get(
        &self,
        kind: EdgeKind,
        target_kind: TargetKind,
        actor_id: &str,
        target_id: &str,
    ) -> Result<Option<Edge>> {
        let id = edge_document_id(actor_id, target_kind, target_id);
        match self.store.get(kind.collection(), &id).await? {
            Some(document) => from_document(document).map(Some),
            None => Ok(None),
        }
    }

    pub async fn exists(
        &self,
        kind: EdgeKind,
        target_kind: TargetKind,
        actor_id: &str,
        target_id: &str,
    ) -> Result<bool> {
        let id = edge_document_id(actor_id, target_kind, target_id);
        Ok(self.store.get(kind.collection(), &id).await?.is_some())
    }

    /// Creates an edge. Returns `false` without touching counters if it already existed.
    pub async fn create(&self, edge: &Edge) -> Result<bool> {
        let collection = edge.kind.collection();
        let id = edge.document_id();

        if self.store.get(collection, &id).await?.is_some() {
            return Ok(false);
        }
        self.store.set(collection, &id, to_data(edge)?).await?;
        self.adjust_counters(edge, 1).await?;

        tracing::debug!(
            kind = %edge.kind,
            actor_id = %edge.actor_id,
            target_id = %edge.target_id,
            "Edge created"
        );
        Ok(true)
    }

    /// Removes an edge. Returns `false` without touching counters if it was absent.
    pub async fn remove(
        &self,
        kind: EdgeKind,
        target_kind: TargetKind,
        actor_id: &str,
        target_id: &str,
    ) -> Result<bool> {
        let Some(edge) = self.get(kind, target_kind, actor_id, target_id).await? else {
            return Ok(false);
        };

        self.store.delete(kind.collection(), &edge.document_id()).await?;
        self.adjust_counters(&edge, -1).await?;

        tracing::debug!(%kind, %actor_id, %target_id, "Edge removed");
        Ok(true)
    }

    /// Newest-first edges of a kind pointing at a target.
    pub async fn by_target(
        &self,
        kind: EdgeKind,
        target_kind: TargetKind,
        target_id: &str,
        limit: Option<usize>,
        cursor: Option<&str>,
    ) -> Result<Vec<Edge>> {
        self.list(
            kind,
            target_kind,
            Filter::eq("target_id", target_id),
            limit,
            cursor,
        )
        .await
    }

    /// Newest-first edges of a kind created by an actor, limited to one
    /// target kind.
    pub async fn by_actor(
        &self,
        kind: EdgeKind,
        target_kind: TargetKind,
        actor_id: &str,
        limit: Option<usize>,
        cursor: Option<&str>,
    ) -> Result<Vec<Edge>> {
        self.list(
            kind,
            target_kind,
            Filter::eq("actor_id", actor_id),
            limit,
            cursor,
        )
        .await
    }

    async fn list(
        &self,
        kind: EdgeKind,
        target_kind: TargetKind,
        filter: Filter,
        limit: Option<usize>,
        cursor: Option<&str>,
    ) -> Result<Vec<Edge>> {
        let mut query = Query::newest_first(0, cursor)
            .filter(filter)
            .filter(Filter::eq("target_kind", target_kind.as_str()));
        query.limit = limit;
        let documents = self.store.query(kind.collection(), &query).await?;
        from_documents(documents)
    }

    async fn adjust_counters(&self, edge: &Edge, delta: i64) -> Result<()> {
        for counter in edge.counters() {
            if let Err(err) = self
                .store
                .increment(counter.collection, &counter.id, counter.field, delta)
                .await
            {
                tracing::warn!(
                    kind = %edge.kind,
                    target_id = %edge.target_id,
                    field = counter.field,
                    error = %err,
                    "Counter update failed after edge write"
                );
                return Err(RepositoryError::PartialFailure {
                    completed: format!("{} edge write", edge.kind),
                    failed: format!("{} update failed: {}", counter.field, err),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::EntitySource;
    use crate::storage::InMemoryDocumentStore;
    use crate::testing::FlakyStore;
    use recipebox_core::social::{Post, Recipe, User};

    async fn seeded() -> (Arc<InMemoryDocumentStore>, EdgeSource<InMemoryDocumentStore>) {
        let store = Arc::new(InMemoryDocumentStore::new());
        let posts = EntitySource::<_, Post>::new(Arc::clone(&store));
        posts
            .create(&Post::new("author", "Sourdough").with_id("p1"))
            .await
            .unwrap();
        (Arc::clone(&store), EdgeSource::new(store))
    }

    async fn like_count(store: &Arc<InMemoryDocumentStore>) -> i64 {
        EntitySource::<_, Post>::new(Arc::clone(store))
            .require("p1")
            .await
            .unwrap()
            .like_count
    }

    #[tokio::test]
    async fn test_create_is_idempotent() {
        let (store, edges) = seeded().await;
        let like = Edge::new(EdgeKind::Like, TargetKind::Post, "u1", "p1");

        assert!(edges.create(&like).await.unwrap());
        assert!(!edges.create(&like).await.unwrap());

        assert!(edges.exists(EdgeKind::Like, TargetKind::Post, "u1", "p1").await.unwrap());
        assert_eq!(like_count(&store).await, 1);
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let (store, edges) = seeded().await;
        let like = Edge::new(EdgeKind::Like, TargetKind::Post, "u1", "p1");
        edges.create(&like).await.unwrap();

        assert!(edges.remove(EdgeKind::Like, TargetKind::Post, "u1", "p1").await.unwrap());
        assert!(!edges.remove(EdgeKind::Like, TargetKind::Post, "u1", "p1").await.unwrap());

        assert!(!edges.exists(EdgeKind::Like, TargetKind::Post, "u1", "p1").await.unwrap());
        assert_eq!(like_count(&store).await, 0);
    }

    #[tokio::test]
    async fn test_follow_adjusts_both_users() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let users = EntitySource::<_, User>::new(Arc::clone(&store));
        users.create(&User::new("a@x.io", "A").with_id("a")).await.unwrap();
        users.create(&User::new("b@x.io", "B").with_id("b")).await.unwrap();
        let edges = EdgeSource::new(Arc::clone(&store));

        edges
            .create(&Edge::new(EdgeKind::Follow, TargetKind::User, "a", "b"))
            .await
            .unwrap();

        assert_eq!(users.require("b").await.unwrap().follower_count, 1);
        assert_eq!(users.require("a").await.unwrap().following_count, 1);
    }

    #[tokio::test]
    async fn test_counter_failure_is_partial() {
        let store = Arc::new(FlakyStore::new(InMemoryDocumentStore::new()));
        let edges = EdgeSource::new(Arc::clone(&store));
        store.fail_increments("UNAVAILABLE");

        // The target post does not need to exist: the increment fails first.
        let err = edges
            .create(&Edge::new(EdgeKind::Like, TargetKind::Post, "u1", "p1"))
            .await
            .unwrap_err();

        assert!(matches!(err, RepositoryError::PartialFailure { .. }));
        assert!(edges.exists(EdgeKind::Like, TargetKind::Post, "u1", "p1").await.unwrap());
    }

    #[tokio::test]
    async fn test_by_target_newest_first() {
        let (_, edges) = seeded().await;
        let base = chrono::Utc::now();
        for (i, actor) in ["u1", "u2", "u3"].into_iter().enumerate() {
            let mut edge = Edge::new(EdgeKind::Like, TargetKind::Post, actor, "p1");
            edge.created_at = base + chrono::Duration::seconds(i as i64);
            edges.create(&edge).await.unwrap();
        }

        let first = edges
            .by_target(EdgeKind::Like, TargetKind::Post, "p1", Some(2), None)
            .await
            .unwrap();
        let actors: Vec<_> = first.iter().map(|e| e.actor_id.as_str()).collect();
        assert_eq!(actors, vec!["u3", "u2"]);

        let cursor = first[1].document_id();
        let rest = edges
            .by_target(EdgeKind::Like, TargetKind::Post, "p1", Some(2), Some(&cursor))
            .await
            .unwrap();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].actor_id, "u1");

        let mine = edges
            .by_actor(EdgeKind::Like, TargetKind::Post, "u2", None, None)
            .await
            .unwrap();
        assert_eq!(mine.len(), 1);
    }

    #[tokio::test]
    async fn test_by_actor_keeps_to_one_target_kind() {
        let store = Arc::new(InMemoryDocumentStore::new());
        EntitySource::<_, Post>::new(Arc::clone(&store))
            .create(&Post::new("author", "Dumplings").with_id("x1"))
            .await
            .unwrap();
        EntitySource::<_, Recipe>::new(Arc::clone(&store))
            .create(&Recipe::new("author", "Dumplings").with_id("x1"))
            .await
            .unwrap();
        let edges = EdgeSource::new(Arc::clone(&store));

        edges
            .create(&Edge::new(EdgeKind::Save, TargetKind::Post, "u1", "x1"))
            .await
            .unwrap();
        // Same ids, different family: a separate edge, not a duplicate.
        assert!(edges
            .create(&Edge::new(EdgeKind::Save, TargetKind::Recipe, "u1", "x1"))
            .await
            .unwrap());

        let posts = edges
            .by_actor(EdgeKind::Save, TargetKind::Post, "u1", None, None)
            .await
            .unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].target_kind, TargetKind::Post);

        assert!(edges
            .remove(EdgeKind::Save, TargetKind::Recipe, "u1", "x1")
            .await
            .unwrap());
        assert!(edges
            .exists(EdgeKind::Save, TargetKind::Post, "u1", "x1")
            .await
            .unwrap());
    }
}
