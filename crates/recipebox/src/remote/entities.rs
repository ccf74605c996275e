//! Typed access to entity collections.

use std::marker::PhantomData;
use std::sync::Arc;

use serde_json::{Map, Value};

use recipebox_core::storage::{DocumentStore, Query, RepositoryError, Result};

use super::conversions::{from_document, from_documents, to_data, StoredEntity};

/// Remote data source for one entity family.
///
/// A thin typed layer over a [`DocumentStore`]: no caching, no retries. Absent
/// documents come back as `Ok(None)`; transport failures are passed through.
pub struct EntitySource<S, T> {
    store: Arc<S>,
    _entity: PhantomData<fn() -> T>,
}

impl<S, T> Clone for EntitySource<S, T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            _entity: PhantomData,
        }
    }
}

impl<S, T> EntitySource<S, T>
where
    S: DocumentStore,
    T: StoredEntity,
{
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            _entity: PhantomData,
        }
    }

    /// Gets an entity by id.
    pub async fn get(&self, id: &str) -> Result<Option<T>> {
        match self.store.get(T::COLLECTION, id).await? {
            Some(document) => from_document(document).map(Some),
            None => Ok(None),
        }
    }

    /// Gets an entity by id, failing with `NotFound` when absent.
    pub async fn require(&self, id: &str) -> Result<T> {
        self.get(id)
            .await?
            .ok_or_else(|| RepositoryError::not_found(T::ENTITY_TYPE, id))
    }

    /// Creates a new entity. Fails with `AlreadyExists` if the id is taken.
    pub async fn create(&self, entity: &T) -> Result<()> {
        if self.store.get(T::COLLECTION, entity.id()).await?.is_some() {
            return Err(RepositoryError::AlreadyExists {
                entity_type: T::ENTITY_TYPE,
                id: entity.id().to_string(),
            });
        }
        self.store
            .set(T::COLLECTION, entity.id(), to_data(entity)?)
            .await
    }

    /// Overwrites an existing entity. Fails with `NotFound` when absent.
    pub async fn replace(&self, entity: &T) -> Result<()> {
        if self.store.get(T::COLLECTION, entity.id()).await?.is_none() {
            return Err(RepositoryError::not_found(T::ENTITY_TYPE, entity.id()));
        }
        self.store
            .set(T::COLLECTION, entity.id(), to_data(entity)?)
            .await
    }

    /// Merges individual fields into an existing entity.
    pub async fn update_fields(&self, id: &str, fields: Map<String, Value>) -> Result<()> {
        self.store
            .update(T::COLLECTION, id, fields)
            .await
            .map_err(|err| rename_not_found::<T>(err, id))
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.store.delete(T::COLLECTION, id).await
    }

    /// Runs a list query over the collection.
    pub async fn list(&self, query: &Query) -> Result<Vec<T>> {
        from_documents(self.store.query(T::COLLECTION, query).await?)
    }

    /// Adds `delta` to a counter field.
    pub async fn increment(&self, id: &str, field: &str, delta: i64) -> Result<()> {
        self.store
            .increment(T::COLLECTION, id, field, delta)
            .await
            .map_err(|err| rename_not_found::<T>(err, id))
    }
}

/// Reports a store-level `NotFound` under the entity's own name.
fn rename_not_found<T: StoredEntity>(err: RepositoryError, id: &str) -> RepositoryError {
    if err.is_not_found() {
        RepositoryError::not_found(T::ENTITY_TYPE, id)
    } else {
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryDocumentStore;
    use recipebox_core::social::Post;

    fn source() -> EntitySource<InMemoryDocumentStore, Post> {
        EntitySource::new(Arc::new(InMemoryDocumentStore::new()))
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let posts = source();
        let post = Post::new("u1", "Brown butter cookies").with_id("p1");

        posts.create(&post).await.unwrap();

        assert_eq!(posts.get("p1").await.unwrap(), Some(post));
        assert_eq!(posts.get("p2").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_create_twice_fails() {
        let posts = source();
        let post = Post::new("u1", "hi").with_id("p1");
        posts.create(&post).await.unwrap();

        let err = posts.create(&post).await.unwrap_err();
        assert_eq!(
            err,
            RepositoryError::AlreadyExists {
                entity_type: "Post",
                id: "p1".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_require_and_replace_missing() {
        let posts = source();
        let post = Post::new("u1", "hi").with_id("p1");

        assert_eq!(
            posts.require("p1").await.unwrap_err(),
            RepositoryError::not_found("Post", "p1")
        );
        assert_eq!(
            posts.replace(&post).await.unwrap_err(),
            RepositoryError::not_found("Post", "p1")
        );
    }

    #[tokio::test]
    async fn test_increment_names_entity_on_missing() {
        let posts = source();
        assert_eq!(
            posts.increment("p1", "like_count", 1).await.unwrap_err(),
            RepositoryError::not_found("Post", "p1")
        );
    }

    #[tokio::test]
    async fn test_list() {
        let posts = source();
        for id in ["p1", "p2"] {
            posts.create(&Post::new("u1", id).with_id(id)).await.unwrap();
        }

        let listed = posts.list(&Query::new().limit(1)).await.unwrap();
        assert_eq!(listed.len(), 1);
    }
}
