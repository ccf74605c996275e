//! In-memory document store.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use recipebox_core::storage::{
    Direction, Document, DocumentStore, Filter, FilterOp, Query, RepositoryError, Result,
};

type Collection = HashMap<String, Value>;

/// In-memory document store for development and testing.
///
/// Cloning is cheap and clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDocumentStore {
    collections: Arc<RwLock<HashMap<String, Collection>>>,
}

impl InMemoryDocumentStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in a collection.
    pub async fn count(&self, collection: &str) -> usize {
        let collections = self.collections.read().await;
        collections.get(collection).map_or(0, HashMap::len)
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|data| Document {
                id: id.to_string(),
                data: data.clone(),
            }))
    }

    async fn set(&self, collection: &str, id: &str, data: Value) -> Result<()> {
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), data);
        Ok(())
    }

    async fn update(&self, collection: &str, id: &str, fields: Map<String, Value>) -> Result<()> {
        let mut collections = self.collections.write().await;
        let data = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| RepositoryError::not_found("Document", id))?;

        let Value::Object(existing) = data else {
            return Err(RepositoryError::Serialization(format!(
                "{}/{} is not an object",
                collection, id
            )));
        };
        existing.extend(fields);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        let mut collections = self.collections.write().await;
        if let Some(docs) = collections.get_mut(collection) {
            docs.remove(id);
        }
        Ok(())
    }

    async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>> {
        let collections = self.collections.read().await;
        let Some(docs) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut matched: Vec<Document> = docs
            .iter()
            .filter(|(_, data)| query.filters.iter().all(|f| filter_matches(f, data)))
            .map(|(id, data)| Document {
                id: id.clone(),
                data: data.clone(),
            })
            .collect();

        matched.sort_by(|a, b| {
            let by_field = match &query.order_by {
                Some((field, direction)) => {
                    let ordering = compare_values(a.data.get(field), b.data.get(field));
                    match direction {
                        Direction::Ascending => ordering,
                        Direction::Descending => ordering.reverse(),
                    }
                }
                None => Ordering::Equal,
            };
            by_field.then_with(|| a.id.cmp(&b.id))
        });

        if let Some(cursor) = &query.start_after {
            match matched.iter().position(|doc| &doc.id == cursor) {
                Some(pos) => {
                    matched.drain(..=pos);
                }
                // The cursor document is gone; there is no page after it.
                None => matched.clear(),
            }
        }

        if let Some(limit) = query.limit {
            matched.truncate(limit);
        }

        Ok(matched)
    }

    async fn increment(&self, collection: &str, id: &str, field: &str, delta: i64) -> Result<()> {
        let mut collections = self.collections.write().await;
        let data = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| RepositoryError::not_found("Document", id))?;

        let Value::Object(fields) = data else {
            return Err(RepositoryError::Serialization(format!(
                "{}/{} is not an object",
                collection, id
            )));
        };
        let current = fields.get(field).and_then(Value::as_i64).unwrap_or(0);
        fields.insert(field.to_string(), Value::from(current + delta));
        Ok(())
    }
}

fn filter_matches(filter: &Filter, data: &Value) -> bool {
    let field = data.get(&filter.field);
    match filter.op {
        FilterOp::Eq => field == Some(&filter.value),
        FilterOp::In => match (&filter.value, field) {
            (Value::Array(candidates), Some(value)) => candidates.contains(value),
            _ => false,
        },
        FilterOp::Contains => match field {
            Some(Value::Array(items)) => items.contains(&filter.value),
            _ => false,
        },
    }
}

/// Orders JSON values: missing < null < bool < number < string.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(value: Option<&Value>) -> u8 {
        match value {
            None => 0,
            Some(Value::Null) => 1,
            Some(Value::Bool(_)) => 2,
            Some(Value::Number(_)) => 3,
            Some(Value::String(_)) => 4,
            Some(_) => 5,
        }
    }

    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn seeded() -> InMemoryDocumentStore {
        let store = InMemoryDocumentStore::new();
        for (id, author, created) in [("p1", "u1", 10), ("p2", "u2", 30), ("p3", "u1", 20)] {
            store
                .set(
                    "posts",
                    id,
                    json!({"id": id, "author_id": author, "created_at": created, "tags": ["x"]}),
                )
                .await
                .unwrap();
        }
        store
    }

    fn ids(docs: &[Document]) -> Vec<&str> {
        docs.iter().map(|d| d.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_get_set_delete() {
        let store = InMemoryDocumentStore::new();
        assert!(store.get("posts", "p1").await.unwrap().is_none());

        store.set("posts", "p1", json!({"id": "p1"})).await.unwrap();
        let doc = store.get("posts", "p1").await.unwrap().unwrap();
        assert_eq!(doc.data, json!({"id": "p1"}));

        store.delete("posts", "p1").await.unwrap();
        store.delete("posts", "p1").await.unwrap();
        assert!(store.get("posts", "p1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let store = seeded().await;
        let mut fields = Map::new();
        fields.insert("content".to_string(), json!("edited"));

        store.update("posts", "p1", fields).await.unwrap();

        let doc = store.get("posts", "p1").await.unwrap().unwrap();
        assert_eq!(doc.data["content"], json!("edited"));
        assert_eq!(doc.data["author_id"], json!("u1"));
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let store = InMemoryDocumentStore::new();
        let err = store.update("posts", "nope", Map::new()).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_query_filters_and_orders() {
        let store = seeded().await;

        let query = Query::new()
            .filter(Filter::eq("author_id", "u1"))
            .order_by("created_at", Direction::Descending);
        let docs = store.query("posts", &query).await.unwrap();

        assert_eq!(ids(&docs), vec!["p3", "p1"]);
    }

    #[tokio::test]
    async fn test_query_pagination() {
        let store = seeded().await;

        let first = store
            .query("posts", &Query::newest_first(2, None))
            .await
            .unwrap();
        assert_eq!(ids(&first), vec!["p2", "p3"]);

        let second = store
            .query("posts", &Query::newest_first(2, Some("p3")))
            .await
            .unwrap();
        assert_eq!(ids(&second), vec!["p1"]);

        let past_end = store
            .query("posts", &Query::newest_first(2, Some("p1")))
            .await
            .unwrap();
        assert!(past_end.is_empty());

        let unknown = store
            .query("posts", &Query::newest_first(2, Some("gone")))
            .await
            .unwrap();
        assert!(unknown.is_empty());
    }

    #[tokio::test]
    async fn test_query_in_and_contains() {
        let store = seeded().await;

        let docs = store
            .query(
                "posts",
                &Query::new().filter(Filter::is_in("id", vec![json!("p1"), json!("p2")])),
            )
            .await
            .unwrap();
        assert_eq!(ids(&docs), vec!["p1", "p2"]);

        let docs = store
            .query("posts", &Query::new().filter(Filter::contains("tags", "x")))
            .await
            .unwrap();
        assert_eq!(docs.len(), 3);
    }

    #[tokio::test]
    async fn test_query_unknown_collection_is_empty() {
        let store = InMemoryDocumentStore::new();
        assert!(store.query("nothing", &Query::new()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_increment() {
        let store = seeded().await;

        store.increment("posts", "p1", "like_count", 1).await.unwrap();
        store.increment("posts", "p1", "like_count", 1).await.unwrap();
        store.increment("posts", "p1", "like_count", -1).await.unwrap();

        let doc = store.get("posts", "p1").await.unwrap().unwrap();
        assert_eq!(doc.data["like_count"], json!(1));

        let err = store
            .increment("posts", "missing", "like_count", 1)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_count() {
        let store = seeded().await;
        assert_eq!(store.count("posts").await, 3);
        assert_eq!(store.count("users").await, 0);
    }
}
