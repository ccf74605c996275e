//! Document conversion functions.
//!
//! Pure functions for converting between store documents and domain types.
//! These are testable in isolation without a store.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use recipebox_core::social::{collections, Comment, Cookbook, Post, Recipe, User};
use recipebox_core::storage::{Document, RepositoryError};

/// A domain type stored as one document per entity.
pub trait StoredEntity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection holding this entity.
    const COLLECTION: &'static str;
    /// Name used in `NotFound` errors.
    const ENTITY_TYPE: &'static str;

    fn id(&self) -> &str;
}

impl StoredEntity for User {
    const COLLECTION: &'static str = collections::USERS;
    const ENTITY_TYPE: &'static str = "User";

    fn id(&self) -> &str {
        &self.id
    }
}

impl StoredEntity for Post {
    const COLLECTION: &'static str = collections::POSTS;
    const ENTITY_TYPE: &'static str = "Post";

    fn id(&self) -> &str {
        &self.id
    }
}

impl StoredEntity for Comment {
    const COLLECTION: &'static str = collections::COMMENTS;
    const ENTITY_TYPE: &'static str = "Comment";

    fn id(&self) -> &str {
        &self.id
    }
}

impl StoredEntity for Recipe {
    const COLLECTION: &'static str = collections::RECIPES;
    const ENTITY_TYPE: &'static str = "Recipe";

    fn id(&self) -> &str {
        &self.id
    }
}

impl StoredEntity for Cookbook {
    const COLLECTION: &'static str = collections::COOKBOOKS;
    const ENTITY_TYPE: &'static str = "Cookbook";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Converts a value to a field map suitable for a merge update.
pub fn to_fields<T: Serialize>(value: &T) -> Result<Map<String, Value>, RepositoryError> {
    match serde_json::to_value(value)? {
        Value::Object(fields) => Ok(fields),
        _ => Err(RepositoryError::Serialization(
            "document data must be an object".to_string(),
        )),
    }
}

/// Converts a value to document data.
pub fn to_data<T: Serialize>(value: &T) -> Result<Value, RepositoryError> {
    to_fields(value).map(Value::Object)
}

/// Converts a document to a domain value.
///
/// The document id wins over any `id` field stored in the data, so renamed
/// or copied documents still decode to the id they live under.
pub fn from_document<T: DeserializeOwned>(document: Document) -> Result<T, RepositoryError> {
    let Document { id, mut data } = document;
    if let Value::Object(fields) = &mut data {
        fields.insert("id".to_string(), Value::String(id));
    }
    serde_json::from_value(data).map_err(RepositoryError::from)
}

/// Converts a batch of documents, failing on the first malformed one.
pub fn from_documents<T: DeserializeOwned>(
    documents: Vec<Document>,
) -> Result<Vec<T>, RepositoryError> {
    documents.into_iter().map(from_document).collect()
}
