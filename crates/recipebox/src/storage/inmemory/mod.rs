//! In-memory storage backend.
//!
//! Documents live in nested `HashMap`s behind `Arc<RwLock<_>>`, blobs in a
//! path-keyed map. Nothing is persisted.
//!
//! # Example
//!
//! ```rust,ignore
//! use recipebox::storage::InMemoryDocumentStore;
//!
//! let store = InMemoryDocumentStore::new();
//! store.set("posts", "p1", serde_json::json!({"id": "p1"})).await?;
//! ```

mod blobs;
mod documents;

pub use blobs::InMemoryBlobStore;
pub use documents::InMemoryDocumentStore;
