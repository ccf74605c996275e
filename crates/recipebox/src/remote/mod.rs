//! Typed remote data sources.
//!
//! Each source wraps the injected [`DocumentStore`](recipebox_core::storage::DocumentStore)
//! and speaks domain types. Sources never touch the cache.

mod conversions;
mod edges;
mod entities;

pub use conversions::{from_document, from_documents, to_data, to_fields, StoredEntity};
pub use edges::EdgeSource;
pub use entities::EntitySource;
