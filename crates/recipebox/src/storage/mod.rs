//! Remote store backends.
//!
//! Implementations of the collaborator traits defined in
//! `recipebox_core::storage`. The in-memory backend stands in for the hosted
//! document database and object storage during development and tests.

pub mod inmemory;

pub use inmemory::{InMemoryBlobStore, InMemoryDocumentStore};
