//! Local cache backends.
//!
//! Implementations of [`recipebox_core::cache::Cache`]. Only the in-memory
//! LRU backend ships today; repositories take the cache as a type parameter
//! so tests can substitute their own doubles.

pub mod memory;

pub use memory::MemoryCache;
