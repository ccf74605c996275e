//! In-memory cache backend with LRU eviction and lazy TTL expiry.

mod cache;

pub use cache::MemoryCache;
