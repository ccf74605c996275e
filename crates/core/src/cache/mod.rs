mod error;
mod keys;
mod patterns;
mod serialization;
mod traits;

pub use error::{CacheError, Result};
pub use keys::{
    comment_key, cookbook_key, edge_key, edge_pattern, list_key, list_pattern, post_key,
    recipe_key, search_key, user_key, DASHBOARD_KEY,
};
pub use patterns::pattern_matches;
pub use serialization::{decode, encode, SerializationError};
pub use traits::Cache;
