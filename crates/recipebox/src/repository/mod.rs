//! Repositories for each entity family.
//!
//! Every repository composes a typed remote source with the local cache:
//! reads go through [`ReadThrough`], relationship toggles through
//! [`OptimisticEdges`], and plain writes run once against the remote store
//! before mirroring the result into the cache.

pub mod admin;
pub mod aggregation;
pub mod analytics;
pub mod comment;
pub mod cookbook;
pub mod interaction;
pub mod media;
pub mod optimistic;
pub mod post;
pub mod read_through;
pub mod recipe;
pub mod reference;
pub mod search;
pub mod user;

use std::future::Future;

use async_stream::stream;
use serde_json::{json, Value};

use recipebox_core::social::ModerationStatus;

use recipebox_core::resource::{Resource, ResourceStream};
use recipebox_core::storage::{failure_message, Filter, Result};

pub use admin::CachedAdminRepository;
pub use aggregation::CachedAggregationRepository;
pub use analytics::CachedAnalyticsRepository;
pub use comment::CachedCommentRepository;
pub use cookbook::CachedCookbookRepository;
pub use interaction::CachedInteractionRepository;
pub use media::BlobMediaRepository;
pub use optimistic::{EdgeState, OptimisticEdges};
pub use post::CachedPostRepository;
pub use read_through::ReadThrough;
pub use recipe::CachedRecipeRepository;
pub use reference::CachedReferenceRepository;
pub use search::CachedSearchRepository;
pub use user::CachedUserRepository;

/// Runs a single remote operation as `[Loading, Success | Failure]`.
pub(crate) fn once<T, F>(fallback: &'static str, op: F) -> ResourceStream<T>
where
    T: Send + 'static,
    F: Future<Output = Result<T>> + Send + 'static,
{
    Box::pin(stream! {
        yield Resource::Loading;
        match op.await {
            Ok(value) => {
                yield Resource::Success(value);
            }
            Err(err) => {
                tracing::debug!(error = %err, "{}", fallback);
                yield Resource::Failure(failure_message(&err, fallback));
            }
        }
    })
}

/// Matches content whose moderation state still allows listing.
pub(crate) fn listed() -> Filter {
    Filter::is_in(
        "moderation",
        vec![
            json!(ModerationStatus::Visible.as_str()),
            json!(ModerationStatus::Flagged.as_str()),
        ],
    )
}

/// Serializes an enum into a document field value.
pub(crate) fn field_value<T: serde::Serialize>(value: &T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}
