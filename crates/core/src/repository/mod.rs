//! Capability traits implemented by the repositories of the `recipebox` crate.
//!
//! Every operation returns a [`ResourceStream`](crate::resource::ResourceStream):
//! `Loading`, then zero or more `Success` values, then at most one `Failure`.

mod traits;

pub use traits::{
    AdminRepository, AggregationRepository, AnalyticsRepository, CommentRepository,
    CookbookRepository, FeedRepository, InteractionRepository, MediaRepository, PostRepository,
    RecipeRepository, ReferenceRepository, SearchRepository, UserRepository,
};
