mod edges;
mod error;
mod operations;
mod types;

pub use edges::{
    collections, edge_document_id, CollaboratorRole, CounterRef, Edge, EdgeKind, LikeType,
    TargetKind,
};
pub use error::SocialError;
pub use operations::{
    normalize_query, post_matches, recipe_matches, user_matches, validate_comment,
    validate_cookbook, validate_follow, validate_post, validate_recipe, validate_user,
    MAX_POST_LEN,
};
pub use types::{
    new_id, now, AccountStatus, AuthSession, Comment, Cookbook, DashboardStats, Ingredient,
    ModerationStatus, Post, PostListItem, Recipe, User, UserRole, Visibility, EXCERPT_LEN,
};
