use crate::social::{EdgeKind, TargetKind};

/// Cache key for the admin dashboard aggregate.
pub const DASHBOARD_KEY: &str = "admin_dashboard";

/// Returns the cache key for a single post.
pub fn post_key(post_id: &str) -> String {
    format!("post:{}", post_id)
}

/// Returns the cache key for a single comment.
pub fn comment_key(comment_id: &str) -> String {
    format!("comment:{}", comment_id)
}

/// Returns the cache key for a single recipe.
pub fn recipe_key(recipe_id: &str) -> String {
    format!("recipe:{}", recipe_id)
}

/// Returns the cache key for a single cookbook.
pub fn cookbook_key(cookbook_id: &str) -> String {
    format!("cookbook:{}", cookbook_id)
}

/// Returns the cache key for a user profile.
pub fn user_key(user_id: &str) -> String {
    format!("user:{}", user_id)
}

/// Returns the cache key recording that an edge exists.
pub fn edge_key(
    kind: EdgeKind,
    target_kind: TargetKind,
    actor_id: &str,
    target_id: &str,
) -> String {
    format!("edge:{}:{}:{}:{}", kind, target_kind, actor_id, target_id)
}

/// Returns the pattern matching every cached edge of a kind pointing at a target.
pub fn edge_pattern(kind: EdgeKind, target_kind: TargetKind, target_id: &str) -> String {
    format!("edge:{}:{}:*:{}", kind, target_kind, target_id)
}

/// Returns the cache key for one page of a list query.
///
/// `scope` names the query and its fixed arguments (e.g. `"public"` or
/// `"user_posts_{user_id}"`). The first page has no cursor and is keyed as
/// `first`; later pages are never cached but still get a distinct key.
///
/// # Examples
///
/// ```
/// use recipebox_core::cache::list_key;
///
/// assert_eq!(list_key("public", 20, None), "public_20_first");
/// assert_eq!(list_key("public", 20, Some("post-9")), "public_20_post-9");
/// ```
pub fn list_key(scope: &str, limit: usize, cursor: Option<&str>) -> String {
    format!("{}_{}_{}", scope, limit, cursor.unwrap_or("first"))
}

/// Returns the pattern matching every cached page of a list query scope.
pub fn list_pattern(scope: &str) -> String {
    format!("{}_*", scope)
}

/// Returns the cache key for a search query.
///
/// The query is trimmed and lowercased so equivalent searches share an entry.
pub fn search_key(kind: &str, query: &str, limit: usize) -> String {
    format!(
        "search_{}_{}_{}",
        kind,
        query.trim().to_lowercase(),
        limit
    )
}
