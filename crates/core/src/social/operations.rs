use super::error::SocialError;
use super::types::{Cookbook, Post, Recipe, User};

/// Maximum length of post content, in characters.
pub const MAX_POST_LEN: usize = 5_000;

/// Validates a post before creation or update.
pub fn validate_post(post: &Post) -> Result<(), SocialError> {
    if post.content.trim().is_empty() && post.image_urls.is_empty() {
        return Err(SocialError::EmptyPost);
    }
    if post.content.chars().count() > MAX_POST_LEN {
        return Err(SocialError::PostTooLong { max: MAX_POST_LEN });
    }
    Ok(())
}

/// Validates comment text.
pub fn validate_comment(content: &str) -> Result<(), SocialError> {
    if content.trim().is_empty() {
        return Err(SocialError::EmptyComment);
    }
    Ok(())
}

/// Validates a recipe before creation or update.
pub fn validate_recipe(recipe: &Recipe) -> Result<(), SocialError> {
    if recipe.title.trim().is_empty() {
        return Err(SocialError::EmptyRecipeTitle);
    }
    if recipe.servings == 0 {
        return Err(SocialError::NoServings);
    }
    Ok(())
}

/// Validates a cookbook before creation or update.
pub fn validate_cookbook(cookbook: &Cookbook) -> Result<(), SocialError> {
    if cookbook.title.trim().is_empty() {
        return Err(SocialError::EmptyCookbookTitle);
    }
    Ok(())
}

/// Validates a profile before creation or update.
pub fn validate_user(user: &User) -> Result<(), SocialError> {
    if user.display_name.trim().is_empty() {
        return Err(SocialError::EmptyDisplayName);
    }
    Ok(())
}

/// Validates a follow request.
pub fn validate_follow(actor_id: &str, target_id: &str) -> Result<(), SocialError> {
    if actor_id == target_id {
        return Err(SocialError::SelfFollow);
    }
    Ok(())
}

/// Normalizes a search query, rejecting blank input.
///
/// # Examples
///
/// ```
/// use recipebox_core::social::normalize_query;
///
/// assert_eq!(normalize_query("  Lemon Tart ").unwrap(), "lemon tart");
/// assert!(normalize_query("   ").is_err());
/// ```
pub fn normalize_query(query: &str) -> Result<String, SocialError> {
    let normalized = query.trim().to_lowercase();
    if normalized.is_empty() {
        return Err(SocialError::EmptySearchQuery);
    }
    Ok(normalized)
}

/// Returns true if a recipe matches a normalized query by title or tag.
pub fn recipe_matches(recipe: &Recipe, query: &str) -> bool {
    recipe.moderation.is_listed()
        && (recipe.title.to_lowercase().contains(query)
            || recipe.tags.iter().any(|t| t.to_lowercase().contains(query)))
}

/// Returns true if a user matches a normalized query by display name.
pub fn user_matches(user: &User, query: &str) -> bool {
    user.display_name.to_lowercase().contains(query)
}

/// Returns true if a post matches a normalized query by content.
pub fn post_matches(post: &Post, query: &str) -> bool {
    post.moderation.is_listed() && post.content.to_lowercase().contains(query)
}
