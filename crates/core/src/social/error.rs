use thiserror::Error;

/// Validation errors for user-supplied social content.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SocialError {
    #[error("Post content cannot be empty")]
    EmptyPost,
    #[error("Post content too long (max {max} characters)")]
    PostTooLong { max: usize },
    #[error("Comment cannot be empty")]
    EmptyComment,
    #[error("Recipe title cannot be empty")]
    EmptyRecipeTitle,
    #[error("Recipe must serve at least one person")]
    NoServings,
    #[error("Cookbook title cannot be empty")]
    EmptyCookbookTitle,
    #[error("Search query cannot be empty")]
    EmptySearchQuery,
    #[error("Users cannot follow themselves")]
    SelfFollow,
    #[error("Display name cannot be empty")]
    EmptyDisplayName,
    #[error("Not signed in")]
    NotSignedIn,
    #[error("Administrator role required")]
    AdminRequired,
}

impl From<SocialError> for crate::storage::RepositoryError {
    fn from(err: SocialError) -> Self {
        crate::storage::RepositoryError::Validation(err.to_string())
    }
}
