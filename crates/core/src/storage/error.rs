use thiserror::Error;

/// Errors that can occur while talking to the remote store or validating
/// caller input before any I/O.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },
    #[error("{entity_type} already exists: {id}")]
    AlreadyExists {
        entity_type: &'static str,
        id: String,
    },
    /// Network or backend failure. The message is passed through verbatim.
    #[error("{0}")]
    Transport(String),
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    /// Caller-supplied input rejected before any I/O.
    #[error("{0}")]
    Validation(String),
    /// One step of a multi-step write completed and a later one failed.
    #[error("{completed} succeeded but {failed}")]
    PartialFailure { completed: String, failed: String },
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl RepositoryError {
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        RepositoryError::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RepositoryError::NotFound { .. })
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::Serialization(err.to_string())
    }
}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;

/// Returns the human-readable message carried by a `Failure` envelope.
///
/// The error's own message is used when it has one; `fallback` is used for
/// errors that arrive without any text.
///
/// # Examples
///
/// ```
/// use recipebox_core::storage::{failure_message, RepositoryError};
///
/// let err = RepositoryError::Transport("deadline exceeded".to_string());
/// assert_eq!(failure_message(&err, "Failed to like post"), "deadline exceeded");
///
/// let err = RepositoryError::Transport(String::new());
/// assert_eq!(failure_message(&err, "Failed to like post"), "Failed to like post");
/// ```
pub fn failure_message(error: &RepositoryError, fallback: &str) -> String {
    let message = error.to_string();
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}
