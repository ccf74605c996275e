use thiserror::Error;

/// Errors that can occur during local cache operations.
///
/// Repositories never surface these to callers: a failing cache read is
/// treated as a miss and a failing cache write is logged.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("Cache unavailable: {0}")]
    Unavailable(String),
    #[error("Cache operation failed: {0}")]
    OperationFailed(String),
    #[error("Invalid cache pattern: {0}")]
    InvalidPattern(String),
}

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_display() {
        let error = CacheError::Unavailable("store closed".to_string());
        assert_eq!(error.to_string(), "Cache unavailable: store closed");
    }

    #[test]
    fn test_operation_failed_display() {
        let error = CacheError::OperationFailed("lock poisoned".to_string());
        assert_eq!(error.to_string(), "Cache operation failed: lock poisoned");
    }

    #[test]
    fn test_invalid_pattern_display() {
        let error = CacheError::InvalidPattern(String::new());
        assert_eq!(error.to_string(), "Invalid cache pattern: ");
    }
}
