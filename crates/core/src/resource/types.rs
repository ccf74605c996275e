use std::pin::Pin;

use serde::{Deserialize, Serialize};
use tokio_stream::Stream;

/// Progress and outcome of a single repository operation.
///
/// A repository call yields these in a fixed order: `Loading` first (omitted
/// only by fire-and-forget tracking calls), then zero or more `Success`
/// values, and at most one terminal `Failure`. A `Failure` is never followed
/// by anything else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum Resource<T> {
    Loading,
    Success(T),
    Failure(String),
}

/// The asynchronous sequence returned by repository operations.
pub type ResourceStream<T> = Pin<Box<dyn Stream<Item = Resource<T>> + Send>>;

impl<T> Resource<T> {
    /// Creates a failure envelope from any displayable message.
    pub fn failure(message: impl Into<String>) -> Self {
        Resource::Failure(message.into())
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Resource::Loading)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Resource::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Resource::Failure(_))
    }

    /// Returns the carried value for `Success`.
    pub fn value(&self) -> Option<&T> {
        match self {
            Resource::Success(value) => Some(value),
            _ => None,
        }
    }

    /// Consumes the envelope and returns the carried value for `Success`.
    pub fn into_value(self) -> Option<T> {
        match self {
            Resource::Success(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the failure message for `Failure`.
    pub fn error(&self) -> Option<&str> {
        match self {
            Resource::Failure(message) => Some(message),
            _ => None,
        }
    }

    /// Maps the success value, keeping `Loading` and `Failure` as they are.
    pub fn map<U, F>(self, f: F) -> Resource<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Resource::Loading => Resource::Loading,
            Resource::Success(value) => Resource::Success(f(value)),
            Resource::Failure(message) => Resource::Failure(message),
        }
    }
}
