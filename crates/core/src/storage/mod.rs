mod error;
mod traits;
mod types;

pub use error::{failure_message, RepositoryError, Result};
pub use traits::{AuthProvider, BlobStore, DocumentStore};
pub use types::{Direction, Document, Filter, FilterOp, Query};
