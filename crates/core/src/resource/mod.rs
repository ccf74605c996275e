mod types;

pub use types::{Resource, ResourceStream};
