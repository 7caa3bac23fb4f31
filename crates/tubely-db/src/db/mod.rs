//! Video repository contract and implementations

mod error;
mod video;

pub use error::{RepositoryError, RepositoryResult};
pub use video::{InMemoryVideoRepository, VideoChange, VideoRepository};
