use tubely_core::AppError;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Video not found: {0}")]
    NotFound(Uuid),

    #[error("Registry backend error: {0}")]
    Backend(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(_) => AppError::NotFound("Video not found".to_string()),
            RepositoryError::Backend(msg) => AppError::Persistence(msg),
        }
    }
}
