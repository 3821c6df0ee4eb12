use core_types::error::CategorizedError;
use core_types::{EntityId, ErrorCategory};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UsageError {
    #[error("service {0} not found")]
    ServiceNotFound(EntityId),

    #[error("environment {0} not found")]
    EnvironmentNotFound(EntityId),

    #[error("repository error: {0}")]
    Repository(#[from] repository::RepositoryError),
}

impl CategorizedError for UsageError {
    fn category(&self) -> ErrorCategory {
        match self {
            Self::ServiceNotFound(_) | Self::EnvironmentNotFound(_) => ErrorCategory::NotFound,
            Self::Repository(e) => e.category(),
        }
    }
}

pub type UsageResult<T> = Result<T, UsageError>;
