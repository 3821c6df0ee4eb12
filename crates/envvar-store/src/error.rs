use core_types::error::CategorizedError;
use core_types::{EntityId, ErrorCategory};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnvVarError {
    #[error("key does not match ^[A-Za-z_][A-Za-z0-9_]*$ or exceeds 255 chars: {0}")]
    InvalidKey(String),

    #[error("env-var {0} not found")]
    NotFound(EntityId),

    #[error("repository error: {0}")]
    Repository(#[from] repository::RepositoryError),
}

impl CategorizedError for EnvVarError {
    fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidKey(_) => ErrorCategory::Validation,
            Self::NotFound(_) => ErrorCategory::NotFound,
            Self::Repository(e) => e.category(),
        }
    }
}

pub type EnvVarResult<T> = Result<T, EnvVarError>;
