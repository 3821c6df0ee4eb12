use core_types::error::CategorizedError;
use core_types::{EntityId, ErrorCategory};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LogStreamError {
    #[error("origin not allowed")]
    OriginNotAllowed,

    #[error("service {0} not found")]
    ServiceNotFound(EntityId),

    #[error("environment {0} not found")]
    EnvironmentNotFound(EntityId),

    #[error("repository error: {0}")]
    Repository(#[from] repository::RepositoryError),

    #[error("orchestrator error: {0}")]
    Orchestrator(#[from] orchestrator_client::OrchestratorError),
}

impl CategorizedError for LogStreamError {
    fn category(&self) -> ErrorCategory {
        match self {
            Self::OriginNotAllowed => ErrorCategory::Forbidden,
            Self::ServiceNotFound(_) | Self::EnvironmentNotFound(_) => ErrorCategory::NotFound,
            Self::Repository(e) => e.category(),
            Self::Orchestrator(_) => ErrorCategory::TransientExternal,
        }
    }
}

pub type LogStreamResult<T> = Result<T, LogStreamError>;
