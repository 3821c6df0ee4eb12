use core_types::error::CategorizedError;
use core_types::ErrorCategory;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("reconciler queue is full")]
    QueueFull,

    #[error("deployment not found: {0}")]
    DeploymentNotFound(core_types::EntityId),

    #[error("repository error: {0}")]
    Repository(#[from] repository::RepositoryError),

    #[error("orchestrator error: {0}")]
    Orchestrator(#[from] orchestrator_client::OrchestratorError),
}

impl CategorizedError for ReconcileError {
    fn category(&self) -> ErrorCategory {
        match self {
            Self::QueueFull => ErrorCategory::TransientExternal,
            Self::DeploymentNotFound(_) => ErrorCategory::NotFound,
            Self::Repository(_) => ErrorCategory::Internal,
            Self::Orchestrator(e) if e.is_retryable() => ErrorCategory::TransientExternal,
            Self::Orchestrator(_) => ErrorCategory::Validation,
        }
    }
}

pub type ReconcileResult<T> = Result<T, ReconcileError>;
