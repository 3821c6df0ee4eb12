use core_types::error::CategorizedError;
use core_types::ErrorCategory;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("service not found: {0}")]
    ServiceNotFound(core_types::EntityId),

    #[error("release not found: {0}")]
    ReleaseNotFound(core_types::EntityId),

    #[error("build timed out waiting for the build semaphore")]
    SemaphoreTimeout,

    #[error("build failed: {0}")]
    BuildFailed(String),

    #[error("repository error: {0}")]
    Repository(#[from] repository::RepositoryError),

    #[error("orchestrator error: {0}")]
    Orchestrator(#[from] orchestrator_client::OrchestratorError),

    #[error("reconcile error: {0}")]
    Reconcile(#[from] reconciler::ReconcileError),

    #[error("dispatch error: {0}")]
    Dispatch(String),
}

impl CategorizedError for BuildError {
    fn category(&self) -> ErrorCategory {
        match self {
            Self::ServiceNotFound(_) | Self::ReleaseNotFound(_) => ErrorCategory::NotFound,
            Self::SemaphoreTimeout | Self::BuildFailed(_) | Self::Dispatch(_) => ErrorCategory::TransientExternal,
            Self::Repository(_) | Self::Orchestrator(_) | Self::Reconcile(_) => ErrorCategory::Internal,
        }
    }
}

pub type BuildResult<T> = Result<T, BuildError>;
