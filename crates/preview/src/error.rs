use core_types::error::CategorizedError;
use core_types::ErrorCategory;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("preview not found: {0}")]
    NotFound(core_types::EntityId),

    #[error("service not found: {0}")]
    ServiceNotFound(core_types::EntityId),

    #[error("preview is not sleeping, cannot wake")]
    NotSleeping,

    #[error("wake failed: scale-up rejected, preview reverted to sleeping")]
    WakeFailed,

    #[error("repository error: {0}")]
    Repository(#[from] repository::RepositoryError),

    #[error("orchestrator error: {0}")]
    Orchestrator(#[from] orchestrator_client::OrchestratorError),

    #[error("reconcile error: {0}")]
    Reconcile(#[from] reconciler::ReconcileError),

    #[error("build error: {0}")]
    Build(#[from] build_orchestrator::BuildError),
}

impl CategorizedError for PreviewError {
    fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound(_) | Self::ServiceNotFound(_) => ErrorCategory::NotFound,
            Self::NotSleeping => ErrorCategory::Validation,
            // S4: a failed wake surfaces as 500, not 503 — the scale-up
            // failure already reverted the preview to `sleeping`, so this
            // is reported as an operation failure rather than a
            // retry-and-backoff signal to the caller.
            Self::WakeFailed => ErrorCategory::Internal,
            Self::Repository(_) | Self::Reconcile(_) | Self::Build(_) => ErrorCategory::Internal,
            Self::Orchestrator(e) => e.category(),
        }
    }
}

pub type PreviewResult<T> = Result<T, PreviewError>;
