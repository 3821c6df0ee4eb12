use core_types::ErrorCategory;
use core_types::error::CategorizedError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("workload or namespace not found: {0}")]
    NotFound(String),

    #[error("invalid workload spec: {0}")]
    InvalidSpec(String),

    #[error("resource quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("transient orchestrator error: {0}")]
    Transient(String),
}

impl CategorizedError for OrchestratorError {
    fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound(_) => ErrorCategory::NotFound,
            Self::InvalidSpec(_) | Self::QuotaExceeded(_) => ErrorCategory::Validation,
            Self::Transient(_) => ErrorCategory::TransientExternal,
        }
    }
}

impl OrchestratorError {
    /// §4.E "Retry & backoff": irrecoverable errors (invalid spec, quota)
    /// must not be retried automatically; everything else is transient.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

pub type OrchestratorResult<T> = Result<T, OrchestratorError>;
