use core_types::error::CategorizedError;
use core_types::ErrorCategory;
use thiserror::Error;

/// Webhook intake error (§4.C, §7). Parse errors are `Validation` (400);
/// an unconfigured shared secret is `Unavailable` (503), distinct from a
/// rejected signature (`Unauthorized`, 401).
#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("Webhook not configured")]
    NotConfigured,

    #[error("Missing signature")]
    MissingSignature,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    #[error("repository error: {0}")]
    Repository(#[from] repository::RepositoryError),

    #[error("build error: {0}")]
    Build(#[from] build_orchestrator::BuildError),

    #[error("preview error: {0}")]
    Preview(#[from] preview::PreviewError),
}

impl CategorizedError for IntakeError {
    fn category(&self) -> ErrorCategory {
        match self {
            Self::NotConfigured => ErrorCategory::Unavailable,
            Self::MissingSignature | Self::InvalidSignature => ErrorCategory::Unauthorized,
            Self::MalformedPayload(_) => ErrorCategory::Validation,
            Self::Repository(_) | Self::Build(_) | Self::Preview(_) => ErrorCategory::Internal,
        }
    }
}

pub type IntakeResult<T> = Result<T, IntakeError>;
