use core_types::ErrorCategory;
use thiserror::Error;

/// Repository contract error (§4.A). Reads return a distinguished not-found
/// result separate from errors — callers use `Option<T>` for that, this enum
/// is reserved for genuine failures.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("unique constraint violated: {0}")]
    Conflict(String),

    #[error("table not migrated: {0}")]
    NotMigrated(String),

    #[error("backing store error: {0}")]
    Backend(String),
}

impl core_types::error::CategorizedError for RepositoryError {
    fn category(&self) -> ErrorCategory {
        match self {
            Self::Conflict(_) => ErrorCategory::Conflict,
            // §6 "Persisted state layout": table-not-found for preview
            // tables is graceful degradation, not a caller-visible error;
            // repositories translate it to empty results before this enum
            // is ever constructed for that case. Any other NotMigrated use
            // is an internal misconfiguration.
            Self::NotMigrated(_) | Self::Backend(_) => ErrorCategory::Internal,
        }
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;
