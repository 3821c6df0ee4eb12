use serde::{Deserialize, Serialize};

/// The error taxonomy from §7. Every per-module error enum implements
/// [`CategorizedError`] so the HTTP layer can derive a status code
/// mechanically instead of matching on concrete error types module by
/// module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCategory {
    /// Caller supplied malformed input. Maps to 400.
    Validation,
    /// Callers must distinguish this from internal errors. Maps to 404.
    NotFound,
    /// Unique-constraint violation (slug, env-var key). Maps to 409.
    Conflict,
    /// Missing or invalid credentials. Maps to 401.
    Unauthorized,
    /// Valid credentials, insufficient role. Maps to 403.
    Forbidden,
    /// Orchestrator/worker/forge timeouts, retried with backoff inside the
    /// core; surfaced only when retries are exhausted in request context.
    /// Maps to 503.
    TransientExternal,
    /// The endpoint is not usable at all (e.g. no webhook secret
    /// configured). Maps to 503.
    Unavailable,
    /// Programming error. Maps to 500, logged with full context.
    Internal,
}

impl ErrorCategory {
    #[must_use]
    pub fn http_status(self) -> u16 {
        match self {
            Self::Validation => 400,
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::TransientExternal | Self::Unavailable => 503,
            Self::Internal => 500,
        }
    }
}

/// Implemented by every per-component error enum so the API layer can map
/// any of them onto an HTTP response the same way.
pub trait CategorizedError {
    fn category(&self) -> ErrorCategory;
}
