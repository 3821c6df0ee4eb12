//! Maps every domain error onto an HTTP response via the §7 taxonomy
//! (`ErrorCategory::http_status`), so this is the only place in the crate
//! that knows about status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use core_types::error::CategorizedError;
use core_types::ErrorCategory;
use serde_json::json;
use tracing::error;

#[derive(Debug)]
pub struct ApiError {
    category: ErrorCategory,
    message: String,
}

impl ApiError {
    #[must_use]
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self { category, message: message.into() }
    }

    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Validation, message)
    }

    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Unauthorized, message)
    }

    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::NotFound, message)
    }
}

impl<E> From<E> for ApiError
where
    E: CategorizedError + std::fmt::Display,
{
    fn from(e: E) -> Self {
        let category = e.category();
        let message = e.to_string();
        if matches!(category, ErrorCategory::Internal) {
            error!(error = %message, "internal error");
        }
        Self { category, message }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.category.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(json!({ "error": self.message }))).into_response()
    }
}
