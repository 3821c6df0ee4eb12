//! `POST /v1/callbacks/build-complete` (§6): the build worker re-entering
//! the control plane. Authenticated with a bearer token separate from user
//! credentials (§4.D "Callback acceptance").

use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::response::IntoResponse;
use axum::Json;
use build_orchestrator::BuildCompleteCallback;
use serde_json::json;

use crate::error::ApiError;
use crate::state::AppState;

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers.get(header::AUTHORIZATION)?.to_str().ok()?.strip_prefix("Bearer ")
}

pub async fn receive(State(state): State<AppState>, headers: HeaderMap, Json(callback): Json<BuildCompleteCallback>) -> Result<impl IntoResponse, ApiError> {
    let Some(expected) = &state.config.webhook.build_callback_token else {
        return Err(ApiError::new(core_types::ErrorCategory::Unavailable, "build callback not configured"));
    };
    if bearer_token(&headers) != Some(expected.as_str()) {
        return Err(ApiError::unauthorized("invalid or missing callback token"));
    }

    state.build_orchestrator.accept_callback(callback).await?;
    Ok(Json(json!({ "status": "accepted" })))
}
