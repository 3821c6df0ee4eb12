//! `GET /v1/user/tokens` (§6). Token issuance and the backing identity
//! provider are out of core scope (§1 Non-goals name cryptographic key
//! management; OIDC-provider integration lives behind `config::AuthConfig`
//! and is wired at the edge, not reimplemented here) — this endpoint
//! reports what `AuthMode` the control plane is running under so a caller
//! knows which flow to use to obtain one.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use config::AuthMode;
use serde_json::json;

use crate::state::AppState;

pub async fn list_tokens(State(state): State<AppState>) -> impl IntoResponse {
    let mode = match state.config.auth.mode {
        AuthMode::Local => "local",
        AuthMode::Oidc => "oidc",
    };
    Json(json!({ "tokens": [], "auth_mode": mode }))
}
