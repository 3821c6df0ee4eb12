//! Environment-Variable Store endpoints (§4.envvars, S6): masked list/get,
//! create, update, and the distinct `reveal` operation.

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use core_types::EntityId;
use serde::Deserialize;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct EnvironmentScope {
    pub environment_id: Option<EntityId>,
}

/// Audit attribution (§4.envvars "actor from context"). Authentication
/// itself is out of scope (§1 Non-goals); callers that need per-user
/// identity attach it via this header ahead of whatever auth layer sits in
/// front of the control plane (§10.3 `AuthMode`).
fn actor(headers: &HeaderMap) -> String {
    headers
        .get("x-enclii-actor")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("anonymous")
        .to_string()
}

#[derive(Debug, Deserialize)]
pub struct CreateEnvVarRequest {
    pub environment_id: Option<EntityId>,
    pub key: String,
    pub value: String,
    #[serde(default)]
    pub secret: bool,
}

/// `POST /v1/services/{id}/env-vars`.
pub async fn create(State(state): State<AppState>, Path(service_id): Path<EntityId>, Json(req): Json<CreateEnvVarRequest>) -> Result<impl IntoResponse, ApiError> {
    let env_var = state.envvar_store.create(service_id, req.environment_id, req.key, req.value, req.secret).await?;
    Ok((axum::http::StatusCode::CREATED, Json(env_var)))
}

/// `GET /v1/services/{id}/env-vars` — masked list, optionally scoped to an
/// environment.
pub async fn list(State(state): State<AppState>, Path(service_id): Path<EntityId>, Query(scope): Query<EnvironmentScope>) -> Result<impl IntoResponse, ApiError> {
    let vars = state.envvar_store.list_masked(service_id, scope.environment_id).await?;
    Ok(Json(vars))
}

/// `GET /v1/services/{id}/env-vars/{env_var_id}` — masked single read (S6).
pub async fn get(State(state): State<AppState>, Path((_service_id, env_var_id)): Path<(EntityId, EntityId)>) -> Result<impl IntoResponse, ApiError> {
    let env_var = state.envvar_store.get_masked(env_var_id).await?;
    Ok(Json(env_var))
}

#[derive(Debug, Deserialize)]
pub struct UpdateEnvVarRequest {
    pub value: String,
}

/// `PUT /v1/services/{id}/env-vars/{env_var_id}` — writes a differential
/// hash audit entry (§4.envvars).
pub async fn update(State(state): State<AppState>, Path((_service_id, env_var_id)): Path<(EntityId, EntityId)>, headers: HeaderMap, Json(req): Json<UpdateEnvVarRequest>) -> Result<impl IntoResponse, ApiError> {
    let env_var = state.envvar_store.update_value(&actor(&headers), env_var_id, req.value).await?;
    Ok(Json(env_var))
}

/// `POST /v1/services/{id}/env-vars/{env_var_id}/reveal` (S6) — returns
/// plaintext, writes a `revealed` audit entry with no hash fields.
pub async fn reveal(State(state): State<AppState>, Path((_service_id, env_var_id)): Path<(EntityId, EntityId)>, headers: HeaderMap) -> Result<impl IntoResponse, ApiError> {
    let env_var = state.envvar_store.reveal(&actor(&headers), env_var_id).await?;
    Ok(Json(env_var))
}
