//! `POST /v1/projects/{slug}/services`, `.../services/bulk`, manual build
//! trigger, and unified pipeline status (§6).

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use core_types::service::{AutoDeployConfig, BuildConfig, HealthSnapshot};
use core_types::{EntityId, Service};
use serde::Deserialize;
use serde_json::json;

use crate::error::ApiError;
use crate::state::AppState;

const MAX_BULK_SERVICES: usize = 20;

#[derive(Debug, Deserialize)]
pub struct CreateServiceRequest {
    pub name: String,
    pub repository_url: String,
    #[serde(default)]
    pub app_path: Option<String>,
    #[serde(default)]
    pub watch_paths: Vec<String>,
    pub build_config: BuildConfig,
    #[serde(default)]
    pub auto_deploy: AutoDeployConfig,
}

impl CreateServiceRequest {
    fn into_service(self, project_id: EntityId) -> Service {
        Service {
            id: EntityId::new(),
            project_id,
            name: self.name,
            repository_url: self.repository_url,
            app_path: self.app_path,
            watch_paths: self.watch_paths,
            build_config: self.build_config,
            auto_deploy: self.auto_deploy,
            health: HealthSnapshot::default(),
        }
    }
}

async fn resolve_project(state: &AppState, slug: &str) -> Result<core_types::Project, ApiError> {
    state
        .repos
        .projects
        .get_by_slug(slug)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("project not found: {slug}")))
}

/// `POST /v1/projects/{slug}/services`.
pub async fn create(State(state): State<AppState>, Path(slug): Path<String>, Json(req): Json<CreateServiceRequest>) -> Result<impl IntoResponse, ApiError> {
    let project = resolve_project(&state, &slug).await?;
    let service = state.repos.services.create(req.into_service(project.id)).await?;
    Ok((axum::http::StatusCode::CREATED, Json(service)))
}

/// `POST /v1/projects/{slug}/services/bulk` — monorepo bulk import, capped
/// at 20 (§6). Returns 207 when any individual service fails to create so
/// the caller can distinguish full success from partial.
pub async fn bulk_create(State(state): State<AppState>, Path(slug): Path<String>, Json(requests): Json<Vec<CreateServiceRequest>>) -> Result<impl IntoResponse, ApiError> {
    if requests.len() > MAX_BULK_SERVICES {
        return Err(ApiError::validation(format!("bulk import accepts at most {MAX_BULK_SERVICES} services, got {}", requests.len())));
    }
    let project = resolve_project(&state, &slug).await?;

    let mut created = Vec::with_capacity(requests.len());
    let mut errors = Vec::new();
    for req in requests {
        let name = req.name.clone();
        match state.repos.services.create(req.into_service(project.id)).await {
            Ok(service) => created.push(service),
            Err(e) => errors.push(json!({ "name": name, "error": e.to_string() })),
        }
    }

    let status = if errors.is_empty() { axum::http::StatusCode::CREATED } else { axum::http::StatusCode::from_u16(207).unwrap() };
    Ok((status, Json(json!({ "created": created, "errors": errors }))))
}

#[derive(Debug, Deserialize)]
pub struct TriggerBuildRequest {
    pub commit_sha: String,
    #[serde(default = "default_branch")]
    pub branch: String,
}

fn default_branch() -> String {
    "main".to_string()
}

/// `POST /v1/services/{id}/build` — manual build trigger (§6).
pub async fn trigger_build(State(state): State<AppState>, Path(service_id): Path<EntityId>, Json(req): Json<TriggerBuildRequest>) -> Result<impl IntoResponse, ApiError> {
    let release = state.build_orchestrator.trigger_build(service_id, &req.commit_sha, &req.branch).await?;
    Ok((axum::http::StatusCode::CREATED, Json(release)))
}

/// `GET /v1/services/{id}/builds/{commit}/status` — unified pipeline
/// status (§6). Reports the release record for this (service, commit);
/// deployment rollout status is queried separately per environment since
/// releases don't carry a back-reference to the deployments built from
/// them.
pub async fn build_status(State(state): State<AppState>, Path((service_id, commit)): Path<(EntityId, String)>) -> Result<impl IntoResponse, ApiError> {
    let release = state
        .repos
        .releases
        .get_latest_by_service_and_commit(service_id, &commit)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("no release for service {service_id} at commit {commit}")))?;
    Ok(Json(release))
}
