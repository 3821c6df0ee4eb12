//! `POST /v1/previews` and `POST /v1/previews/{id}/wake` (§6): the explicit
//! entry points into the Preview Environment Lifecycle that don't originate
//! from a forge webhook.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use core_types::EntityId;
use preview::PullRequestEvent;
use serde::Deserialize;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreatePreviewRequest {
    pub service_id: EntityId,
    pub project_id: EntityId,
    pub pr_number: u64,
    pub pr_title: String,
    pub pr_url: String,
    pub pr_author: String,
    pub head_branch: String,
    pub base_branch: String,
    pub head_commit: String,
}

impl From<CreatePreviewRequest> for PullRequestEvent {
    fn from(req: CreatePreviewRequest) -> Self {
        Self {
            service_id: req.service_id,
            project_id: req.project_id,
            pr_number: req.pr_number,
            pr_title: req.pr_title,
            pr_url: req.pr_url,
            pr_author: req.pr_author,
            head_branch: req.head_branch,
            base_branch: req.base_branch,
            head_commit: req.head_commit,
        }
    }
}

/// `POST /v1/previews` (§6 "Create preview") — the same `opened`/`reopened`
/// path the `pull_request` webhook drives, exposed for callers that don't
/// go through the forge (manual preview creation, internal tooling).
pub async fn create(State(state): State<AppState>, Json(req): Json<CreatePreviewRequest>) -> Result<impl IntoResponse, ApiError> {
    let preview = state.preview_lifecycle.open(req.into()).await?;
    Ok((axum::http::StatusCode::CREATED, Json(preview)))
}

/// `POST /v1/previews/{id}/wake` (§6, S4) — 200 on success, 500 if the
/// scale-up fails and the preview reverts to `sleeping`.
pub async fn wake(State(state): State<AppState>, Path(preview_id): Path<EntityId>) -> Result<impl IntoResponse, ApiError> {
    let preview = state.preview_lifecycle.wake(preview_id).await?;
    Ok(Json(preview))
}
