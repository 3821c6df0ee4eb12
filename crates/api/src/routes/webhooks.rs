//! `POST /v1/webhooks/github` (§6). Thin decode/dispatch layer over
//! `webhook_intake::WebhookIntake`.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use webhook_intake::IntakeOutcome;

use crate::error::ApiError;
use crate::state::AppState;

pub async fn receive(State(state): State<AppState>, headers: HeaderMap, body: axum::body::Bytes) -> Result<impl IntoResponse, ApiError> {
    let event_type = headers.get("X-GitHub-Event").and_then(|v| v.to_str().ok()).unwrap_or("").to_string();
    let signature = headers.get("X-Hub-Signature-256").and_then(|v| v.to_str().ok()).map(ToString::to_string);

    let outcome = state.webhook_intake.handle_event(&event_type, signature.as_deref(), &body).await;
    match outcome {
        Ok(IntakeOutcome::Push(push)) => Ok(Json(json!({
            "status": "accepted",
            "triggered_count": push.triggered_count(),
            "skipped_count": push.skipped_count(),
            "services": push.services.iter().map(|s| json!({
                "service_name": s.service_name,
                "triggered": s.triggered,
                "skip_reason": s.skip_reason,
            })).collect::<Vec<_>>(),
        }))),
        Ok(IntakeOutcome::PullRequest) => Ok(Json(json!({ "status": "accepted" }))),
        Ok(IntakeOutcome::PullRequestIgnored | IntakeOutcome::UnknownEvent) => Ok(Json(json!({ "status": "ignored" }))),
        Ok(IntakeOutcome::WorkflowRun) => Ok(Json(json!({ "status": "accepted" }))),
        Err(e) => Err(ApiError::from(e)),
    }
}
