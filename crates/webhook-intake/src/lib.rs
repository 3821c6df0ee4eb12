//! The Webhook Intake component (§4.C): verifies the forge signature,
//! dispatches on event type, and fans push/pull-request/workflow-run
//! payloads out to the build orchestrator, preview lifecycle and CI-run
//! repository respectively.

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod pull_request;
pub mod push;
pub mod signature;
pub mod watchpath;
pub mod workflow_run;

pub use error::{IntakeError, IntakeResult};

use std::sync::Arc;

use build_orchestrator::BuildOrchestrator;
use core_types::audit::AuditOutcome;
use core_types::AuditEntry;
use preview::PreviewLifecycle;
use repository::InMemoryRepositories;
use tracing::{info, warn};

use pull_request::{PullRequestAction, PullRequestPayload};
use push::PushEvent;
use workflow_run::WorkflowRunPayload;

/// One matched-or-skipped service from a push event, surfaced so callers
/// (and the S1 scenario) can distinguish `triggered` from `skipped`.
#[derive(Debug, Clone)]
pub struct PushServiceResult {
    pub service_name: String,
    pub triggered: bool,
    pub skip_reason: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct PushOutcome {
    pub services: Vec<PushServiceResult>,
}

impl PushOutcome {
    #[must_use]
    pub fn triggered_count(&self) -> usize {
        self.services.iter().filter(|s| s.triggered).count()
    }

    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.services.iter().filter(|s| !s.triggered).count()
    }
}

/// Outcome of a single dispatched webhook event, used to pick the HTTP
/// response shape at the API layer.
pub enum IntakeOutcome {
    Push(PushOutcome),
    PullRequest,
    PullRequestIgnored,
    WorkflowRun,
    /// Event type not in the three handled kinds; accepted but ignored.
    UnknownEvent,
}

pub struct WebhookIntake {
    repos: InMemoryRepositories,
    build_orchestrator: Arc<BuildOrchestrator>,
    preview_lifecycle: Arc<PreviewLifecycle>,
    audit: audit::AuditSink,
    shared_secret: Option<String>,
}

impl WebhookIntake {
    #[must_use]
    pub fn new(
        repos: InMemoryRepositories,
        build_orchestrator: Arc<BuildOrchestrator>,
        preview_lifecycle: Arc<PreviewLifecycle>,
        audit: audit::AuditSink,
        shared_secret: Option<String>,
    ) -> Self {
        Self { repos, build_orchestrator, preview_lifecycle, audit, shared_secret }
    }

    /// Entry point for `POST /v1/webhooks/forge` (§6). `event_type` is the
    /// forge's event-type header (e.g. `X-GitHub-Event`).
    pub async fn handle_event(&self, event_type: &str, signature_header: Option<&str>, body: &[u8]) -> IntakeResult<IntakeOutcome> {
        let secret = self.shared_secret.as_deref().ok_or(IntakeError::NotConfigured)?;
        signature::verify(signature_header, body, secret)?;

        match event_type {
            "push" => Ok(IntakeOutcome::Push(self.handle_push(body).await?)),
            "pull_request" => self.handle_pull_request(body).await,
            "workflow_run" => {
                self.handle_workflow_run(body).await?;
                Ok(IntakeOutcome::WorkflowRun)
            }
            "ping" => {
                info!("ping event received, no work to dispatch");
                Ok(IntakeOutcome::UnknownEvent)
            }
            other => {
                info!(event_type = other, "ignoring unhandled webhook event type");
                Ok(IntakeOutcome::UnknownEvent)
            }
        }
    }

    async fn handle_push(&self, body: &[u8]) -> IntakeResult<PushOutcome> {
        let event: PushEvent = serde_json::from_slice(body).map_err(|e| IntakeError::MalformedPayload(e.to_string()))?;

        if !event.is_default_branch() {
            return Ok(PushOutcome::default());
        }
        if event.after.len() < 7 {
            return Err(IntakeError::MalformedPayload("commit sha shorter than 7 characters".to_string()));
        }

        let services = self.repos.services.list_by_repository_url(&event.repository.clone_url).await?;
        let changed_files = event.changed_files();
        let branch = event.branch().to_string();

        let mut results = Vec::with_capacity(services.len());
        for service in services {
            let service_id = service.id;
            let service_name = service.name;
            if watchpath::matches_any(&service.watch_paths, &changed_files) {
                let orchestrator = Arc::clone(&self.build_orchestrator);
                let commit_sha = event.after.clone();
                let branch = branch.clone();
                tokio::spawn(async move {
                    if let Err(e) = orchestrator.trigger_build(service_id, &commit_sha, &branch).await {
                        warn!(service_id = %service_id, error = %e, "push-triggered build failed to start");
                    }
                });
                results.push(PushServiceResult { service_name, triggered: true, skip_reason: None });
            } else {
                results.push(PushServiceResult {
                    service_name,
                    triggered: false,
                    skip_reason: Some("No files changed in watched paths".to_string()),
                });
            }
        }

        Ok(PushOutcome { services: results })
    }

    async fn handle_pull_request(&self, body: &[u8]) -> IntakeResult<IntakeOutcome> {
        let payload: PullRequestPayload = serde_json::from_slice(body).map_err(|e| IntakeError::MalformedPayload(e.to_string()))?;
        let action = payload.classify();
        if matches!(action, PullRequestAction::Ignored) {
            return Ok(IntakeOutcome::PullRequestIgnored);
        }

        let services = self.repos.services.list_by_repository_url(&payload.repository.clone_url).await?;
        if services.is_empty() {
            return Ok(IntakeOutcome::PullRequestIgnored);
        }

        for service in services {
            let event = payload.to_event(service.id, service.project_id);
            let outcome = match action {
                PullRequestAction::Open => self.preview_lifecycle.open(event).await.map(|_| ()),
                PullRequestAction::Synchronize => self.preview_lifecycle.synchronize(event).await.map(|_| ()),
                PullRequestAction::Close => self.preview_lifecycle.close(event.service_id, event.pr_number).await.map(|_| ()),
                PullRequestAction::Ignored => unreachable!("filtered above"),
            };
            if let Err(e) = outcome {
                warn!(service_id = %service.id, pr_number = payload.number, error = %e, "pull-request event handling failed");
                self.audit.record(AuditEntry::new(
                    "webhook-intake",
                    "pull_request_handling_failed",
                    "service",
                    service.id.to_string(),
                    "webhook",
                    AuditOutcome::Failure,
                ));
            }
        }

        Ok(IntakeOutcome::PullRequest)
    }

    async fn handle_workflow_run(&self, body: &[u8]) -> IntakeResult<()> {
        let payload: WorkflowRunPayload = serde_json::from_slice(body).map_err(|e| IntakeError::MalformedPayload(e.to_string()))?;
        let services = self.repos.services.list_by_repository_url(&payload.repository.clone_url).await?;
        for service in services {
            let run = payload.to_ci_run(service.id);
            self.repos.ci_runs.upsert_by_run_id(run).await?;
        }
        Ok(())
    }
}
