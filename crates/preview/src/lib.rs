//! The Preview Environment Lifecycle (component F): a state machine tied to
//! PR identity, owning subdomain allocation, sleep/wake, forge comments, and
//! cleanup (§4.F).

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod forge;
pub mod sweeper;

pub use error::{PreviewError, PreviewResult};
pub use forge::ForgeClient;

use std::sync::Arc;
use std::time::Duration;

use audit::AuditSink;
use build_orchestrator::BuildOrchestrator;
use core_types::audit::AuditOutcome;
use core_types::{
    AuditEntry, Deployment, DeploymentStatus, EntityId, Environment, PreviewEnvironment,
    PreviewStatus,
};
use orchestrator_client::OrchestratorClient;
use reconciler::{Priority, ReconcilerQueue};
use repository::InMemoryRepositories;
use tracing::{info, warn};

/// Inputs carried by a `pull_request` webhook event (§4.C "Pull-request
/// handling"), already decoded by the webhook-intake layer.
#[derive(Debug, Clone)]
pub struct PullRequestEvent {
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

/// The Preview Environment Lifecycle. Stateless beyond its handles —
/// every transition is persisted through `repos.previews` immediately,
/// matching the reconciler's "database-authoritative desired state"
/// philosophy (§9).
pub struct PreviewLifecycle {
    repos: InMemoryRepositories,
    orchestrator: Arc<dyn OrchestratorClient>,
    build_orchestrator: Arc<BuildOrchestrator>,
    reconciler_queue: Arc<ReconcilerQueue>,
    forge: Arc<dyn ForgeClient>,
    audit: AuditSink,
    preview_domain_suffix: String,
    default_auto_sleep_minutes: u32,
    convergence_timeout: Duration,
}

impl PreviewLifecycle {
    #[must_use]
    pub fn new(
        repos: InMemoryRepositories,
        orchestrator: Arc<dyn OrchestratorClient>,
        build_orchestrator: Arc<BuildOrchestrator>,
        reconciler_queue: Arc<ReconcilerQueue>,
        forge: Arc<dyn ForgeClient>,
        audit: AuditSink,
        preview_domain_suffix: impl Into<String>,
        default_auto_sleep_minutes: u32,
    ) -> Self {
        Self {
            repos,
            orchestrator,
            build_orchestrator,
            reconciler_queue,
            forge,
            audit,
            preview_domain_suffix: preview_domain_suffix.into(),
            default_auto_sleep_minutes,
            convergence_timeout: Duration::from_secs(120),
        }
    }

    /// `opened` | `reopened` (§4.F). Creates a fresh preview, or resurrects
    /// a closed one for the same (service, PR-number) so the PR's preview
    /// history lives under one record id.
    pub async fn open(self: &Arc<Self>, event: PullRequestEvent) -> PreviewResult<PreviewEnvironment> {
        let service = self
            .repos
            .services
            .get_by_id(event.service_id)
            .await?
            .ok_or(PreviewError::ServiceNotFound(event.service_id))?;

        let existing = self
            .repos
            .previews
            .get_any_by_service_and_pr(event.service_id, event.pr_number)
            .await?;

        let preview = if let Some(mut preview) = existing {
            preview.status = PreviewStatus::Pending;
            preview.pr_title = event.pr_title.clone();
            preview.pr_url = event.pr_url.clone();
            preview.pr_author = event.pr_author.clone();
            preview.head_branch = event.head_branch.clone();
            preview.base_branch = event.base_branch.clone();
            preview.head_commit = event.head_commit.clone();
            preview.last_accessed = chrono::Utc::now();
            self.repos.previews.update(preview.clone()).await?;
            preview
        } else {
            let subdomain = PreviewEnvironment::subdomain_for(event.pr_number, &service.slug());
            let preview = PreviewEnvironment {
                id: EntityId::new(),
                project_id: event.project_id,
                service_id: event.service_id,
                pr_number: event.pr_number,
                pr_title: event.pr_title.clone(),
                pr_url: event.pr_url.clone(),
                pr_author: event.pr_author.clone(),
                head_branch: event.head_branch.clone(),
                base_branch: event.base_branch.clone(),
                head_commit: event.head_commit.clone(),
                public_url: format!("https://{subdomain}.{}", self.preview_domain_suffix),
                subdomain,
                status: PreviewStatus::Pending,
                auto_sleep_after_minutes: self.default_auto_sleep_minutes,
                last_accessed: chrono::Utc::now(),
                environment_id: None,
                deployment_id: None,
                forge_comment_id: None,
            };
            self.repos.previews.create(preview).await?
        };

        self.audit.record(AuditEntry::new(
            "preview-lifecycle",
            "preview_opened",
            "preview",
            preview.id.to_string(),
            format!("pr #{}", preview.pr_number),
            AuditOutcome::Success,
        ));

        let lifecycle = Arc::clone(self);
        let preview_id = preview.id;
        let head_branch = preview.head_branch.clone();
        let head_commit = preview.head_commit.clone();
        tokio::spawn(async move {
            lifecycle.run_build_and_deploy(preview_id, head_branch, head_commit).await;
        });

        Ok(preview)
    }

    /// `synchronize` (§4.F): update head commit and rebuild. No-op (beyond
    /// the commit update) if the preview was already closed — a
    /// `synchronize` after `closed` is followed by a separate `reopened`.
    pub async fn synchronize(self: &Arc<Self>, event: PullRequestEvent) -> PreviewResult<PreviewEnvironment> {
        let mut preview = self
            .repos
            .previews
            .get_open_by_service_and_pr(event.service_id, event.pr_number)
            .await?
            .ok_or(PreviewError::NotFound(event.service_id))?;

        preview.head_commit = event.head_commit.clone();
        preview.pr_title = event.pr_title.clone();
        self.repos.previews.update(preview.clone()).await?;

        let lifecycle = Arc::clone(self);
        let preview_id = preview.id;
        let head_branch = preview.head_branch.clone();
        let head_commit = preview.head_commit.clone();
        tokio::spawn(async move {
            lifecycle.run_build_and_deploy(preview_id, head_branch, head_commit).await;
        });

        Ok(preview)
    }

    /// `closed` (§4.F "active|sleeping→closed"): scale replicas to zero and
    /// enqueue cleanup; the record itself is retained (§3 invariant).
    pub async fn close(self: &Arc<Self>, service_id: EntityId, pr_number: u64) -> PreviewResult<PreviewEnvironment> {
        let mut preview = self
            .repos
            .previews
            .get_open_by_service_and_pr(service_id, pr_number)
            .await?
            .ok_or(PreviewError::NotFound(service_id))?;

        preview.status = PreviewStatus::Closed;
        self.repos.previews.update(preview.clone()).await?;

        self.audit.record(AuditEntry::new(
            "preview-lifecycle",
            "preview_closed",
            "preview",
            preview.id.to_string(),
            format!("pr #{pr_number}"),
            AuditOutcome::Success,
        ));

        let lifecycle = Arc::clone(self);
        let preview_id = preview.id;
        tokio::spawn(async move {
            lifecycle.cleanup(preview_id).await;
        });

        Ok(preview)
    }

    /// §4.F "Cleanup": delete workload and ingress in the preview
    /// namespace, then delete the namespace itself. Failures are logged
    /// and non-fatal; cleanup is idempotent.
    async fn cleanup(&self, preview_id: EntityId) {
        let Ok(Some(preview)) = self.repos.previews.get_by_id(preview_id).await else {
            return;
        };
        let namespace = preview.namespace();
        if let Err(e) = self.orchestrator.scale(&namespace, &preview.subdomain, 0).await {
            warn!(preview_id = %preview_id, error = %e, "cleanup: scale-to-zero failed (non-fatal)");
        }
        if let Err(e) = self.orchestrator.delete_workload(&namespace, &preview.subdomain).await {
            warn!(preview_id = %preview_id, error = %e, "cleanup: workload deletion failed (non-fatal)");
        }
        if let Err(e) = self.orchestrator.delete_namespace(&namespace).await {
            warn!(preview_id = %preview_id, error = %e, "cleanup: namespace deletion failed (non-fatal)");
        }
        info!(preview_id = %preview_id, %namespace, "preview cleanup complete");
    }

    /// §4.F "active→sleeping": no access recorded for
    /// `auto-sleep-after` minutes; replica count scaled to zero. Invoked by
    /// the background sweep, not the request path.
    pub async fn sleep(&self, preview_id: EntityId) -> PreviewResult<()> {
        let mut preview = self
            .repos
            .previews
            .get_by_id(preview_id)
            .await?
            .ok_or(PreviewError::NotFound(preview_id))?;
        if preview.status != PreviewStatus::Active {
            return Ok(());
        }
        let namespace = preview.namespace();
        self.orchestrator.scale(&namespace, &preview.subdomain, 0).await?;
        preview.status = PreviewStatus::Sleeping;
        self.repos.previews.update(preview.clone()).await?;
        self.audit.record(AuditEntry::new(
            "preview-lifecycle",
            "preview_slept",
            "preview",
            preview.id.to_string(),
            preview.subdomain.clone(),
            AuditOutcome::Success,
        ));
        Ok(())
    }

    /// Explicit wake (§6 `POST /v1/previews/{id}/wake`, §4.F
    /// "sleeping→active"). Reverts to `sleeping` and surfaces an error if
    /// the scale-up fails (S4).
    pub async fn wake(&self, preview_id: EntityId) -> PreviewResult<PreviewEnvironment> {
        let mut preview = self
            .repos
            .previews
            .get_by_id(preview_id)
            .await?
            .ok_or(PreviewError::NotFound(preview_id))?;

        if preview.status != PreviewStatus::Sleeping {
            return Err(PreviewError::NotSleeping);
        }

        let namespace = preview.namespace();
        match self.orchestrator.scale(&namespace, &preview.subdomain, 1).await {
            Ok(()) => {
                preview.status = PreviewStatus::Active;
                preview.last_accessed = chrono::Utc::now();
                self.repos.previews.update(preview.clone()).await?;
                self.audit.record(AuditEntry::new(
                    "preview-lifecycle",
                    "preview_woken",
                    "preview",
                    preview.id.to_string(),
                    preview.subdomain.clone(),
                    AuditOutcome::Success,
                ));
                Ok(preview)
            }
            Err(e) => {
                warn!(preview_id = %preview_id, error = %e, "wake: scale-up failed, reverting to sleeping");
                Err(PreviewError::WakeFailed)
            }
        }
    }

    /// §4.F "Access tracking": updates `last_accessed`. Callers invoke this
    /// without awaiting it on the response path (§5 "Asynchronous access
    /// logging must not block the response path") — the repository write
    /// itself is fire-and-forget from the caller's perspective because this
    /// method is typically spawned, not because it blocks internally.
    pub async fn record_access(&self, preview_id: EntityId) -> PreviewResult<()> {
        let Some(mut preview) = self.repos.previews.get_by_id(preview_id).await? else {
            return Ok(());
        };
        preview.last_accessed = chrono::Utc::now();
        self.repos.previews.update(preview).await?;
        Ok(())
    }

    async fn set_status(&self, preview_id: EntityId, status: PreviewStatus) {
        let Ok(Some(mut preview)) = self.repos.previews.get_by_id(preview_id).await else {
            return;
        };
        preview.status = status;
        if let Err(e) = self.repos.previews.update(preview).await {
            warn!(preview_id = %preview_id, error = %e, "failed to persist preview status transition");
        }
    }

    async fn fail(&self, preview_id: EntityId, reason: String) {
        self.set_status(preview_id, PreviewStatus::Failed).await;
        self.audit.record(AuditEntry::new(
            "preview-lifecycle",
            "preview_failed",
            "preview",
            preview_id.to_string(),
            reason,
            AuditOutcome::Failure,
        ));
    }

    /// Drives `pending→building→deploying→active|failed` (§4.F). Spawned as
    /// a background task by `open`/`synchronize` so the webhook response
    /// isn't held open for the full build+deploy pipeline.
    async fn run_build_and_deploy(self: Arc<Self>, preview_id: EntityId, branch: String, commit_sha: String) {
        let Ok(Some(preview)) = self.repos.previews.get_by_id(preview_id).await else {
            return;
        };

        self.set_status(preview_id, PreviewStatus::Building).await;

        let triggered = self
            .build_orchestrator
            .trigger_preview_build(preview.service_id, &commit_sha, &branch)
            .await;
        let release_id = match triggered {
            Ok(release) => release.id,
            Err(e) => {
                self.fail(preview_id, format!("build dispatch failed: {e}")).await;
                return;
            }
        };

        let Ok(Some(release)) = self.repos.releases.get_by_id(release_id).await else {
            self.fail(preview_id, "release disappeared after build".to_string()).await;
            return;
        };
        if release.status != core_types::ReleaseStatus::Ready {
            self.fail(
                preview_id,
                release.error_message.clone().unwrap_or_else(|| "build failed".to_string()),
            )
            .await;
            return;
        }
        if release.image_uri.is_none() {
            self.fail(preview_id, "release ready without image uri".to_string()).await;
            return;
        }

        self.set_status(preview_id, PreviewStatus::Deploying).await;

        let environment = match self.ensure_preview_environment(&preview).await {
            Ok(env) => env,
            Err(e) => {
                self.fail(preview_id, format!("namespace provisioning failed: {e}")).await;
                return;
            }
        };

        // §4.F "Isolation": env-vars inherited from the parent service are
        // augmented with PREVIEW_URL and IS_PREVIEW — scoped to this
        // preview's own environment row so the reconciler's existing
        // system/user env-var union (§4.E step 3) picks them up without
        // any preview-specific branch in the reconciliation algorithm.
        if let Err(e) = self.seed_preview_env_vars(preview.service_id, environment.id, &preview.public_url).await {
            warn!(preview_id = %preview_id, error = %e, "failed to seed preview env-vars (non-fatal)");
        }

        let deployment = match self
            .repos
            .deployments
            .create(Deployment::new(preview.service_id, release_id, environment.id, 1))
            .await
        {
            Ok(d) => d,
            Err(e) => {
                self.fail(preview_id, format!("deployment creation failed: {e}")).await;
                return;
            }
        };

        if let Ok(Some(mut preview)) = self.repos.previews.get_by_id(preview_id).await {
            preview.environment_id = Some(environment.id);
            preview.deployment_id = Some(deployment.id);
            let _ = self.repos.previews.update(preview).await;
        }

        if let Err(e) = self.reconciler_queue.enqueue(deployment.id, Priority::UserAction) {
            warn!(preview_id = %preview_id, error = %e, "failed to enqueue preview reconciliation");
        }

        match self.wait_for_convergence(deployment.id).await {
            ConvergenceOutcome::Healthy => {
                self.set_status(preview_id, PreviewStatus::Active).await;
                self.audit.record(AuditEntry::new(
                    "preview-lifecycle",
                    "preview_active",
                    "preview",
                    preview_id.to_string(),
                    preview.subdomain.clone(),
                    AuditOutcome::Success,
                ));
                self.post_or_update_comment(preview_id).await;
            }
            ConvergenceOutcome::Failed(reason) => {
                self.fail(preview_id, reason).await;
            }
            ConvergenceOutcome::TimedOut => {
                self.fail(preview_id, "timed out waiting for reconciliation to converge".to_string()).await;
            }
        }
    }

    async fn ensure_preview_environment(&self, preview: &PreviewEnvironment) -> PreviewResult<Environment> {
        let name = format!("preview-{}", preview.subdomain);
        if let Some(env) = self
            .repos
            .environments
            .get_by_project_and_name(preview.project_id, &name)
            .await?
        {
            return Ok(env);
        }
        let env = Environment {
            id: EntityId::new(),
            project_id: preview.project_id,
            name,
            namespace: preview.namespace(),
        };
        self.orchestrator.ensure_namespace(&env.namespace, &[("enclii.app/preview", "true")]).await?;
        Ok(self.repos.environments.create(env).await?)
    }

    /// Idempotent: `synchronize` re-runs this on every rebuild, so an
    /// already-present key is updated in place rather than re-created
    /// (which would trip the repository's unique-key conflict).
    async fn seed_preview_env_vars(&self, service_id: EntityId, environment_id: EntityId, public_url: &str) -> PreviewResult<()> {
        let existing = self.repos.env_vars.list_for_service(service_id, Some(environment_id)).await?;
        for (key, value) in [("PREVIEW_URL", public_url.to_string()), ("IS_PREVIEW", "true".to_string())] {
            let value_hash = audit::hash::hash_value(&value);
            if let Some(found) = existing.iter().find(|v| v.key == key) {
                self.repos.env_vars.update_value(found.id, &value, &value_hash).await?;
                continue;
            }
            let var = core_types::EnvVar {
                id: EntityId::new(),
                service_id,
                environment_id: Some(environment_id),
                key: key.to_string(),
                value_hash,
                value,
                secret: false,
            };
            self.repos.env_vars.create(var).await?;
        }
        Ok(())
    }

    async fn wait_for_convergence(&self, deployment_id: EntityId) -> ConvergenceOutcome {
        let deadline = tokio::time::Instant::now() + self.convergence_timeout;
        loop {
            if tokio::time::Instant::now() >= deadline {
                return ConvergenceOutcome::TimedOut;
            }
            match self.repos.deployments.get_by_id(deployment_id).await {
                Ok(Some(deployment)) => match deployment.status {
                    DeploymentStatus::Running => return ConvergenceOutcome::Healthy,
                    DeploymentStatus::Failed => {
                        return ConvergenceOutcome::Failed(
                            deployment.error_message.unwrap_or_else(|| "reconciliation failed".to_string()),
                        )
                    }
                    DeploymentStatus::Pending => {}
                },
                Ok(None) => return ConvergenceOutcome::Failed("deployment disappeared".to_string()),
                Err(e) => return ConvergenceOutcome::Failed(e.to_string()),
            }
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
    }

    /// §4.F "Forge comment": posts once on reaching `active`; later
    /// transitions through this same path update the comment in place via
    /// the embedded marker rather than spamming the PR.
    async fn post_or_update_comment(&self, preview_id: EntityId) {
        let Ok(Some(preview)) = self.repos.previews.get_by_id(preview_id).await else {
            return;
        };
        let body = forge::render_comment(&preview.public_url, &preview.head_branch, &preview.head_commit, preview.auto_sleep_after_minutes);
        match self.forge.upsert_comment(&preview.pr_url, &body).await {
            Ok(comment_id) => {
                if let Ok(Some(mut preview)) = self.repos.previews.get_by_id(preview_id).await {
                    preview.forge_comment_id = Some(comment_id);
                    let _ = self.repos.previews.update(preview).await;
                }
            }
            Err(e) => warn!(preview_id = %preview_id, error = %e, "failed to post preview comment (non-fatal)"),
        }
    }
}

enum ConvergenceOutcome {
    Healthy,
    Failed(String),
    TimedOut,
}

#[cfg(test)]
mod tests {
    use super::*;
    use build_orchestrator::{BuildMode, builder::FakeBuilder};
    use core_types::service::{AutoDeployConfig, BuildConfig, HealthSnapshot};
    use core_types::{Project, Service};
    use orchestrator_client::fake::FakeOrchestratorClient;

    async fn seeded() -> (Arc<PreviewLifecycle>, core_types::Service, core_types::Project) {
        let repos = InMemoryRepositories::new();
        let project = repos.projects.create(Project::new("acme", "Acme")).await.unwrap();
        let service = repos
            .services
            .create(Service {
                id: EntityId::new(),
                project_id: project.id,
                name: "api".to_string(),
                repository_url: "https://github.com/acme/platform.git".to_string(),
                app_path: None,
                watch_paths: vec![],
                build_config: BuildConfig::Dockerfile {
                    dockerfile_path: "Dockerfile".to_string(),
                },
                auto_deploy: AutoDeployConfig::default(),
                health: HealthSnapshot::default(),
            })
            .await
            .unwrap();

        let orchestrator: Arc<dyn OrchestratorClient> = Arc::new(FakeOrchestratorClient::new());
        let audit = AuditSink::spawn(repos.audit.clone());
        let reconciler_ctx = reconciler::ReconcilerContext::new(repos.clone(), Arc::clone(&orchestrator), audit.clone());
        let reconciler = reconciler::Reconciler::start(
            reconciler_ctx,
            100,
            2,
            Duration::from_secs(3600),
            Duration::from_secs(5),
            Duration::from_secs(300),
        );
        let queue = Arc::clone(&reconciler.queue);
        std::mem::forget(reconciler);

        let build_orchestrator = Arc::new(BuildOrchestrator::new(
            repos.clone(),
            Arc::clone(&queue),
            audit.clone(),
            BuildMode::InProcess(Arc::new(FakeBuilder::new())),
            2,
            "reg",
            Duration::from_secs(5),
        ));

        let forge: Arc<dyn ForgeClient> = Arc::new(forge::FakeForgeClient::default());
        let lifecycle = Arc::new(PreviewLifecycle::new(
            repos,
            orchestrator,
            build_orchestrator,
            queue,
            forge,
            audit,
            "preview.enclii.app",
            30,
        ));
        (lifecycle, service, project)
    }

    fn pr_event(service_id: EntityId, project_id: EntityId, pr_number: u64, commit: &str) -> PullRequestEvent {
        PullRequestEvent {
            service_id,
            project_id,
            pr_number,
            pr_title: "Add feature x".to_string(),
            pr_url: "https://github.com/acme/platform/pull/42".to_string(),
            pr_author: "octocat".to_string(),
            head_branch: "feature/x".to_string(),
            base_branch: "main".to_string(),
            head_commit: commit.to_string(),
        }
    }

    #[tokio::test]
    async fn open_creates_preview_with_derived_subdomain() {
        let (lifecycle, service, project) = seeded().await;
        let preview = lifecycle.open(pr_event(service.id, project.id, 42, "c0ffee7abc")).await.unwrap();
        assert_eq!(preview.subdomain, "pr-42-api");
        assert_eq!(preview.public_url, "https://pr-42-api.preview.enclii.app");
        assert_eq!(preview.status, PreviewStatus::Pending);
    }

    #[tokio::test]
    async fn open_then_build_and_deploy_converges_to_active() {
        let (lifecycle, service, project) = seeded().await;
        let preview = lifecycle.open(pr_event(service.id, project.id, 42, "c0ffee7abc")).await.unwrap();

        let mut converged = false;
        for _ in 0..50 {
            tokio::time::sleep(Duration::from_millis(20)).await;
            let updated = lifecycle.repos.previews.get_by_id(preview.id).await.unwrap().unwrap();
            if updated.status == PreviewStatus::Active {
                converged = true;
                break;
            }
        }
        assert!(converged, "preview did not converge to active in time");
    }

    #[tokio::test]
    async fn second_open_preview_for_same_pr_is_rejected_by_the_repository() {
        let (lifecycle, service, project) = seeded().await;
        lifecycle.open(pr_event(service.id, project.id, 42, "c0ffee7abc")).await.unwrap();
        let err = lifecycle
            .repos
            .previews
            .create(PreviewEnvironment {
                id: EntityId::new(),
                project_id: project.id,
                service_id: service.id,
                pr_number: 42,
                pr_title: "dup".into(),
                pr_url: "u".into(),
                pr_author: "a".into(),
                head_branch: "b".into(),
                base_branch: "main".into(),
                head_commit: "deadbeef".into(),
                subdomain: "pr-42-api".into(),
                public_url: String::new(),
                status: PreviewStatus::Pending,
                auto_sleep_after_minutes: 30,
                last_accessed: chrono::Utc::now(),
                environment_id: None,
                deployment_id: None,
                forge_comment_id: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, repository::RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn close_transitions_to_closed_and_allows_reopen() {
        let (lifecycle, service, project) = seeded().await;
        lifecycle.open(pr_event(service.id, project.id, 7, "aaaaaaa")).await.unwrap();
        let closed = lifecycle.close(service.id, 7).await.unwrap();
        assert_eq!(closed.status, PreviewStatus::Closed);

        let reopened = lifecycle.open(pr_event(service.id, project.id, 7, "bbbbbbb")).await.unwrap();
        assert_eq!(reopened.id, closed.id);
        assert_eq!(reopened.status, PreviewStatus::Pending);
    }

    #[tokio::test]
    async fn wake_on_non_sleeping_preview_is_rejected() {
        let (lifecycle, service, project) = seeded().await;
        let preview = lifecycle.open(pr_event(service.id, project.id, 9, "ccccccc")).await.unwrap();
        let err = lifecycle.wake(preview.id).await.unwrap_err();
        assert!(matches!(err, PreviewError::NotSleeping));
    }
}
