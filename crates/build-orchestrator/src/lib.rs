//! The Build Orchestrator (component D): owns the build semaphore, creates
//! releases, executes or dispatches builds, and accepts completion
//! callbacks (§4.D).

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod builder;
pub mod callback;
pub mod dispatch;
pub mod error;

pub use builder::{BuildOutcome, BuildRequest, Builder};
pub use callback::BuildCompleteCallback;
pub use dispatch::{BuildDispatcher, BuildJob};
pub use error::{BuildError, BuildResult};

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use core_types::audit::AuditOutcome;
use core_types::{AuditEntry, Deployment, EntityId, Environment, Release, ReleaseStatus};
use reconciler::{Priority, ReconcilerQueue};
use repository::InMemoryRepositories;
use tracing::{info, warn};
use uuid::Uuid;

/// Build execution mode (§4.D "Two modes"). The semaphore is held for the
/// full in-process build; in dispatched mode it only guards the dispatch
/// call itself.
pub enum BuildMode {
    InProcess(Arc<dyn Builder>),
    Dispatched(Arc<dyn BuildDispatcher>),
}

pub struct BuildOrchestrator {
    repos: InMemoryRepositories,
    reconciler_queue: Arc<ReconcilerQueue>,
    audit: audit::AuditSink,
    semaphore: Arc<tokio::sync::Semaphore>,
    mode: BuildMode,
    registry_url: String,
    build_deadline: Duration,
    /// Releases triggered with `auto_deploy = false` (preview builds): the
    /// dispatched-mode callback path consults this since the decision is
    /// made at trigger time but applied later, possibly out of process.
    no_auto_deploy: Mutex<HashSet<EntityId>>,
}

impl BuildOrchestrator {
    #[must_use]
    pub fn new(
        repos: InMemoryRepositories,
        reconciler_queue: Arc<ReconcilerQueue>,
        audit: audit::AuditSink,
        mode: BuildMode,
        semaphore_capacity: usize,
        registry_url: impl Into<String>,
        build_deadline: Duration,
    ) -> Self {
        Self {
            repos,
            reconciler_queue,
            audit,
            semaphore: Arc::new(tokio::sync::Semaphore::new(semaphore_capacity)),
            mode,
            registry_url: registry_url.into(),
            build_deadline,
            no_auto_deploy: Mutex::new(HashSet::new()),
        }
    }

    /// Entry point for §4.C step 6 and manual build triggers (§6 `POST
    /// /v1/services/{id}/build`). Creates the release row immediately so
    /// concurrent requests for the same (service, commit) resolve by
    /// "latest wins" rather than contending on one row (§5 "Ordering").
    pub async fn trigger_build(&self, service_id: EntityId, commit_sha: &str, branch: &str) -> BuildResult<Release> {
        self.trigger_build_inner(service_id, commit_sha, branch, true).await
    }

    /// Same build path, but skips the auto-deploy rule: preview builds are
    /// deployed into a PR-scoped namespace by the preview lifecycle itself,
    /// never into the service's configured auto-deploy environment.
    pub async fn trigger_preview_build(&self, service_id: EntityId, commit_sha: &str, branch: &str) -> BuildResult<Release> {
        self.trigger_build_inner(service_id, commit_sha, branch, false).await
    }

    async fn trigger_build_inner(&self, service_id: EntityId, commit_sha: &str, branch: &str, auto_deploy: bool) -> BuildResult<Release> {
        let service = self
            .repos
            .services
            .get_by_id(service_id)
            .await?
            .ok_or(BuildError::ServiceNotFound(service_id))?;

        let version = commit_sha.chars().take(7).collect::<String>();
        let release = self
            .repos
            .releases
            .create(Release::new_building(service_id, commit_sha, version))
            .await?;

        if !auto_deploy {
            self.no_auto_deploy.lock().unwrap().insert(release.id);
        }

        match &self.mode {
            BuildMode::InProcess(builder) => {
                self.run_in_process(Arc::clone(builder), &service, release.clone(), branch, auto_deploy).await;
            }
            BuildMode::Dispatched(dispatcher) => {
                self.dispatch_build(Arc::clone(dispatcher), &service, release.clone(), branch, auto_deploy).await;
            }
        }

        Ok(release)
    }

    async fn run_in_process(&self, builder: Arc<dyn Builder>, service: &core_types::Service, release: Release, branch: &str, auto_deploy: bool) {
        let permit = tokio::time::timeout(self.build_deadline, self.semaphore.acquire()).await;
        let Ok(Ok(_permit)) = permit else {
            warn!(release_id = %release.id, "timed out waiting for build semaphore");
            let _ = self
                .repos
                .releases
                .update_status(release.id, ReleaseStatus::Failed, Some("timeout waiting for build semaphore".to_string()))
                .await;
            return;
        };

        let request = BuildRequest {
            service_id: service.id,
            release_id: release.id,
            commit_sha: release.commit_sha.clone(),
            branch: branch.to_string(),
            registry_url: self.registry_url.clone(),
        };

        let outcome = tokio::time::timeout(self.build_deadline, builder.build(&request)).await;
        match outcome {
            Ok(Ok(outcome)) => {
                self.finish_success(service, &release, outcome, auto_deploy).await;
            }
            Ok(Err(reason)) => {
                self.finish_failure(&release, reason).await;
            }
            Err(_) => {
                self.finish_failure(&release, "build deadline exceeded".to_string()).await;
            }
        }
    }

    async fn dispatch_build(&self, dispatcher: Arc<dyn BuildDispatcher>, service: &core_types::Service, release: Release, branch: &str, _auto_deploy: bool) {
        let Ok(_permit) = tokio::time::timeout(self.build_deadline, self.semaphore.acquire()).await else {
            warn!(release_id = %release.id, "timed out waiting for dispatch slot");
            let _ = self
                .repos
                .releases
                .update_status(release.id, ReleaseStatus::Failed, Some("timeout waiting for dispatch slot".to_string()))
                .await;
            return;
        };

        let job = BuildJob {
            job_id: Uuid::new_v4().to_string(),
            release_id: release.id,
            service_id: service.id,
            commit_sha: release.commit_sha.clone(),
            branch: branch.to_string(),
        };
        if let Err(reason) = dispatcher.dispatch(job).await {
            self.finish_failure(&release, format!("dispatch failed: {reason}")).await;
        }
        // Semaphore guards dispatch rate only in this mode (§4.D); the
        // permit is dropped here and the release stays `building` until
        // the completion callback arrives.
    }

    /// Idempotent on release-id (§4.D "Callbacks are idempotent on
    /// release-id: re-applying a terminal state is a no-op returning 200").
    pub async fn accept_callback(&self, callback: BuildCompleteCallback) -> BuildResult<()> {
        let release = self
            .repos
            .releases
            .get_by_id(callback.release_id)
            .await?
            .ok_or(BuildError::ReleaseNotFound(callback.release_id))?;

        if release.status != ReleaseStatus::Building {
            info!(release_id = %release.id, status = ?release.status, "callback for already-terminal release, ignoring");
            return Ok(());
        }

        let service = self
            .repos
            .services
            .get_by_id(release.service_id)
            .await?
            .ok_or(BuildError::ServiceNotFound(release.service_id))?;

        if callback.success {
            let outcome = BuildOutcome {
                image_uri: callback.image_uri.unwrap_or_default(),
                sbom: callback.sbom,
                sbom_format: callback.sbom_format,
                image_signature: callback.image_signature,
            };
            let auto_deploy = !self.no_auto_deploy.lock().unwrap().remove(&release.id);
            self.finish_success(&service, &release, outcome, auto_deploy).await;
        } else {
            self.finish_failure(&release, callback.error_message.unwrap_or_else(|| "build failed".to_string())).await;
        }
        Ok(())
    }

    /// §4.D "State updates on success": image ref -> SBOM (non-fatal) ->
    /// signature (non-fatal) -> status ready -> auto-deploy.
    async fn finish_success(&self, service: &core_types::Service, release: &Release, outcome: BuildOutcome, auto_deploy: bool) {
        self.no_auto_deploy.lock().unwrap().remove(&release.id);
        if let Err(e) = self.repos.releases.update_image_uri(release.id, &outcome.image_uri).await {
            warn!(release_id = %release.id, error = %e, "failed to persist image uri");
        }
        if let Some(sbom) = &outcome.sbom {
            if let Err(e) = self
                .repos
                .releases
                .update_sbom(release.id, sbom, outcome.sbom_format.as_deref().unwrap_or("unknown"))
                .await
            {
                warn!(release_id = %release.id, error = %e, "failed to persist sbom (non-fatal)");
            }
        }
        if let Some(signature) = &outcome.image_signature {
            if let Err(e) = self.repos.releases.update_signature(release.id, signature).await {
                warn!(release_id = %release.id, error = %e, "failed to persist signature (non-fatal)");
            }
        }
        if let Err(e) = self.repos.releases.update_status(release.id, ReleaseStatus::Ready, None).await {
            warn!(release_id = %release.id, error = %e, "failed to mark release ready");
            return;
        }

        self.audit.record(AuditEntry::new(
            "build-orchestrator",
            "build_succeeded",
            "release",
            release.id.to_string(),
            service.name.clone(),
            AuditOutcome::Success,
        ));

        if auto_deploy {
            if let Err(e) = self.maybe_auto_deploy(service, release.id).await {
                warn!(release_id = %release.id, error = %e, "auto-deploy failed");
            }
        }
    }

    /// §4.D "State updates on failure".
    async fn finish_failure(&self, release: &Release, reason: String) {
        if let Err(e) = self
            .repos
            .releases
            .update_status(release.id, ReleaseStatus::Failed, Some(reason.clone()))
            .await
        {
            warn!(release_id = %release.id, error = %e, "failed to mark release failed");
        }
        self.audit.record(AuditEntry::new(
            "build-orchestrator",
            "build_failed",
            "release",
            release.id.to_string(),
            reason,
            AuditOutcome::Failure,
        ));
    }

    /// §4.D "Auto-deploy rule".
    async fn maybe_auto_deploy(&self, service: &core_types::Service, release_id: EntityId) -> BuildResult<()> {
        if !service.auto_deploy.enabled {
            return Ok(());
        }
        let Some(env_name) = &service.auto_deploy.target_environment else {
            return Ok(());
        };

        let environment = match self.repos.environments.get_by_project_and_name(service.project_id, env_name).await? {
            Some(env) => env,
            None => {
                let env = Environment {
                    id: EntityId::new(),
                    project_id: service.project_id,
                    name: env_name.clone(),
                    namespace: Environment::derive_namespace(env_name),
                };
                self.repos.environments.create(env).await?
            }
        };

        let deployment = self
            .repos
            .deployments
            .create(Deployment::new(service.id, release_id, environment.id, 1))
            .await?;

        self.reconciler_queue.enqueue(deployment.id, Priority::UserAction)?;
        info!(deployment_id = %deployment.id, environment = %environment.name, "auto-deploy scheduled");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use builder::FakeBuilder;
    use core_types::service::{AutoDeployConfig, BuildConfig, HealthSnapshot};
    use core_types::{Project, Service};
    use orchestrator_client::fake::FakeOrchestratorClient;

    async fn seeded(auto_deploy: bool) -> (BuildOrchestrator, core_types::Service) {
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
                auto_deploy: AutoDeployConfig {
                    enabled: auto_deploy,
                    target_environment: Some("production".to_string()),
                    branch_override: None,
                },
                health: HealthSnapshot::default(),
            })
            .await
            .unwrap();

        let orchestrator: Arc<dyn orchestrator_client::OrchestratorClient> = Arc::new(FakeOrchestratorClient::new());
        let audit = audit::AuditSink::spawn(repos.audit.clone());
        let reconciler_ctx = reconciler::ReconcilerContext::new(repos.clone(), orchestrator, audit.clone());
        let reconciler = reconciler::Reconciler::start(
            reconciler_ctx,
            100,
            1,
            Duration::from_secs(3600),
            Duration::from_secs(5),
            Duration::from_secs(300),
        );

        let orchestrator = BuildOrchestrator::new(
            repos,
            Arc::clone(&reconciler.queue),
            audit,
            BuildMode::InProcess(Arc::new(FakeBuilder::new())),
            2,
            "reg",
            Duration::from_secs(5),
        );
        std::mem::forget(reconciler);
        (orchestrator, service)
    }

    #[tokio::test]
    async fn successful_build_marks_release_ready() {
        let (orchestrator, service) = seeded(false).await;
        let release = orchestrator.trigger_build(service.id, "abcdef1234567890", "main").await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        let updated = orchestrator.repos.releases.get_by_id(release.id).await.unwrap().unwrap();
        assert_eq!(updated.status, ReleaseStatus::Ready);
        assert!(updated.image_uri.is_some());
    }

    #[tokio::test]
    async fn auto_deploy_creates_deployment_when_enabled() {
        let (orchestrator, service) = seeded(true).await;
        let release = orchestrator.trigger_build(service.id, "abcdef1234567890", "main").await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        let env = orchestrator
            .repos
            .environments
            .get_by_project_and_name(service.project_id, "production")
            .await
            .unwrap()
            .expect("environment auto-created");
        let deployment = orchestrator
            .repos
            .deployments
            .get_latest_for_service_environment(service.id, env.id)
            .await
            .unwrap()
            .expect("deployment created");
        assert_eq!(deployment.release_id, release.id);
    }

    #[tokio::test]
    async fn callback_is_idempotent_on_terminal_release() {
        let (orchestrator, service) = seeded(false).await;
        let release = orchestrator.repos.releases.create(Release::new_building(service.id, "abcdef1234567890", "1")).await.unwrap();
        orchestrator
            .repos
            .releases
            .update_status(release.id, ReleaseStatus::Ready, None)
            .await
            .unwrap();

        orchestrator
            .accept_callback(BuildCompleteCallback {
                job_id: "job-1".to_string(),
                release_id: release.id,
                success: false,
                image_uri: None,
                image_digest: None,
                image_size_mb: None,
                sbom: None,
                sbom_format: None,
                image_signature: None,
                duration_secs: None,
                error_message: Some("late failure".to_string()),
                logs_url: None,
            })
            .await
            .unwrap();

        let unchanged = orchestrator.repos.releases.get_by_id(release.id).await.unwrap().unwrap();
        assert_eq!(unchanged.status, ReleaseStatus::Ready);
    }
}
