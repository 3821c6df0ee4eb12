//! The Deployment Reconciler (component E): a priority queue + worker pool
//! driving desired state toward observed state in the orchestrator (§4.E).

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod algorithm;
pub mod context;
pub mod error;
pub mod queue;
pub mod sweeper;
pub mod worker;

pub use algorithm::reconcile_deployment;
pub use context::ReconcilerContext;
pub use error::{ReconcileError, ReconcileResult};
pub use queue::{Priority, ReconcilerQueue};

use std::sync::Arc;
use std::time::Duration;

/// A running reconciler: the queue handle callers enqueue onto, plus the
/// background worker and sweeper tasks (kept so a caller can abort them on
/// shutdown — dropping the handle leaves the tasks running, matching
/// `tokio::spawn`'s fire-and-forget default).
pub struct Reconciler {
    pub queue: Arc<ReconcilerQueue>,
    worker_handles: Vec<tokio::task::JoinHandle<()>>,
    sweeper_handle: tokio::task::JoinHandle<()>,
}

impl Reconciler {
    #[must_use]
    pub fn start(
        ctx: ReconcilerContext,
        queue_capacity: usize,
        worker_count: usize,
        sweep_interval: Duration,
        initial_backoff: Duration,
        max_backoff: Duration,
    ) -> Self {
        let queue = Arc::new(ReconcilerQueue::new(queue_capacity));
        let worker_handles = worker::spawn_workers(worker_count, Arc::clone(&queue), ctx.clone(), initial_backoff, max_backoff);
        let sweeper_handle = sweeper::spawn_sweeper(sweep_interval, Arc::clone(&queue), ctx);
        Self {
            queue,
            worker_handles,
            sweeper_handle,
        }
    }

    pub fn shutdown(self) {
        for handle in self.worker_handles {
            handle.abort();
        }
        self.sweeper_handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use audit::AuditSink;
    use core_types::service::{AutoDeployConfig, BuildConfig, HealthSnapshot};
    use core_types::{Deployment, Environment, Project, Release, Service};
    use orchestrator_client::fake::FakeOrchestratorClient;
    use repository::InMemoryRepositories;

    async fn seeded_context() -> (ReconcilerContext, core_types::Deployment) {
        let repos = InMemoryRepositories::new();
        let orchestrator: Arc<dyn orchestrator_client::OrchestratorClient> = Arc::new(FakeOrchestratorClient::new());
        let audit = AuditSink::spawn(repos.audit.clone());
        let ctx = ReconcilerContext::new(repos.clone(), orchestrator, audit);

        let project = repos.projects.create(Project::new("acme", "Acme")).await.unwrap();
        let environment = repos
            .environments
            .create(Environment {
                id: core_types::EntityId::new(),
                project_id: project.id,
                name: "production".to_string(),
                namespace: Environment::derive_namespace("production"),
            })
            .await
            .unwrap();
        let service = repos
            .services
            .create(Service {
                id: core_types::EntityId::new(),
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
        let mut release = Release::new_building(service.id, "abcdef1234567890", "1");
        release.status = core_types::ReleaseStatus::Ready;
        release.image_uri = Some("reg/api:abcdef1".to_string());
        let release = repos.releases.create(release).await.unwrap();
        let deployment = repos
            .deployments
            .create(Deployment::new(service.id, release.id, environment.id, 1))
            .await
            .unwrap();

        (ctx, deployment)
    }

    #[tokio::test]
    async fn reconcile_converges_to_running_when_orchestrator_is_healthy() {
        let (ctx, deployment) = seeded_context().await;
        reconcile_deployment(&ctx, deployment.id).await.unwrap();

        let updated = ctx.repos.deployments.get_by_id(deployment.id).await.unwrap().unwrap();
        assert_eq!(updated.status, core_types::DeploymentStatus::Running);
        assert_eq!(updated.observed_health, core_types::HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn reconcile_leaves_pending_release_alone() {
        let repos = InMemoryRepositories::new();
        let orchestrator: Arc<dyn orchestrator_client::OrchestratorClient> = Arc::new(FakeOrchestratorClient::new());
        let audit = AuditSink::spawn(repos.audit.clone());
        let ctx = ReconcilerContext::new(repos.clone(), orchestrator, audit);

        let project = repos.projects.create(Project::new("acme", "Acme")).await.unwrap();
        let environment = repos
            .environments
            .create(Environment {
                id: core_types::EntityId::new(),
                project_id: project.id,
                name: "production".to_string(),
                namespace: Environment::derive_namespace("production"),
            })
            .await
            .unwrap();
        let service = repos
            .services
            .create(Service {
                id: core_types::EntityId::new(),
                project_id: project.id,
                name: "api".to_string(),
                repository_url: "u".to_string(),
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
        let release = repos
            .releases
            .create(Release::new_building(service.id, "abcdef1234567890", "1"))
            .await
            .unwrap();
        let deployment = repos
            .deployments
            .create(Deployment::new(service.id, release.id, environment.id, 1))
            .await
            .unwrap();

        reconcile_deployment(&ctx, deployment.id).await.unwrap();

        let updated = ctx.repos.deployments.get_by_id(deployment.id).await.unwrap().unwrap();
        assert_eq!(updated.status, core_types::DeploymentStatus::Pending);
    }
}
