//! In-memory implementations of every repository contract, backed by
//! `Arc<RwLock<HashMap/Vec>>`, mirroring the teacher's `CostTracker`
//! (`Arc<RwLock<Vec<TrackedCall>>>`) and `GitHubTokenManager`
//! (`Mutex<HashMap<String, TokenInfo>>`) idioms.

mod audit;
mod ci_run;
mod deployment;
mod envvar;
mod environment;
mod preview;
mod project;
mod release;
mod service;

pub use audit::InMemoryAuditRepository;
pub use ci_run::InMemoryCiRunRepository;
pub use deployment::InMemoryDeploymentRepository;
pub use envvar::InMemoryEnvVarRepository;
pub use environment::InMemoryEnvironmentRepository;
pub use preview::InMemoryPreviewRepository;
pub use project::InMemoryProjectRepository;
pub use release::InMemoryReleaseRepository;
pub use service::InMemoryServiceRepository;

use std::sync::Arc;

use crate::contracts::{
    AuditRepository, CiRunRepository, DeploymentRepository, EnvVarRepository,
    EnvironmentRepository, PreviewRepository, ProjectRepository, ReleaseRepository,
    ServiceRepository,
};

/// A bundle of every in-memory repository, wired up as trait objects for
/// drop-in use by `AppState` in tests and local development.
#[derive(Clone)]
pub struct InMemoryRepositories {
    pub projects: Arc<dyn ProjectRepository>,
    pub services: Arc<dyn ServiceRepository>,
    pub environments: Arc<dyn EnvironmentRepository>,
    pub releases: Arc<dyn ReleaseRepository>,
    pub deployments: Arc<dyn DeploymentRepository>,
    pub previews: Arc<dyn PreviewRepository>,
    pub ci_runs: Arc<dyn CiRunRepository>,
    pub env_vars: Arc<dyn EnvVarRepository>,
    pub audit: Arc<dyn AuditRepository>,
}

impl InMemoryRepositories {
    #[must_use]
    pub fn new() -> Self {
        Self {
            projects: Arc::new(InMemoryProjectRepository::default()),
            services: Arc::new(InMemoryServiceRepository::default()),
            environments: Arc::new(InMemoryEnvironmentRepository::default()),
            releases: Arc::new(InMemoryReleaseRepository::default()),
            deployments: Arc::new(InMemoryDeploymentRepository::default()),
            previews: Arc::new(InMemoryPreviewRepository::default()),
            ci_runs: Arc::new(InMemoryCiRunRepository::default()),
            env_vars: Arc::new(InMemoryEnvVarRepository::default()),
            audit: Arc::new(InMemoryAuditRepository::default()),
        }
    }
}

impl Default for InMemoryRepositories {
    fn default() -> Self {
        Self::new()
    }
}
