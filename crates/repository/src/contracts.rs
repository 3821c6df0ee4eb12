use async_trait::async_trait;
use core_types::{
    AuditEntry, CiRun, Deployment, EntityId, EnvVar, Environment, PreviewEnvironment, Project,
    Release, Service,
};

use crate::error::RepositoryResult;

/// Each entity contract offers create / get-by-id / list-by-* / targeted
/// mutators (§4.A). Reads that find nothing return `Ok(None)`, never an
/// error — `RepositoryError` is reserved for genuine failures.
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn create(&self, project: Project) -> RepositoryResult<Project>;
    async fn get_by_id(&self, id: EntityId) -> RepositoryResult<Option<Project>>;
    async fn get_by_slug(&self, slug: &str) -> RepositoryResult<Option<Project>>;
    async fn list(&self) -> RepositoryResult<Vec<Project>>;
}

#[async_trait]
pub trait ServiceRepository: Send + Sync {
    async fn create(&self, service: Service) -> RepositoryResult<Service>;
    async fn get_by_id(&self, id: EntityId) -> RepositoryResult<Option<Service>>;
    async fn list_by_project(&self, project_id: EntityId) -> RepositoryResult<Vec<Service>>;
    /// Resolve services whose `repository_url` matches any clone/HTTPS/SSH
    /// form of the same forge repository (§4.C step 3).
    async fn list_by_repository_url(&self, repository_url: &str) -> RepositoryResult<Vec<Service>>;
    async fn update_health(&self, id: EntityId, health: core_types::service::HealthSnapshot) -> RepositoryResult<()>;
}

#[async_trait]
pub trait EnvironmentRepository: Send + Sync {
    async fn create(&self, environment: Environment) -> RepositoryResult<Environment>;
    async fn get_by_id(&self, id: EntityId) -> RepositoryResult<Option<Environment>>;
    async fn get_by_project_and_name(
        &self,
        project_id: EntityId,
        name: &str,
    ) -> RepositoryResult<Option<Environment>>;
}

#[async_trait]
pub trait ReleaseRepository: Send + Sync {
    async fn create(&self, release: Release) -> RepositoryResult<Release>;
    async fn get_by_id(&self, id: EntityId) -> RepositoryResult<Option<Release>>;
    async fn list_by_service(&self, service_id: EntityId) -> RepositoryResult<Vec<Release>>;
    async fn get_latest_by_service_and_commit(
        &self,
        service_id: EntityId,
        commit_sha: &str,
    ) -> RepositoryResult<Option<Release>>;
    async fn update_image_uri(&self, id: EntityId, image_uri: &str) -> RepositoryResult<()>;
    async fn update_sbom(&self, id: EntityId, sbom: &str, format: &str) -> RepositoryResult<()>;
    async fn update_signature(&self, id: EntityId, signature: &str) -> RepositoryResult<()>;
    async fn update_status(
        &self,
        id: EntityId,
        status: core_types::ReleaseStatus,
        error_message: Option<String>,
    ) -> RepositoryResult<()>;
}

#[async_trait]
pub trait DeploymentRepository: Send + Sync {
    async fn create(&self, deployment: Deployment) -> RepositoryResult<Deployment>;
    async fn get_by_id(&self, id: EntityId) -> RepositoryResult<Option<Deployment>>;
    /// Exactly one *latest* deployment per (service, environment) is
    /// considered current (§3).
    async fn get_latest_for_service_environment(
        &self,
        service_id: EntityId,
        environment_id: EntityId,
    ) -> RepositoryResult<Option<Deployment>>;
    async fn list_non_terminal(&self) -> RepositoryResult<Vec<Deployment>>;
    async fn update_status(
        &self,
        id: EntityId,
        status: core_types::DeploymentStatus,
        health: core_types::HealthStatus,
        error_message: Option<String>,
    ) -> RepositoryResult<()>;
}

#[async_trait]
pub trait PreviewRepository: Send + Sync {
    async fn create(&self, preview: PreviewEnvironment) -> RepositoryResult<PreviewEnvironment>;
    async fn get_by_id(&self, id: EntityId) -> RepositoryResult<Option<PreviewEnvironment>>;
    /// Invariant: at most one non-closed preview per (service, PR-number).
    async fn get_open_by_service_and_pr(
        &self,
        service_id: EntityId,
        pr_number: u64,
    ) -> RepositoryResult<Option<PreviewEnvironment>>;
    /// Latest record regardless of status, including `closed` — lets the
    /// lifecycle resurrect a closed preview on PR reopen instead of
    /// creating a fresh row (§4.F "closed→pending: PR reopened").
    async fn get_any_by_service_and_pr(
        &self,
        service_id: EntityId,
        pr_number: u64,
    ) -> RepositoryResult<Option<PreviewEnvironment>>;
    async fn list_active(&self) -> RepositoryResult<Vec<PreviewEnvironment>>;
    async fn update(&self, preview: PreviewEnvironment) -> RepositoryResult<()>;
}

#[async_trait]
pub trait CiRunRepository: Send + Sync {
    async fn upsert_by_run_id(&self, run: CiRun) -> RepositoryResult<CiRun>;
    async fn get_by_run_id(&self, run_id: &str) -> RepositoryResult<Option<CiRun>>;
}

#[async_trait]
pub trait EnvVarRepository: Send + Sync {
    async fn create(&self, env_var: EnvVar) -> RepositoryResult<EnvVar>;
    async fn get_by_id(&self, id: EntityId) -> RepositoryResult<Option<EnvVar>>;
    async fn list_for_service(
        &self,
        service_id: EntityId,
        environment_id: Option<EntityId>,
    ) -> RepositoryResult<Vec<EnvVar>>;
    async fn update_value(&self, id: EntityId, value: &str, value_hash: &str) -> RepositoryResult<()>;
}

#[async_trait]
pub trait AuditRepository: Send + Sync {
    /// Append-only. Failure here must never be surfaced to the triggering
    /// operation (§3, §7) — callers treat this as best-effort.
    async fn append(&self, entry: AuditEntry) -> RepositoryResult<()>;
    async fn list_for_resource(&self, resource_type: &str, resource_id: &str) -> RepositoryResult<Vec<AuditEntry>>;
}
