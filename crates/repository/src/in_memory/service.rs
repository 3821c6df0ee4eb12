use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use core_types::service::HealthSnapshot;
use core_types::{EntityId, Service};

use crate::contracts::ServiceRepository;
use crate::error::{RepositoryError, RepositoryResult};

/// Normalizes a repository URL to its clone/HTTPS/SSH-insensitive form so
/// `list_by_repository_url` (§4.C step 3) matches any of the three forms
/// users may register or receive in a webhook payload.
fn normalize_repo_url(url: &str) -> String {
    let stripped = url
        .trim_start_matches("https://")
        .trim_start_matches("ssh://")
        .trim_start_matches("git://")
        .trim_start_matches("git@");
    stripped
        .replacen(':', "/", 1)
        .trim_end_matches(".git")
        .trim_end_matches('/')
        .to_lowercase()
}

#[derive(Default)]
pub struct InMemoryServiceRepository {
    by_id: RwLock<HashMap<EntityId, Service>>,
}

#[async_trait]
impl ServiceRepository for InMemoryServiceRepository {
    async fn create(&self, service: Service) -> RepositoryResult<Service> {
        let mut guard = self.by_id.write().map_err(|_| RepositoryError::Backend("lock poisoned".into()))?;
        if guard
            .values()
            .any(|s| s.project_id == service.project_id && s.name == service.name)
        {
            return Err(RepositoryError::Conflict(format!(
                "service name already exists in project: {}",
                service.name
            )));
        }
        guard.insert(service.id, service.clone());
        Ok(service)
    }

    async fn get_by_id(&self, id: EntityId) -> RepositoryResult<Option<Service>> {
        let guard = self.by_id.read().map_err(|_| RepositoryError::Backend("lock poisoned".into()))?;
        Ok(guard.get(&id).cloned())
    }

    async fn list_by_project(&self, project_id: EntityId) -> RepositoryResult<Vec<Service>> {
        let guard = self.by_id.read().map_err(|_| RepositoryError::Backend("lock poisoned".into()))?;
        Ok(guard.values().filter(|s| s.project_id == project_id).cloned().collect())
    }

    async fn list_by_repository_url(&self, repository_url: &str) -> RepositoryResult<Vec<Service>> {
        let needle = normalize_repo_url(repository_url);
        let guard = self.by_id.read().map_err(|_| RepositoryError::Backend("lock poisoned".into()))?;
        Ok(guard
            .values()
            .filter(|s| normalize_repo_url(&s.repository_url) == needle)
            .cloned()
            .collect())
    }

    async fn update_health(&self, id: EntityId, health: HealthSnapshot) -> RepositoryResult<()> {
        let mut guard = self.by_id.write().map_err(|_| RepositoryError::Backend("lock poisoned".into()))?;
        if let Some(service) = guard.get_mut(&id) {
            service.health = health;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::service::{AutoDeployConfig, BuildConfig};

    fn make_service(project_id: EntityId, name: &str, url: &str) -> Service {
        Service {
            id: EntityId::new(),
            project_id,
            name: name.to_string(),
            repository_url: url.to_string(),
            app_path: None,
            watch_paths: vec![],
            build_config: BuildConfig::Dockerfile {
                dockerfile_path: "Dockerfile".to_string(),
            },
            auto_deploy: AutoDeployConfig::default(),
            health: HealthSnapshot::default(),
        }
    }

    #[tokio::test]
    async fn matches_across_clone_https_ssh_forms() {
        let repo = InMemoryServiceRepository::default();
        let project_id = EntityId::new();
        repo.create(make_service(project_id, "api", "git@github.com:acme/platform.git"))
            .await
            .unwrap();

        let found = repo
            .list_by_repository_url("https://github.com/acme/platform.git")
            .await
            .unwrap();
        assert_eq!(found.len(), 1);

        let found = repo.list_by_repository_url("https://github.com/acme/platform").await.unwrap();
        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn duplicate_name_in_project_is_conflict() {
        let repo = InMemoryServiceRepository::default();
        let project_id = EntityId::new();
        repo.create(make_service(project_id, "api", "u1")).await.unwrap();
        let err = repo.create(make_service(project_id, "api", "u2")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }
}
