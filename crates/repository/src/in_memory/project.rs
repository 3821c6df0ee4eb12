use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use core_types::{EntityId, Project};

use crate::contracts::ProjectRepository;
use crate::error::{RepositoryError, RepositoryResult};

#[derive(Default)]
pub struct InMemoryProjectRepository {
    by_id: RwLock<HashMap<EntityId, Project>>,
}

#[async_trait]
impl ProjectRepository for InMemoryProjectRepository {
    async fn create(&self, project: Project) -> RepositoryResult<Project> {
        let mut guard = self.by_id.write().map_err(|_| RepositoryError::Backend("lock poisoned".into()))?;
        if guard.values().any(|p| p.slug == project.slug) {
            return Err(RepositoryError::Conflict(format!("slug already exists: {}", project.slug)));
        }
        guard.insert(project.id, project.clone());
        Ok(project)
    }

    async fn get_by_id(&self, id: EntityId) -> RepositoryResult<Option<Project>> {
        let guard = self.by_id.read().map_err(|_| RepositoryError::Backend("lock poisoned".into()))?;
        Ok(guard.get(&id).cloned())
    }

    async fn get_by_slug(&self, slug: &str) -> RepositoryResult<Option<Project>> {
        let guard = self.by_id.read().map_err(|_| RepositoryError::Backend("lock poisoned".into()))?;
        Ok(guard.values().find(|p| p.slug == slug).cloned())
    }

    async fn list(&self) -> RepositoryResult<Vec<Project>> {
        let guard = self.by_id.read().map_err(|_| RepositoryError::Backend("lock poisoned".into()))?;
        Ok(guard.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn duplicate_slug_is_a_conflict() {
        let repo = InMemoryProjectRepository::default();
        repo.create(Project::new("acme", "Acme")).await.unwrap();
        let err = repo.create(Project::new("acme", "Acme Again")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn get_by_slug_roundtrips() {
        let repo = InMemoryProjectRepository::default();
        let p = repo.create(Project::new("acme", "Acme")).await.unwrap();
        let found = repo.get_by_slug("acme").await.unwrap().unwrap();
        assert_eq!(found.id, p.id);
        assert!(repo.get_by_slug("missing").await.unwrap().is_none());
    }
}
