use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use core_types::{EntityId, Environment};

use crate::contracts::EnvironmentRepository;
use crate::error::{RepositoryError, RepositoryResult};

#[derive(Default)]
pub struct InMemoryEnvironmentRepository {
    by_id: RwLock<HashMap<EntityId, Environment>>,
}

#[async_trait]
impl EnvironmentRepository for InMemoryEnvironmentRepository {
    async fn create(&self, environment: Environment) -> RepositoryResult<Environment> {
        let mut guard = self.by_id.write().map_err(|_| RepositoryError::Backend("lock poisoned".into()))?;
        guard.insert(environment.id, environment.clone());
        Ok(environment)
    }

    async fn get_by_id(&self, id: EntityId) -> RepositoryResult<Option<Environment>> {
        let guard = self.by_id.read().map_err(|_| RepositoryError::Backend("lock poisoned".into()))?;
        Ok(guard.get(&id).cloned())
    }

    async fn get_by_project_and_name(
        &self,
        project_id: EntityId,
        name: &str,
    ) -> RepositoryResult<Option<Environment>> {
        let guard = self.by_id.read().map_err(|_| RepositoryError::Backend("lock poisoned".into()))?;
        Ok(guard
            .values()
            .find(|e| e.project_id == project_id && e.name == name)
            .cloned())
    }
}
