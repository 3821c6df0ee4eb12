use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use core_types::{EntityId, EnvVar};

use crate::contracts::EnvVarRepository;
use crate::error::{RepositoryError, RepositoryResult};

#[derive(Default)]
pub struct InMemoryEnvVarRepository {
    by_id: RwLock<HashMap<EntityId, EnvVar>>,
}

#[async_trait]
impl EnvVarRepository for InMemoryEnvVarRepository {
    async fn create(&self, env_var: EnvVar) -> RepositoryResult<EnvVar> {
        let mut guard = self.by_id.write().map_err(|_| RepositoryError::Backend("lock poisoned".into()))?;
        if guard.values().any(|v| {
            v.service_id == env_var.service_id
                && v.environment_id == env_var.environment_id
                && v.key == env_var.key
        }) {
            return Err(RepositoryError::Conflict(format!("env-var key already exists: {}", env_var.key)));
        }
        guard.insert(env_var.id, env_var.clone());
        Ok(env_var)
    }

    async fn get_by_id(&self, id: EntityId) -> RepositoryResult<Option<EnvVar>> {
        let guard = self.by_id.read().map_err(|_| RepositoryError::Backend("lock poisoned".into()))?;
        Ok(guard.get(&id).cloned())
    }

    async fn list_for_service(
        &self,
        service_id: EntityId,
        environment_id: Option<EntityId>,
    ) -> RepositoryResult<Vec<EnvVar>> {
        let guard = self.by_id.read().map_err(|_| RepositoryError::Backend("lock poisoned".into()))?;
        Ok(guard
            .values()
            .filter(|v| v.service_id == service_id && v.environment_id == environment_id)
            .cloned()
            .collect())
    }

    async fn update_value(&self, id: EntityId, value: &str, value_hash: &str) -> RepositoryResult<()> {
        let mut guard = self.by_id.write().map_err(|_| RepositoryError::Backend("lock poisoned".into()))?;
        if let Some(env_var) = guard.get_mut(&id) {
            env_var.value = value.to_string();
            env_var.value_hash = value_hash.to_string();
        }
        Ok(())
    }
}
