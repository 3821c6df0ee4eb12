use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use core_types::{Deployment, DeploymentStatus, EntityId, HealthStatus};

use crate::contracts::DeploymentRepository;
use crate::error::{RepositoryError, RepositoryResult};

#[derive(Default)]
pub struct InMemoryDeploymentRepository {
    by_id: RwLock<HashMap<EntityId, Deployment>>,
    /// Insertion order, so "latest" is well-defined without a timestamp
    /// column on this entity (§3 "Exactly one *latest* deployment").
    order: RwLock<Vec<EntityId>>,
}

#[async_trait]
impl DeploymentRepository for InMemoryDeploymentRepository {
    async fn create(&self, deployment: Deployment) -> RepositoryResult<Deployment> {
        let mut by_id = self.by_id.write().map_err(|_| RepositoryError::Backend("lock poisoned".into()))?;
        let mut order = self.order.write().map_err(|_| RepositoryError::Backend("lock poisoned".into()))?;
        order.push(deployment.id);
        by_id.insert(deployment.id, deployment.clone());
        Ok(deployment)
    }

    async fn get_by_id(&self, id: EntityId) -> RepositoryResult<Option<Deployment>> {
        let guard = self.by_id.read().map_err(|_| RepositoryError::Backend("lock poisoned".into()))?;
        Ok(guard.get(&id).cloned())
    }

    async fn get_latest_for_service_environment(
        &self,
        service_id: EntityId,
        environment_id: EntityId,
    ) -> RepositoryResult<Option<Deployment>> {
        let by_id = self.by_id.read().map_err(|_| RepositoryError::Backend("lock poisoned".into()))?;
        let order = self.order.read().map_err(|_| RepositoryError::Backend("lock poisoned".into()))?;
        Ok(order
            .iter()
            .rev()
            .filter_map(|id| by_id.get(id))
            .find(|d| d.service_id == service_id && d.environment_id == environment_id)
            .cloned())
    }

    async fn list_non_terminal(&self) -> RepositoryResult<Vec<Deployment>> {
        let guard = self.by_id.read().map_err(|_| RepositoryError::Backend("lock poisoned".into()))?;
        Ok(guard.values().filter(|d| !d.status.is_terminal()).cloned().collect())
    }

    async fn update_status(
        &self,
        id: EntityId,
        status: DeploymentStatus,
        health: HealthStatus,
        error_message: Option<String>,
    ) -> RepositoryResult<()> {
        let mut guard = self.by_id.write().map_err(|_| RepositoryError::Backend("lock poisoned".into()))?;
        if let Some(deployment) = guard.get_mut(&id) {
            deployment.status = status;
            deployment.observed_health = health;
            deployment.error_message = error_message;
        }
        Ok(())
    }
}
