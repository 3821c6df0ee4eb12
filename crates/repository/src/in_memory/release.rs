use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use core_types::{EntityId, Release, ReleaseStatus};

use crate::contracts::ReleaseRepository;
use crate::error::{RepositoryError, RepositoryResult};

#[derive(Default)]
pub struct InMemoryReleaseRepository {
    by_id: RwLock<HashMap<EntityId, Release>>,
}

#[async_trait]
impl ReleaseRepository for InMemoryReleaseRepository {
    async fn create(&self, release: Release) -> RepositoryResult<Release> {
        let mut guard = self.by_id.write().map_err(|_| RepositoryError::Backend("lock poisoned".into()))?;
        guard.insert(release.id, release.clone());
        Ok(release)
    }

    async fn get_by_id(&self, id: EntityId) -> RepositoryResult<Option<Release>> {
        let guard = self.by_id.read().map_err(|_| RepositoryError::Backend("lock poisoned".into()))?;
        Ok(guard.get(&id).cloned())
    }

    async fn list_by_service(&self, service_id: EntityId) -> RepositoryResult<Vec<Release>> {
        let guard = self.by_id.read().map_err(|_| RepositoryError::Backend("lock poisoned".into()))?;
        Ok(guard.values().filter(|r| r.service_id == service_id).cloned().collect())
    }

    async fn get_latest_by_service_and_commit(
        &self,
        service_id: EntityId,
        commit_sha: &str,
    ) -> RepositoryResult<Option<Release>> {
        let guard = self.by_id.read().map_err(|_| RepositoryError::Backend("lock poisoned".into()))?;
        Ok(guard
            .values()
            .filter(|r| r.service_id == service_id && r.commit_sha == commit_sha)
            .max_by_key(|r| r.created_at)
            .cloned())
    }

    async fn update_image_uri(&self, id: EntityId, image_uri: &str) -> RepositoryResult<()> {
        let mut guard = self.by_id.write().map_err(|_| RepositoryError::Backend("lock poisoned".into()))?;
        if let Some(release) = guard.get_mut(&id) {
            release.image_uri = Some(image_uri.to_string());
            release.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn update_sbom(&self, id: EntityId, sbom: &str, format: &str) -> RepositoryResult<()> {
        let mut guard = self.by_id.write().map_err(|_| RepositoryError::Backend("lock poisoned".into()))?;
        if let Some(release) = guard.get_mut(&id) {
            release.sbom = Some(sbom.to_string());
            release.sbom_format = Some(format.to_string());
            release.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn update_signature(&self, id: EntityId, signature: &str) -> RepositoryResult<()> {
        let mut guard = self.by_id.write().map_err(|_| RepositoryError::Backend("lock poisoned".into()))?;
        if let Some(release) = guard.get_mut(&id) {
            release.image_signature = Some(signature.to_string());
            release.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn update_status(
        &self,
        id: EntityId,
        status: ReleaseStatus,
        error_message: Option<String>,
    ) -> RepositoryResult<()> {
        let mut guard = self.by_id.write().map_err(|_| RepositoryError::Backend("lock poisoned".into()))?;
        if let Some(release) = guard.get_mut(&id) {
            release.status = status;
            release.error_message = error_message;
            release.updated_at = Utc::now();
        }
        Ok(())
    }
}
