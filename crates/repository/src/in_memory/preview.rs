use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use core_types::{EntityId, PreviewEnvironment, PreviewStatus};

use crate::contracts::PreviewRepository;
use crate::error::{RepositoryError, RepositoryResult};

#[derive(Default)]
pub struct InMemoryPreviewRepository {
    by_id: RwLock<HashMap<EntityId, PreviewEnvironment>>,
}

#[async_trait]
impl PreviewRepository for InMemoryPreviewRepository {
    async fn create(&self, preview: PreviewEnvironment) -> RepositoryResult<PreviewEnvironment> {
        let mut guard = self.by_id.write().map_err(|_| RepositoryError::Backend("lock poisoned".into()))?;
        if guard
            .values()
            .any(|p| p.service_id == preview.service_id && p.pr_number == preview.pr_number && !p.status.is_closed())
        {
            return Err(RepositoryError::Conflict(format!(
                "open preview already exists for service {} pr #{}",
                preview.service_id, preview.pr_number
            )));
        }
        guard.insert(preview.id, preview.clone());
        Ok(preview)
    }

    async fn get_by_id(&self, id: EntityId) -> RepositoryResult<Option<PreviewEnvironment>> {
        let guard = self.by_id.read().map_err(|_| RepositoryError::Backend("lock poisoned".into()))?;
        Ok(guard.get(&id).cloned())
    }

    async fn get_open_by_service_and_pr(
        &self,
        service_id: EntityId,
        pr_number: u64,
    ) -> RepositoryResult<Option<PreviewEnvironment>> {
        let guard = self.by_id.read().map_err(|_| RepositoryError::Backend("lock poisoned".into()))?;
        Ok(guard
            .values()
            .find(|p| p.service_id == service_id && p.pr_number == pr_number && !p.status.is_closed())
            .cloned())
    }

    async fn get_any_by_service_and_pr(
        &self,
        service_id: EntityId,
        pr_number: u64,
    ) -> RepositoryResult<Option<PreviewEnvironment>> {
        let guard = self.by_id.read().map_err(|_| RepositoryError::Backend("lock poisoned".into()))?;
        Ok(guard
            .values()
            .filter(|p| p.service_id == service_id && p.pr_number == pr_number)
            .cloned()
            .max_by_key(|p| p.last_accessed))
    }

    async fn list_active(&self) -> RepositoryResult<Vec<PreviewEnvironment>> {
        let guard = self.by_id.read().map_err(|_| RepositoryError::Backend("lock poisoned".into()))?;
        Ok(guard
            .values()
            .filter(|p| matches!(p.status, PreviewStatus::Active | PreviewStatus::Sleeping))
            .cloned()
            .collect())
    }

    async fn update(&self, preview: PreviewEnvironment) -> RepositoryResult<()> {
        let mut guard = self.by_id.write().map_err(|_| RepositoryError::Backend("lock poisoned".into()))?;
        guard.insert(preview.id, preview);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn make_preview(service_id: EntityId, pr_number: u64) -> PreviewEnvironment {
        PreviewEnvironment {
            id: EntityId::new(),
            project_id: EntityId::new(),
            service_id,
            pr_number,
            pr_title: "t".into(),
            pr_url: "u".into(),
            pr_author: "a".into(),
            head_branch: "feature/x".into(),
            base_branch: "main".into(),
            head_commit: "c0ffee7".into(),
            subdomain: PreviewEnvironment::subdomain_for(pr_number, "api"),
            public_url: String::new(),
            status: PreviewStatus::Pending,
            auto_sleep_after_minutes: 30,
            last_accessed: Utc::now(),
            environment_id: None,
            deployment_id: None,
            forge_comment_id: None,
        }
    }

    #[tokio::test]
    async fn uniqueness_invariant_blocks_second_open_preview() {
        let repo = InMemoryPreviewRepository::default();
        let service_id = EntityId::new();
        repo.create(make_preview(service_id, 42)).await.unwrap();
        let err = repo.create(make_preview(service_id, 42)).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn closing_then_reopening_is_allowed() {
        let repo = InMemoryPreviewRepository::default();
        let service_id = EntityId::new();
        let mut preview = repo.create(make_preview(service_id, 42)).await.unwrap();
        preview.status = PreviewStatus::Closed;
        repo.update(preview).await.unwrap();

        repo.create(make_preview(service_id, 42)).await.unwrap();
    }
}
