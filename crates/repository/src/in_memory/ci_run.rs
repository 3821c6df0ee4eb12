use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use core_types::CiRun;

use crate::contracts::CiRunRepository;
use crate::error::{RepositoryError, RepositoryResult};

#[derive(Default)]
pub struct InMemoryCiRunRepository {
    by_run_id: RwLock<HashMap<String, CiRun>>,
}

#[async_trait]
impl CiRunRepository for InMemoryCiRunRepository {
    async fn upsert_by_run_id(&self, run: CiRun) -> RepositoryResult<CiRun> {
        let mut guard = self.by_run_id.write().map_err(|_| RepositoryError::Backend("lock poisoned".into()))?;
        guard.insert(run.run_id.clone(), run.clone());
        Ok(run)
    }

    async fn get_by_run_id(&self, run_id: &str) -> RepositoryResult<Option<CiRun>> {
        let guard = self.by_run_id.read().map_err(|_| RepositoryError::Backend("lock poisoned".into()))?;
        Ok(guard.get(run_id).cloned())
    }
}
