use std::sync::RwLock;

use async_trait::async_trait;
use core_types::AuditEntry;

use crate::contracts::AuditRepository;
use crate::error::{RepositoryError, RepositoryResult};

/// Append-only log. Errors are represented here for interface completeness,
/// but upstream callers (the `audit` crate's dispatcher) never let a write
/// failure interrupt the operation that triggered it (§3, §7).
#[derive(Default)]
pub struct InMemoryAuditRepository {
    entries: RwLock<Vec<AuditEntry>>,
}

#[async_trait]
impl AuditRepository for InMemoryAuditRepository {
    async fn append(&self, entry: AuditEntry) -> RepositoryResult<()> {
        let mut guard = self.entries.write().map_err(|_| RepositoryError::Backend("lock poisoned".into()))?;
        guard.push(entry);
        Ok(())
    }

    async fn list_for_resource(&self, resource_type: &str, resource_id: &str) -> RepositoryResult<Vec<AuditEntry>> {
        let guard = self.entries.read().map_err(|_| RepositoryError::Backend("lock poisoned".into()))?;
        Ok(guard
            .iter()
            .filter(|e| e.resource_type == resource_type && e.resource_id == resource_id)
            .cloned()
            .collect())
    }
}
