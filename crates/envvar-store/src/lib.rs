//! The Environment-Variable Store (§4.envvars): key validation, masked
//! reads, and the distinct `reveal` operation with its mandatory audit
//! write. Sits alongside `repository::EnvVarRepository` the way `usage`
//! and `audit` wrap their repository contracts with component-specific
//! rules rather than leaving callers to reimplement them at the API layer.

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;

pub use error::{EnvVarError, EnvVarResult};

use audit::AuditSink;
use core_types::audit::AuditOutcome;
use core_types::{AuditEntry, EntityId, EnvVar};
use repository::EnvVarRepository;
use std::sync::Arc;
use tracing::info;

pub struct EnvVarStore {
    repo: Arc<dyn EnvVarRepository>,
    audit: AuditSink,
}

impl EnvVarStore {
    #[must_use]
    pub fn new(repo: Arc<dyn EnvVarRepository>, audit: AuditSink) -> Self {
        Self { repo, audit }
    }

    /// §4.envvars: keys match `^[A-Za-z_][A-Za-z0-9_]*$`, length 1..255,
    /// unique per (service, environment-or-null) — uniqueness is enforced
    /// by the repository's `Conflict` error.
    pub async fn create(&self, service_id: EntityId, environment_id: Option<EntityId>, key: String, value: String, secret: bool) -> EnvVarResult<EnvVar> {
        if !EnvVar::key_pattern_valid(&key) {
            return Err(EnvVarError::InvalidKey(key));
        }
        let value_hash = audit::hash::hash_value(&value);
        let env_var = EnvVar {
            id: EntityId::new(),
            service_id,
            environment_id,
            key,
            value,
            secret,
            value_hash,
        };
        Ok(self.repo.create(env_var).await?)
    }

    /// List for a service, masked (§4.envvars "Secret values are returned
    /// masked on list/get").
    pub async fn list_masked(&self, service_id: EntityId, environment_id: Option<EntityId>) -> EnvVarResult<Vec<EnvVar>> {
        let mut vars = self.repo.list_for_service(service_id, environment_id).await?;
        for var in &mut vars {
            if var.secret {
                var.value = EnvVar::MASK.to_string();
            }
        }
        Ok(vars)
    }

    /// Get one, masked.
    pub async fn get_masked(&self, id: EntityId) -> EnvVarResult<EnvVar> {
        let mut var = self.repo.get_by_id(id).await?.ok_or(EnvVarError::NotFound(id))?;
        if var.secret {
            var.value = EnvVar::MASK.to_string();
        }
        Ok(var)
    }

    /// §4.envvars "Updates and reveals write a SHA-256 hash of old/new
    /// values for differential auditing; plaintext is never logged."
    pub async fn update_value(&self, actor: &str, id: EntityId, new_value: String) -> EnvVarResult<EnvVar> {
        let existing = self.repo.get_by_id(id).await?.ok_or(EnvVarError::NotFound(id))?;
        let old_hash = existing.value_hash.clone();
        let new_hash = audit::hash::hash_value(&new_value);

        self.repo.update_value(id, &new_value, &new_hash).await?;

        self.audit.record(
            AuditEntry::new(actor, "updated", "env_var", id.to_string(), existing.key.clone(), AuditOutcome::Success)
                .with_context("old_value_hash", old_hash)
                .with_context("new_value_hash", new_hash),
        );

        let mut updated = existing;
        updated.value = new_value;
        Ok(updated)
    }

    /// §4.envvars "a distinct `reveal` operation returns the plaintext and
    /// writes a mandatory audit entry" (S6: `action=revealed`, no
    /// `old_value_hash`/`new_value_hash` fields — this is a read, not a
    /// write, so there is no before/after to diff).
    pub async fn reveal(&self, actor: &str, id: EntityId) -> EnvVarResult<EnvVar> {
        let var = self.repo.get_by_id(id).await?.ok_or(EnvVarError::NotFound(id))?;
        self.audit.record(AuditEntry::new(actor, "revealed", "env_var", id.to_string(), var.key.clone(), AuditOutcome::Success));
        info!(env_var_id = %id, "secret revealed");
        Ok(var)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use repository::in_memory::{InMemoryAuditRepository, InMemoryEnvVarRepository};

    fn store() -> (EnvVarStore, Arc<dyn repository::AuditRepository>) {
        let env_repo: Arc<dyn EnvVarRepository> = Arc::new(InMemoryEnvVarRepository::default());
        let audit_repo: Arc<dyn repository::AuditRepository> = Arc::new(InMemoryAuditRepository::default());
        let sink = AuditSink::spawn(audit_repo.clone());
        (EnvVarStore::new(env_repo, sink), audit_repo)
    }

    #[tokio::test]
    async fn invalid_key_is_rejected() {
        let (store, _) = store();
        let err = store.create(EntityId::new(), None, "1BAD".to_string(), "x".to_string(), false).await.unwrap_err();
        assert!(matches!(err, EnvVarError::InvalidKey(_)));
    }

    #[tokio::test]
    async fn list_masks_secret_values_only() {
        let (store, _) = store();
        let service_id = EntityId::new();
        store.create(service_id, None, "DB_PASSWORD".to_string(), "s3cret".to_string(), true).await.unwrap();
        store.create(service_id, None, "PUBLIC_URL".to_string(), "https://x".to_string(), false).await.unwrap();

        let vars = store.list_masked(service_id, None).await.unwrap();
        let secret = vars.iter().find(|v| v.key == "DB_PASSWORD").unwrap();
        let public = vars.iter().find(|v| v.key == "PUBLIC_URL").unwrap();
        assert_eq!(secret.value, EnvVar::MASK);
        assert_eq!(public.value, "https://x");
    }

    #[tokio::test]
    async fn reveal_returns_plaintext_and_writes_audit_entry_without_hash_fields() {
        let (store, audit_repo) = store();
        let service_id = EntityId::new();
        let created = store.create(service_id, None, "DB_PASSWORD".to_string(), "s3cret".to_string(), true).await.unwrap();

        let revealed = store.reveal("user-1", created.id).await.unwrap();
        assert_eq!(revealed.value, "s3cret");

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        let entries = audit_repo.list_for_resource("env_var", &created.id.to_string()).await.unwrap();
        let entry = entries.iter().find(|e| e.action == "revealed").expect("audit entry recorded");
        assert!(!entry.context.contains_key("old_value_hash"));
        assert!(!entry.context.contains_key("new_value_hash"));
    }

    #[tokio::test]
    async fn update_writes_differential_hash_audit_entry() {
        let (store, audit_repo) = store();
        let service_id = EntityId::new();
        let created = store.create(service_id, None, "DB_PASSWORD".to_string(), "old".to_string(), true).await.unwrap();

        store.update_value("user-1", created.id, "new".to_string()).await.unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        let entries = audit_repo.list_for_resource("env_var", &created.id.to_string()).await.unwrap();
        let entry = entries.iter().find(|e| e.action == "updated").expect("audit entry recorded");
        assert!(entry.context.contains_key("old_value_hash"));
        assert!(entry.context.contains_key("new_value_hash"));
    }
}
