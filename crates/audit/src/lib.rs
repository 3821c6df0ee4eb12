//! The Audit Sink (component I): structured, best-effort event log fed by
//! Webhook Intake, the Build Orchestrator, the Reconciler, and the Preview
//! Lifecycle (§2 row I).
//!
//! Grounded on `notify::Notifier`'s fire-and-forget dispatch (errors logged,
//! never propagated to the caller) but backed by a bounded mpsc channel and
//! a single background writer task rather than one spawn per event, so
//! entries are written in submission order — append-only (§3) needs an
//! order, a pile of concurrent spawns does not guarantee one.

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod hash;

use std::sync::Arc;

use core_types::AuditEntry;
use repository::AuditRepository;
use tokio::sync::mpsc;
use tracing::{error, warn};

const CHANNEL_CAPACITY: usize = 1024;

/// Handle callers use to submit entries. Cloning is cheap — it is just a
/// channel sender.
#[derive(Clone)]
pub struct AuditSink {
    tx: mpsc::Sender<AuditEntry>,
}

impl AuditSink {
    /// Spawns the background writer and returns a sink handle. The writer
    /// task runs until every sender is dropped.
    #[must_use]
    pub fn spawn(repository: Arc<dyn AuditRepository>) -> Self {
        let (tx, mut rx) = mpsc::channel::<AuditEntry>(CHANNEL_CAPACITY);

        tokio::spawn(async move {
            while let Some(entry) = rx.recv().await {
                let resource = format!("{}/{}", entry.resource_type, entry.resource_id);
                if let Err(e) = repository.append(entry).await {
                    // §3 "failure to write is non-fatal to the triggering
                    // operation" — the caller already returned by the time
                    // this runs, so all we can do is log.
                    error!(resource = %resource, error = %e, "audit write failed");
                }
            }
        });

        Self { tx }
    }

    /// Best-effort, non-blocking: if the channel is full the entry is
    /// dropped and a warning logged rather than applying backpressure to
    /// the caller, matching §3's best-effort guarantee.
    pub fn record(&self, entry: AuditEntry) {
        if let Err(e) = self.tx.try_send(entry) {
            warn!(error = %e, "audit channel full or closed, dropping entry");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::audit::AuditOutcome;
    use repository::in_memory::InMemoryAuditRepository;

    #[tokio::test]
    async fn recorded_entries_land_in_the_repository() {
        let repo: Arc<dyn AuditRepository> = Arc::new(InMemoryAuditRepository::default());
        let sink = AuditSink::spawn(repo.clone());

        sink.record(AuditEntry::new("user-1", "revealed", "env_var", "ev-1", "DB_PASSWORD", AuditOutcome::Success));

        // yield so the background writer gets a chance to run.
        tokio::task::yield_now().await;
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        let entries = repo.list_for_resource("env_var", "ev-1").await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, "revealed");
    }
}
