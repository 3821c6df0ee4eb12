use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use core_types::EntityId;
use tracing::{error, warn};

use crate::algorithm::reconcile_deployment;
use crate::context::ReconcilerContext;
use crate::queue::{Priority, ReconcilerQueue};

/// Tracks the current backoff duration per deployment so repeated transient
/// failures double the delay (initial 5s, x2, cap 5m per §4.E) instead of
/// retrying at a fixed interval. Cleared on success.
#[derive(Default)]
struct BackoffTracker {
    current: Mutex<HashMap<EntityId, Duration>>,
}

impl BackoffTracker {
    fn next_delay(&self, deployment_id: EntityId, initial: Duration, max: Duration) -> Duration {
        let mut guard = self.current.lock().unwrap();
        let delay = guard
            .get(&deployment_id)
            .map_or(initial, |prev| (*prev * 2).min(max));
        guard.insert(deployment_id, delay);
        delay
    }

    fn clear(&self, deployment_id: EntityId) {
        self.current.lock().unwrap().remove(&deployment_id);
    }
}

/// Spawns the fixed pool of reconciler workers that drain the queue
/// cooperatively (§4.E "A fixed pool of reconciler workers drains the queue").
/// Each worker loops: dequeue, reconcile, and on transient failure
/// re-enqueue at priority 2 with exponential backoff; irrecoverable
/// failures are not retried automatically.
pub fn spawn_workers(
    worker_count: usize,
    queue: Arc<ReconcilerQueue>,
    ctx: ReconcilerContext,
    initial_backoff: Duration,
    max_backoff: Duration,
) -> Vec<tokio::task::JoinHandle<()>> {
    let backoff = Arc::new(BackoffTracker::default());

    (0..worker_count)
        .map(|worker_id| {
            let queue = Arc::clone(&queue);
            let ctx = ctx.clone();
            let backoff = Arc::clone(&backoff);
            tokio::spawn(async move {
                loop {
                    let deployment_id = queue.dequeue().await;
                    match reconcile_deployment(&ctx, deployment_id).await {
                        Ok(()) => backoff.clear(deployment_id),
                        Err(e) if is_retryable(&e) => {
                            let delay = backoff.next_delay(deployment_id, initial_backoff, max_backoff);
                            warn!(worker_id, %deployment_id, error = %e, ?delay, "transient reconcile failure, scheduling retry");
                            schedule_retry(Arc::clone(&queue), deployment_id, delay);
                        }
                        Err(e) => {
                            backoff.clear(deployment_id);
                            error!(worker_id, %deployment_id, error = %e, "reconcile failed without retry");
                        }
                    }
                }
            })
        })
        .collect()
}

fn is_retryable(err: &crate::error::ReconcileError) -> bool {
    matches!(err, crate::error::ReconcileError::Orchestrator(o) if o.is_retryable())
}

fn schedule_retry(queue: Arc<ReconcilerQueue>, deployment_id: EntityId, delay: Duration) {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        if let Err(e) = queue.enqueue(deployment_id, Priority::DriftCheck) {
            warn!(%deployment_id, error = %e, "failed to re-enqueue after backoff; periodic sweep will retry");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_and_caps() {
        let tracker = BackoffTracker::default();
        let id = EntityId::new();
        let initial = Duration::from_secs(5);
        let max = Duration::from_secs(20);
        assert_eq!(tracker.next_delay(id, initial, max), Duration::from_secs(5));
        assert_eq!(tracker.next_delay(id, initial, max), Duration::from_secs(10));
        assert_eq!(tracker.next_delay(id, initial, max), Duration::from_secs(20));
        assert_eq!(tracker.next_delay(id, initial, max), Duration::from_secs(20));
        tracker.clear(id);
        assert_eq!(tracker.next_delay(id, initial, max), Duration::from_secs(5));
    }
}
