use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::context::ReconcilerContext;
use crate::queue::{Priority, ReconcilerQueue};

/// Runs every `interval`, enqueuing reconciliation for every non-terminal
/// deployment at priority 3 (§4.E "A periodic sweeper runs every T
/// seconds... enqueuing reconciliation for every non-terminal deployment").
/// This is also what re-enqueues work dropped by a full queue, since a
/// missed enqueue just means the deployment is picked up on the next sweep.
pub fn spawn_sweeper(interval: Duration, queue: Arc<ReconcilerQueue>, ctx: ReconcilerContext) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let deployments = match ctx.repos.deployments.list_non_terminal().await {
                Ok(deployments) => deployments,
                Err(e) => {
                    warn!(error = %e, "sweeper failed to list non-terminal deployments");
                    continue;
                }
            };
            debug!(count = deployments.len(), "sweep enqueuing non-terminal deployments");
            for deployment in deployments {
                if let Err(e) = queue.enqueue(deployment.id, Priority::PeriodicSweep) {
                    warn!(deployment_id = %deployment.id, error = %e, "sweep enqueue failed, will retry next sweep");
                }
            }
        }
    })
}
