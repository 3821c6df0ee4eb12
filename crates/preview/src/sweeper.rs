//! Background sweep that puts idle previews to sleep (§4.F "Access
//! tracking": "A background sweeper scans active previews and triggers
//! active→sleeping when idle past threshold"), mirroring the reconciler's
//! own periodic sweeper.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use core_types::PreviewStatus;
use tracing::{debug, warn};

use crate::PreviewLifecycle;

pub fn spawn_sleep_sweeper(interval: Duration, lifecycle: Arc<PreviewLifecycle>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let previews = match lifecycle.repos.previews.list_active().await {
                Ok(previews) => previews,
                Err(e) => {
                    warn!(error = %e, "preview sleep sweep failed to list active previews");
                    continue;
                }
            };

            let mut put_to_sleep = 0usize;
            for preview in previews {
                if preview.status != PreviewStatus::Active {
                    continue;
                }
                let idle_minutes = Utc::now().signed_duration_since(preview.last_accessed).num_minutes();
                if idle_minutes < i64::from(preview.auto_sleep_after_minutes) {
                    continue;
                }
                match lifecycle.sleep(preview.id).await {
                    Ok(()) => put_to_sleep += 1,
                    Err(e) => warn!(preview_id = %preview.id, error = %e, "failed to put idle preview to sleep"),
                }
            }
            if put_to_sleep > 0 {
                debug!(count = put_to_sleep, "preview sweep put idle previews to sleep");
            }
        }
    })
}
