use async_trait::async_trait;
use core_types::EntityId;
use serde::{Deserialize, Serialize};

/// A job handed to the external build-worker queue in dispatched mode
/// (§4.D "the orchestrator enqueues a Job on an external worker pool").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildJob {
    pub job_id: String,
    pub release_id: EntityId,
    pub service_id: EntityId,
    pub commit_sha: String,
    pub branch: String,
}

/// The out-of-process build worker collaborator (§1). The orchestrator
/// releases the semaphore immediately after a successful dispatch and
/// awaits the completion callback rather than blocking on this call.
#[async_trait]
pub trait BuildDispatcher: Send + Sync {
    async fn dispatch(&self, job: BuildJob) -> Result<(), String>;
}

/// Records dispatched jobs in memory instead of calling a real worker API —
/// used by tests exercising dispatched-mode flows end to end via the
/// callback endpoint.
#[derive(Default)]
pub struct FakeBuildDispatcher {
    pub dispatched: std::sync::Mutex<Vec<BuildJob>>,
}

#[async_trait]
impl BuildDispatcher for FakeBuildDispatcher {
    async fn dispatch(&self, job: BuildJob) -> Result<(), String> {
        self.dispatched.lock().unwrap().push(job);
        Ok(())
    }
}
