use std::sync::Arc;

use audit::AuditSink;
use orchestrator_client::OrchestratorClient;
use repository::InMemoryRepositories;

/// Everything a reconciliation step needs, bundled for cheap cloning across
/// worker tasks.
#[derive(Clone)]
pub struct ReconcilerContext {
    pub repos: InMemoryRepositories,
    pub orchestrator: Arc<dyn OrchestratorClient>,
    pub audit: AuditSink,
}

impl ReconcilerContext {
    #[must_use]
    pub fn new(repos: InMemoryRepositories, orchestrator: Arc<dyn OrchestratorClient>, audit: AuditSink) -> Self {
        Self {
            repos,
            orchestrator,
            audit,
        }
    }
}
