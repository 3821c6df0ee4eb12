use std::sync::Arc;
use std::time::Duration;

use build_orchestrator::BuildOrchestrator;
use envvar_store::EnvVarStore;
use logstream::LogStreamService;
use orchestrator_client::OrchestratorClient;
use preview::PreviewLifecycle;
use reconciler::ReconcilerQueue;
use repository::InMemoryRepositories;
use usage::UsageAggregator;
use webhook_intake::WebhookIntake;

use crate::cache::TtlCache;

/// Shared application state threaded through every handler via
/// `.with_state(state)`, the way `integrations::server::AppState` does
/// (§10.2).
#[derive(Clone)]
pub struct AppState {
    pub repos: InMemoryRepositories,
    pub orchestrator: Arc<dyn OrchestratorClient>,
    pub build_orchestrator: Arc<BuildOrchestrator>,
    pub reconciler_queue: Arc<ReconcilerQueue>,
    pub preview_lifecycle: Arc<PreviewLifecycle>,
    pub webhook_intake: Arc<WebhookIntake>,
    pub log_stream: Arc<LogStreamService>,
    pub usage: Arc<UsageAggregator>,
    pub envvar_store: Arc<EnvVarStore>,
    pub audit: audit::AuditSink,
    pub config: Arc<config::Config>,
    /// Build-status cache keyed by `(service_id, commit_sha)` (§5 dashboard
    /// cache).
    pub build_status_cache: Arc<TtlCache<(core_types::EntityId, String), serde_json::Value>>,
}

impl AppState {
    #[must_use]
    pub fn dashboard_cache_ttl(config: &config::Config) -> Duration {
        config.dashboard_cache_ttl
    }
}
