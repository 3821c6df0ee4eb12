//! Control-plane HTTP service entrypoint. Grounded on
//! `integrations::bin::linear`'s startup sequence: init tracing, load
//! config, connect to Kubernetes, assemble state, build the router, serve
//! (§10.2).

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use api::cache::TtlCache;
use api::state::AppState;
use audit::AuditSink;
use build_orchestrator::builder::FakeBuilder;
use build_orchestrator::{BuildMode, BuildOrchestrator};
use config::Config;
use envvar_store::EnvVarStore;
use logstream::LogStreamService;
use orchestrator_client::fake::FakeOrchestratorClient;
use orchestrator_client::kube_client::KubeOrchestratorClient;
use orchestrator_client::OrchestratorClient;
use preview::forge::{FakeForgeClient, ForgeClient};
use preview::PreviewLifecycle;
use reconciler::{Reconciler, ReconcilerContext};
use repository::InMemoryRepositories;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use usage::{UsageAggregator, UsagePricing};
use webhook_intake::WebhookIntake;

/// Interval the idle-preview sweeper polls at — not itself a tunable in
/// `config::Config` since it only governs the same auto-sleep window
/// `PreviewConfig::default_auto_sleep_minutes` already configures.
const PREVIEW_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("enclii_api=info".parse()?))
        .init();

    info!("starting enclii control plane");

    let config = Arc::new(Config::from_env().context("failed to load configuration")?);
    let repos = InMemoryRepositories::new();

    let orchestrator: Arc<dyn OrchestratorClient> = match kube::Client::try_default().await {
        Ok(client) => {
            info!("connected to Kubernetes");
            Arc::new(KubeOrchestratorClient::new(client))
        }
        Err(e) => {
            warn!(error = %e, "no Kubernetes context available, falling back to the in-memory orchestrator client");
            Arc::new(FakeOrchestratorClient::new())
        }
    };

    let audit = AuditSink::spawn(repos.audit.clone());

    let reconciler = Reconciler::start(
        ReconcilerContext::new(repos.clone(), Arc::clone(&orchestrator), audit.clone()),
        config.reconciler.queue_capacity,
        config.reconciler.worker_count,
        config.reconciler.sweep_interval,
        config.reconciler.initial_backoff,
        config.reconciler.max_backoff,
    );
    let reconciler_queue = Arc::clone(&reconciler.queue);
    // The worker/sweeper tasks are plain `tokio::spawn`s and keep running
    // detached regardless of `reconciler`'s lifetime; it's kept around so
    // a future graceful-shutdown path has something to call
    // `.shutdown()` on.
    let _reconciler = reconciler;

    let build_orchestrator = Arc::new(BuildOrchestrator::new(
        repos.clone(),
        Arc::clone(&reconciler_queue),
        audit.clone(),
        BuildMode::InProcess(Arc::new(FakeBuilder::new())),
        config.build.semaphore_capacity,
        config.build.registry_url.clone(),
        config.build.build_deadline,
    ));

    // `config::Config` carries no forge API token (§10.3 lists only the
    // webhook shared secret and the build-worker callback token), so PR
    // comments are recorded in memory rather than posted to a real forge;
    // wiring `preview::forge::GitHubForgeClient` in is a matter of adding
    // that token to configuration, not of the lifecycle's API.
    let forge: Arc<dyn ForgeClient> = Arc::new(FakeForgeClient::default());

    let preview_lifecycle = Arc::new(PreviewLifecycle::new(
        repos.clone(),
        Arc::clone(&orchestrator),
        Arc::clone(&build_orchestrator),
        Arc::clone(&reconciler_queue),
        forge,
        audit.clone(),
        config.preview.preview_domain_suffix.clone(),
        config.preview.default_auto_sleep_minutes,
    ));
    let _sleep_sweeper = preview::sweeper::spawn_sleep_sweeper(PREVIEW_SWEEP_INTERVAL, Arc::clone(&preview_lifecycle));

    let webhook_intake = Arc::new(WebhookIntake::new(
        repos.clone(),
        Arc::clone(&build_orchestrator),
        Arc::clone(&preview_lifecycle),
        audit.clone(),
        config.webhook.shared_secret.clone(),
    ));

    let log_stream = Arc::new(LogStreamService::new(
        repos.clone(),
        Arc::clone(&orchestrator),
        config.log_stream.allowed_origins.clone(),
        config.log_stream.buffer_capacity,
        config.log_stream.historical_line_cap,
    ));

    let usage = Arc::new(UsageAggregator::new(repos.clone(), Arc::clone(&orchestrator), UsagePricing::default()));

    let envvar_store = Arc::new(EnvVarStore::new(repos.env_vars.clone(), audit.clone()));

    let state = AppState {
        repos,
        orchestrator,
        build_orchestrator,
        reconciler_queue,
        preview_lifecycle,
        webhook_intake,
        log_stream,
        usage,
        envvar_store,
        audit,
        config: Arc::clone(&config),
        build_status_cache: Arc::new(TtlCache::new(config.dashboard_cache_ttl)),
    };

    let app = api::build_router(state);

    let port: u16 = std::env::var("PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(8080);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await.context("failed to bind to address")?;
    info!(%addr, "enclii control plane listening");

    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
