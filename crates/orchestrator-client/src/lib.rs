//! The container-orchestrator client collaborator (component B, §10.1 of
//! `SPEC_FULL.md`). Its internals (the actual Kubernetes API surface) are out
//! of scope for the core per §1 — what lives here is the narrow trait the
//! Build Orchestrator, Reconciler, Preview Lifecycle, and Log Streaming
//! components depend on, plus two implementations: a real `kube`-backed one
//! and an in-memory fake for tests.

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod fake;
pub mod kube_client;
pub mod spec;

pub use error::{OrchestratorError, OrchestratorResult};
pub use spec::{NetworkSpec, ObservedHealth, ResourceMetrics, WorkloadSpec};

use async_trait::async_trait;
use futures::stream::BoxStream;

/// Apply/scale/delete workloads; stream pod logs; query metrics (§2 row B).
#[async_trait]
pub trait OrchestratorClient: Send + Sync {
    async fn ensure_namespace(&self, namespace: &str, labels: &[(&str, &str)]) -> OrchestratorResult<()>;
    async fn delete_namespace(&self, namespace: &str) -> OrchestratorResult<()>;

    /// Create-or-update idempotently, matched by name within namespace
    /// (§4.E step 5).
    async fn apply_workload(&self, namespace: &str, spec: &WorkloadSpec) -> OrchestratorResult<()>;
    async fn apply_network(&self, namespace: &str, spec: &NetworkSpec) -> OrchestratorResult<()>;
    async fn delete_workload(&self, namespace: &str, name: &str) -> OrchestratorResult<()>;

    async fn scale(&self, namespace: &str, name: &str, replicas: u32) -> OrchestratorResult<()>;

    /// Read replica counts (§4.E step 6).
    async fn observe(&self, namespace: &str, name: &str) -> OrchestratorResult<ObservedHealth>;

    /// `Ok(None)` means metrics-server is unavailable; callers fall back to
    /// heuristics (§4.H).
    async fn metrics(&self, namespace: &str, name: &str) -> OrchestratorResult<Option<ResourceMetrics>>;

    /// Feeds the log-stream bridge (component G). Each item is one log line.
    async fn stream_logs(&self, namespace: &str, name: &str) -> OrchestratorResult<BoxStream<'static, OrchestratorResult<String>>>;
}
