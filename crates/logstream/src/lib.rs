//! The Log Streaming component (component G, §4.G): WebSocket-agnostic pod
//! log bridging. Origin allow-listing, the `connected`/`log`/`error`/
//! `disconnected` frame protocol, the 100-slot lossy buffer, and the
//! 10,000-line historical read cap all live here; the `api` crate owns the
//! actual `axum` WebSocket upgrade and writes these frames to the socket.

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod buffer;
pub mod error;
pub mod frame;

pub use error::{LogStreamError, LogStreamResult};
pub use frame::LogFrame;

use std::sync::Arc;

use core_types::EntityId;
use futures::StreamExt;
use orchestrator_client::OrchestratorClient;
use repository::InMemoryRepositories;
use tracing::{info, warn};

use buffer::LossyFrameBuffer;

/// A live streaming session: the producer task runs until the client
/// disconnects or the orchestrator stream ends; [`LogStreamSession::recv`]
/// drains frames for the transport layer to forward.
pub struct LogStreamSession {
    buffer: Arc<LossyFrameBuffer>,
    producer: tokio::task::JoinHandle<()>,
}

impl LogStreamSession {
    pub async fn recv(&self) -> Option<LogFrame> {
        self.buffer.recv().await
    }

    /// §4.G "reading any message from the client cancels the stream" —
    /// the transport layer calls this the moment it reads anything (or
    /// detects hangup) from the client's half of the socket.
    pub fn cancel(&self) {
        self.producer.abort();
        self.buffer.close();
    }
}

pub struct LogStreamService {
    repos: InMemoryRepositories,
    orchestrator: Arc<dyn OrchestratorClient>,
    allowed_origins: Vec<String>,
    buffer_capacity: usize,
    historical_line_cap: usize,
}

impl LogStreamService {
    #[must_use]
    pub fn new(
        repos: InMemoryRepositories,
        orchestrator: Arc<dyn OrchestratorClient>,
        allowed_origins: Vec<String>,
        buffer_capacity: usize,
        historical_line_cap: usize,
    ) -> Self {
        Self { repos, orchestrator, allowed_origins, buffer_capacity, historical_line_cap }
    }

    /// §4.G "WebSocket upgrade gated by an allow-list of origins
    /// (configured)". An empty allow-list rejects every origin rather than
    /// defaulting open.
    #[must_use]
    pub fn is_origin_allowed(&self, origin: Option<&str>) -> bool {
        match origin {
            Some(origin) => self.allowed_origins.iter().any(|allowed| allowed == origin),
            None => false,
        }
    }

    async fn resolve_namespace_and_name(&self, service_id: EntityId, environment_id: EntityId) -> LogStreamResult<(String, String)> {
        let service = self.repos.services.get_by_id(service_id).await?.ok_or(LogStreamError::ServiceNotFound(service_id))?;
        let environment = self.repos.environments.get_by_id(environment_id).await?.ok_or(LogStreamError::EnvironmentNotFound(environment_id))?;
        Ok((environment.namespace, service.name))
    }

    /// Starts the producer and returns a session the transport layer polls
    /// via [`LogStreamSession::recv`]. The `connected` frame is pushed
    /// before this returns so the caller never races it.
    pub async fn open(self: &Arc<Self>, service_id: EntityId, environment_id: EntityId) -> LogStreamResult<LogStreamSession> {
        let (namespace, name) = self.resolve_namespace_and_name(service_id, environment_id).await?;
        let mut log_stream = self.orchestrator.stream_logs(&namespace, &name).await?;

        let buffer = Arc::new(LossyFrameBuffer::new(self.buffer_capacity));
        buffer.push(LogFrame::Connected);

        let producer_buffer = Arc::clone(&buffer);
        let producer = tokio::spawn(async move {
            while let Some(item) = log_stream.next().await {
                match item {
                    Ok(line) => producer_buffer.push(LogFrame::Log { line }),
                    Err(e) => {
                        warn!(%service_id, error = %e, "log producer error");
                        producer_buffer.push(LogFrame::Error { message: e.to_string() });
                    }
                }
            }
            info!(%service_id, "log producer exhausted, disconnecting");
            producer_buffer.push(LogFrame::Disconnected);
            producer_buffer.close();
        });

        Ok(LogStreamSession { buffer, producer })
    }

    /// §4.G "Historical (non-streaming) log reads cap at 10,000 lines and
    /// return the raw concatenated text for naive substring search."
    pub async fn historical(&self, service_id: EntityId, environment_id: EntityId) -> LogStreamResult<String> {
        let (namespace, name) = self.resolve_namespace_and_name(service_id, environment_id).await?;
        let mut log_stream = self.orchestrator.stream_logs(&namespace, &name).await?;

        let mut lines = Vec::with_capacity(self.historical_line_cap.min(1024));
        while lines.len() < self.historical_line_cap {
            match log_stream.next().await {
                Some(Ok(line)) => lines.push(line),
                Some(Err(_)) | None => break,
            }
        }
        Ok(lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orchestrator_client::fake::FakeOrchestratorClient;

    fn service() -> Arc<LogStreamService> {
        let repos = InMemoryRepositories::new();
        let orchestrator: Arc<dyn OrchestratorClient> = Arc::new(FakeOrchestratorClient::new());
        Arc::new(LogStreamService::new(repos, orchestrator, vec!["https://app.enclii.dev".to_string()], 100, 10_000))
    }

    #[test]
    fn matching_origin_is_allowed() {
        let svc = service();
        assert!(svc.is_origin_allowed(Some("https://app.enclii.dev")));
    }

    #[test]
    fn unlisted_or_missing_origin_is_rejected() {
        let svc = service();
        assert!(!svc.is_origin_allowed(Some("https://evil.example")));
        assert!(!svc.is_origin_allowed(None));
    }

    #[tokio::test]
    async fn open_emits_connected_then_log_frames() {
        let svc = service();
        let repos = &svc.repos;
        let project = repos.projects.create(core_types::Project::new("demo", "demo")).await.unwrap();
        let service_row = repos
            .services
            .create(core_types::Service {
                id: EntityId::new(),
                project_id: project.id,
                name: "api".to_string(),
                repository_url: "git@github.com:acme/api.git".to_string(),
                app_path: None,
                watch_paths: vec![],
                build_config: core_types::service::BuildConfig::Dockerfile { dockerfile_path: "Dockerfile".to_string() },
                auto_deploy: core_types::service::AutoDeployConfig::default(),
                health: core_types::service::HealthSnapshot::default(),
            })
            .await
            .unwrap();
        let environment = repos
            .environments
            .create(core_types::Environment {
                id: EntityId::new(),
                project_id: project.id,
                name: "production".to_string(),
                namespace: "enclii-production".to_string(),
            })
            .await
            .unwrap();

        let session = svc.open(service_row.id, environment.id).await.unwrap();
        assert_eq!(session.recv().await, Some(LogFrame::Connected));
        let next = session.recv().await.unwrap();
        assert!(matches!(next, LogFrame::Log { .. }));
        session.cancel();
    }

    #[tokio::test]
    async fn historical_reads_are_capped() {
        let svc = {
            let repos = InMemoryRepositories::new();
            let orchestrator: Arc<dyn OrchestratorClient> = Arc::new(FakeOrchestratorClient::new());
            Arc::new(LogStreamService::new(repos, orchestrator, vec![], 100, 1))
        };
        let repos = &svc.repos;
        let project = repos.projects.create(core_types::Project::new("demo", "demo")).await.unwrap();
        let service_row = repos
            .services
            .create(core_types::Service {
                id: EntityId::new(),
                project_id: project.id,
                name: "api".to_string(),
                repository_url: "git@github.com:acme/api.git".to_string(),
                app_path: None,
                watch_paths: vec![],
                build_config: core_types::service::BuildConfig::Dockerfile { dockerfile_path: "Dockerfile".to_string() },
                auto_deploy: core_types::service::AutoDeployConfig::default(),
                health: core_types::service::HealthSnapshot::default(),
            })
            .await
            .unwrap();
        let environment = repos
            .environments
            .create(core_types::Environment {
                id: EntityId::new(),
                project_id: project.id,
                name: "production".to_string(),
                namespace: "enclii-production".to_string(),
            })
            .await
            .unwrap();

        let text = svc.historical(service_row.id, environment.id).await.unwrap();
        assert_eq!(text.lines().count(), 1);
    }
}
