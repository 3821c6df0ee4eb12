//! In-memory `OrchestratorClient`, standing in for a real cluster in tests —
//! the same role the teacher's `DistributedRateLimiter` stub plays for a
//! would-be external rate-limit backend.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use futures::stream::{self, BoxStream};

use crate::error::{OrchestratorError, OrchestratorResult};
use crate::spec::{NetworkSpec, ObservedHealth, ResourceMetrics, WorkloadSpec};
use crate::OrchestratorClient;

#[derive(Debug, Clone)]
struct FakeWorkload {
    spec: WorkloadSpec,
    ready_replicas: u32,
}

#[derive(Default)]
pub struct FakeOrchestratorClient {
    namespaces: RwLock<HashMap<String, Vec<(String, String)>>>,
    workloads: RwLock<HashMap<(String, String), FakeWorkload>>,
    /// When set, `observe` reports this many fewer ready replicas than
    /// desired — lets tests exercise the unhealthy/converging path without
    /// a real scheduler.
    pub readiness_lag: RwLock<u32>,
}

impl FakeOrchestratorClient {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_readiness_lag(&self, lag: u32) {
        *self.readiness_lag.write().unwrap() = lag;
    }
}

#[async_trait]
impl OrchestratorClient for FakeOrchestratorClient {
    async fn ensure_namespace(&self, namespace: &str, labels: &[(&str, &str)]) -> OrchestratorResult<()> {
        self.namespaces.write().unwrap().insert(
            namespace.to_string(),
            labels.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect(),
        );
        Ok(())
    }

    async fn delete_namespace(&self, namespace: &str) -> OrchestratorResult<()> {
        self.namespaces.write().unwrap().remove(namespace);
        self.workloads.write().unwrap().retain(|(ns, _), _| ns != namespace);
        Ok(())
    }

    async fn apply_workload(&self, namespace: &str, spec: &WorkloadSpec) -> OrchestratorResult<()> {
        if spec.replicas == 0 && spec.image.is_empty() {
            return Err(OrchestratorError::InvalidSpec("empty image".into()));
        }
        let lag = *self.readiness_lag.read().unwrap();
        let ready = spec.replicas.saturating_sub(lag);
        self.workloads.write().unwrap().insert(
            (namespace.to_string(), spec.name.clone()),
            FakeWorkload {
                spec: spec.clone(),
                ready_replicas: ready,
            },
        );
        Ok(())
    }

    async fn apply_network(&self, _namespace: &str, _spec: &NetworkSpec) -> OrchestratorResult<()> {
        Ok(())
    }

    async fn delete_workload(&self, namespace: &str, name: &str) -> OrchestratorResult<()> {
        self.workloads.write().unwrap().remove(&(namespace.to_string(), name.to_string()));
        Ok(())
    }

    async fn scale(&self, namespace: &str, name: &str, replicas: u32) -> OrchestratorResult<()> {
        let mut guard = self.workloads.write().unwrap();
        let key = (namespace.to_string(), name.to_string());
        let Some(workload) = guard.get_mut(&key) else {
            return Err(OrchestratorError::NotFound(format!("{namespace}/{name}")));
        };
        workload.spec.replicas = replicas;
        let lag = *self.readiness_lag.read().unwrap();
        workload.ready_replicas = replicas.saturating_sub(lag);
        Ok(())
    }

    async fn observe(&self, namespace: &str, name: &str) -> OrchestratorResult<ObservedHealth> {
        let guard = self.workloads.read().unwrap();
        let workload = guard
            .get(&(namespace.to_string(), name.to_string()))
            .ok_or_else(|| OrchestratorError::NotFound(format!("{namespace}/{name}")))?;
        Ok(ObservedHealth {
            ready_replicas: workload.ready_replicas,
            desired_replicas: workload.spec.replicas,
        })
    }

    async fn metrics(&self, namespace: &str, name: &str) -> OrchestratorResult<Option<ResourceMetrics>> {
        let guard = self.workloads.read().unwrap();
        Ok(guard.get(&(namespace.to_string(), name.to_string())).map(|w| ResourceMetrics {
            memory_gb_hours: f64::from(w.ready_replicas) * 0.5,
            cpu_core_hours: f64::from(w.ready_replicas) * 0.25,
        }))
    }

    async fn stream_logs(&self, namespace: &str, name: &str) -> OrchestratorResult<BoxStream<'static, OrchestratorResult<String>>> {
        let lines = vec![
            Ok(format!("[{namespace}/{name}] starting")),
            Ok(format!("[{namespace}/{name}] ready")),
        ];
        Ok(Box::pin(stream::iter(lines)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    fn workload(name: &str, replicas: u32) -> WorkloadSpec {
        WorkloadSpec {
            name: name.to_string(),
            image: "reg/api:abc1234".to_string(),
            replicas,
            port: 8080,
            env: vec![],
            labels: Default::default(),
        }
    }

    #[tokio::test]
    async fn apply_then_observe_converges_when_no_lag() {
        let client = FakeOrchestratorClient::new();
        client.apply_workload("ns", &workload("api", 2)).await.unwrap();
        let health = client.observe("ns", "api").await.unwrap();
        assert_eq!(health.ready_replicas, 2);
        assert_eq!(health.desired_replicas, 2);
    }

    #[tokio::test]
    async fn readiness_lag_keeps_deployment_unhealthy() {
        let client = FakeOrchestratorClient::new();
        client.set_readiness_lag(1);
        client.apply_workload("ns", &workload("api", 2)).await.unwrap();
        let health = client.observe("ns", "api").await.unwrap();
        assert_eq!(health.ready_replicas, 1);
        assert_eq!(health.desired_replicas, 2);
    }

    #[tokio::test]
    async fn stream_logs_produces_lines() {
        let client = FakeOrchestratorClient::new();
        let mut stream = client.stream_logs("ns", "api").await.unwrap();
        let mut count = 0;
        while stream.next().await.is_some() {
            count += 1;
        }
        assert_eq!(count, 2);
    }
}
