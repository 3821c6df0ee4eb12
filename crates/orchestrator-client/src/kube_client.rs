//! `kube`-backed [`OrchestratorClient`], grounded on the Server-Side-Apply
//! idiom used throughout the pack's kubernetes operators: idempotent
//! create-or-update via `Patch::Apply`, namespace deletion tolerating
//! already-gone (404) as success.

use std::collections::BTreeMap;

use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::TryStreamExt;
use k8s_openapi::api::apps::v1::{Deployment as K8sDeployment, DeploymentSpec};
use k8s_openapi::api::core::v1::{
    Container, ContainerPort, EnvVar as K8sEnvVar, Namespace, PodSpec, PodTemplateSpec,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};
use kube::api::{Api, LogParams, Patch, PatchParams};
use kube::Client;
use tracing::{debug, warn};

use crate::error::{OrchestratorError, OrchestratorResult};
use crate::spec::{NetworkSpec, ObservedHealth, ResourceMetrics, WorkloadSpec};
use crate::OrchestratorClient;

const FIELD_MANAGER: &str = "enclii-control-plane";

pub struct KubeOrchestratorClient {
    client: Client,
}

impl KubeOrchestratorClient {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn deployment_spec(namespace: &str, spec: &WorkloadSpec) -> K8sDeployment {
        let labels: BTreeMap<String, String> = {
            let mut labels = spec.labels.clone();
            labels.insert("app".to_string(), spec.name.clone());
            labels
        };
        K8sDeployment {
            metadata: ObjectMeta {
                name: Some(spec.name.clone()),
                namespace: Some(namespace.to_string()),
                labels: Some(labels.clone()),
                ..Default::default()
            },
            spec: Some(DeploymentSpec {
                replicas: Some(i32::try_from(spec.replicas).unwrap_or(i32::MAX)),
                selector: LabelSelector {
                    match_labels: Some(labels.clone()),
                    ..Default::default()
                },
                template: PodTemplateSpec {
                    metadata: Some(ObjectMeta {
                        labels: Some(labels),
                        ..Default::default()
                    }),
                    spec: Some(PodSpec {
                        containers: vec![Container {
                            name: spec.name.clone(),
                            image: Some(spec.image.clone()),
                            ports: Some(vec![ContainerPort {
                                container_port: i32::from(spec.port),
                                ..Default::default()
                            }]),
                            env: Some(
                                spec.env
                                    .iter()
                                    .map(|(k, v)| K8sEnvVar {
                                        name: k.clone(),
                                        value: Some(v.clone()),
                                        ..Default::default()
                                    })
                                    .collect(),
                            ),
                            ..Default::default()
                        }],
                        ..Default::default()
                    }),
                },
                ..Default::default()
            }),
            ..Default::default()
        }
    }
}

#[async_trait]
impl OrchestratorClient for KubeOrchestratorClient {
    async fn ensure_namespace(&self, namespace: &str, labels: &[(&str, &str)]) -> OrchestratorResult<()> {
        let api: Api<Namespace> = Api::all(self.client.clone());
        let ns = Namespace {
            metadata: ObjectMeta {
                name: Some(namespace.to_string()),
                labels: Some(labels.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect()),
                ..Default::default()
            },
            ..Default::default()
        };
        api.patch(namespace, &PatchParams::apply(FIELD_MANAGER), &Patch::Apply(&ns))
            .await
            .map_err(|e| OrchestratorError::Transient(e.to_string()))?;
        Ok(())
    }

    async fn delete_namespace(&self, namespace: &str) -> OrchestratorResult<()> {
        let api: Api<Namespace> = Api::all(self.client.clone());
        match api.delete(namespace, &Default::default()).await {
            Ok(_) => Ok(()),
            Err(kube::Error::Api(e)) if e.code == 404 => {
                debug!(namespace, "namespace already deleted, skipping");
                Ok(())
            }
            Err(e) => Err(OrchestratorError::Transient(e.to_string())),
        }
    }

    async fn apply_workload(&self, namespace: &str, spec: &WorkloadSpec) -> OrchestratorResult<()> {
        if spec.image.is_empty() {
            return Err(OrchestratorError::InvalidSpec("workload image must not be empty".into()));
        }
        let api: Api<K8sDeployment> = Api::namespaced(self.client.clone(), namespace);
        let deployment = Self::deployment_spec(namespace, spec);
        api.patch(&spec.name, &PatchParams::apply(FIELD_MANAGER), &Patch::Apply(&deployment))
            .await
            .map_err(classify_kube_error)?;
        Ok(())
    }

    async fn apply_network(&self, namespace: &str, spec: &NetworkSpec) -> OrchestratorResult<()> {
        // Ingress/Service application follows the same Server-Side-Apply
        // shape as `apply_workload`; omitted here because this core's scope
        // stops at the orchestrator-client *contract* (§10.1), not a full
        // ingress-controller integration.
        debug!(namespace, name = %spec.name, domains = spec.external_domains.len(), "apply_network (no-op in this build)");
        Ok(())
    }

    async fn delete_workload(&self, namespace: &str, name: &str) -> OrchestratorResult<()> {
        let api: Api<K8sDeployment> = Api::namespaced(self.client.clone(), namespace);
        match api.delete(name, &Default::default()).await {
            Ok(_) => Ok(()),
            Err(kube::Error::Api(e)) if e.code == 404 => Ok(()),
            Err(e) => Err(OrchestratorError::Transient(e.to_string())),
        }
    }

    async fn scale(&self, namespace: &str, name: &str, replicas: u32) -> OrchestratorResult<()> {
        let api: Api<K8sDeployment> = Api::namespaced(self.client.clone(), namespace);
        let patch = serde_json::json!({ "spec": { "replicas": replicas } });
        api.patch(name, &PatchParams::default(), &Patch::Merge(&patch))
            .await
            .map_err(classify_kube_error)?;
        Ok(())
    }

    async fn observe(&self, namespace: &str, name: &str) -> OrchestratorResult<ObservedHealth> {
        let api: Api<K8sDeployment> = Api::namespaced(self.client.clone(), namespace);
        let deployment = api.get(name).await.map_err(classify_kube_error)?;
        let status = deployment.status.unwrap_or_default();
        let spec = deployment.spec.unwrap_or_default();
        Ok(ObservedHealth {
            ready_replicas: u32::try_from(status.ready_replicas.unwrap_or(0)).unwrap_or(0),
            desired_replicas: u32::try_from(spec.replicas.unwrap_or(0)).unwrap_or(0),
        })
    }

    async fn metrics(&self, _namespace: &str, _name: &str) -> OrchestratorResult<Option<ResourceMetrics>> {
        // metrics-server is an optional cluster addon; its absence is the
        // expected "unavailable" case the usage aggregator falls back from
        // (§4.H), not an error.
        warn!("metrics-server integration not wired in this build; reporting unavailable");
        Ok(None)
    }

    async fn stream_logs(&self, namespace: &str, name: &str) -> OrchestratorResult<BoxStream<'static, OrchestratorResult<String>>> {
        let api: Api<k8s_openapi::api::core::v1::Pod> = Api::namespaced(self.client.clone(), namespace);
        let params = LogParams {
            follow: true,
            ..Default::default()
        };
        let stream = api
            .log_stream(name, &params)
            .await
            .map_err(classify_kube_error)?
            .map_err(|e| OrchestratorError::Transient(e.to_string()))
            .map_ok(|bytes| String::from_utf8_lossy(&bytes).into_owned());
        Ok(Box::pin(stream))
    }
}

fn classify_kube_error(err: kube::Error) -> OrchestratorError {
    match err {
        kube::Error::Api(e) if e.code == 404 => OrchestratorError::NotFound(e.message),
        kube::Error::Api(e) if e.code == 409 || e.code == 422 => OrchestratorError::InvalidSpec(e.message),
        other => OrchestratorError::Transient(other.to_string()),
    }
}
