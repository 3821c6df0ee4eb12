use serde::{Deserialize, Serialize};

use crate::ids::EntityId;
use crate::service::HealthStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentStatus {
    Pending,
    Running,
    Failed,
}

impl DeploymentStatus {
    /// Used by the periodic sweeper (§4.E) to decide whether a deployment
    /// still needs reconciliation.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Failed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservedHealth {
    pub status: HealthStatus,
    pub ready_replicas: u32,
    pub desired_replicas: u32,
}

impl ObservedHealth {
    /// §4.E step 6: "Healthy iff `available == desired && desired > 0`".
    #[must_use]
    pub fn from_counts(ready: u32, desired: u32) -> Self {
        let status = if desired > 0 && ready == desired {
            HealthStatus::Healthy
        } else if desired > 0 {
            HealthStatus::Unhealthy
        } else {
            HealthStatus::Unknown
        };
        Self {
            status,
            ready_replicas: ready,
            desired_replicas: desired,
        }
    }
}

/// Desired state of a release in an environment (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deployment {
    pub id: EntityId,
    pub service_id: EntityId,
    pub release_id: EntityId,
    pub environment_id: EntityId,
    pub desired_replicas: u32,
    pub status: DeploymentStatus,
    pub observed_health: HealthStatus,
    pub error_message: Option<String>,
}

impl Deployment {
    #[must_use]
    pub fn new(
        service_id: EntityId,
        release_id: EntityId,
        environment_id: EntityId,
        desired_replicas: u32,
    ) -> Self {
        Self {
            id: EntityId::new(),
            service_id,
            release_id,
            environment_id,
            desired_replicas,
            status: DeploymentStatus::Pending,
            observed_health: HealthStatus::Unknown,
            error_message: None,
        }
    }
}
