use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::EntityId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseStatus {
    Building,
    Ready,
    Failed,
}

/// The immutable artifact produced by a build (§3). Created in `building`
/// and transitions exactly once to `ready` or `failed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Release {
    pub id: EntityId,
    pub service_id: EntityId,
    /// Monotonically-sortable version string.
    pub version: String,
    pub commit_sha: String,
    pub image_uri: Option<String>,
    pub sbom: Option<String>,
    pub sbom_format: Option<String>,
    pub image_signature: Option<String>,
    pub status: ReleaseStatus,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Release {
    #[must_use]
    pub fn new_building(service_id: EntityId, commit_sha: impl Into<String>, version: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: EntityId::new(),
            service_id,
            version: version.into(),
            commit_sha: commit_sha.into(),
            image_uri: None,
            sbom: None,
            sbom_format: None,
            image_signature: None,
            status: ReleaseStatus::Building,
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Invariant (§3): image reference is non-empty iff status is ready or
    /// failed-after-build.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self.status, ReleaseStatus::Ready)
    }
}
