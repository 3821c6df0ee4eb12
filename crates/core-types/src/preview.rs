use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::EntityId;

/// Preview lifecycle state machine (§4.F).
///
/// ```text
/// pending → building → deploying → active ⇄ sleeping
///                                     ↓
///                                  closed (terminal until reopen)
/// failed is reachable from any non-terminal state
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreviewStatus {
    Pending,
    Building,
    Deploying,
    Active,
    Sleeping,
    Failed,
    Closed,
}

impl PreviewStatus {
    #[must_use]
    pub fn is_closed(self) -> bool {
        matches!(self, Self::Closed)
    }
}

/// Ephemeral deployment for a PR (§3). Invariant: at most one non-closed
/// preview per (service, PR-number) — enforced by the repository, not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewEnvironment {
    pub id: EntityId,
    pub project_id: EntityId,
    pub service_id: EntityId,
    pub pr_number: u64,
    pub pr_title: String,
    pub pr_url: String,
    pub pr_author: String,
    pub head_branch: String,
    pub base_branch: String,
    pub head_commit: String,
    pub subdomain: String,
    pub public_url: String,
    pub status: PreviewStatus,
    pub auto_sleep_after_minutes: u32,
    pub last_accessed: DateTime<Utc>,
    pub environment_id: Option<EntityId>,
    pub deployment_id: Option<EntityId>,
    /// Id of the posted forge comment, if any (§4.F "Forge comment").
    pub forge_comment_id: Option<String>,
}

impl PreviewEnvironment {
    #[must_use]
    pub fn subdomain_for(pr_number: u64, service_slug: &str) -> String {
        format!("pr-{pr_number}-{service_slug}")
    }

    #[must_use]
    pub fn namespace(&self) -> String {
        format!("enclii-preview-{}", self.subdomain)
    }
}
