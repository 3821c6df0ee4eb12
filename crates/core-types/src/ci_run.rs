use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::EntityId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CiStatus {
    Queued,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CiConclusion {
    Success,
    Failure,
    Cancelled,
    TimedOut,
    Skipped,
    #[serde(other)]
    Unknown,
}

/// Observed external CI status (§3, §4 "Workflow-run handling").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CiRun {
    pub id: EntityId,
    pub service_id: EntityId,
    pub commit_sha: String,
    pub workflow_id: String,
    pub workflow_name: String,
    pub run_id: String,
    pub run_number: u64,
    pub status: CiStatus,
    pub conclusion: Option<CiConclusion>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub external_url: String,
}
