//! CI workflow-run upsert (§4.C "Workflow-run handling", §3 `CiRun`).

use core_types::{CiConclusion, CiRun, CiStatus, EntityId};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct WorkflowRunPayload {
    pub repository: WorkflowRunRepository,
    pub workflow_run: WorkflowRunBody,
}

#[derive(Debug, Deserialize)]
pub struct WorkflowRunRepository {
    pub clone_url: String,
}

#[derive(Debug, Deserialize)]
pub struct WorkflowRunBody {
    pub id: u64,
    pub run_number: u64,
    pub name: String,
    pub head_sha: String,
    pub status: String,
    #[serde(default)]
    pub conclusion: Option<String>,
    pub html_url: String,
    #[serde(default)]
    pub run_started_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

fn map_status(raw: &str) -> CiStatus {
    match raw {
        "queued" | "requested" | "waiting" | "pending" => CiStatus::Queued,
        "completed" => CiStatus::Completed,
        _ => CiStatus::InProgress,
    }
}

fn map_conclusion(raw: &str) -> CiConclusion {
    match raw {
        "success" => CiConclusion::Success,
        "failure" | "action_required" | "startup_failure" => CiConclusion::Failure,
        "cancelled" => CiConclusion::Cancelled,
        "timed_out" => CiConclusion::TimedOut,
        "skipped" | "neutral" => CiConclusion::Skipped,
        _ => CiConclusion::Unknown,
    }
}

impl WorkflowRunPayload {
    #[must_use]
    pub fn to_ci_run(&self, service_id: EntityId) -> CiRun {
        let status = map_status(&self.workflow_run.status);
        let conclusion = self.workflow_run.conclusion.as_deref().map(map_conclusion);
        CiRun {
            id: EntityId::new(),
            service_id,
            commit_sha: self.workflow_run.head_sha.clone(),
            workflow_id: self.workflow_run.id.to_string(),
            workflow_name: self.workflow_run.name.clone(),
            run_id: self.workflow_run.id.to_string(),
            run_number: self.workflow_run.run_number,
            status,
            conclusion,
            started_at: self.workflow_run.run_started_at,
            completed_at: matches!(status, CiStatus::Completed).then_some(self.workflow_run.updated_at).flatten(),
            external_url: self.workflow_run.html_url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(status: &str, conclusion: Option<&str>) -> WorkflowRunPayload {
        WorkflowRunPayload {
            repository: WorkflowRunRepository { clone_url: "https://github.com/acme/widgets.git".to_string() },
            workflow_run: WorkflowRunBody {
                id: 9001,
                run_number: 12,
                name: "CI".to_string(),
                head_sha: "abcdef1234567890".to_string(),
                status: status.to_string(),
                conclusion: conclusion.map(ToString::to_string),
                html_url: "https://github.com/acme/widgets/actions/runs/9001".to_string(),
                run_started_at: None,
                updated_at: None,
            },
        }
    }

    #[test]
    fn in_progress_run_has_no_conclusion() {
        let run = payload("in_progress", None).to_ci_run(EntityId::new());
        assert_eq!(run.status, CiStatus::InProgress);
        assert!(run.conclusion.is_none());
    }

    #[test]
    fn completed_success_maps_conclusion() {
        let run = payload("completed", Some("success")).to_ci_run(EntityId::new());
        assert_eq!(run.status, CiStatus::Completed);
        assert_eq!(run.conclusion, Some(CiConclusion::Success));
    }

    #[test]
    fn unknown_status_defaults_to_in_progress() {
        let run = payload("waiting_on_approval", None).to_ci_run(EntityId::new());
        assert_eq!(run.status, CiStatus::InProgress);
    }
}
