//! Pull-request payload parsing, delegating to the preview lifecycle
//! (§4.C "Pull-request handling", §4.F).

use core_types::EntityId;
use preview::PullRequestEvent;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct PullRequestPayload {
    pub action: String,
    pub number: u64,
    pub pull_request: PullRequestBody,
    pub repository: PullRequestRepository,
}

#[derive(Debug, Deserialize)]
pub struct PullRequestBody {
    pub title: String,
    pub html_url: String,
    pub user: PullRequestUser,
    pub head: PullRequestRef,
    pub base: PullRequestRef,
}

#[derive(Debug, Deserialize)]
pub struct PullRequestUser {
    pub login: String,
}

#[derive(Debug, Deserialize)]
pub struct PullRequestRef {
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub sha: String,
}

#[derive(Debug, Deserialize)]
pub struct PullRequestRepository {
    pub clone_url: String,
}

/// What to do once a service has been resolved for this payload.
pub enum PullRequestAction {
    /// `opened`, `reopened`: create or resurrect the preview.
    Open,
    /// `synchronize`: new commits pushed to the PR branch.
    Synchronize,
    /// `closed`: merged or abandoned, tear the preview down.
    Close,
    /// Action this system doesn't act on (e.g. `labeled`, `edited`).
    Ignored,
}

impl PullRequestPayload {
    #[must_use]
    pub fn classify(&self) -> PullRequestAction {
        match self.action.as_str() {
            "opened" | "reopened" => PullRequestAction::Open,
            "synchronize" => PullRequestAction::Synchronize,
            "closed" => PullRequestAction::Close,
            _ => PullRequestAction::Ignored,
        }
    }

    #[must_use]
    pub fn to_event(&self, service_id: EntityId, project_id: EntityId) -> PullRequestEvent {
        PullRequestEvent {
            service_id,
            project_id,
            pr_number: self.number,
            pr_title: self.pull_request.title.clone(),
            pr_url: self.pull_request.html_url.clone(),
            pr_author: self.pull_request.user.login.clone(),
            head_branch: self.pull_request.head.git_ref.clone(),
            base_branch: self.pull_request.base.git_ref.clone(),
            head_commit: self.pull_request.head.sha.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(action: &str) -> PullRequestPayload {
        PullRequestPayload {
            action: action.to_string(),
            number: 42,
            pull_request: PullRequestBody {
                title: "Add widget".to_string(),
                html_url: "https://github.com/acme/widgets/pull/42".to_string(),
                user: PullRequestUser { login: "octocat".to_string() },
                head: PullRequestRef { git_ref: "feature/widget".to_string(), sha: "abcdef1234567890".to_string() },
                base: PullRequestRef { git_ref: "main".to_string(), sha: "0000000000000000".to_string() },
            },
            repository: PullRequestRepository { clone_url: "https://github.com/acme/widgets.git".to_string() },
        }
    }

    #[test]
    fn opened_and_reopened_classify_as_open() {
        assert!(matches!(payload("opened").classify(), PullRequestAction::Open));
        assert!(matches!(payload("reopened").classify(), PullRequestAction::Open));
    }

    #[test]
    fn synchronize_and_closed_classify_correctly() {
        assert!(matches!(payload("synchronize").classify(), PullRequestAction::Synchronize));
        assert!(matches!(payload("closed").classify(), PullRequestAction::Close));
    }

    #[test]
    fn unrelated_actions_are_ignored() {
        assert!(matches!(payload("labeled").classify(), PullRequestAction::Ignored));
    }

    #[test]
    fn to_event_carries_pr_metadata() {
        let service_id = EntityId::new();
        let project_id = EntityId::new();
        let event = payload("opened").to_event(service_id, project_id);
        assert_eq!(event.pr_number, 42);
        assert_eq!(event.head_branch, "feature/widget");
        assert_eq!(event.base_branch, "main");
    }
}
