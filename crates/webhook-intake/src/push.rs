//! Push-event handling (§4.C "Push handling").

use std::collections::BTreeSet;

use serde::Deserialize;

const DEFAULT_BRANCHES: [&str; 2] = ["main", "master"];

#[derive(Debug, Deserialize)]
pub struct PushEvent {
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub after: String,
    pub repository: PushRepository,
    #[serde(default)]
    pub head_commit: Option<PushCommit>,
    #[serde(default)]
    pub commits: Vec<PushCommit>,
}

#[derive(Debug, Deserialize)]
pub struct PushRepository {
    pub clone_url: String,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub ssh_url: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PushCommit {
    #[serde(default)]
    pub added: Vec<String>,
    #[serde(default)]
    pub removed: Vec<String>,
    #[serde(default)]
    pub modified: Vec<String>,
}

impl PushEvent {
    /// The branch name stripped of `refs/heads/`, or the raw ref if it
    /// doesn't look like a branch ref (e.g. a tag push).
    #[must_use]
    pub fn branch(&self) -> &str {
        self.git_ref.strip_prefix("refs/heads/").unwrap_or(&self.git_ref)
    }

    /// §4.C step 1: only the repository's default branches trigger a build.
    #[must_use]
    pub fn is_default_branch(&self) -> bool {
        DEFAULT_BRANCHES.contains(&self.branch())
    }

    /// §4.C step 4: union of added/modified/removed paths across
    /// `head_commit` and every commit in the push.
    #[must_use]
    pub fn changed_files(&self) -> Vec<String> {
        let mut set = BTreeSet::new();
        let commits = self.head_commit.iter().chain(self.commits.iter());
        for commit in commits {
            set.extend(commit.added.iter().cloned());
            set.extend(commit.modified.iter().cloned());
            set.extend(commit.removed.iter().cloned());
        }
        set.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn branch_is_stripped_of_refs_prefix() {
        let event = PushEvent {
            git_ref: "refs/heads/main".to_string(),
            after: "abcdef1".to_string(),
            repository: PushRepository {
                clone_url: "u".to_string(),
                html_url: None,
                ssh_url: None,
            },
            head_commit: None,
            commits: vec![],
        };
        assert_eq!(event.branch(), "main");
        assert!(event.is_default_branch());
    }

    #[test]
    fn feature_branch_is_not_default() {
        let event = PushEvent {
            git_ref: "refs/heads/feature/x".to_string(),
            after: "abcdef1".to_string(),
            repository: PushRepository {
                clone_url: "u".to_string(),
                html_url: None,
                ssh_url: None,
            },
            head_commit: None,
            commits: vec![],
        };
        assert!(!event.is_default_branch());
    }

    #[test]
    fn changed_files_unions_head_commit_and_commits() {
        let event = PushEvent {
            git_ref: "refs/heads/main".to_string(),
            after: "abcdef1".to_string(),
            repository: PushRepository {
                clone_url: "u".to_string(),
                html_url: None,
                ssh_url: None,
            },
            head_commit: Some(PushCommit {
                added: vec!["apps/api/server.go".to_string()],
                ..Default::default()
            }),
            commits: vec![PushCommit {
                modified: vec!["apps/web/index.tsx".to_string()],
                ..Default::default()
            }],
        };
        let files = event.changed_files();
        assert_eq!(files, vec!["apps/api/server.go".to_string(), "apps/web/index.tsx".to_string()]);
    }
}
