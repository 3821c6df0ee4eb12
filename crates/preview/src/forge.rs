//! Posting/updating the preview-status PR comment (§4.F "Forge comment").
//! Grounded on `integrations::github_client::GitHubClient`'s `reqwest`
//! client setup, but scoped to the one comment-upsert operation the
//! lifecycle needs rather than the full webhook-management surface.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use serde::{Deserialize, Serialize};

pub const COMMENT_MARKER: &str = "<!-- enclii-preview-comment -->";

const GITHUB_API_BASE: &str = "https://api.github.com";

/// Posts or updates the single marked comment on a pull request (§9
/// "Forge-comment idempotency via marker"): lookup is linear in the number
/// of comments on the PR, which is bounded.
#[async_trait]
pub trait ForgeClient: Send + Sync {
    async fn upsert_comment(&self, pr_url: &str, body: &str) -> Result<String, String>;
}

#[derive(Debug, Deserialize)]
struct IssueComment {
    id: u64,
    body: String,
}

#[derive(Debug, Serialize)]
struct CommentPayload<'a> {
    body: &'a str,
}

/// Real implementation against the GitHub issues-comments API. `pr_url` is
/// expected in the form `https://github.com/{owner}/{repo}/pull/{number}`.
pub struct GitHubForgeClient {
    client: reqwest::Client,
    api_base: String,
}

impl GitHubForgeClient {
    pub fn new(token: &str) -> Result<Self, String> {
        Self::with_api_base(token, GITHUB_API_BASE)
    }

    /// Same as [`GitHubForgeClient::new`] but against a caller-supplied API
    /// base (tests point this at a `wiremock` server instead of the real
    /// GitHub API).
    fn with_api_base(token: &str, api_base: impl Into<String>) -> Result<Self, String> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert(USER_AGENT, HeaderValue::from_static("enclii-preview-lifecycle/1.0"));
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|e| e.to_string())?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| e.to_string())?;
        Ok(Self { client, api_base: api_base.into() })
    }

    fn comments_url(&self, pr_url: &str) -> Option<String> {
        let rest = pr_url.strip_prefix("https://github.com/")?;
        let mut parts = rest.splitn(4, '/');
        let owner = parts.next()?;
        let repo = parts.next()?;
        parts.next()?; // "pull"
        let number = parts.next()?;
        Some(format!("{}/repos/{owner}/{repo}/issues/{number}/comments", self.api_base))
    }
}

#[async_trait]
impl ForgeClient for GitHubForgeClient {
    async fn upsert_comment(&self, pr_url: &str, body: &str) -> Result<String, String> {
        let url = self.comments_url(pr_url).ok_or_else(|| format!("unrecognized PR url: {pr_url}"))?;

        let existing: Vec<IssueComment> = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| e.to_string())?
            .json()
            .await
            .map_err(|e| e.to_string())?;

        if let Some(comment) = existing.into_iter().find(|c| c.body.contains(COMMENT_MARKER)) {
            let comment_url = format!("{url}/{}", comment.id);
            self.client
                .patch(&comment_url)
                .json(&CommentPayload { body })
                .send()
                .await
                .map_err(|e| e.to_string())?;
            return Ok(comment.id.to_string());
        }

        let created: IssueComment = self
            .client
            .post(&url)
            .json(&CommentPayload { body })
            .send()
            .await
            .map_err(|e| e.to_string())?
            .json()
            .await
            .map_err(|e| e.to_string())?;
        Ok(created.id.to_string())
    }
}

/// Records upserted comments in memory, keyed by PR url — used by tests
/// exercising the lifecycle without a real forge API.
#[derive(Default)]
pub struct FakeForgeClient {
    comments: std::sync::Mutex<std::collections::HashMap<String, (String, String)>>,
}

#[async_trait]
impl ForgeClient for FakeForgeClient {
    async fn upsert_comment(&self, pr_url: &str, body: &str) -> Result<String, String> {
        let mut guard = self.comments.lock().unwrap();
        if let Some((id, existing_body)) = guard.get_mut(pr_url) {
            *existing_body = body.to_string();
            return Ok(id.clone());
        }
        let id = format!("comment-{}", guard.len() + 1);
        guard.insert(pr_url.to_string(), (id.clone(), body.to_string()));
        Ok(id)
    }
}

impl FakeForgeClient {
    #[must_use]
    pub fn comment_for(&self, pr_url: &str) -> Option<(String, String)> {
        self.comments.lock().unwrap().get(pr_url).cloned()
    }
}

/// Builds the comment body (§4.F "preview URL, branch, short commit, and
/// auto-sleep"), with the idempotency marker embedded.
#[must_use]
pub fn render_comment(public_url: &str, branch: &str, commit_sha: &str, auto_sleep_after_minutes: u32) -> String {
    let short_sha = &commit_sha[..commit_sha.len().min(7)];
    format!(
        "{COMMENT_MARKER}\n### Preview environment\n\n\
         - URL: {public_url}\n\
         - Branch: `{branch}`\n\
         - Commit: `{short_sha}`\n\
         - Auto-sleeps after {auto_sleep_after_minutes} minutes of inactivity\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn comments_url_parses_owner_repo_and_pr_number() {
        let client = GitHubForgeClient::with_api_base("token", "https://api.github.test").unwrap();
        let url = client.comments_url("https://github.com/acme/platform/pull/42").unwrap();
        assert_eq!(url, "https://api.github.test/repos/acme/platform/issues/42/comments");
    }

    #[test]
    fn comments_url_rejects_non_github_url() {
        let client = GitHubForgeClient::with_api_base("token", "https://api.github.test").unwrap();
        assert!(client.comments_url("https://gitlab.com/acme/platform/pull/42").is_none());
    }

    #[tokio::test]
    async fn upsert_posts_a_new_comment_when_no_marker_comment_exists() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/acme/platform/issues/42/comments"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/repos/acme/platform/issues/42/comments"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "id": 1,
                "body": "hello"
            })))
            .mount(&server)
            .await;

        let client = GitHubForgeClient::with_api_base("token", server.uri()).unwrap();
        let id = client
            .upsert_comment("https://github.com/acme/platform/pull/42", "hello")
            .await
            .unwrap();
        assert_eq!(id, "1");
    }

    #[tokio::test]
    async fn upsert_patches_the_comment_bearing_the_marker_in_place() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/acme/platform/issues/42/comments"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "id": 7, "body": "unrelated comment" },
                { "id": 99, "body": format!("{COMMENT_MARKER}\nold preview info") },
            ])))
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/repos/acme/platform/issues/42/comments/99"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 99,
                "body": "updated"
            })))
            .mount(&server)
            .await;

        let client = GitHubForgeClient::with_api_base("token", server.uri()).unwrap();
        let id = client
            .upsert_comment("https://github.com/acme/platform/pull/42", "updated preview info")
            .await
            .unwrap();
        assert_eq!(id, "99");
    }
}
