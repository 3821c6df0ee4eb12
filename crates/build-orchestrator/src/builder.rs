use async_trait::async_trait;
use core_types::EntityId;

/// What the in-process build produces. Mirrors the fields of the
/// build-complete callback schema (§6) minus `job_id`, which only applies to
/// dispatched builds.
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub image_uri: String,
    pub sbom: Option<String>,
    pub sbom_format: Option<String>,
    pub image_signature: Option<String>,
}

#[derive(Debug, Clone)]
pub struct BuildRequest {
    pub service_id: EntityId,
    pub release_id: EntityId,
    pub commit_sha: String,
    pub branch: String,
    pub registry_url: String,
}

/// The image-builder runtime collaborator (§1 "the image builder runtime" —
/// explicitly out of scope for the core). This trait is the seam: the core
/// calls it synchronously while holding the build semaphore in in-process
/// mode (§4.D).
#[async_trait]
pub trait Builder: Send + Sync {
    async fn build(&self, request: &BuildRequest) -> Result<BuildOutcome, String>;
}

/// A builder that always succeeds, producing a deterministic image
/// reference `{registry}/{service-short-id}:{short-sha}` — useful for
/// exercising the orchestrator's state machine without a real build
/// toolchain.
pub struct FakeBuilder {
    pub should_fail: bool,
}

impl FakeBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self { should_fail: false }
    }

    #[must_use]
    pub fn failing() -> Self {
        Self { should_fail: true }
    }
}

impl Default for FakeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Builder for FakeBuilder {
    async fn build(&self, request: &BuildRequest) -> Result<BuildOutcome, String> {
        if self.should_fail {
            return Err("simulated build failure".to_string());
        }
        let short_sha = &request.commit_sha[..request.commit_sha.len().min(7)];
        Ok(BuildOutcome {
            image_uri: format!("{}/{}:{}", request.registry_url, request.service_id, short_sha),
            sbom: Some("{}".to_string()),
            sbom_format: Some("cyclonedx-json".to_string()),
            image_signature: None,
        })
    }
}
