use core_types::EntityId;
use serde::{Deserialize, Serialize};

/// Build-complete callback schema (§6): the only input that can carry a
/// dispatched release from `building` to a terminal state (§9 "Build
/// dispatch duality").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildCompleteCallback {
    pub job_id: String,
    pub release_id: EntityId,
    pub success: bool,
    pub image_uri: Option<String>,
    pub image_digest: Option<String>,
    pub image_size_mb: Option<u64>,
    pub sbom: Option<String>,
    pub sbom_format: Option<String>,
    pub image_signature: Option<String>,
    pub duration_secs: Option<u64>,
    pub error_message: Option<String>,
    pub logs_url: Option<String>,
}
