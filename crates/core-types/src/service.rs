use serde::{Deserialize, Serialize};

use crate::ids::EntityId;

/// Denormalized health snapshot, mirrored from the latest [`crate::deployment::Deployment`]
/// by the reconciler (§9 "Denormalized health on Service").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
    Unknown,
}

impl Default for HealthStatus {
    fn default() -> Self {
        Self::Unknown
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HealthSnapshot {
    pub status: HealthStatus,
    pub ready_replicas: u32,
    pub desired_replicas: u32,
    pub namespace: Option<String>,
}

/// Build configuration: a type tag plus type-specific options (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BuildConfig {
    Buildpack {
        #[serde(default)]
        builder_image: Option<String>,
    },
    Dockerfile {
        #[serde(default = "default_dockerfile_path")]
        dockerfile_path: String,
    },
    Nixpack {
        #[serde(default)]
        extra_args: Vec<String>,
    },
}

fn default_dockerfile_path() -> String {
    "Dockerfile".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AutoDeployConfig {
    pub enabled: bool,
    pub target_environment: Option<String>,
    pub branch_override: Option<String>,
}

/// The unit of build+deploy (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: EntityId,
    pub project_id: EntityId,
    /// Unique within project.
    pub name: String,
    /// Any of clone/HTTPS/SSH forms.
    pub repository_url: String,
    pub app_path: Option<String>,
    /// Ordered set of glob/prefix patterns; empty means "always match".
    pub watch_paths: Vec<String>,
    pub build_config: BuildConfig,
    pub auto_deploy: AutoDeployConfig,
    pub health: HealthSnapshot,
}

impl Service {
    /// Lowercased, hyphenated form used to build preview subdomains (§4.F).
    #[must_use]
    pub fn slug(&self) -> String {
        self.name
            .to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '-' })
            .collect::<String>()
    }
}
