use serde::{Deserialize, Serialize};

use crate::ids::EntityId;

/// A deployment target scoped to a project (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Environment {
    pub id: EntityId,
    pub project_id: EntityId,
    pub name: String,
    pub namespace: String,
}

impl Environment {
    /// Auto-created environments derive their namespace from the name
    /// (§4.D "auto-creating it (with derived namespace `enclii-{env-name-lowercased}`)").
    #[must_use]
    pub fn derive_namespace(env_name: &str) -> String {
        format!("enclii-{}", env_name.to_lowercase())
    }
}
