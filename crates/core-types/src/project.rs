use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::EntityId;

/// Container for [`crate::service::Service`]s (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: EntityId,
    /// URL-safe, unique.
    pub slug: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    #[must_use]
    pub fn new(slug: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: EntityId::new(),
            slug: slug.into(),
            name: name.into(),
            created_at: now,
            updated_at: now,
        }
    }
}
