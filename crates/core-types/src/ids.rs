use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// An opaque 128-bit identifier shared by every entity (§3).
///
/// Wrapping `Uuid` rather than passing it around bare keeps the entity kinds
/// from being accidentally interchanged (a `ReleaseId` cannot be passed where
/// a `ServiceId` is expected even though both are newtype-identical at
/// runtime) — callers construct the typed alias they need via `EntityId::new`
/// or `From<Uuid>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(Uuid);

impl EntityId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for EntityId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for EntityId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}
