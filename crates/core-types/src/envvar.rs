use serde::{Deserialize, Serialize};

use crate::ids::EntityId;

/// Environment-variable store entry (§4.envvars). Keys match
/// `^[A-Za-z_][A-Za-z0-9_]*$`, length 1..255, unique per (service,
/// environment-or-null). Secret values are masked on list/get; `reveal` is a
/// distinct operation that writes a mandatory audit entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvVar {
    pub id: EntityId,
    pub service_id: EntityId,
    /// `None` means the variable is unscoped (applies to every environment).
    pub environment_id: Option<EntityId>,
    pub key: String,
    pub value: String,
    pub secret: bool,
    /// SHA-256 hash of the value at last write, used for differential
    /// auditing without ever logging plaintext.
    pub value_hash: String,
}

impl EnvVar {
    pub const MASK: &'static str = "••••••••";

    #[must_use]
    pub fn masked_value(&self) -> &str {
        if self.secret {
            Self::MASK
        } else {
            &self.value
        }
    }

    #[must_use]
    pub fn key_pattern_valid(key: &str) -> bool {
        let mut chars = key.chars();
        let Some(first) = chars.next() else {
            return false;
        };
        if !(first.is_ascii_alphabetic() || first == '_') {
            return false;
        }
        if key.len() > 255 {
            return false;
        }
        chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_pattern_rejects_leading_digit() {
        assert!(!EnvVar::key_pattern_valid("1BAD"));
        assert!(EnvVar::key_pattern_valid("_OK_1"));
        assert!(EnvVar::key_pattern_valid("DB_PASSWORD"));
        assert!(!EnvVar::key_pattern_valid(""));
    }

    #[test]
    fn masked_value_hides_secrets_only() {
        let mut v = EnvVar {
            id: EntityId::new(),
            service_id: EntityId::new(),
            environment_id: None,
            key: "DB_PASSWORD".to_string(),
            value: "s3cret".to_string(),
            secret: true,
            value_hash: String::new(),
        };
        assert_eq!(v.masked_value(), EnvVar::MASK);
        v.secret = false;
        assert_eq!(v.masked_value(), "s3cret");
    }
}
