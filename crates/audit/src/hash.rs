use sha2::{Digest, Sha256};

/// SHA-256 hash of a value, hex-encoded. Used by the env-var store (§4.envvars)
/// to write differential audit trails ("a SHA-256 hash of old/new values")
/// without ever logging plaintext.
#[must_use]
pub fn hash_value(value: &str) -> String {
    let digest = Sha256::digest(value.as_bytes());
    hex::encode(digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic_and_does_not_reveal_length_trivially() {
        let h1 = hash_value("s3cret");
        let h2 = hash_value("s3cret");
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64);
        assert_ne!(h1, hash_value("different"));
    }
}
