//! `X-Hub-Signature-256` verification (§4.C, §6). Grounded on
//! `integrations::webhooks::verify_webhook_signature`: HMAC-SHA256 over the
//! raw body, compared in constant time via `subtle::ConstantTimeEq` so a
//! mismatching byte never shortens the comparison (testable property 2).

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::{IntakeError, IntakeResult};

type HmacSha256 = Hmac<Sha256>;

const SIGNATURE_PREFIX: &str = "sha256=";

/// Verifies `header` against `body` under `secret`. `None` secret means the
/// caller should have already rejected with [`IntakeError::NotConfigured`]
/// before reaching this — kept as a precondition, not handled here, so the
/// two failure modes stay distinguishable at the call site.
pub fn verify(header: Option<&str>, body: &[u8], secret: &str) -> IntakeResult<()> {
    let header = header.ok_or(IntakeError::MissingSignature)?;
    let hex_digest = header.strip_prefix(SIGNATURE_PREFIX).ok_or(IntakeError::InvalidSignature)?;
    let provided = hex::decode(hex_digest).map_err(|_| IntakeError::InvalidSignature)?;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| IntakeError::InvalidSignature)?;
    mac.update(body);
    let computed = mac.finalize().into_bytes();

    if computed.as_slice().ct_eq(&provided).into() {
        Ok(())
    } else {
        Err(IntakeError::InvalidSignature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hmac::Mac;

    fn sign(body: &[u8], secret: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(body);
        format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
    }

    #[test]
    fn valid_signature_is_accepted() {
        let body = b"{\"after\":\"abc\"}";
        let header = sign(body, "s3cret");
        assert!(verify(Some(&header), body, "s3cret").is_ok());
    }

    #[test]
    fn missing_header_is_rejected() {
        let err = verify(None, b"body", "s3cret").unwrap_err();
        assert!(matches!(err, IntakeError::MissingSignature));
    }

    #[test]
    fn tampered_body_is_rejected() {
        let body = b"{\"after\":\"abc\"}";
        let header = sign(body, "s3cret");
        assert!(verify(Some(&header), b"{\"after\":\"xyz\"}", "s3cret").is_err());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let body = b"payload";
        let header = sign(body, "right-secret");
        let err = verify(Some(&header), body, "wrong-secret").unwrap_err();
        assert!(matches!(err, IntakeError::InvalidSignature));
    }
}
