//! HMAC-SHA1 Webhook Signing
//!
//! Verifies inbound webhook payloads against the tenant's signing secret.
//! The chat platform signs the raw request body with HMAC-SHA1 and sends the
//! hex digest in a header.

use hmac::{Hmac, Mac};
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;

/// Header carrying the hex HMAC-SHA1 signature of the raw body.
pub const SIGNATURE_HEADER: &str = "X-Spark-Signature";

/// Sign a payload with HMAC-SHA1 and return the hex-encoded signature.
pub fn sign_payload(secret: &str, payload: &[u8]) -> String {
    let mut mac =
        HmacSha1::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

/// Verify an HMAC-SHA1 signature against a payload. A missing header should
/// be passed as an empty string and fails the length check.
pub fn verify_signature(secret: &str, payload: &[u8], signature: &str) -> bool {
    let expected = sign_payload(secret, payload);
    // Constant-time comparison
    expected.len() == signature.len()
        && expected
            .as_bytes()
            .iter()
            .zip(signature.as_bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}

/// Generate a random 32-byte hex signing secret.
pub fn generate_signing_secret() -> String {
    use rand::Rng;
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill(&mut bytes);
    hex::encode(bytes)
}
