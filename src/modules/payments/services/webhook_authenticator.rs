use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the notification signature
pub const SIGNATURE_HEADER: &str = "X-Webhook-Signature";

const SIGNATURE_PREFIX: &str = "sha256=";

/// Check a notification's HMAC-SHA256 signature over the raw body.
///
/// The header holds a hex digest, optionally prefixed with `sha256=`.
/// Returns false on any missing or malformed input; never errors.
pub fn authenticate(
    signature_header: Option<&str>,
    raw_body: &[u8],
    shared_secret: Option<&str>,
) -> bool {
    let (Some(header), Some(secret)) = (signature_header, shared_secret) else {
        return false;
    };
    if secret.is_empty() || raw_body.is_empty() {
        return false;
    }

    let header = header.trim();
    let hex_digest = header.strip_prefix(SIGNATURE_PREFIX).unwrap_or(header);
    if hex_digest.is_empty() {
        return false;
    }

    let Ok(provided) = hex::decode(hex_digest) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(raw_body);

    // constant-time
    mac.verify_slice(&provided).is_ok()
}

/// Lowercase hex HMAC-SHA256 of `body`, as a sender would put in the header
pub fn compute_signature(body: &[u8], secret: &str) -> String {
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        // HMAC accepts keys of any length
        Err(_) => return String::new(),
    };
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}
