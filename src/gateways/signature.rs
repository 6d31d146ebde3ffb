use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Hex-encoded HMAC-SHA256 of `message` keyed by `key`.
pub fn hmac_sha256_hex(key: &str, message: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(key.as_bytes()).expect("HMAC can take key of any size");
    mac.update(message.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

pub fn verify_hmac_sha256_hex(key: &str, message: &str, provided: &str) -> bool {
    let expected = hmac_sha256_hex(key, message);
    expected.as_bytes().ct_eq(provided.as_bytes()).unwrap_u8() == 1
}
