//! Token digests and random token material.

use rand::RngCore;
use sha2::{Digest, Sha256};

/// Value stored under a blacklist key
pub const BLACKLIST_SENTINEL: &str = "revoked";

/// Hex SHA-256 digest of a raw token
pub fn digest_token(raw: &str) -> String {
    format!("{:x}", Sha256::digest(raw.as_bytes()))
}

/// Cache key marking `raw_access_token` as revoked
pub fn blacklist_key(raw_access_token: &str) -> String {
    format!("blacklist:{}", digest_token(raw_access_token))
}

/// `bytes` bytes from the thread-local CSPRNG, hex encoded
pub fn random_token(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    rand::thread_rng().fill_bytes(&mut buf);
    hex::encode(buf)
}
