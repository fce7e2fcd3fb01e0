//! Keyed digest for password reset tokens.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::errors::DomainError;

type HmacSha256 = Hmac<Sha256>;

/// HMAC-SHA256 of a raw reset token under a server-side key
///
/// Without the key a leaked digest table cannot be checked against guessed
/// tokens.
#[derive(Clone)]
pub struct ResetTokenDigest {
    key: Vec<u8>,
}

impl ResetTokenDigest {
    pub fn new(key: impl AsRef<[u8]>) -> Self {
        Self {
            key: key.as_ref().to_vec(),
        }
    }

    /// Hex digest of `raw`
    pub fn digest(&self, raw: &str) -> Result<String, DomainError> {
        let mut mac = HmacSha256::new_from_slice(&self.key).map_err(|_| DomainError::Internal {
            message: "invalid reset digest key".to_string(),
        })?;
        mac.update(raw.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }
}

impl std::fmt::Debug for ResetTokenDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResetTokenDigest")
            .field("key", &"[redacted]")
            .finish()
    }
}
