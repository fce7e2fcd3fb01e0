//! Password reset token entity.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Password reset token record
///
/// Only a keyed digest of the token is persisted; the raw value exists in
/// the reset email alone. One row per user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordResetToken {
    pub id: Uuid,

    /// Hex HMAC-SHA256 digest of the raw token
    pub token_digest: String,

    pub user_id: Uuid,

    pub expires_at: DateTime<Utc>,

    pub created_at: DateTime<Utc>,
}

impl PasswordResetToken {
    pub fn new(user_id: Uuid, token_digest: String, ttl: Duration, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            token_digest,
            user_id,
            expires_at: now + ttl,
            created_at: now,
        }
    }

    /// Checks if the token has expired; it is still usable at `expires_at`
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}
