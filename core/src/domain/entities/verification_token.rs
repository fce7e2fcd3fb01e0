//! Email verification token entity.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Single-use token gating account verification
///
/// At most one live row exists per user; creating a new token removes the
/// previous ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationToken {
    pub id: Uuid,

    /// Raw token value forwarded in the verification email
    pub token: String,

    /// User awaiting verification
    pub user_id: Uuid,

    pub expires_at: DateTime<Utc>,

    pub created_at: DateTime<Utc>,
}

impl VerificationToken {
    /// Creates a fresh random token for `user_id` valid for `ttl`
    pub fn new(user_id: Uuid, ttl: Duration, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            token: Uuid::new_v4().to_string(),
            user_id,
            expires_at: now + ttl,
            created_at: now,
        }
    }

    /// Checks if the token has expired
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}
