//! Session entity: one row per active login, holding the refresh token.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Refresh-token record for one login session
///
/// Only the SHA-256 digest of the refresh token is stored. The digest is
/// unique and the row is deleted as soon as the token is rotated or revoked,
/// which is what makes a refresh token single-use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Unique identifier for the session row
    pub id: Uuid,

    /// User this session belongs to
    pub owner_id: Uuid,

    /// Hex SHA-256 digest of the refresh token
    pub refresh_token_hash: String,

    /// Correlation id embedded in both tokens of the pair
    pub session_token_id: String,

    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(
        owner_id: Uuid,
        refresh_token_hash: String,
        session_token_id: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            refresh_token_hash,
            session_token_id,
            created_at: now,
        }
    }
}
