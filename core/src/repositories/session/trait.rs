//! Session repository trait: refresh-token records keyed by digest.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::Session;
use crate::errors::DomainError;

/// Outcome of a device-limited session insert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionInsert {
    Inserted,
    /// Nothing was written
    LimitReached { active: usize },
}

/// Repository trait for Session persistence
///
/// All lookups take the hex SHA-256 digest of the refresh token, never the
/// raw token.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Insert `session` unless its owner already holds `limit` live sessions
    ///
    /// Runs as one transaction that serialises concurrent inserts for the
    /// same owner. Sessions created before `stale_before` do not count and are
    /// deleted when the insert goes through. On `LimitReached` nothing changes.
    async fn insert_within_limit(
        &self,
        session: &Session,
        limit: usize,
        stale_before: DateTime<Utc>,
    ) -> Result<SessionInsert, DomainError>;

    /// Atomically swap the session holding `old_hash` for `replacement`
    ///
    /// # Returns
    /// * `Ok(true)` - Old row deleted and replacement inserted
    /// * `Ok(false)` - No row for `old_hash`, or it belongs to another user;
    ///   nothing was written
    async fn replace(
        &self,
        old_hash: &str,
        owner_id: Uuid,
        replacement: &Session,
    ) -> Result<bool, DomainError>;

    /// Find a session by refresh-token digest
    async fn find_by_hash(&self, refresh_token_hash: &str) -> Result<Option<Session>, DomainError>;

    /// Count live sessions for a user
    async fn count_for_user(&self, user_id: Uuid) -> Result<usize, DomainError>;

    /// Delete the session holding `refresh_token_hash`
    ///
    /// # Returns
    /// * `Ok(true)` - Session deleted
    /// * `Ok(false)` - Session not found
    async fn delete_by_hash(&self, refresh_token_hash: &str) -> Result<bool, DomainError>;

    /// Delete the session matching both the session-token id and the owner
    async fn delete_by_session(
        &self,
        session_token_id: &str,
        user_id: Uuid,
    ) -> Result<u64, DomainError>;

    /// Delete every session of a user
    async fn delete_all_for_user(&self, user_id: Uuid) -> Result<u64, DomainError>;

    /// Delete sessions created before `cutoff`
    async fn delete_created_before(&self, cutoff: DateTime<Utc>) -> Result<u64, DomainError>;
}
