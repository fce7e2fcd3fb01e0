//! Password reset token repository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::{PasswordResetToken, User};
use crate::errors::DomainError;

/// Repository trait for password reset tokens, one row per user
#[async_trait]
pub trait PasswordResetTokenRepository: Send + Sync {
    /// Upsert `token` keyed on its user unless an unexpired row exists
    ///
    /// The check and the write happen in one transaction.
    ///
    /// # Returns
    /// * `Ok(true)` - Token stored
    /// * `Ok(false)` - An unexpired token already exists; nothing changed
    async fn upsert_unless_active(
        &self,
        token: &PasswordResetToken,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError>;

    /// Find a token by digest together with the owning user
    async fn find_with_user_by_digest(
        &self,
        token_digest: &str,
    ) -> Result<Option<(PasswordResetToken, User)>, DomainError>;

    /// Burn the unexpired token `token_digest` of `user_id` and store the new
    /// password hash in one transaction
    ///
    /// The password changes only if this call removed the token, so a token
    /// can complete at most one reset.
    ///
    /// # Returns
    /// * `Ok(false)` - No live token matched; nothing changed
    async fn consume(
        &self,
        token_digest: &str,
        user_id: Uuid,
        new_password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError>;

    /// Delete tokens whose expiry lies before `now`
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, DomainError>;
}
