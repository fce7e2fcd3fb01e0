//! Verification token repository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::{User, VerificationToken};
use crate::errors::DomainError;

/// Rows removed by an expiry purge
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PurgeCount {
    pub tokens: u64,
    pub users: u64,
}

/// Repository trait for email verification tokens
#[async_trait]
pub trait VerificationTokenRepository: Send + Sync {
    /// Delete every token of `token.user_id` and insert `token`, atomically
    async fn replace_for_user(&self, token: &VerificationToken) -> Result<(), DomainError>;

    /// Find a token by its raw value together with the owning user
    async fn find_with_user(
        &self,
        token: &str,
    ) -> Result<Option<(VerificationToken, User)>, DomainError>;

    /// Find the live token of a user, if any
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<VerificationToken>, DomainError>;

    /// Mark the owner verified and delete the token row in one transaction
    ///
    /// # Returns
    /// * `Ok(Some(User))` - The updated user
    /// * `Ok(None)` - The token row no longer exists; nothing changed
    async fn confirm(
        &self,
        token_id: Uuid,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, DomainError>;

    /// Delete the token and its owner in one transaction
    ///
    /// The owner is only deleted while still unverified.
    async fn purge(&self, token_id: Uuid, user_id: Uuid) -> Result<PurgeCount, DomainError>;

    /// Delete every token that expired before `now` along with its
    /// still-unverified owner
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<PurgeCount, DomainError>;
}
