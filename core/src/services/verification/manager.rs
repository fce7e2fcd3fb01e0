//! Verification token manager

use chrono::Duration;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::entities::VerificationToken;
use crate::domain::value_objects::VerificationOutcome;
use crate::errors::DomainError;
use crate::repositories::VerificationTokenRepository;
use crate::services::clock::Clock;

/// Creates and redeems email verification tokens
///
/// A token moves from pending to either verified (redeemed in time) or
/// purged (redeemed late, taking the unverified account with it).
pub struct VerificationTokenManager<V: VerificationTokenRepository> {
    repository: Arc<V>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl<V: VerificationTokenRepository> VerificationTokenManager<V> {
    pub fn new(repository: Arc<V>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            repository,
            clock,
            ttl,
        }
    }

    /// Builds a token for `user_id` without persisting it
    pub fn prepare(&self, user_id: Uuid) -> VerificationToken {
        VerificationToken::new(user_id, self.ttl, self.clock.now())
    }

    /// Replaces any token of `user_id` with a fresh one and returns its raw
    /// value
    pub async fn create(&self, user_id: Uuid) -> Result<String, DomainError> {
        let token = self.prepare(user_id);
        self.repository.replace_for_user(&token).await?;

        debug!(user_id = %user_id, expires_at = %token.expires_at, "Created verification token");
        Ok(token.token)
    }

    /// Redeems `token`
    pub async fn verify(&self, token: &str) -> Result<VerificationOutcome, DomainError> {
        let (record, user) = match self.repository.find_with_user(token).await? {
            Some(found) => found,
            None => return Ok(VerificationOutcome::NotFound),
        };

        let now = self.clock.now();
        if record.is_expired(now) {
            let purged = self.repository.purge(record.id, user.id).await?;
            info!(
                user_id = %user.id,
                users_deleted = purged.users,
                "Verification token expired, pending account purged"
            );
            return Ok(VerificationOutcome::Expired);
        }

        match self.repository.confirm(record.id, user.id, now).await? {
            Some(verified) => {
                info!(user_id = %verified.id, "Email verified");
                Ok(VerificationOutcome::Verified(verified.profile()))
            }
            // Redeemed concurrently
            None => Ok(VerificationOutcome::NotFound),
        }
    }

    /// The live token of `user_id`, if any
    pub async fn pending_token(
        &self,
        user_id: Uuid,
    ) -> Result<Option<VerificationToken>, DomainError> {
        self.repository.find_by_user(user_id).await
    }

    /// Whether `token` is still within its lifetime
    pub fn is_live(&self, token: &VerificationToken) -> bool {
        !token.is_expired(self.clock.now())
    }

    /// Deletes `token` and its owner if still unverified
    pub async fn discard(&self, token: &VerificationToken) -> Result<(), DomainError> {
        self.repository.purge(token.id, token.user_id).await?;
        Ok(())
    }
}
