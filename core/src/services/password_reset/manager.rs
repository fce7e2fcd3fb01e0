//! Password reset token manager

use chrono::Duration;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::entities::{PasswordResetToken, User};
use crate::errors::{DomainError, TokenError};
use crate::repositories::PasswordResetTokenRepository;
use crate::services::clock::Clock;
use crate::services::token::random_token;

use super::digest::ResetTokenDigest;

/// Creates, verifies and consumes password reset tokens
///
/// Only the keyed digest is persisted. A pending token is never silently
/// replaced by a new request.
pub struct PasswordResetTokenManager<P: PasswordResetTokenRepository> {
    repository: Arc<P>,
    clock: Arc<dyn Clock>,
    digest: ResetTokenDigest,
    ttl: Duration,
}

impl<P: PasswordResetTokenRepository> PasswordResetTokenManager<P> {
    pub fn new(
        repository: Arc<P>,
        clock: Arc<dyn Clock>,
        digest: ResetTokenDigest,
        ttl: Duration,
    ) -> Self {
        Self {
            repository,
            clock,
            digest,
            ttl,
        }
    }

    /// Creates a reset token for `user_id` and returns the raw value
    ///
    /// # Returns
    /// * `Err(TokenError::ResetAlreadyPending)` - an unexpired token exists
    pub async fn create(&self, user_id: Uuid) -> Result<String, DomainError> {
        let now = self.clock.now();
        let raw = random_token(32);
        let token = PasswordResetToken::new(user_id, self.digest.digest(&raw)?, self.ttl, now);

        if !self.repository.upsert_unless_active(&token, now).await? {
            warn!(user_id = %user_id, "Password reset requested while one is pending");
            return Err(TokenError::ResetAlreadyPending.into());
        }

        debug!(user_id = %user_id, expires_at = %token.expires_at, "Created password reset token");
        Ok(raw)
    }

    /// Returns the owner of `raw` if the token exists and is unexpired
    pub async fn verify(&self, raw: &str) -> Result<Option<User>, DomainError> {
        let digest = self.digest.digest(raw)?;

        match self.repository.find_with_user_by_digest(&digest).await? {
            Some((token, user)) if !token.is_expired(self.clock.now()) => Ok(Some(user)),
            Some(_) => {
                debug!("Password reset token expired");
                Ok(None)
            }
            None => Ok(None),
        }
    }

    /// Burns `raw` and stores the new password hash in one transaction
    ///
    /// # Returns
    /// * `Err(DomainError::NotFound)` - the token was already used, has
    ///   expired or does not belong to `user_id`
    pub async fn consume(
        &self,
        raw: &str,
        user_id: Uuid,
        new_password_hash: &str,
    ) -> Result<(), DomainError> {
        let digest = self.digest.digest(raw)?;
        let updated = self
            .repository
            .consume(&digest, user_id, new_password_hash, self.clock.now())
            .await?;
        if !updated {
            warn!(
                target: "security",
                user_id = %user_id,
                "Rejected reuse of a password reset token"
            );
            return Err(reset_token_not_found());
        }

        info!(user_id = %user_id, "Password reset completed");
        Ok(())
    }
}

/// Outcome for a reset token that is unknown, expired or already used
pub(crate) fn reset_token_not_found() -> DomainError {
    DomainError::NotFound {
        resource: "password reset token".to_string(),
    }
}
