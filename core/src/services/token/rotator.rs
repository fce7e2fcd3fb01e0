//! Single-use refresh rotation.

use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::entities::{Claims, Session, TokenPair};
use crate::errors::{DomainError, TokenError};
use crate::repositories::SessionRepository;
use crate::services::clock::Clock;

use super::digest::{digest_token, random_token};
use super::signer::{JwtSigner, TokenSubject};

/// Replaces a verified refresh token with a new pair
pub struct RefreshRotator<S: SessionRepository> {
    sessions: Arc<S>,
    signer: Arc<JwtSigner>,
    clock: Arc<dyn Clock>,
}

impl<S: SessionRepository> RefreshRotator<S> {
    pub fn new(sessions: Arc<S>, signer: Arc<JwtSigner>, clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions,
            signer,
            clock,
        }
    }

    /// Rotates `old_refresh_token`, whose signature the caller has verified
    /// into `claims`
    ///
    /// Only `sub`, `email` and `isVerified` are carried over; the new pair
    /// gets a fresh session-token id. The old session row is deleted and the
    /// new one inserted in the same transaction.
    ///
    /// # Returns
    /// * `Err(TokenError::AccessDenied)` - the token was already consumed,
    ///   revoked, or belongs to a different user than `claims.sub`
    pub async fn rotate(
        &self,
        old_refresh_token: &str,
        claims: &Claims,
    ) -> Result<TokenPair, DomainError> {
        let owner_id = match claims.user_id() {
            Some(id) => id,
            None => {
                warn!(target: "security", sub = %claims.sub, "Refresh claims carry a malformed subject");
                return Err(TokenError::AccessDenied.into());
            }
        };

        let now = self.clock.now();
        let subject = TokenSubject {
            user_id: owner_id,
            email: claims.email.clone(),
            is_verified: claims.is_verified,
        };
        let session_token = random_token(16);
        let pair = self.signer.sign_pair(&subject, &session_token, now)?;
        let replacement = Session::new(
            owner_id,
            digest_token(&pair.refresh_token),
            session_token,
            now,
        );

        let swapped = self
            .sessions
            .replace(&digest_token(old_refresh_token), owner_id, &replacement)
            .await?;
        if !swapped {
            warn!(
                target: "security",
                user_id = %owner_id,
                session_token = %claims.session_token,
                "Refresh token reuse or owner mismatch detected"
            );
            return Err(TokenError::AccessDenied.into());
        }

        info!(user_id = %owner_id, "Rotated refresh token");
        Ok(pair)
    }
}
