//! Access-token validation including the blacklist check.

use std::sync::Arc;
use tracing::warn;

use cb_shared::config::RevocationCheckPolicy;

use crate::domain::entities::Claims;
use crate::errors::{DomainError, TokenError};
use crate::repositories::RevocationCache;
use crate::services::clock::Clock;

use super::digest::blacklist_key;
use super::signer::JwtSigner;

/// Verifies access tokens and rejects blacklisted ones
pub struct AccessTokenValidator<C: RevocationCache> {
    signer: Arc<JwtSigner>,
    cache: Arc<C>,
    clock: Arc<dyn Clock>,
    policy: RevocationCheckPolicy,
}

impl<C: RevocationCache> AccessTokenValidator<C> {
    pub fn new(
        signer: Arc<JwtSigner>,
        cache: Arc<C>,
        clock: Arc<dyn Clock>,
        policy: RevocationCheckPolicy,
    ) -> Self {
        Self {
            signer,
            cache,
            clock,
            policy,
        }
    }

    /// Returns the claims of `raw` if its signature and expiry check out and
    /// it is not blacklisted
    ///
    /// When the cache cannot be reached the configured policy decides:
    /// fail-open accepts with a warning, fail-closed returns the cache error.
    pub async fn validate(&self, raw: &str) -> Result<Claims, DomainError> {
        let claims = self.signer.decode_access(raw, self.clock.now())?;

        match self.cache.get(&blacklist_key(raw)).await {
            Ok(Some(_)) => {
                warn!(target: "security", user_id = %claims.sub, "Blacklisted access token presented");
                Err(TokenError::TokenRevoked.into())
            }
            Ok(None) => Ok(claims),
            Err(e) => match self.policy {
                RevocationCheckPolicy::FailOpen => {
                    warn!(
                        target: "security",
                        user_id = %claims.sub,
                        error = %e,
                        "Revocation cache unavailable, accepting access token"
                    );
                    Ok(claims)
                }
                RevocationCheckPolicy::FailClosed => {
                    warn!(
                        target: "security",
                        user_id = %claims.sub,
                        error = %e,
                        "Revocation cache unavailable, rejecting access token"
                    );
                    Err(e)
                }
            },
        }
    }
}
