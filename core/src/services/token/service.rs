//! Token service: the operation surface of the credential engine

use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::{Claims, TokenPair, User};
use crate::errors::{DomainError, TokenError};
use crate::repositories::{RevocationCache, SessionRepository};
use crate::services::clock::Clock;

use super::config::TokenServiceConfig;
use super::issuer::TokenIssuer;
use super::revoker::SessionRevoker;
use super::rotator::RefreshRotator;
use super::signer::{JwtSigner, TokenSubject};
use super::validator::AccessTokenValidator;

/// Service wiring issuance, rotation, revocation and validation over one
/// session store and one revocation cache
pub struct TokenService<S: SessionRepository, C: RevocationCache> {
    signer: Arc<JwtSigner>,
    issuer: TokenIssuer<S>,
    rotator: RefreshRotator<S>,
    revoker: SessionRevoker<S, C>,
    validator: AccessTokenValidator<C>,
    clock: Arc<dyn Clock>,
    config: TokenServiceConfig,
}

impl<S: SessionRepository, C: RevocationCache> TokenService<S, C> {
    pub fn new(
        sessions: Arc<S>,
        cache: Arc<C>,
        clock: Arc<dyn Clock>,
        config: TokenServiceConfig,
    ) -> Self {
        let signer = Arc::new(JwtSigner::new(&config));

        Self {
            issuer: TokenIssuer::new(
                sessions.clone(),
                signer.clone(),
                clock.clone(),
                config.max_devices,
                config.refresh_ttl,
            ),
            rotator: RefreshRotator::new(sessions.clone(), signer.clone(), clock.clone()),
            revoker: SessionRevoker::new(sessions, cache.clone(), clock.clone()),
            validator: AccessTokenValidator::new(
                signer.clone(),
                cache,
                clock.clone(),
                config.revocation_check_policy,
            ),
            signer,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &TokenServiceConfig {
        &self.config
    }

    /// Issues a new pair for `user`, subject to the device limit
    pub async fn issue_tokens(&self, user: &User) -> Result<TokenPair, DomainError> {
        self.issuer.issue(&TokenSubject::from(user)).await
    }

    /// Rotates a refresh token whose claims the caller already verified
    pub async fn rotate(
        &self,
        old_refresh_token: &str,
        verified_claims: &Claims,
    ) -> Result<TokenPair, DomainError> {
        self.rotator.rotate(old_refresh_token, verified_claims).await
    }

    pub async fn revoke_one(&self, refresh_token: &str) -> Result<bool, DomainError> {
        self.revoker.revoke_one(refresh_token).await
    }

    pub async fn revoke_by_session(
        &self,
        session_token_id: &str,
        user_id: Uuid,
    ) -> Result<u64, DomainError> {
        self.revoker.revoke_by_session(session_token_id, user_id).await
    }

    pub async fn revoke_all(&self, user_id: Uuid) -> Result<u64, DomainError> {
        self.revoker.revoke_all(user_id).await
    }

    pub async fn blacklist_access_token(
        &self,
        raw_access_token: &str,
        exp: i64,
    ) -> Result<(), DomainError> {
        self.revoker.blacklist_access_token(raw_access_token, exp).await
    }

    /// Verifies an access token, blacklist included
    pub async fn validate_access_token(&self, raw: &str) -> Result<Claims, DomainError> {
        self.validator.validate(raw).await
    }

    /// Verifies a refresh token's signature and expiry only; whether it is
    /// still live is decided by the store during rotation
    pub fn decode_refresh_token(&self, raw: &str) -> Result<Claims, TokenError> {
        self.signer.decode_refresh(raw, self.clock.now())
    }
}
