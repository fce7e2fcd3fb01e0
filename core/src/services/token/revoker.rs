//! Session deletion and access-token blacklisting.

use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::DomainError;
use crate::repositories::{RevocationCache, SessionRepository};
use crate::services::clock::Clock;

use super::digest::{blacklist_key, digest_token, BLACKLIST_SENTINEL};

/// Deletes session rows and writes blacklist entries
///
/// The two stores are written independently; there is no transaction
/// spanning the cache and the credential store.
pub struct SessionRevoker<S: SessionRepository, C: RevocationCache> {
    sessions: Arc<S>,
    cache: Arc<C>,
    clock: Arc<dyn Clock>,
}

impl<S: SessionRepository, C: RevocationCache> SessionRevoker<S, C> {
    pub fn new(sessions: Arc<S>, cache: Arc<C>, clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions,
            cache,
            clock,
        }
    }

    /// Deletes the session holding `refresh_token`
    ///
    /// # Returns
    /// * `Ok(false)` - no such session
    pub async fn revoke_one(&self, refresh_token: &str) -> Result<bool, DomainError> {
        let deleted = self
            .sessions
            .delete_by_hash(&digest_token(refresh_token))
            .await?;
        debug!(deleted, "Revoked session by refresh token");
        Ok(deleted)
    }

    /// Deletes the session matching both the session-token id and the owner
    pub async fn revoke_by_session(
        &self,
        session_token_id: &str,
        user_id: Uuid,
    ) -> Result<u64, DomainError> {
        let deleted = self
            .sessions
            .delete_by_session(session_token_id, user_id)
            .await?;
        info!(user_id = %user_id, deleted, "Revoked session");
        Ok(deleted)
    }

    /// Deletes every session of `user_id`
    pub async fn revoke_all(&self, user_id: Uuid) -> Result<u64, DomainError> {
        let deleted = self.sessions.delete_all_for_user(user_id).await?;
        info!(user_id = %user_id, deleted, "Revoked all sessions");
        Ok(deleted)
    }

    /// Blacklists `raw_access_token` until its `exp`
    ///
    /// Tokens already past `exp` are skipped without touching the cache.
    pub async fn blacklist_access_token(
        &self,
        raw_access_token: &str,
        exp: i64,
    ) -> Result<(), DomainError> {
        let ttl = exp - self.clock.now().timestamp();
        if ttl <= 0 {
            debug!("Access token already expired, not blacklisting");
            return Ok(());
        }

        self.cache
            .set(&blacklist_key(raw_access_token), BLACKLIST_SENTINEL, ttl as u64)
            .await?;
        debug!(ttl, "Blacklisted access token");
        Ok(())
    }
}
