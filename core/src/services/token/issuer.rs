//! Device-limited issuance of access/refresh pairs.

use chrono::Duration;
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::entities::{Session, TokenPair};
use crate::errors::{DomainError, TokenError};
use crate::repositories::{SessionInsert, SessionRepository};
use crate::services::clock::Clock;

use super::digest::{digest_token, random_token};
use super::signer::{JwtSigner, TokenSubject};

/// Mints token pairs and records the session that makes the refresh token
/// usable
pub struct TokenIssuer<S: SessionRepository> {
    sessions: Arc<S>,
    signer: Arc<JwtSigner>,
    clock: Arc<dyn Clock>,
    max_devices: usize,
    refresh_ttl: Duration,
}

impl<S: SessionRepository> TokenIssuer<S> {
    pub fn new(
        sessions: Arc<S>,
        signer: Arc<JwtSigner>,
        clock: Arc<dyn Clock>,
        max_devices: usize,
        refresh_ttl: Duration,
    ) -> Self {
        Self {
            sessions,
            signer,
            clock,
            max_devices,
            refresh_ttl,
        }
    }

    /// Issues a new pair for `subject`
    ///
    /// Signing happens first; the pair only becomes usable once the session
    /// row is committed. A failed insert leaves a refresh token that no store
    /// lookup will ever accept.
    ///
    /// # Returns
    /// * `Err(TokenError::DeviceLimitExceeded)` - the user already holds the
    ///   maximum number of live sessions; nothing was written
    pub async fn issue(&self, subject: &TokenSubject) -> Result<TokenPair, DomainError> {
        let now = self.clock.now();
        let session_token = random_token(16);
        let pair = self.signer.sign_pair(subject, &session_token, now)?;

        let session = Session::new(
            subject.user_id,
            digest_token(&pair.refresh_token),
            session_token,
            now,
        );
        let stale_before = now - self.refresh_ttl;

        match self
            .sessions
            .insert_within_limit(&session, self.max_devices, stale_before)
            .await?
        {
            SessionInsert::Inserted => {
                info!(user_id = %subject.user_id, session_id = %session.id, "Issued token pair");
                Ok(pair)
            }
            SessionInsert::LimitReached { active } => {
                warn!(
                    user_id = %subject.user_id,
                    active,
                    limit = self.max_devices,
                    "Device limit reached, refusing new session"
                );
                Err(TokenError::DeviceLimitExceeded {
                    limit: self.max_devices,
                }
                .into())
            }
        }
    }
}
