//! Mock credential store backed by one shared, lock-protected state
//!
//! Holding a single write lock for the whole of a multi-row operation gives
//! the same all-or-nothing behaviour the SQL implementation gets from a
//! transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::{PasswordResetToken, Session, User, VerificationToken};
use crate::errors::{AuthError, DomainError};
use crate::repositories::password_reset::PasswordResetTokenRepository;
use crate::repositories::session::{SessionInsert, SessionRepository};
use crate::repositories::user::UserRepository;
use crate::repositories::verification::{PurgeCount, VerificationTokenRepository};

#[derive(Default)]
struct StoreState {
    users: HashMap<Uuid, User>,
    sessions: Vec<Session>,
    verification_tokens: Vec<VerificationToken>,
    reset_tokens: HashMap<Uuid, PasswordResetToken>,
}

impl StoreState {
    fn remove_user(&mut self, user_id: Uuid) -> bool {
        let removed = self.users.remove(&user_id).is_some();
        if removed {
            self.sessions.retain(|s| s.owner_id != user_id);
            self.verification_tokens.retain(|t| t.user_id != user_id);
            self.reset_tokens.remove(&user_id);
        }
        removed
    }
}

/// Mock credential store for testing
#[derive(Clone, Default)]
pub struct MockCredentialStore {
    state: Arc<RwLock<StoreState>>,
    unavailable: Arc<AtomicBool>,
}

impl MockCredentialStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with `StoreUnavailable`
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), DomainError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DomainError::StoreUnavailable {
                message: "mock store offline".to_string(),
            });
        }
        Ok(())
    }

    /// Seed a user directly
    pub async fn insert_user(&self, user: User) {
        self.state.write().await.users.insert(user.id, user);
    }

    /// Seed a session directly, bypassing the device limit
    pub async fn insert_session(&self, session: Session) {
        self.state.write().await.sessions.push(session);
    }

    /// Seed a verification token directly
    pub async fn insert_verification_token(&self, token: VerificationToken) {
        self.state.write().await.verification_tokens.push(token);
    }

    pub async fn user(&self, user_id: Uuid) -> Option<User> {
        self.state.read().await.users.get(&user_id).cloned()
    }

    pub async fn sessions_for(&self, user_id: Uuid) -> Vec<Session> {
        self.state
            .read()
            .await
            .sessions
            .iter()
            .filter(|s| s.owner_id == user_id)
            .cloned()
            .collect()
    }

    pub async fn verification_tokens_for(&self, user_id: Uuid) -> Vec<VerificationToken> {
        self.state
            .read()
            .await
            .verification_tokens
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect()
    }

    pub async fn reset_token_for(&self, user_id: Uuid) -> Option<PasswordResetToken> {
        self.state.read().await.reset_tokens.get(&user_id).cloned()
    }
}

#[async_trait]
impl UserRepository for MockCredentialStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        self.check()?;
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        self.check()?;
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.email == email).cloned())
    }

    async fn create_pending(
        &self,
        user: &User,
        token: &VerificationToken,
    ) -> Result<(), DomainError> {
        self.check()?;
        let mut state = self.state.write().await;

        if state.users.values().any(|u| u.email == user.email) {
            return Err(AuthError::EmailAlreadyRegistered.into());
        }

        state.users.insert(user.id, user.clone());
        state.verification_tokens.push(token.clone());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        self.check()?;
        Ok(self.state.write().await.remove_user(id))
    }
}

#[async_trait]
impl SessionRepository for MockCredentialStore {
    async fn insert_within_limit(
        &self,
        session: &Session,
        limit: usize,
        stale_before: DateTime<Utc>,
    ) -> Result<SessionInsert, DomainError> {
        self.check()?;
        let mut state = self.state.write().await;

        let active = state
            .sessions
            .iter()
            .filter(|s| s.owner_id == session.owner_id && s.created_at > stale_before)
            .count();
        if active >= limit {
            return Ok(SessionInsert::LimitReached { active });
        }

        state
            .sessions
            .retain(|s| !(s.owner_id == session.owner_id && s.created_at <= stale_before));
        state.sessions.push(session.clone());
        Ok(SessionInsert::Inserted)
    }

    async fn replace(
        &self,
        old_hash: &str,
        owner_id: Uuid,
        replacement: &Session,
    ) -> Result<bool, DomainError> {
        self.check()?;
        let mut state = self.state.write().await;

        let position = state
            .sessions
            .iter()
            .position(|s| s.refresh_token_hash == old_hash && s.owner_id == owner_id);
        match position {
            Some(index) => {
                state.sessions.remove(index);
                state.sessions.push(replacement.clone());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find_by_hash(&self, refresh_token_hash: &str) -> Result<Option<Session>, DomainError> {
        self.check()?;
        let state = self.state.read().await;
        Ok(state
            .sessions
            .iter()
            .find(|s| s.refresh_token_hash == refresh_token_hash)
            .cloned())
    }

    async fn count_for_user(&self, user_id: Uuid) -> Result<usize, DomainError> {
        self.check()?;
        let state = self.state.read().await;
        Ok(state.sessions.iter().filter(|s| s.owner_id == user_id).count())
    }

    async fn delete_by_hash(&self, refresh_token_hash: &str) -> Result<bool, DomainError> {
        self.check()?;
        let mut state = self.state.write().await;
        let before = state.sessions.len();
        state
            .sessions
            .retain(|s| s.refresh_token_hash != refresh_token_hash);
        Ok(state.sessions.len() < before)
    }

    async fn delete_by_session(
        &self,
        session_token_id: &str,
        user_id: Uuid,
    ) -> Result<u64, DomainError> {
        self.check()?;
        let mut state = self.state.write().await;
        let before = state.sessions.len();
        state
            .sessions
            .retain(|s| !(s.session_token_id == session_token_id && s.owner_id == user_id));
        Ok((before - state.sessions.len()) as u64)
    }

    async fn delete_all_for_user(&self, user_id: Uuid) -> Result<u64, DomainError> {
        self.check()?;
        let mut state = self.state.write().await;
        let before = state.sessions.len();
        state.sessions.retain(|s| s.owner_id != user_id);
        Ok((before - state.sessions.len()) as u64)
    }

    async fn delete_created_before(&self, cutoff: DateTime<Utc>) -> Result<u64, DomainError> {
        self.check()?;
        let mut state = self.state.write().await;
        let before = state.sessions.len();
        state.sessions.retain(|s| s.created_at > cutoff);
        Ok((before - state.sessions.len()) as u64)
    }
}

#[async_trait]
impl VerificationTokenRepository for MockCredentialStore {
    async fn replace_for_user(&self, token: &VerificationToken) -> Result<(), DomainError> {
        self.check()?;
        let mut state = self.state.write().await;
        state
            .verification_tokens
            .retain(|t| t.user_id != token.user_id);
        state.verification_tokens.push(token.clone());
        Ok(())
    }

    async fn find_with_user(
        &self,
        token: &str,
    ) -> Result<Option<(VerificationToken, User)>, DomainError> {
        self.check()?;
        let state = self.state.read().await;
        Ok(state
            .verification_tokens
            .iter()
            .find(|t| t.token == token)
            .and_then(|t| state.users.get(&t.user_id).map(|u| (t.clone(), u.clone()))))
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<VerificationToken>, DomainError> {
        self.check()?;
        let state = self.state.read().await;
        Ok(state
            .verification_tokens
            .iter()
            .find(|t| t.user_id == user_id)
            .cloned())
    }

    async fn confirm(
        &self,
        token_id: Uuid,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, DomainError> {
        self.check()?;
        let mut state = self.state.write().await;

        let before = state.verification_tokens.len();
        state.verification_tokens.retain(|t| t.id != token_id);
        if state.verification_tokens.len() == before {
            return Ok(None);
        }

        match state.users.get_mut(&user_id) {
            Some(user) => {
                user.verify(now);
                Ok(Some(user.clone()))
            }
            None => Ok(None),
        }
    }

    async fn purge(&self, token_id: Uuid, user_id: Uuid) -> Result<PurgeCount, DomainError> {
        self.check()?;
        let mut state = self.state.write().await;
        let mut count = PurgeCount::default();

        let before = state.verification_tokens.len();
        state.verification_tokens.retain(|t| t.id != token_id);
        count.tokens = (before - state.verification_tokens.len()) as u64;

        let unverified = state
            .users
            .get(&user_id)
            .map(|u| !u.is_verified)
            .unwrap_or(false);
        if unverified && state.remove_user(user_id) {
            count.users = 1;
        }
        Ok(count)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<PurgeCount, DomainError> {
        self.check()?;
        let mut state = self.state.write().await;
        let mut count = PurgeCount::default();

        let expired: Vec<VerificationToken> = state
            .verification_tokens
            .iter()
            .filter(|t| t.is_expired(now))
            .cloned()
            .collect();

        for token in expired {
            state.verification_tokens.retain(|t| t.id != token.id);
            count.tokens += 1;

            let unverified = state
                .users
                .get(&token.user_id)
                .map(|u| !u.is_verified)
                .unwrap_or(false);
            if unverified && state.remove_user(token.user_id) {
                count.users += 1;
            }
        }
        Ok(count)
    }
}

#[async_trait]
impl PasswordResetTokenRepository for MockCredentialStore {
    async fn upsert_unless_active(
        &self,
        token: &PasswordResetToken,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        self.check()?;
        let mut state = self.state.write().await;

        if let Some(existing) = state.reset_tokens.get(&token.user_id) {
            if !existing.is_expired(now) {
                return Ok(false);
            }
        }
        state.reset_tokens.insert(token.user_id, token.clone());
        Ok(true)
    }

    async fn find_with_user_by_digest(
        &self,
        token_digest: &str,
    ) -> Result<Option<(PasswordResetToken, User)>, DomainError> {
        self.check()?;
        let state = self.state.read().await;
        Ok(state
            .reset_tokens
            .values()
            .find(|t| t.token_digest == token_digest)
            .and_then(|t| state.users.get(&t.user_id).map(|u| (t.clone(), u.clone()))))
    }

    async fn consume(
        &self,
        token_digest: &str,
        user_id: Uuid,
        new_password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        self.check()?;
        let mut state = self.state.write().await;

        let live = matches!(
            state.reset_tokens.get(&user_id),
            Some(t) if t.token_digest == token_digest && !t.is_expired(now)
        );
        if !live || !state.users.contains_key(&user_id) {
            return Ok(false);
        }

        state.reset_tokens.remove(&user_id);
        if let Some(user) = state.users.get_mut(&user_id) {
            user.set_password_hash(new_password_hash.to_string(), now);
        }
        Ok(true)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, DomainError> {
        self.check()?;
        let mut state = self.state.write().await;
        let before = state.reset_tokens.len();
        state.reset_tokens.retain(|_, t| !t.is_expired(now));
        Ok((before - state.reset_tokens.len()) as u64)
    }
}
