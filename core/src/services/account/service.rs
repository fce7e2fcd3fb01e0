//! Account service implementation

use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use cb_shared::utils::email::{is_valid_email, mask_email, normalize_email};

use crate::domain::entities::{Claims, User};
use crate::domain::value_objects::{AuthResponse, NewUser, UserProfile, VerificationOutcome};
use crate::errors::{AuthError, DomainError, TokenError, ValidationError};
use crate::repositories::{
    PasswordResetTokenRepository, RevocationCache, SessionRepository, UserRepository,
    VerificationTokenRepository,
};
use crate::services::clock::Clock;
use crate::services::password_reset::{reset_token_not_found, PasswordResetTokenManager};
use crate::services::token::TokenService;
use crate::services::verification::VerificationTokenManager;

use super::config::{AuthServiceConfig, MIN_PASSWORD_LENGTH};
use super::email::{EmailSender, RESET_PASSWORD_TEMPLATE, VERIFY_EMAIL_TEMPLATE};
use super::password::{hash_password, verify_password};

/// Account service handling registration, login, logout and password reset
///
/// # Type Parameters
/// * `U` - User repository
/// * `S` - Session repository
/// * `V` - Verification token repository
/// * `P` - Password reset token repository
/// * `C` - Revocation cache
/// * `E` - Email sender
pub struct AuthService<U, S, V, P, C, E>
where
    U: UserRepository,
    S: SessionRepository,
    V: VerificationTokenRepository,
    P: PasswordResetTokenRepository,
    C: RevocationCache,
    E: EmailSender,
{
    users: Arc<U>,
    tokens: TokenService<S, C>,
    verification: VerificationTokenManager<V>,
    resets: PasswordResetTokenManager<P>,
    mailer: Arc<E>,
    clock: Arc<dyn Clock>,
    config: AuthServiceConfig,
}

impl<U, S, V, P, C, E> AuthService<U, S, V, P, C, E>
where
    U: UserRepository,
    S: SessionRepository,
    V: VerificationTokenRepository,
    P: PasswordResetTokenRepository,
    C: RevocationCache,
    E: EmailSender,
{
    pub fn new(
        users: Arc<U>,
        tokens: TokenService<S, C>,
        verification: VerificationTokenManager<V>,
        resets: PasswordResetTokenManager<P>,
        mailer: Arc<E>,
        clock: Arc<dyn Clock>,
        config: AuthServiceConfig,
    ) -> Self {
        Self {
            users,
            tokens,
            verification,
            resets,
            mailer,
            clock,
            config,
        }
    }

    /// The credential engine behind this service
    pub fn tokens(&self) -> &TokenService<S, C> {
        &self.tokens
    }

    /// Registers a new unverified account and mails its verification token
    ///
    /// An earlier registration of the same email whose verification window
    /// has lapsed is purged first. If the verification email cannot be sent
    /// the new account is removed again.
    pub async fn register(&self, new_user: NewUser) -> Result<UserProfile, DomainError> {
        let email = normalize_email(&new_user.email);
        Self::validate_registration(&new_user, &email)?;

        if let Some(existing) = self.users.find_by_email(&email).await? {
            if existing.is_verified || existing.is_deleted() {
                return Err(AuthError::EmailAlreadyRegistered.into());
            }
            match self.verification.pending_token(existing.id).await? {
                Some(token) if self.verification.is_live(&token) => {
                    return Err(AuthError::VerificationPending.into());
                }
                Some(token) => self.verification.discard(&token).await?,
                None => {
                    self.users.delete(existing.id).await?;
                }
            }
            info!(email = %mask_email(&email), "Purged lapsed registration");
        }

        let password_hash = hash_password(&new_user.password, self.config.bcrypt_cost)?;
        let user = User::new(
            email,
            new_user.first_name.trim().to_string(),
            new_user.last_name.trim().to_string(),
            password_hash,
            self.clock.now(),
        );
        let token = self.verification.prepare(user.id);
        self.users.create_pending(&user, &token).await?;

        let context = json!({
            "userName": user.first_name,
            "token": token.token,
            "expiresAt": token.expires_at,
        });
        if let Err(e) = self
            .mailer
            .send(&user.email, VERIFY_EMAIL_TEMPLATE, context)
            .await
        {
            error!(email = %mask_email(&user.email), error = %e, "Verification email failed");
            self.users.delete(user.id).await?;
            return Err(AuthError::EmailDeliveryFailed.into());
        }

        info!(user_id = %user.id, email = %mask_email(&user.email), "Registered user");
        Ok(user.profile())
    }

    /// Redeems an email verification token
    pub async fn verify_email(&self, token: &str) -> Result<VerificationOutcome, DomainError> {
        if token.trim().is_empty() {
            return Err(ValidationError::RequiredField {
                field: "token".to_string(),
            }
            .into());
        }
        self.verification.verify(token).await
    }

    /// Authenticates with email and password and issues a token pair
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, DomainError> {
        let email = normalize_email(email);
        let user = match self.users.find_by_email(&email).await? {
            Some(user) => user,
            None => {
                debug!(email = %mask_email(&email), "Login for unknown email");
                return Err(AuthError::InvalidCredentials.into());
            }
        };

        if user.is_deleted() {
            return Err(AuthError::AccountDeactivated.into());
        }
        self.ensure_verified(&user).await?;

        if !verify_password(password, &user.password_hash)? {
            warn!(target: "security", user_id = %user.id, "Failed login attempt");
            return Err(AuthError::InvalidCredentials.into());
        }

        let pair = self.tokens.issue_tokens(&user).await?;
        info!(user_id = %user.id, "User logged in");
        Ok(AuthResponse::from_token_pair(pair, Some(user.profile())))
    }

    /// Resolves an access token to the verified, active user it belongs to
    pub async fn authenticate(&self, raw_access_token: &str) -> Result<UserProfile, DomainError> {
        let claims = self.tokens.validate_access_token(raw_access_token).await?;
        let user_id = Self::subject(&claims)?;

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;
        if user.is_deleted() {
            return Err(AuthError::AccountDeactivated.into());
        }
        if !user.is_verified {
            return Err(AuthError::EmailNotVerified.into());
        }
        Ok(user.profile())
    }

    /// Exchanges a refresh token for a new pair
    ///
    /// A refresh token that no longer verifies has its session deleted and
    /// yields `SessionExpired`.
    pub async fn refresh(&self, raw_refresh_token: &str) -> Result<AuthResponse, DomainError> {
        let claims = match self.tokens.decode_refresh_token(raw_refresh_token) {
            Ok(claims) => claims,
            Err(reason) => {
                debug!(%reason, "Refresh token rejected, dropping its session");
                if let Err(e) = self.tokens.revoke_one(raw_refresh_token).await {
                    warn!(error = %e, "Failed to drop session of dead refresh token");
                }
                return Err(TokenError::SessionExpired.into());
            }
        };

        let pair = self.tokens.rotate(raw_refresh_token, &claims).await?;
        Ok(AuthResponse::from_token_pair(pair, None))
    }

    /// Ends the session the access token belongs to
    pub async fn logout(&self, raw_access_token: &str) -> Result<(), DomainError> {
        let claims = self.tokens.validate_access_token(raw_access_token).await?;
        let user_id = Self::subject(&claims)?;

        self.tokens
            .blacklist_access_token(raw_access_token, claims.exp)
            .await?;
        self.tokens
            .revoke_by_session(&claims.session_token, user_id)
            .await?;

        info!(user_id = %user_id, "User logged out");
        Ok(())
    }

    /// Ends the session holding `raw_refresh_token`
    ///
    /// # Returns
    /// * `Ok(false)` - no live session held that token
    pub async fn logout_session(&self, raw_refresh_token: &str) -> Result<bool, DomainError> {
        self.tokens.revoke_one(raw_refresh_token).await
    }

    /// Ends every session of the access token's owner
    pub async fn logout_all(&self, raw_access_token: &str) -> Result<u64, DomainError> {
        let claims = self.tokens.validate_access_token(raw_access_token).await?;
        let user_id = Self::subject(&claims)?;

        self.tokens
            .blacklist_access_token(raw_access_token, claims.exp)
            .await?;
        let revoked = self.tokens.revoke_all(user_id).await?;

        info!(user_id = %user_id, revoked, "User logged out everywhere");
        Ok(revoked)
    }

    /// Starts a password reset and mails the raw token
    pub async fn forgot_password(&self, email: &str) -> Result<(), DomainError> {
        let email = normalize_email(email);
        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if user.is_deleted() {
            return Err(AuthError::AccountDeactivated.into());
        }
        self.ensure_verified(&user).await?;

        let raw = self.resets.create(user.id).await?;
        let context = json!({
            "name": user.first_name,
            "token": raw,
            "expiresInMinutes": self.config.reset_token_expiry_minutes,
        });
        self.mailer
            .send(&user.email, RESET_PASSWORD_TEMPLATE, context)
            .await
            .map_err(|e| {
                error!(user_id = %user.id, error = %e, "Reset email failed");
                DomainError::from(AuthError::EmailDeliveryFailed)
            })?;

        info!(user_id = %user.id, "Password reset requested");
        Ok(())
    }

    /// Sets a new password using a reset token, then signs the user out
    /// everywhere
    pub async fn reset_password(
        &self,
        raw_token: &str,
        new_password: &str,
    ) -> Result<(), DomainError> {
        Self::validate_password(new_password)?;

        let user = self
            .resets
            .verify(raw_token)
            .await?
            .ok_or_else(reset_token_not_found)?;

        let password_hash = hash_password(new_password, self.config.bcrypt_cost)?;
        self.resets
            .consume(raw_token, user.id, &password_hash)
            .await?;
        self.tokens.revoke_all(user.id).await?;

        info!(user_id = %user.id, "Password changed, sessions revoked");
        Ok(())
    }

    /// Rejects unverified accounts, purging the ones whose verification
    /// window has lapsed
    async fn ensure_verified(&self, user: &User) -> Result<(), DomainError> {
        if user.is_verified {
            return Ok(());
        }

        match self.verification.pending_token(user.id).await? {
            Some(token) if self.verification.is_live(&token) => {
                Err(AuthError::VerificationPending.into())
            }
            Some(token) => {
                self.verification.discard(&token).await?;
                info!(user_id = %user.id, "Purged account with lapsed verification");
                Err(AuthError::RegistrationExpired.into())
            }
            None => {
                self.users.delete(user.id).await?;
                info!(user_id = %user.id, "Purged unverified account without token");
                Err(AuthError::RegistrationExpired.into())
            }
        }
    }

    fn subject(claims: &Claims) -> Result<Uuid, DomainError> {
        claims
            .user_id()
            .ok_or_else(|| TokenError::InvalidToken.into())
    }

    fn validate_registration(new_user: &NewUser, email: &str) -> Result<(), DomainError> {
        if !is_valid_email(email) {
            return Err(ValidationError::InvalidEmail.into());
        }

        let first_name = new_user.first_name.trim().chars().count();
        if !(3..=20).contains(&first_name) {
            return Err(ValidationError::InvalidLength {
                field: "first_name".to_string(),
                min: 3,
                max: 20,
            }
            .into());
        }
        let last_name = new_user.last_name.trim().chars().count();
        if !(1..=20).contains(&last_name) {
            return Err(ValidationError::InvalidLength {
                field: "last_name".to_string(),
                min: 1,
                max: 20,
            }
            .into());
        }

        Self::validate_password(&new_user.password)
    }

    fn validate_password(password: &str) -> Result<(), DomainError> {
        // bcrypt ignores input beyond 72 bytes
        if password.chars().count() < MIN_PASSWORD_LENGTH || password.len() > 72 {
            return Err(ValidationError::InvalidLength {
                field: "password".to_string(),
                min: MIN_PASSWORD_LENGTH,
                max: 72,
            }
            .into());
        }
        Ok(())
    }
}
