//! HS256 signing of access/refresh pairs.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::domain::entities::token::{Claims, TokenPair, JWT_ISSUER};
use crate::domain::entities::User;
use crate::errors::{DomainError, TokenError};

use super::config::TokenServiceConfig;

/// Identity fields copied into every token of a pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSubject {
    pub user_id: Uuid,
    pub email: String,
    pub is_verified: bool,
}

impl From<&User> for TokenSubject {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            email: user.email.clone(),
            is_verified: user.is_verified,
        }
    }
}

/// Signs and decodes tokens with one key pair per token kind
///
/// Expiry is compared against the caller-supplied `now` rather than the
/// system clock, so `exp` validation inside `jsonwebtoken` is disabled.
pub struct JwtSigner {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
    validation: Validation,
}

impl JwtSigner {
    pub fn new(config: &TokenServiceConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[JWT_ISSUER]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);
        validation.validate_exp = false;

        Self {
            access_encoding: EncodingKey::from_secret(config.access_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(config.access_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(config.refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(config.refresh_secret.as_bytes()),
            access_ttl: config.access_ttl,
            refresh_ttl: config.refresh_ttl,
            validation,
        }
    }

    /// Signs an access token and a refresh token sharing `session_token`
    pub fn sign_pair(
        &self,
        subject: &TokenSubject,
        session_token: &str,
        now: DateTime<Utc>,
    ) -> Result<TokenPair, DomainError> {
        let access_claims = Self::claims(subject, session_token, now, self.access_ttl);
        let refresh_claims = Self::claims(subject, session_token, now, self.refresh_ttl);

        let header = Header::new(Algorithm::HS256);
        let access_token = encode(&header, &access_claims, &self.access_encoding)
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to sign access token: {}", e),
            })?;
        let refresh_token = encode(&header, &refresh_claims, &self.refresh_encoding)
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to sign refresh token: {}", e),
            })?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            access_expires_in: self.access_ttl.num_seconds(),
            refresh_expires_in: self.refresh_ttl.num_seconds(),
        })
    }

    /// Verifies an access token's signature and expiry
    pub fn decode_access(&self, raw: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        self.decode(raw, &self.access_decoding, now)
    }

    /// Verifies a refresh token's signature and expiry
    pub fn decode_refresh(&self, raw: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        self.decode(raw, &self.refresh_decoding, now)
    }

    fn decode(
        &self,
        raw: &str,
        key: &DecodingKey,
        now: DateTime<Utc>,
    ) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(raw, key, &self.validation)
            .map_err(|_| TokenError::InvalidToken)?;

        if data.claims.exp <= now.timestamp() {
            return Err(TokenError::TokenExpired);
        }
        Ok(data.claims)
    }

    fn claims(
        subject: &TokenSubject,
        session_token: &str,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Claims {
        Claims {
            sub: subject.user_id.to_string(),
            email: subject.email.clone(),
            is_verified: subject.is_verified,
            session_token: session_token.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            iss: JWT_ISSUER.to_string(),
        }
    }
}
