//! Authentication configuration: signing secrets, token lifetimes and limits
//!
//! Everything in here is read once at startup and treated as immutable for the
//! lifetime of the process.

use serde::{Deserialize, Serialize};

use super::{env_or, ConfigError};

const DEFAULT_ACCESS_SECRET: &str = "development-access-secret-change-in-production";
const DEFAULT_REFRESH_SECRET: &str = "development-refresh-secret-change-in-production";
const DEFAULT_RESET_DIGEST_KEY: &str = "development-reset-digest-key-change-in-production";

/// What to do when the revocation cache cannot be reached during an
/// access-token check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RevocationCheckPolicy {
    /// Accept the token and log a warning
    FailOpen,
    /// Reject the token
    FailClosed,
}

impl Default for RevocationCheckPolicy {
    fn default() -> Self {
        RevocationCheckPolicy::FailOpen
    }
}

impl std::str::FromStr for RevocationCheckPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fail-open" | "open" => Ok(RevocationCheckPolicy::FailOpen),
            "fail-closed" | "closed" => Ok(RevocationCheckPolicy::FailClosed),
            _ => Err(format!("Invalid revocation check policy: {}", s)),
        }
    }
}

/// Secrets, lifetimes and limits for credential issuance
#[derive(Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Secret used to sign access tokens
    pub access_secret: String,

    /// Access token lifetime in seconds
    pub access_token_expiry: i64,

    /// Secret used to sign refresh tokens (must differ from the access secret)
    pub refresh_secret: String,

    /// Refresh token lifetime in seconds
    pub refresh_token_expiry: i64,

    /// Email verification token lifetime in minutes
    pub verification_token_expiry_minutes: i64,

    /// Password reset token lifetime in minutes
    pub reset_token_expiry_minutes: i64,

    /// Maximum number of live sessions per user
    pub max_devices: usize,

    /// Server-side key for the password reset token digest
    pub reset_digest_key: String,

    /// bcrypt cost factor for password hashing
    pub bcrypt_cost: u32,

    /// Behaviour when the revocation cache is unavailable
    #[serde(default)]
    pub revocation_check_policy: RevocationCheckPolicy,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_secret: DEFAULT_ACCESS_SECRET.to_string(),
            access_token_expiry: 900,     // 15 minutes
            refresh_secret: DEFAULT_REFRESH_SECRET.to_string(),
            refresh_token_expiry: 604800, // 7 days
            verification_token_expiry_minutes: 30,
            reset_token_expiry_minutes: 30,
            max_devices: 3,
            reset_digest_key: DEFAULT_RESET_DIGEST_KEY.to_string(),
            bcrypt_cost: 10,
            revocation_check_policy: RevocationCheckPolicy::default(),
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("access_secret", &"[redacted]")
            .field("access_token_expiry", &self.access_token_expiry)
            .field("refresh_secret", &"[redacted]")
            .field("refresh_token_expiry", &self.refresh_token_expiry)
            .field("verification_token_expiry_minutes", &self.verification_token_expiry_minutes)
            .field("reset_token_expiry_minutes", &self.reset_token_expiry_minutes)
            .field("max_devices", &self.max_devices)
            .field("reset_digest_key", &"[redacted]")
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("revocation_check_policy", &self.revocation_check_policy)
            .finish()
    }
}

impl AuthConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            access_secret: std::env::var("JWT_ACCESS_SECRET").unwrap_or(defaults.access_secret),
            access_token_expiry: env_or(
                "JWT_ACCESS_EXPIRATION_SECONDS",
                defaults.access_token_expiry,
            ),
            refresh_secret: std::env::var("JWT_REFRESH_SECRET").unwrap_or(defaults.refresh_secret),
            refresh_token_expiry: env_or(
                "JWT_REFRESH_EXPIRATION_SECONDS",
                defaults.refresh_token_expiry,
            ),
            verification_token_expiry_minutes: env_or(
                "EMAIL_VERIFICATION_TOKEN_EXPIRATION_MINUTES",
                defaults.verification_token_expiry_minutes,
            ),
            reset_token_expiry_minutes: env_or(
                "PASSWORD_RESET_TOKEN_EXPIRATION_MINUTES",
                defaults.reset_token_expiry_minutes,
            ),
            max_devices: env_or("MAX_DEVICES_PER_USER", defaults.max_devices),
            reset_digest_key: std::env::var("PASSWORD_RESET_DIGEST_KEY")
                .unwrap_or(defaults.reset_digest_key),
            bcrypt_cost: env_or("BCRYPT_COST", defaults.bcrypt_cost),
            revocation_check_policy: env_or(
                "REVOCATION_CHECK_POLICY",
                defaults.revocation_check_policy,
            ),
        }
    }

    /// Set both signing secrets
    pub fn with_secrets(mut self, access: impl Into<String>, refresh: impl Into<String>) -> Self {
        self.access_secret = access.into();
        self.refresh_secret = refresh.into();
        self
    }

    /// Set the maximum number of live sessions per user
    pub fn with_max_devices(mut self, max_devices: usize) -> Self {
        self.max_devices = max_devices;
        self
    }

    /// Set access token expiry in minutes
    pub fn with_access_expiry_minutes(mut self, minutes: i64) -> Self {
        self.access_token_expiry = minutes * 60;
        self
    }

    /// Set refresh token expiry in days
    pub fn with_refresh_expiry_days(mut self, days: i64) -> Self {
        self.refresh_token_expiry = days * 86400;
        self
    }

    /// Check if any of the development secrets is still in use
    pub fn is_using_default_secrets(&self) -> bool {
        self.access_secret == DEFAULT_ACCESS_SECRET
            || self.refresh_secret == DEFAULT_REFRESH_SECRET
            || self.reset_digest_key == DEFAULT_RESET_DIGEST_KEY
    }

    /// Reject configurations the credential engine cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.access_secret.is_empty() {
            return Err(ConfigError::Missing("JWT_ACCESS_SECRET".to_string()));
        }
        if self.refresh_secret.is_empty() {
            return Err(ConfigError::Missing("JWT_REFRESH_SECRET".to_string()));
        }
        if self.reset_digest_key.is_empty() {
            return Err(ConfigError::Missing("PASSWORD_RESET_DIGEST_KEY".to_string()));
        }
        if self.access_secret == self.refresh_secret {
            return Err(ConfigError::Invalid {
                key: "JWT_REFRESH_SECRET".to_string(),
                reason: "must differ from JWT_ACCESS_SECRET".to_string(),
            });
        }

        let positive = [
            ("JWT_ACCESS_EXPIRATION_SECONDS", self.access_token_expiry),
            ("JWT_REFRESH_EXPIRATION_SECONDS", self.refresh_token_expiry),
            (
                "EMAIL_VERIFICATION_TOKEN_EXPIRATION_MINUTES",
                self.verification_token_expiry_minutes,
            ),
            (
                "PASSWORD_RESET_TOKEN_EXPIRATION_MINUTES",
                self.reset_token_expiry_minutes,
            ),
        ];
        for (key, value) in positive {
            if value <= 0 {
                return Err(ConfigError::Invalid {
                    key: key.to_string(),
                    reason: "must be greater than zero".to_string(),
                });
            }
        }

        if self.max_devices == 0 {
            return Err(ConfigError::Invalid {
                key: "MAX_DEVICES_PER_USER".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        // bcrypt accepts costs in 4..=31
        if !(4..=31).contains(&self.bcrypt_cost) {
            return Err(ConfigError::Invalid {
                key: "BCRYPT_COST".to_string(),
                reason: "must be between 4 and 31".to_string(),
            });
        }

        Ok(())
    }
}
