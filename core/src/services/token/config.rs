//! Configuration for the token service

use chrono::Duration;

use cb_shared::config::{AuthConfig, RevocationCheckPolicy};

/// Immutable settings the credential engine is constructed with
#[derive(Clone)]
pub struct TokenServiceConfig {
    /// Access token signing secret
    pub access_secret: String,
    pub access_ttl: Duration,
    /// Refresh token signing secret, distinct from the access secret
    pub refresh_secret: String,
    pub refresh_ttl: Duration,
    pub verification_ttl: Duration,
    pub reset_ttl: Duration,
    /// Maximum number of live sessions per user
    pub max_devices: usize,
    /// Key for the password reset token digest
    pub reset_digest_key: String,
    pub revocation_check_policy: RevocationCheckPolicy,
}

impl Default for TokenServiceConfig {
    fn default() -> Self {
        Self::from(&AuthConfig::default())
    }
}

impl From<&AuthConfig> for TokenServiceConfig {
    fn from(config: &AuthConfig) -> Self {
        Self {
            access_secret: config.access_secret.clone(),
            access_ttl: Duration::seconds(config.access_token_expiry),
            refresh_secret: config.refresh_secret.clone(),
            refresh_ttl: Duration::seconds(config.refresh_token_expiry),
            verification_ttl: Duration::minutes(config.verification_token_expiry_minutes),
            reset_ttl: Duration::minutes(config.reset_token_expiry_minutes),
            max_devices: config.max_devices,
            reset_digest_key: config.reset_digest_key.clone(),
            revocation_check_policy: config.revocation_check_policy,
        }
    }
}

impl std::fmt::Debug for TokenServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenServiceConfig")
            .field("access_secret", &"[redacted]")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_secret", &"[redacted]")
            .field("refresh_ttl", &self.refresh_ttl)
            .field("verification_ttl", &self.verification_ttl)
            .field("reset_ttl", &self.reset_ttl)
            .field("max_devices", &self.max_devices)
            .field("reset_digest_key", &"[redacted]")
            .field("revocation_check_policy", &self.revocation_check_policy)
            .finish()
    }
}
