//! Configuration for the account service

use cb_shared::config::AuthConfig;

/// Minimum accepted password length
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Account service settings
#[derive(Debug, Clone)]
pub struct AuthServiceConfig {
    /// bcrypt cost factor
    pub bcrypt_cost: u32,
    /// Lifetime of a reset token, echoed in the reset email
    pub reset_token_expiry_minutes: i64,
}

impl Default for AuthServiceConfig {
    fn default() -> Self {
        Self::from(&AuthConfig::default())
    }
}

impl From<&AuthConfig> for AuthServiceConfig {
    fn from(config: &AuthConfig) -> Self {
        Self {
            bcrypt_cost: config.bcrypt_cost,
            reset_token_expiry_minutes: config.reset_token_expiry_minutes,
        }
    }
}
