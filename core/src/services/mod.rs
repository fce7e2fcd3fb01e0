//! Business services containing the credential lifecycle and account flows.

pub mod account;
pub mod clock;
pub mod password_reset;
pub mod token;
pub mod verification;

// Re-export commonly used types
pub use account::{AuthService, AuthServiceConfig, EmailSender};
pub use clock::{Clock, SystemClock};
pub use password_reset::{PasswordResetTokenManager, ResetTokenDigest};
pub use token::{
    AccessTokenValidator, CleanupResult, JwtSigner, RefreshRotator, SessionRevoker,
    TokenCleanupConfig, TokenCleanupService, TokenIssuer, TokenService, TokenServiceConfig,
};
pub use verification::VerificationTokenManager;

#[cfg(test)]
pub use clock::MockClock;
