//! # Chatterbox Core
//!
//! Domain layer and credential lifecycle engine for the Chatterbox auth
//! backend: entities, repository traits, token issuance, rotation,
//! revocation, verification and password-reset flows.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::entities::{
    Claims, PasswordResetToken, Session, TokenPair, User, VerificationToken,
};
pub use domain::value_objects::{AuthResponse, NewUser, UserProfile, VerificationOutcome};
pub use errors::{AuthError, DomainError, DomainResult, TokenError, ValidationError};
pub use repositories::{
    PasswordResetTokenRepository, PurgeCount, RevocationCache, SessionInsert, SessionRepository,
    UserRepository, VerificationTokenRepository,
};
pub use services::{
    AccessTokenValidator, AuthService, AuthServiceConfig, CleanupResult, Clock, EmailSender,
    JwtSigner, PasswordResetTokenManager, RefreshRotator, ResetTokenDigest, SessionRevoker,
    SystemClock, TokenCleanupConfig, TokenCleanupService, TokenIssuer, TokenService,
    TokenServiceConfig, VerificationTokenManager,
};
