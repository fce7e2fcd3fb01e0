//! Error types for account flows, credential lifecycle and input validation
//!
//! Messages are deliberately generic; the security-relevant details are
//! logged, never returned.

use thiserror::Error;

/// Account-level errors raised by registration, login and password flows
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Email already registered")]
    EmailAlreadyRegistered,

    #[error("Email verification pending")]
    VerificationPending,

    #[error("Registration expired, please register again")]
    RegistrationExpired,

    #[error("Account deactivated")]
    AccountDeactivated,

    #[error("Email not verified")]
    EmailNotVerified,

    #[error("User not found")]
    UserNotFound,

    #[error("Email delivery failed")]
    EmailDeliveryFailed,
}

impl AuthError {
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::EmailAlreadyRegistered => "EMAIL_ALREADY_REGISTERED",
            AuthError::VerificationPending => "VERIFICATION_PENDING",
            AuthError::RegistrationExpired => "REGISTRATION_EXPIRED",
            AuthError::AccountDeactivated => "ACCOUNT_DEACTIVATED",
            AuthError::EmailNotVerified => "EMAIL_NOT_VERIFIED",
            AuthError::UserNotFound => "USER_NOT_FOUND",
            AuthError::EmailDeliveryFailed => "EMAIL_DELIVERY_FAILED",
        }
    }
}

/// Credential lifecycle errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Maximum number of devices reached ({limit})")]
    DeviceLimitExceeded { limit: usize },

    #[error("Access denied")]
    AccessDenied,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token revoked")]
    TokenRevoked,

    #[error("Session expired")]
    SessionExpired,

    #[error("A password reset is already pending")]
    ResetAlreadyPending,
}

impl TokenError {
    pub fn code(&self) -> &'static str {
        match self {
            TokenError::DeviceLimitExceeded { .. } => "DEVICE_LIMIT_EXCEEDED",
            TokenError::AccessDenied => "ACCESS_DENIED",
            TokenError::TokenExpired => "TOKEN_EXPIRED",
            TokenError::InvalidToken => "INVALID_TOKEN",
            TokenError::TokenRevoked => "TOKEN_REVOKED",
            TokenError::SessionExpired => "SESSION_EXPIRED",
            TokenError::ResetAlreadyPending => "RESET_ALREADY_PENDING",
        }
    }
}

/// Input validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field: {field}")]
    RequiredField { field: String },

    #[error("Invalid email")]
    InvalidEmail,

    #[error("Invalid length: {field} (min: {min}, max: {max})")]
    InvalidLength { field: String, min: usize, max: usize },
}
