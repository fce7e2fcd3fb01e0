//! Domain-specific error types and error handling.

mod types;


// Re-export all error types
pub use types::{AuthError, TokenError, ValidationError};

use thiserror::Error;

/// Core domain errors (general purpose)
///
/// Store and cache failures are kept apart from the credential-specific
/// variants so callers can tell a transient outage from a rejected request.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Credential store unavailable: {message}")]
    StoreUnavailable { message: String },

    #[error("Operation timed out: {operation}")]
    Timeout { operation: String },

    #[error("Revocation cache unavailable: {message}")]
    CacheUnavailable { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    ValidationErr(#[from] ValidationError),
}

impl DomainError {
    /// Whether retrying the same request later may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DomainError::StoreUnavailable { .. }
                | DomainError::Timeout { .. }
                | DomainError::CacheUnavailable { .. }
        )
    }

    /// Stable machine-readable code for the presentation layer
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::Validation { .. } | DomainError::ValidationErr(_) => "VALIDATION_ERROR",
            DomainError::NotFound { .. } => "NOT_FOUND",
            DomainError::StoreUnavailable { .. } => "STORE_UNAVAILABLE",
            DomainError::Timeout { .. } => "TIMEOUT",
            DomainError::CacheUnavailable { .. } => "CACHE_UNAVAILABLE",
            DomainError::Internal { .. } => "INTERNAL_ERROR",
            DomainError::Auth(e) => e.code(),
            DomainError::Token(e) => e.code(),
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
