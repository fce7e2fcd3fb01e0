//! Database module - MySQL implementations using SQLx
//!
//! This module provides the credential store:
//! - Connection pool management
//! - Transaction limits (connection wait and body deadline)
//! - Repository implementations of the `cb_core` store traits

pub mod connection;
pub mod mysql;
pub mod transaction;


use cb_core::errors::DomainError;

// Re-export commonly used types
pub use connection::{DatabasePool, PoolStatistics};
pub use mysql::{
    MySqlPasswordResetTokenRepository, MySqlSessionRepository, MySqlUserRepository,
    MySqlVerificationTokenRepository,
};
pub use transaction::{begin, within_deadline, TransactionSettings};

/// Map a SQLx failure onto the domain taxonomy
///
/// Connection-level failures are retryable; anything else is a bug or a
/// schema mismatch and surfaces as `Internal`.
pub(crate) fn store_error(error: sqlx::Error) -> DomainError {
    match error {
        sqlx::Error::PoolTimedOut => DomainError::Timeout {
            operation: "acquire database connection".to_string(),
        },
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => DomainError::StoreUnavailable {
            message: error.to_string(),
        },
        other => DomainError::Internal {
            message: format!("Database error: {}", other),
        },
    }
}
