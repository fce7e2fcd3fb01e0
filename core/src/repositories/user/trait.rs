//! User repository trait defining the interface for account persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::{User, VerificationToken};
use crate::errors::DomainError;

/// Repository trait for User entity persistence operations
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by ID
    ///
    /// # Returns
    /// * `Ok(Some(User))` - User found
    /// * `Ok(None)` - No user with that ID
    /// * `Err(DomainError)` - Store error occurred
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError>;

    /// Find a user by normalized email address
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;

    /// Insert a new unverified user together with its first verification
    /// token, in one transaction
    ///
    /// # Returns
    /// * `Err(DomainError::Auth(AuthError::EmailAlreadyRegistered))` - email taken
    async fn create_pending(&self, user: &User, token: &VerificationToken)
        -> Result<(), DomainError>;

    /// Hard-delete a user
    ///
    /// Sessions and tokens owned by the user are removed with it.
    ///
    /// # Returns
    /// * `Ok(true)` - User deleted
    /// * `Ok(false)` - No such user
    async fn delete(&self, id: Uuid) -> Result<bool, DomainError>;
}
