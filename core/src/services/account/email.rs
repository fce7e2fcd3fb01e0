//! Outgoing email seam.

use async_trait::async_trait;

use crate::errors::DomainError;

/// Template sent at registration, context carries the verification token
pub const VERIFY_EMAIL_TEMPLATE: &str = "verify-email";

/// Template sent on a password reset request, context carries the raw token
pub const RESET_PASSWORD_TEMPLATE: &str = "reset-password";

/// Delivers templated email; rendering and transport live behind this trait
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(
        &self,
        to: &str,
        template: &str,
        context: serde_json::Value,
    ) -> Result<(), DomainError>;
}

#[cfg(test)]
pub use mock::MockEmailSender;
