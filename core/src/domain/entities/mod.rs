//! Domain entities owned by the credential store.

pub mod password_reset_token;
pub mod session;
pub mod token;
pub mod user;
pub mod verification_token;


// Re-export commonly used types
pub use password_reset_token::PasswordResetToken;
pub use session::Session;
pub use token::{Claims, TokenPair, JWT_ISSUER};
pub use user::User;
pub use verification_token::VerificationToken;
