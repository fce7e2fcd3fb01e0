//! MySQL implementations of the credential store traits

mod password_reset_token_repository;
mod rows;
mod session_repository;
mod user_repository;
mod verification_token_repository;

pub use password_reset_token_repository::MySqlPasswordResetTokenRepository;
pub use session_repository::MySqlSessionRepository;
pub use user_repository::MySqlUserRepository;
pub use verification_token_repository::MySqlVerificationTokenRepository;
