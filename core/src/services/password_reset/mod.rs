//! Password reset tokens.

mod digest;
mod manager;


pub use digest::ResetTokenDigest;
pub use manager::PasswordResetTokenManager;
pub(crate) use manager::reset_token_not_found;
