//! Email verification tokens gating account activation.

mod manager;


pub use manager::VerificationTokenManager;
