//! Repository traits for the credential store and the revocation cache.
//!
//! Every operation that must keep an invariant across several rows is a
//! single trait method, so implementations can run it as one transaction.

pub mod password_reset;
pub mod revocation;
pub mod session;
pub mod user;
pub mod verification;

#[cfg(test)]
pub mod memory;

pub use password_reset::PasswordResetTokenRepository;
pub use revocation::RevocationCache;
pub use session::{SessionInsert, SessionRepository};
pub use user::UserRepository;
pub use verification::{PurgeCount, VerificationTokenRepository};

#[cfg(test)]
pub use memory::{MockCredentialStore, MockRevocationCache};
