//! Value objects representing immutable domain concepts.

pub mod auth_response;
pub mod new_user;
pub mod user_profile;
pub mod verification_outcome;

// Re-export commonly used types
pub use auth_response::AuthResponse;
pub use new_user::NewUser;
pub use user_profile::UserProfile;
pub use verification_outcome::VerificationOutcome;
