//! Account flows built on the credential engine: registration, login,
//! logout and password reset.

mod config;
mod email;
mod password;
mod service;

#[cfg(test)]
mod tests;

pub use config::AuthServiceConfig;
pub use email::{EmailSender, RESET_PASSWORD_TEMPLATE, VERIFY_EMAIL_TEMPLATE};
pub use password::{hash_password, verify_password};
pub use service::AuthService;

#[cfg(test)]
pub use email::MockEmailSender;
