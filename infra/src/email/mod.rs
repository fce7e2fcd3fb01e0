//! Outgoing email implementations

mod log_mailer;

pub use log_mailer::LogEmailSender;
