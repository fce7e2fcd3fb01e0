//! Token lifecycle engine
//!
//! This module handles:
//! - Signing and decoding access/refresh pairs with distinct secrets
//! - Device-limited issuance
//! - Single-use refresh rotation
//! - Session revocation and the access-token blacklist
//! - Background cleanup of expired credentials

mod cleanup;
mod config;
mod digest;
mod issuer;
mod revoker;
mod rotator;
mod service;
mod signer;
mod validator;

#[cfg(test)]
mod tests;

pub use cleanup::{CleanupResult, TokenCleanupConfig, TokenCleanupService};
pub use config::TokenServiceConfig;
pub use digest::{blacklist_key, digest_token, random_token, BLACKLIST_SENTINEL};
pub use issuer::TokenIssuer;
pub use revoker::SessionRevoker;
pub use rotator::RefreshRotator;
pub use service::TokenService;
pub use signer::{JwtSigner, TokenSubject};
pub use validator::AccessTokenValidator;
