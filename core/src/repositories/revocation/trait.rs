//! Revocation cache trait: TTL-bound key/value store backing the access
//! token blacklist.

use async_trait::async_trait;

use crate::errors::DomainError;

/// Key/value cache with per-entry TTL
///
/// Failures surface as `DomainError::CacheUnavailable`.
#[async_trait]
pub trait RevocationCache: Send + Sync {
    /// Store `value` under `key` for `ttl_seconds`
    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), DomainError>;

    /// Fetch the value under `key`, if present
    async fn get(&self, key: &str) -> Result<Option<String>, DomainError>;
}
