//! Redis-backed revocation cache for blacklisted access tokens

use async_trait::async_trait;
use std::sync::Arc;

use cb_core::errors::DomainError;
use cb_core::repositories::RevocationCache;

use super::redis_client::RedisClient;

/// Stores revocation entries under the configured key prefix with `SET EX`
pub struct RedisRevocationCache {
    client: Arc<RedisClient>,
}

impl RedisRevocationCache {
    pub fn new(client: Arc<RedisClient>) -> Self {
        Self { client }
    }

    fn key(&self, key: &str) -> String {
        self.client.config().make_key(key)
    }
}

#[async_trait]
impl RevocationCache for RedisRevocationCache {
    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), DomainError> {
        self.client
            .set_with_expiry(&self.key(key), value, ttl_seconds)
            .await
            .map_err(DomainError::from)
    }

    async fn get(&self, key: &str) -> Result<Option<String>, DomainError> {
        self.client
            .get(&self.key(key))
            .await
            .map_err(DomainError::from)
    }
}
