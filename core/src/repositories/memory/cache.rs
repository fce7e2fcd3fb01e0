//! Mock revocation cache recording every write with its TTL

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::errors::DomainError;
use crate::repositories::revocation::RevocationCache;

/// Mock cache for testing; entries never expire on their own
#[derive(Clone, Default)]
pub struct MockRevocationCache {
    entries: Arc<RwLock<HashMap<String, (String, u64)>>>,
    unavailable: Arc<AtomicBool>,
}

impl MockRevocationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with `CacheUnavailable`
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// TTL recorded for `key`
    pub async fn ttl_of(&self, key: &str) -> Option<u64> {
        self.entries.read().await.get(key).map(|(_, ttl)| *ttl)
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    fn check(&self) -> Result<(), DomainError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DomainError::CacheUnavailable {
                message: "mock cache offline".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl RevocationCache for MockRevocationCache {
    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), DomainError> {
        self.check()?;
        self.entries
            .write()
            .await
            .insert(key.to_string(), (value.to_string(), ttl_seconds));
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, DomainError> {
        self.check()?;
        Ok(self.entries.read().await.get(key).map(|(v, _)| v.clone()))
    }
}
