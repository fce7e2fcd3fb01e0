//! Tests for the token lifecycle engine

mod issuer_tests;
mod revoker_tests;

use chrono::{Duration, Utc};
use std::sync::Arc;

use cb_shared::config::RevocationCheckPolicy;

use crate::domain::entities::User;
use crate::repositories::{MockCredentialStore, MockRevocationCache};
use crate::services::clock::MockClock;
use crate::services::token::{TokenService, TokenServiceConfig};

pub(super) fn test_config() -> TokenServiceConfig {
    TokenServiceConfig {
        access_secret: "test-access-secret".to_string(),
        access_ttl: Duration::minutes(15),
        refresh_secret: "test-refresh-secret".to_string(),
        refresh_ttl: Duration::days(7),
        verification_ttl: Duration::minutes(30),
        reset_ttl: Duration::minutes(30),
        max_devices: 3,
        reset_digest_key: "test-reset-key".to_string(),
        revocation_check_policy: RevocationCheckPolicy::FailOpen,
    }
}

pub(super) struct Harness {
    pub store: Arc<MockCredentialStore>,
    pub cache: Arc<MockRevocationCache>,
    pub clock: Arc<MockClock>,
    pub service: TokenService<MockCredentialStore, MockRevocationCache>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: TokenServiceConfig) -> Self {
        let store = Arc::new(MockCredentialStore::new());
        let cache = Arc::new(MockRevocationCache::new());
        let clock = Arc::new(MockClock::new(Utc::now()));
        let service = TokenService::new(store.clone(), cache.clone(), clock.clone(), config);

        Self {
            store,
            cache,
            clock,
            service,
        }
    }

    pub async fn verified_user(&self) -> User {
        let mut user = User::new(
            format!("{}@example.com", uuid::Uuid::new_v4().simple()),
            "Grace".to_string(),
            "Hopper".to_string(),
            "hash".to_string(),
            self.clock_now(),
        );
        user.verify(self.clock_now());
        self.store.insert_user(user.clone()).await;
        user
    }

    fn clock_now(&self) -> chrono::DateTime<Utc> {
        use crate::services::clock::Clock;
        self.clock.now()
    }
}
