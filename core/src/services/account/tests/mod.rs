//! Tests for the account service

mod login_tests;
mod password_tests;
mod scenario_tests;

use chrono::{Duration, Utc};
use std::sync::Arc;

use cb_shared::config::RevocationCheckPolicy;

use crate::domain::value_objects::NewUser;
use crate::repositories::{MockCredentialStore, MockRevocationCache};
use crate::services::account::{
    AuthService, AuthServiceConfig, MockEmailSender, VERIFY_EMAIL_TEMPLATE,
};
use crate::services::clock::MockClock;
use crate::services::password_reset::{PasswordResetTokenManager, ResetTokenDigest};
use crate::services::token::{TokenService, TokenServiceConfig};
use crate::services::verification::VerificationTokenManager;

pub(super) type TestAuthService = AuthService<
    MockCredentialStore,
    MockCredentialStore,
    MockCredentialStore,
    MockCredentialStore,
    MockRevocationCache,
    MockEmailSender,
>;

pub(super) struct Fixture {
    pub store: Arc<MockCredentialStore>,
    pub cache: Arc<MockRevocationCache>,
    pub mailer: Arc<MockEmailSender>,
    pub clock: Arc<MockClock>,
    pub service: TestAuthService,
}

pub(super) fn fixture() -> Fixture {
    let config = TokenServiceConfig {
        access_secret: "account-access-secret".to_string(),
        access_ttl: Duration::minutes(15),
        refresh_secret: "account-refresh-secret".to_string(),
        refresh_ttl: Duration::days(7),
        verification_ttl: Duration::minutes(30),
        reset_ttl: Duration::minutes(30),
        max_devices: 3,
        reset_digest_key: "account-reset-key".to_string(),
        revocation_check_policy: RevocationCheckPolicy::FailOpen,
    };

    let store = Arc::new(MockCredentialStore::new());
    let cache = Arc::new(MockRevocationCache::new());
    let mailer = Arc::new(MockEmailSender::new());
    let clock = Arc::new(MockClock::new(Utc::now()));

    let tokens = TokenService::new(store.clone(), cache.clone(), clock.clone(), config.clone());
    let verification =
        VerificationTokenManager::new(store.clone(), clock.clone(), config.verification_ttl);
    let resets = PasswordResetTokenManager::new(
        store.clone(),
        clock.clone(),
        ResetTokenDigest::new(&config.reset_digest_key),
        config.reset_ttl,
    );
    let service = AuthService::new(
        store.clone(),
        tokens,
        verification,
        resets,
        mailer.clone(),
        clock.clone(),
        AuthServiceConfig {
            bcrypt_cost: 4,
            reset_token_expiry_minutes: 30,
        },
    );

    Fixture {
        store,
        cache,
        mailer,
        clock,
        service,
    }
}

pub(super) fn new_user(email: &str) -> NewUser {
    NewUser {
        email: email.to_string(),
        first_name: "Alan".to_string(),
        last_name: "Turing".to_string(),
        password: "enigma-machine".to_string(),
    }
}

impl Fixture {
    /// Registers and verifies `email`, returning the user id
    pub async fn verified_account(&self, email: &str) -> uuid::Uuid {
        let profile = self.service.register(new_user(email)).await.unwrap();
        let token = self.mailer.last_token(VERIFY_EMAIL_TEMPLATE).await.unwrap();
        assert!(self.service.verify_email(&token).await.unwrap().is_verified());
        profile.id
    }
}
