//! Login and access-token authentication

use chrono::Duration;

use crate::errors::{AuthError, DomainError, TokenError};
use crate::repositories::UserRepository;

use super::{fixture, new_user};

#[tokio::test]
async fn test_login_issues_pair_with_profile() {
    let f = fixture();
    let user_id = f.verified_account("login@example.com").await;

    let response = f
        .service
        .login("LOGIN@example.com", "enigma-machine")
        .await
        .unwrap();

    assert_eq!(response.expires_in, 900);
    assert_eq!(response.user.as_ref().unwrap().id, user_id);
    assert_eq!(f.store.sessions_for(user_id).await.len(), 1);

    let profile = f.service.authenticate(&response.access_token).await.unwrap();
    assert_eq!(profile.id, user_id);
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let f = fixture();
    f.verified_account("who@example.com").await;

    let unknown = f.service.login("nobody@example.com", "enigma-machine").await;
    let wrong = f.service.login("who@example.com", "wrong-password").await;

    assert!(matches!(unknown, Err(DomainError::Auth(AuthError::InvalidCredentials))));
    assert!(matches!(wrong, Err(DomainError::Auth(AuthError::InvalidCredentials))));
}

#[tokio::test]
async fn test_login_while_verification_pending() {
    let f = fixture();
    f.service.register(new_user("pending@example.com")).await.unwrap();

    let result = f.service.login("pending@example.com", "enigma-machine").await;
    assert!(matches!(result, Err(DomainError::Auth(AuthError::VerificationPending))));
}

#[tokio::test]
async fn test_login_after_verification_window_purges_account() {
    let f = fixture();
    let profile = f.service.register(new_user("late@example.com")).await.unwrap();
    f.clock.advance(Duration::minutes(45));

    let result = f.service.login("late@example.com", "enigma-machine").await;
    assert!(matches!(result, Err(DomainError::Auth(AuthError::RegistrationExpired))));
    assert!(f.store.user(profile.id).await.is_none());
}

#[tokio::test]
async fn test_login_of_deactivated_account() {
    let f = fixture();
    let user_id = f.verified_account("gone@example.com").await;
    let mut user = f.store.user(user_id).await.unwrap();
    user.deleted_at = Some(user.created_at);
    f.store.insert_user(user).await;

    let result = f.service.login("gone@example.com", "enigma-machine").await;
    assert!(matches!(result, Err(DomainError::Auth(AuthError::AccountDeactivated))));
}

#[tokio::test]
async fn test_fourth_device_is_refused() {
    let f = fixture();
    f.verified_account("devices@example.com").await;

    for _ in 0..3 {
        f.service.login("devices@example.com", "enigma-machine").await.unwrap();
    }
    let result = f.service.login("devices@example.com", "enigma-machine").await;
    assert!(matches!(
        result,
        Err(DomainError::Token(TokenError::DeviceLimitExceeded { limit: 3 }))
    ));
}

#[tokio::test]
async fn test_authenticate_rejects_removed_user() {
    let f = fixture();
    let user_id = f.verified_account("removed@example.com").await;
    let response = f.service.login("removed@example.com", "enigma-machine").await.unwrap();

    f.store.delete(user_id).await.unwrap();

    let result = f.service.authenticate(&response.access_token).await;
    assert!(matches!(result, Err(DomainError::Auth(AuthError::UserNotFound))));
}
