//! Forgot/reset password flows

use chrono::Duration;

use crate::errors::{AuthError, DomainError, TokenError};
use crate::services::account::RESET_PASSWORD_TEMPLATE;

use super::{fixture, new_user};

#[tokio::test]
async fn test_reset_password_end_to_end() {
    let f = fixture();
    let user_id = f.verified_account("forgot@example.com").await;
    let old_login = f.service.login("forgot@example.com", "enigma-machine").await.unwrap();

    f.service.forgot_password("forgot@example.com").await.unwrap();
    let raw = f.mailer.last_token(RESET_PASSWORD_TEMPLATE).await.unwrap();
    assert_ne!(f.store.reset_token_for(user_id).await.unwrap().token_digest, raw);

    f.service.reset_password(&raw, "bombe-machine").await.unwrap();

    assert!(f.store.reset_token_for(user_id).await.is_none());
    assert!(f.store.sessions_for(user_id).await.is_empty());
    assert!(matches!(
        f.service.refresh(&old_login.refresh_token).await,
        Err(DomainError::Token(TokenError::AccessDenied))
    ));
    assert!(f.service.login("forgot@example.com", "enigma-machine").await.is_err());
    assert!(f.service.login("forgot@example.com", "bombe-machine").await.is_ok());

    // The token cannot be replayed
    let replay = f.service.reset_password(&raw, "another-password").await;
    assert!(matches!(replay, Err(DomainError::NotFound { .. })));
}

#[tokio::test]
async fn test_forgot_password_conflicts_while_pending() {
    let f = fixture();
    f.verified_account("twice@example.com").await;

    f.service.forgot_password("twice@example.com").await.unwrap();
    let second = f.service.forgot_password("twice@example.com").await;
    assert!(matches!(
        second,
        Err(DomainError::Token(TokenError::ResetAlreadyPending))
    ));

    f.clock.advance(Duration::minutes(31));
    assert!(f.service.forgot_password("twice@example.com").await.is_ok());
}

#[tokio::test]
async fn test_forgot_password_for_unknown_or_unverified() {
    let f = fixture();
    assert!(matches!(
        f.service.forgot_password("ghost@example.com").await,
        Err(DomainError::Auth(AuthError::UserNotFound))
    ));

    f.service.register(new_user("fresh@example.com")).await.unwrap();
    assert!(matches!(
        f.service.forgot_password("fresh@example.com").await,
        Err(DomainError::Auth(AuthError::VerificationPending))
    ));
}

#[tokio::test]
async fn test_expired_reset_token_is_rejected() {
    let f = fixture();
    f.verified_account("slow@example.com").await;
    f.service.forgot_password("slow@example.com").await.unwrap();
    let raw = f.mailer.last_token(RESET_PASSWORD_TEMPLATE).await.unwrap();
    f.clock.advance(Duration::minutes(31));

    let result = f.service.reset_password(&raw, "new-password").await;
    assert!(matches!(result, Err(DomainError::NotFound { .. })));
}

#[tokio::test]
async fn test_concurrent_resets_with_one_token_change_password_once() {
    let f = fixture();
    f.verified_account("race@example.com").await;
    f.service.forgot_password("race@example.com").await.unwrap();
    let raw = f.mailer.last_token(RESET_PASSWORD_TEMPLATE).await.unwrap();

    let (first, second) = tokio::join!(
        f.service.reset_password(&raw, "first-password"),
        f.service.reset_password(&raw, "second-password"),
    );

    assert_eq!(first.is_ok() as u8 + second.is_ok() as u8, 1);
    let winner = if first.is_ok() { "first-password" } else { "second-password" };
    let loser = if first.is_ok() { "second-password" } else { "first-password" };
    assert!(f.service.login("race@example.com", winner).await.is_ok());
    assert!(f.service.login("race@example.com", loser).await.is_err());
}

#[tokio::test]
async fn test_reset_rejects_short_password() {
    let f = fixture();
    let result = f.service.reset_password("whatever", "short").await;
    assert!(matches!(result, Err(DomainError::ValidationErr(_))));
}
