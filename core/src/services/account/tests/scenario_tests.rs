//! Register, verify, login, rotate, logout, then replay the old refresh token

use crate::errors::{DomainError, TokenError};
use crate::services::account::VERIFY_EMAIL_TEMPLATE;

use super::{fixture, new_user};

#[tokio::test]
async fn test_full_session_lifecycle() {
    let f = fixture();

    // Register and verify within the TTL
    let profile = f.service.register(new_user("u@example.com")).await.unwrap();
    let token = f.mailer.last_token(VERIFY_EMAIL_TEMPLATE).await.unwrap();
    assert!(f.service.verify_email(&token).await.unwrap().is_verified());

    // Login
    let login = f.service.login("u@example.com", "enigma-machine").await.unwrap();

    // Rotate once
    let rotated = f.service.refresh(&login.refresh_token).await.unwrap();

    // Logout by the session id carried in the access token claims
    let claims = f
        .service
        .tokens()
        .validate_access_token(&rotated.access_token)
        .await
        .unwrap();
    let revoked = f
        .service
        .tokens()
        .revoke_by_session(&claims.session_token, profile.id)
        .await
        .unwrap();
    assert_eq!(revoked, 1);
    assert!(f.store.sessions_for(profile.id).await.is_empty());

    // Both the pre-rotation and the post-rotation refresh tokens are dead
    assert!(matches!(
        f.service.refresh(&login.refresh_token).await,
        Err(DomainError::Token(TokenError::AccessDenied))
    ));
    assert!(matches!(
        f.service.refresh(&rotated.refresh_token).await,
        Err(DomainError::Token(TokenError::AccessDenied))
    ));
}
