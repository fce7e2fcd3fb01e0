//! Tests for device-limited issuance

use chrono::Duration;
use std::sync::Arc;

use crate::errors::{DomainError, TokenError};
use crate::services::token::digest_token;

use super::Harness;

#[tokio::test]
async fn test_issue_persists_digest_not_raw_token() {
    let h = Harness::new();
    let user = h.verified_user().await;

    let pair = h.service.issue_tokens(&user).await.unwrap();

    let sessions = h.store.sessions_for(user.id).await;
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].refresh_token_hash, digest_token(&pair.refresh_token));
    assert_ne!(sessions[0].refresh_token_hash, pair.refresh_token);
    assert_eq!(pair.access_expires_in, 900);
    assert_eq!(pair.refresh_expires_in, 7 * 24 * 3600);
}

#[tokio::test]
async fn test_access_and_refresh_share_session_token() {
    let h = Harness::new();
    let user = h.verified_user().await;

    let pair = h.service.issue_tokens(&user).await.unwrap();
    let access = h.service.validate_access_token(&pair.access_token).await.unwrap();
    let refresh = h.service.decode_refresh_token(&pair.refresh_token).unwrap();

    assert_eq!(access.session_token, refresh.session_token);
    assert_eq!(access.sub, user.id.to_string());
    assert_eq!(access.email, user.email);
    assert!(access.is_verified);

    let sessions = h.store.sessions_for(user.id).await;
    assert_eq!(sessions[0].session_token_id, access.session_token);
}

#[tokio::test]
async fn test_device_limit_exceeded_has_no_side_effects() {
    let h = Harness::new();
    let user = h.verified_user().await;

    for _ in 0..3 {
        h.service.issue_tokens(&user).await.unwrap();
    }
    let before = h.store.sessions_for(user.id).await;

    let result = h.service.issue_tokens(&user).await;
    assert!(matches!(
        result,
        Err(DomainError::Token(TokenError::DeviceLimitExceeded { limit: 3 }))
    ));
    assert_eq!(h.store.sessions_for(user.id).await, before);
}

#[tokio::test]
async fn test_stale_sessions_free_device_slots() {
    let h = Harness::new();
    let user = h.verified_user().await;

    for _ in 0..3 {
        h.service.issue_tokens(&user).await.unwrap();
    }
    h.clock.advance(Duration::days(7) + Duration::seconds(1));

    h.service.issue_tokens(&user).await.unwrap();
    assert_eq!(h.store.sessions_for(user.id).await.len(), 1);
}

#[tokio::test]
async fn test_device_limit_is_per_user() {
    let h = Harness::new();
    let alice = h.verified_user().await;
    let bob = h.verified_user().await;

    for _ in 0..3 {
        h.service.issue_tokens(&alice).await.unwrap();
    }
    assert!(h.service.issue_tokens(&bob).await.is_ok());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_logins_never_exceed_limit() {
    let h = Harness::new();
    let user = h.verified_user().await;
    let service = Arc::new(h.service);

    let mut handles = Vec::new();
    for _ in 0..20 {
        let service = service.clone();
        let user = user.clone();
        handles.push(tokio::spawn(async move { service.issue_tokens(&user).await }));
    }

    let mut issued = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => issued += 1,
            Err(DomainError::Token(TokenError::DeviceLimitExceeded { .. })) => {}
            Err(e) => panic!("unexpected error: {}", e),
        }
    }

    assert_eq!(issued, 3);
    assert_eq!(h.store.sessions_for(user.id).await.len(), 3);
}

#[tokio::test]
async fn test_store_outage_is_retryable() {
    let h = Harness::new();
    let user = h.verified_user().await;
    h.store.set_unavailable(true);

    let error = h.service.issue_tokens(&user).await.unwrap_err();
    assert!(error.is_retryable());
}
