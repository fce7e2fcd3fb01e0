//! Tests for session revocation and blacklisting

use chrono::Duration;
use uuid::Uuid;

use crate::services::clock::Clock;
use crate::services::token::{blacklist_key, BLACKLIST_SENTINEL};
use crate::repositories::RevocationCache;

use super::Harness;

#[tokio::test]
async fn test_blacklist_ttl_matches_remaining_lifetime() {
    let h = Harness::new();
    let user = h.verified_user().await;
    let pair = h.service.issue_tokens(&user).await.unwrap();
    let claims = h.service.validate_access_token(&pair.access_token).await.unwrap();

    h.clock.advance(Duration::seconds(100));
    h.service
        .blacklist_access_token(&pair.access_token, claims.exp)
        .await
        .unwrap();

    let key = blacklist_key(&pair.access_token);
    assert_eq!(
        h.cache.get(&key).await.unwrap().as_deref(),
        Some(BLACKLIST_SENTINEL)
    );

    let expected = claims.exp - h.clock.now().timestamp();
    let ttl = h.cache.ttl_of(&key).await.unwrap() as i64;
    assert!((ttl - expected).abs() <= 1);
    assert!((ttl - 800).abs() <= 1);
}

#[tokio::test]
async fn test_expired_token_is_not_blacklisted() {
    let h = Harness::new();
    let now = h.clock.now().timestamp();

    h.service.blacklist_access_token("some.jwt.value", now).await.unwrap();
    h.service
        .blacklist_access_token("some.jwt.value", now - 60)
        .await
        .unwrap();

    assert_eq!(h.cache.len().await, 0);
}

#[tokio::test]
async fn test_revoke_one_reports_missing_session() {
    let h = Harness::new();
    let user = h.verified_user().await;
    let pair = h.service.issue_tokens(&user).await.unwrap();

    assert!(h.service.revoke_one(&pair.refresh_token).await.unwrap());
    assert!(!h.service.revoke_one(&pair.refresh_token).await.unwrap());
}

#[tokio::test]
async fn test_revoke_by_session_needs_matching_owner() {
    let h = Harness::new();
    let user = h.verified_user().await;
    let pair = h.service.issue_tokens(&user).await.unwrap();
    let claims = h.service.validate_access_token(&pair.access_token).await.unwrap();

    let deleted = h
        .service
        .revoke_by_session(&claims.session_token, Uuid::new_v4())
        .await
        .unwrap();
    assert_eq!(deleted, 0);

    let deleted = h
        .service
        .revoke_by_session(&claims.session_token, user.id)
        .await
        .unwrap();
    assert_eq!(deleted, 1);
    assert!(h.store.sessions_for(user.id).await.is_empty());
}

#[tokio::test]
async fn test_revoke_all_leaves_other_users() {
    let h = Harness::new();
    let alice = h.verified_user().await;
    let bob = h.verified_user().await;
    h.service.issue_tokens(&alice).await.unwrap();
    h.service.issue_tokens(&alice).await.unwrap();
    h.service.issue_tokens(&bob).await.unwrap();

    assert_eq!(h.service.revoke_all(alice.id).await.unwrap(), 2);
    assert_eq!(h.store.sessions_for(bob.id).await.len(), 1);
}
