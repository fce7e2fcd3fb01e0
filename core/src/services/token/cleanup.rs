//! Token cleanup service for periodic maintenance of expired credentials
//!
//! Expired verification tokens take their still-unverified users with them;
//! expired reset tokens and sessions past the refresh lifetime are dropped.

use chrono::Duration;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::errors::DomainError;
use crate::repositories::{
    PasswordResetTokenRepository, PurgeCount, SessionRepository, VerificationTokenRepository,
};
use crate::services::clock::Clock;

/// Configuration for token cleanup service
#[derive(Debug, Clone)]
pub struct TokenCleanupConfig {
    /// How often to run cleanup (in seconds)
    pub interval_seconds: u64,
    /// Whether to enable automatic cleanup
    pub enabled: bool,
}

impl Default for TokenCleanupConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 3600, // Run every hour
            enabled: true,
        }
    }
}

/// Service for cleaning up expired credentials
pub struct TokenCleanupService<S, V, P>
where
    S: SessionRepository + 'static,
    V: VerificationTokenRepository + 'static,
    P: PasswordResetTokenRepository + 'static,
{
    sessions: Arc<S>,
    verification_tokens: Arc<V>,
    reset_tokens: Arc<P>,
    clock: Arc<dyn Clock>,
    refresh_ttl: Duration,
    config: TokenCleanupConfig,
}

impl<S, V, P> TokenCleanupService<S, V, P>
where
    S: SessionRepository + 'static,
    V: VerificationTokenRepository + 'static,
    P: PasswordResetTokenRepository + 'static,
{
    /// Create a new token cleanup service
    pub fn new(
        sessions: Arc<S>,
        verification_tokens: Arc<V>,
        reset_tokens: Arc<P>,
        clock: Arc<dyn Clock>,
        refresh_ttl: Duration,
        config: TokenCleanupConfig,
    ) -> Self {
        Self {
            sessions,
            verification_tokens,
            reset_tokens,
            clock,
            refresh_ttl,
            config,
        }
    }

    /// Run a single cleanup cycle
    ///
    /// Each step runs even if an earlier one failed; failures are collected
    /// in `CleanupResult::errors`.
    pub async fn run_cleanup(&self) -> Result<CleanupResult, DomainError> {
        if !self.config.enabled {
            return Ok(CleanupResult::default());
        }

        info!("Starting token cleanup cycle");

        let now = self.clock.now();
        let mut result = CleanupResult::default();

        match self.verification_tokens.purge_expired(now).await {
            Ok(PurgeCount { tokens, users }) => {
                result.verification_tokens_deleted = tokens;
                result.unverified_users_deleted = users;
            }
            Err(e) => {
                error!("Failed to purge expired verification tokens: {}", e);
                result
                    .errors
                    .push(format!("Verification token cleanup error: {}", e));
            }
        }

        match self.reset_tokens.delete_expired(now).await {
            Ok(count) => result.reset_tokens_deleted = count,
            Err(e) => {
                error!("Failed to delete expired reset tokens: {}", e);
                result
                    .errors
                    .push(format!("Reset token cleanup error: {}", e));
            }
        }

        match self
            .sessions
            .delete_created_before(now - self.refresh_ttl)
            .await
        {
            Ok(count) => result.stale_sessions_deleted = count,
            Err(e) => {
                error!("Failed to delete stale sessions: {}", e);
                result.errors.push(format!("Session cleanup error: {}", e));
            }
        }

        info!(
            "Token cleanup completed - Verification: {} (users: {}), Reset: {}, Sessions: {}",
            result.verification_tokens_deleted,
            result.unverified_users_deleted,
            result.reset_tokens_deleted,
            result.stale_sessions_deleted
        );

        Ok(result)
    }

    /// Start the cleanup service as a background task
    ///
    /// The returned handle can be aborted to stop the loop.
    pub fn start_background_task(self: Arc<Self>) -> Option<tokio::task::JoinHandle<()>> {
        if !self.config.enabled {
            warn!("Token cleanup service is disabled");
            return None;
        }

        let interval = std::time::Duration::from_secs(self.config.interval_seconds);

        Some(tokio::spawn(async move {
            info!(
                "Token cleanup service started - will run every {} seconds",
                self.config.interval_seconds
            );

            let mut interval_timer = tokio::time::interval(interval);

            loop {
                interval_timer.tick().await;

                match self.run_cleanup().await {
                    Ok(result) => {
                        if !result.errors.is_empty() {
                            warn!("Cleanup completed with errors: {:?}", result.errors);
                        }
                    }
                    Err(e) => {
                        error!("Token cleanup cycle failed: {}", e);
                    }
                }
            }
        }))
    }
}

/// Result of a cleanup operation
#[derive(Debug, Default)]
pub struct CleanupResult {
    /// Number of expired verification tokens deleted
    pub verification_tokens_deleted: u64,
    /// Number of unverified users purged with their tokens
    pub unverified_users_deleted: u64,
    /// Number of expired password reset tokens deleted
    pub reset_tokens_deleted: u64,
    /// Number of sessions past the refresh lifetime deleted
    pub stale_sessions_deleted: u64,
    /// Any errors encountered during cleanup
    pub errors: Vec<String>,
}

impl CleanupResult {
    /// Check if the cleanup was successful (no errors)
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get total number of rows cleaned up
    pub fn total_cleaned(&self) -> u64 {
        self.verification_tokens_deleted
            + self.unverified_users_deleted
            + self.reset_tokens_deleted
            + self.stale_sessions_deleted
    }
}
