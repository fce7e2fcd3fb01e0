//! Cleanup worker: purges expired verification tokens (with their unverified
//! users), expired reset tokens and sessions past the refresh lifetime, on a
//! fixed interval until Ctrl-C.

use anyhow::Context;
use std::sync::Arc;

use cb_core::services::{Clock, SystemClock, TokenCleanupConfig, TokenCleanupService};
use cb_infra::database::{
    DatabasePool, MySqlPasswordResetTokenRepository, MySqlSessionRepository,
    MySqlVerificationTokenRepository,
};
use cb_infra::telemetry;
use cb_shared::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("failed to load configuration")?;
    telemetry::init(&config.logging)?;

    let cleanup_config = TokenCleanupConfig {
        interval_seconds: std::env::var("CLEANUP_INTERVAL_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(TokenCleanupConfig::default().interval_seconds),
        enabled: true,
    };
    tracing::info!(
        environment = %config.environment,
        interval_seconds = cleanup_config.interval_seconds,
        "Starting token janitor"
    );

    let pool = DatabasePool::new(config.database.clone()).await?;
    if std::env::var("RUN_MIGRATIONS").map(|v| v == "true").unwrap_or(false) {
        pool.run_migrations().await?;
    }

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let refresh_ttl = chrono::Duration::seconds(config.auth.refresh_token_expiry);
    let service = Arc::new(TokenCleanupService::new(
        Arc::new(MySqlSessionRepository::new(&pool)),
        Arc::new(MySqlVerificationTokenRepository::new(&pool)),
        Arc::new(MySqlPasswordResetTokenRepository::new(&pool)),
        clock,
        refresh_ttl,
        cleanup_config,
    ));

    let handle = service
        .start_background_task()
        .context("cleanup task is disabled")?;

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    tracing::info!("Shutdown requested, stopping token janitor");

    handle.abort();
    pool.close().await;
    Ok(())
}
