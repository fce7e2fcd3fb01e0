//! # Infrastructure Layer
//!
//! Concrete implementations behind the `cb_core` repository and seam traits:
//! - **Database**: MySQL credential store using SQLx, one transaction per
//!   invariant-bearing operation
//! - **Cache**: Redis client and the access-token revocation cache
//! - **Email**: a log-only `EmailSender`
//! - **Telemetry**: `tracing-subscriber` installation
//!
//! [`initialize`] wires all of it into a ready [`AuthService`](cb_core::AuthService).

pub mod cache;
pub mod database;
pub mod email;
pub mod telemetry;

use std::sync::Arc;

use cb_core::errors::DomainError;
use cb_core::services::{
    AuthService, AuthServiceConfig, Clock, PasswordResetTokenManager, ResetTokenDigest,
    SystemClock, TokenCleanupConfig, TokenCleanupService, TokenService, TokenServiceConfig,
    VerificationTokenManager,
};
use cb_shared::config::AppConfig;

use cache::{RedisClient, RedisRevocationCache};
use database::{
    DatabasePool, MySqlPasswordResetTokenRepository, MySqlSessionRepository,
    MySqlUserRepository, MySqlVerificationTokenRepository,
};
use email::LogEmailSender;

/// Account service over the MySQL store and Redis cache
pub type MySqlAuthService = AuthService<
    MySqlUserRepository,
    MySqlSessionRepository,
    MySqlVerificationTokenRepository,
    MySqlPasswordResetTokenRepository,
    RedisRevocationCache,
    LogEmailSender,
>;

/// Cleanup worker over the MySQL store
pub type MySqlCleanupService = TokenCleanupService<
    MySqlSessionRepository,
    MySqlVerificationTokenRepository,
    MySqlPasswordResetTokenRepository,
>;

/// Everything a host process needs, wired from one [`AppConfig`]
pub struct Infrastructure {
    pub pool: DatabasePool,
    pub redis: Arc<RedisClient>,
    pub auth_service: Arc<MySqlAuthService>,
    pub cleanup_service: Arc<MySqlCleanupService>,
}

/// Connect to MySQL and Redis and build the account and cleanup services
///
/// The configuration is read once here; nothing is reloaded afterwards.
pub async fn initialize(config: &AppConfig) -> Result<Infrastructure, InfrastructureError> {
    tracing::info!(environment = %config.environment, "Initializing infrastructure services");

    config
        .validate()
        .map_err(|e| InfrastructureError::Config(e.to_string()))?;

    let pool = DatabasePool::new(config.database.clone()).await?;
    let redis = Arc::new(RedisClient::new(config.cache.clone()).await?);

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let token_config = TokenServiceConfig::from(&config.auth);

    let users = Arc::new(MySqlUserRepository::new(&pool));
    let sessions = Arc::new(MySqlSessionRepository::new(&pool));
    let verification_tokens = Arc::new(MySqlVerificationTokenRepository::new(&pool));
    let reset_tokens = Arc::new(MySqlPasswordResetTokenRepository::new(&pool));
    let revocations = Arc::new(RedisRevocationCache::new(redis.clone()));

    let verification = VerificationTokenManager::new(
        verification_tokens.clone(),
        clock.clone(),
        token_config.verification_ttl,
    );
    let resets = PasswordResetTokenManager::new(
        reset_tokens.clone(),
        clock.clone(),
        ResetTokenDigest::new(&token_config.reset_digest_key),
        token_config.reset_ttl,
    );
    let cleanup_service = Arc::new(TokenCleanupService::new(
        sessions.clone(),
        verification_tokens,
        reset_tokens,
        clock.clone(),
        token_config.refresh_ttl,
        TokenCleanupConfig::default(),
    ));
    let tokens = TokenService::new(sessions, revocations, clock.clone(), token_config);

    let auth_service = Arc::new(AuthService::new(
        users,
        tokens,
        verification,
        resets,
        Arc::new(LogEmailSender::new()),
        clock,
        AuthServiceConfig::from(&config.auth),
    ));

    tracing::info!("Infrastructure services initialized successfully");

    Ok(Infrastructure {
        pool,
        redis,
        auth_service,
        cleanup_service,
    })
}

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<InfrastructureError> for DomainError {
    fn from(error: InfrastructureError) -> Self {
        match error {
            InfrastructureError::Database(e) => database::store_error(e),
            InfrastructureError::Cache(e) => DomainError::CacheUnavailable {
                message: e.to_string(),
            },
            InfrastructureError::Config(message) => DomainError::Internal { message },
        }
    }
}
